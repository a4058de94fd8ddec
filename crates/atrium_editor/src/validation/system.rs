//! Ordered validator pipeline.
//!
//! Validators run in registration order. Warnings accumulate across every
//! validator that runs; the first failing validator contributes its errors
//! and stops the pass.

use std::sync::{Arc, Weak};

use atrium_core::{EntityId, ValidationResult, Vec3};
use atrium_ecs::{Entity, EntityLookup, Transform};
use atrium_event::{EventBus, Subscription};
use parking_lot::{Mutex, RwLock};

use crate::events::{ValidationCompleted, ValidationReport, ValidationRequest, ValidationRequested};

static INSTANCE: Mutex<Option<Arc<ValidationSystem>>> = parking_lot::const_mutex(None);

/// Everything a validator sees for one pass
#[derive(Clone, Copy, Debug)]
pub struct ValidationContext<'a> {
    pub entity: &'a Entity,
    pub entity_id: &'a EntityId,
    /// Candidate position; may differ from the entity's current transform
    pub position: Vec3,
    /// Euler angles in radians, `y` is yaw
    pub rotation: Option<Vec3>,
}

impl ValidationContext<'_> {
    pub fn yaw(&self) -> f32 {
        self.rotation.map_or(0.0, |r| r.y)
    }
}

/// One check in the pipeline
pub trait Validator: Send + Sync {
    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult;
}

impl<F> Validator for F
where
    F: Fn(&ValidationContext<'_>) -> ValidationResult + Send + Sync,
{
    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        self(ctx)
    }
}

/// Run `validators` in order against `ctx`
pub(crate) fn run_pipeline<'v>(
    validators: impl IntoIterator<Item = &'v dyn Validator>,
    ctx: &ValidationContext<'_>,
) -> ValidationResult {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    for validator in validators {
        let result = validator.validate(ctx);
        warnings.extend(result.warnings);
        errors.extend(result.errors);
        if !result.is_valid {
            return ValidationResult {
                is_valid: false,
                errors,
                warnings,
            };
        }
    }

    ValidationResult {
        is_valid: true,
        errors,
        warnings,
    }
}

/// Runs registered validators and answers [`ValidationRequested`] events
pub struct ValidationSystem {
    validators: RwLock<Vec<Arc<dyn Validator>>>,
    lookup: EntityLookup,
    bus: EventBus,
    subscription: Mutex<Option<Subscription>>,
}

impl ValidationSystem {
    /// Create a system and subscribe it to validation requests on `bus`
    pub fn new(bus: EventBus, lookup: EntityLookup) -> Arc<Self> {
        let system = Arc::new(Self {
            validators: RwLock::new(Vec::new()),
            lookup,
            bus: bus.clone(),
            subscription: Mutex::new(None),
        });

        let weak: Weak<Self> = Arc::downgrade(&system);
        let subscription = bus.on::<ValidationRequested, _>(move |request| {
            if let Some(system) = weak.upgrade() {
                system.handle_request(request);
            }
        });
        *system.subscription.lock() = Some(subscription);
        system
    }

    /// Process-wide instance; later calls ignore their arguments
    pub fn instance(bus: EventBus, lookup: EntityLookup) -> Arc<Self> {
        INSTANCE
            .lock()
            .get_or_insert_with(|| {
                log::debug!("Creating shared validation system");
                Self::new(bus, lookup)
            })
            .clone()
    }

    pub fn reset_instance() {
        if let Some(system) = INSTANCE.lock().take() {
            system.detach();
            log::debug!("Shared validation system reset");
        }
    }

    /// Stop answering requests on the bus
    pub fn detach(&self) {
        if let Some(subscription) = self.subscription.lock().take() {
            subscription.unsubscribe();
        }
    }

    /// Append a validator; earlier registrations run first
    pub fn register_validator(&self, validator: impl Validator + 'static) {
        self.validators.write().push(Arc::new(validator));
    }

    pub fn validator_count(&self) -> usize {
        self.validators.read().len()
    }

    /// Validate `entity` at `position`, taking rotation from its transform
    pub fn validate(&self, entity: &Entity, position: Vec3) -> ValidationResult {
        let rotation = entity.get::<Transform>().map(|t| t.rotation);
        self.validate_with_rotation(entity, position, rotation)
    }

    /// Validate with an explicit rotation
    pub fn validate_with_rotation(
        &self,
        entity: &Entity,
        position: Vec3,
        rotation: Option<Vec3>,
    ) -> ValidationResult {
        let ctx = ValidationContext {
            entity,
            entity_id: entity.id(),
            position,
            rotation,
        };
        // Validators may call back into the system
        let validators = self.validators.read().clone();
        let result = run_pipeline(validators.iter().map(|v| v.as_ref()), &ctx);

        if !result.is_valid {
            log::debug!("Validation failed for {}: {:?}", entity.id(), result.errors);
        }
        result
    }

    fn handle_request(&self, request: &ValidationRequest) {
        let report = match (self.lookup)(&request.entity_id) {
            Some(entity) => {
                let result = self.validate(&entity, request.position);
                ValidationReport {
                    entity_id: request.entity_id.clone(),
                    position: request.position,
                    valid: result.is_valid,
                    errors: result.errors,
                    warnings: result.warnings,
                }
            }
            None => ValidationReport {
                entity_id: request.entity_id.clone(),
                position: request.position,
                valid: false,
                errors: vec!["entity not found".to_string()],
                warnings: Vec::new(),
            },
        };
        self.bus.emit::<ValidationCompleted>(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn id(s: &str) -> EntityId {
        EntityId::new(s).unwrap()
    }

    fn no_entities() -> EntityLookup {
        Arc::new(|_: &EntityId| None)
    }

    fn pass_with_warning(_: &ValidationContext<'_>) -> ValidationResult {
        ValidationResult::valid().with_warning("w1")
    }

    fn fail(_: &ValidationContext<'_>) -> ValidationResult {
        ValidationResult::invalid("e1").with_warning("w2")
    }

    #[test]
    fn test_pipeline_stops_at_first_failure() {
        let system = ValidationSystem::new(EventBus::new(), no_entities());
        let spy_calls = Arc::new(AtomicUsize::new(0));
        let spy = Arc::clone(&spy_calls);

        system.register_validator(pass_with_warning);
        system.register_validator(fail);
        system.register_validator(move |_: &ValidationContext<'_>| {
            spy.fetch_add(1, Ordering::SeqCst);
            ValidationResult::invalid("never")
        });

        let result = system.validate(&Entity::new(id("chair")), Vec3::ZERO);
        assert!(!result.is_valid);
        assert_eq!(result.errors, vec!["e1".to_string()]);
        assert_eq!(result.warnings, vec!["w1".to_string(), "w2".to_string()]);
        assert_eq!(spy_calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_empty_pipeline_is_valid() {
        let system = ValidationSystem::new(EventBus::new(), no_entities());
        assert_eq!(
            system.validate(&Entity::new(id("a")), Vec3::ZERO),
            ValidationResult::valid()
        );
    }

    #[test]
    fn test_rotation_comes_from_transform_unless_overridden() {
        let system = ValidationSystem::new(EventBus::new(), no_entities());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let s = Arc::clone(&seen);
        system.register_validator(move |ctx: &ValidationContext<'_>| {
            s.lock().push(ctx.yaw());
            ValidationResult::valid()
        });

        let entity = Entity::new(id("a"))
            .with_component(Transform::default().with_rotation(Vec3::new(0.0, 1.5, 0.0)));
        system.validate(&entity, Vec3::ZERO);
        system.validate_with_rotation(&entity, Vec3::ZERO, None);

        assert_eq!(*seen.lock(), vec![1.5, 0.0]);
    }

    #[test]
    fn test_request_for_missing_entity_reports_not_found() {
        let bus = EventBus::new();
        let _system = ValidationSystem::new(bus.clone(), no_entities());
        let reports = Arc::new(Mutex::new(Vec::new()));
        let r = Arc::clone(&reports);
        bus.on::<ValidationCompleted, _>(move |report| r.lock().push(report.clone()));

        bus.emit::<ValidationRequested>(ValidationRequest {
            entity_id: id("ghost"),
            position: Vec3::ZERO,
        });

        let reports = reports.lock();
        assert_eq!(reports.len(), 1);
        assert!(!reports[0].valid);
        assert_eq!(reports[0].errors, vec!["entity not found".to_string()]);
    }

    #[test]
    fn test_request_for_known_entity_runs_pipeline() {
        let bus = EventBus::new();
        let lookup: EntityLookup =
            Arc::new(|id: &EntityId| Some(Entity::new(id.clone())));
        let system = ValidationSystem::new(bus.clone(), lookup);
        system.register_validator(pass_with_warning);

        let reports = Arc::new(Mutex::new(Vec::new()));
        let r = Arc::clone(&reports);
        bus.on::<ValidationCompleted, _>(move |report| r.lock().push(report.clone()));

        bus.emit::<ValidationRequested>(ValidationRequest {
            entity_id: id("lamp"),
            position: Vec3::new(1.0, 0.0, 2.0),
        });

        let reports = reports.lock();
        assert!(reports[0].valid);
        assert_eq!(reports[0].warnings, vec!["w1".to_string()]);
        assert_eq!(reports[0].position, Vec3::new(1.0, 0.0, 2.0));
    }

    #[test]
    fn test_detached_system_ignores_requests() {
        let bus = EventBus::new();
        let system = ValidationSystem::new(bus.clone(), no_entities());
        assert_eq!(bus.listener_count::<ValidationRequested>(), 1);
        system.detach();
        assert_eq!(bus.listener_count::<ValidationRequested>(), 0);
    }
}
