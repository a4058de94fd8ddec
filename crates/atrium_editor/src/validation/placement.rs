//! Placement validators: lot bounds, then collision with placed objects.

use std::sync::Arc;

use atrium_core::{Aabb2, ValidationResult, Vec2};
use atrium_ecs::{ComponentType, Entity, EntityManager, Footprint};
use serde::{Deserialize, Serialize};

use super::footprint::{entity_bounds, footprint_bounds};
use super::system::{run_pipeline, ValidationContext, Validator};
use crate::spatial::SpatialGrid;

pub const OUT_OF_BOUNDS: &str = "Footprint está fora dos limites do lote";
pub const NEAR_EDGE: &str = "Footprint muito próximo do limite do lote";
pub const COLLISION_PREFIX: &str = "Colisão com objeto existente";

/// Snapshot of the objects already placed
pub type EntitySource = Arc<dyn Fn() -> Vec<Entity> + Send + Sync>;

/// Objects with a footprint currently stored in `manager`
pub fn placed_objects(manager: &Arc<EntityManager>) -> EntitySource {
    let manager = Arc::clone(manager);
    Arc::new(move || manager.get_entities_with_component(ComponentType::Footprint))
}

/// Lot rectangle, centered on the origin
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotBounds {
    pub width: f32,
    pub depth: f32,
    /// Distance from an edge below which a placement is flagged
    pub edge_margin: f32,
}

impl LotBounds {
    pub fn new(width: f32, depth: f32) -> Self {
        Self {
            width,
            depth,
            edge_margin: 0.0,
        }
    }

    pub fn with_edge_margin(mut self, edge_margin: f32) -> Self {
        self.edge_margin = edge_margin;
        self
    }

    pub fn aabb(&self) -> Aabb2 {
        Aabb2::from_center_size(Vec2::ZERO, Vec2::new(self.width, self.depth))
    }
}

impl Default for LotBounds {
    fn default() -> Self {
        Self {
            width: 20.0,
            depth: 20.0,
            edge_margin: 0.3,
        }
    }
}

/// Candidate bounds for the entity in `ctx`; `None` without a footprint
fn candidate_bounds(ctx: &ValidationContext<'_>) -> Option<Aabb2> {
    ctx.entity
        .get::<Footprint>()
        .map(|footprint| footprint_bounds(footprint, ctx.position, ctx.yaw()))
}

/// The footprint must lie inside the lot
pub struct BoundsValidator {
    lot: LotBounds,
}

impl BoundsValidator {
    pub fn new(lot: LotBounds) -> Self {
        Self { lot }
    }
}

impl Validator for BoundsValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let Some(bounds) = candidate_bounds(ctx) else {
            return ValidationResult::valid();
        };
        let lot = self.lot.aabb();

        if !lot.contains_box(&bounds) {
            return ValidationResult::invalid(OUT_OF_BOUNDS);
        }
        if bounds.clearance_within(&lot) < self.lot.edge_margin {
            return ValidationResult::valid().with_warning(NEAR_EDGE);
        }
        ValidationResult::valid()
    }
}

/// The footprint must not overlap any other placed footprint
pub struct CollisionValidator {
    existing: EntitySource,
    cell_size: f32,
}

impl CollisionValidator {
    pub fn new(existing: EntitySource, cell_size: f32) -> Self {
        Self { existing, cell_size }
    }
}

impl Validator for CollisionValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        let Some(bounds) = candidate_bounds(ctx) else {
            return ValidationResult::valid();
        };

        let mut grid = SpatialGrid::new(self.cell_size);
        for entity in (self.existing)() {
            if entity.id() == ctx.entity_id {
                continue;
            }
            if let Some(other) = entity_bounds(&entity) {
                grid.insert(entity.id().clone(), other);
            }
        }

        let mut hits = grid.query_rect(&bounds);
        hits.sort();
        ValidationResult::from_errors(
            hits.iter()
                .map(|id| format!("{COLLISION_PREFIX}: {id}"))
                .collect(),
        )
    }
}

/// Bounds then collision, stopping at the first failure
pub struct PlacementValidator {
    bounds: BoundsValidator,
    collision: CollisionValidator,
}

impl Validator for PlacementValidator {
    fn validate(&self, ctx: &ValidationContext<'_>) -> ValidationResult {
        run_pipeline(
            [&self.bounds as &dyn Validator, &self.collision as &dyn Validator],
            ctx,
        )
    }
}

/// Placement validator over `lot` against the objects from `existing`
pub fn create_placement_validator(lot: LotBounds, existing: EntitySource) -> PlacementValidator {
    create_placement_validator_with_grid(lot, existing, SpatialGrid::DEFAULT_CELL_SIZE)
}

/// Same as [`create_placement_validator`] with an explicit broad-phase cell size
pub fn create_placement_validator_with_grid(
    lot: LotBounds,
    existing: EntitySource,
    cell_size: f32,
) -> PlacementValidator {
    PlacementValidator {
        bounds: BoundsValidator::new(lot),
        collision: CollisionValidator::new(existing, cell_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atrium_core::{EntityId, Vec3};
    use atrium_ecs::Transform;
    use std::f32::consts::FRAC_PI_2;

    fn boxed(id: &str, position: Vec3, width: f32, depth: f32) -> Entity {
        Entity::new(EntityId::new(id).unwrap())
            .with_component(Transform::new(position))
            .with_component(Footprint::boxed(width, depth, 1.0).unwrap())
    }

    fn ctx(entity: &Entity, position: Vec3, yaw: f32) -> ValidationContext<'_> {
        ValidationContext {
            entity,
            entity_id: entity.id(),
            position,
            rotation: Some(Vec3::new(0.0, yaw, 0.0)),
        }
    }

    #[test]
    fn test_bounds_inside_near_edge_and_outside() {
        let v = BoundsValidator::new(LotBounds::new(10.0, 10.0).with_edge_margin(0.5));
        let chair = boxed("chair", Vec3::ZERO, 2.0, 2.0);

        assert_eq!(v.validate(&ctx(&chair, Vec3::ZERO, 0.0)), ValidationResult::valid());

        let near = v.validate(&ctx(&chair, Vec3::new(3.8, 0.0, 0.0), 0.0));
        assert!(near.is_valid);
        assert_eq!(near.warnings, vec![NEAR_EDGE.to_string()]);

        let out = v.validate(&ctx(&chair, Vec3::new(4.5, 0.0, 0.0), 0.0));
        assert_eq!(out.errors, vec![OUT_OF_BOUNDS.to_string()]);
    }

    #[test]
    fn test_bounds_respect_rotation() {
        let v = BoundsValidator::new(LotBounds::new(10.0, 10.0));
        let bench = boxed("bench", Vec3::ZERO, 4.0, 1.0);
        let at = Vec3::new(0.0, 0.0, 3.5);

        assert!(v.validate(&ctx(&bench, at, 0.0)).is_valid);
        assert!(!v.validate(&ctx(&bench, at, FRAC_PI_2)).is_valid);
    }

    #[test]
    fn test_collision_reports_overlapping_ids_and_skips_self() {
        let placed = vec![
            boxed("sofa", Vec3::ZERO, 2.0, 2.0),
            boxed("lamp", Vec3::new(2.0, 0.0, 0.0), 2.0, 2.0),
        ];
        let source: EntitySource = Arc::new(move || placed.clone());
        let v = CollisionValidator::new(source, 1.0);

        let table = boxed("table", Vec3::ZERO, 2.0, 2.0);
        let result = v.validate(&ctx(&table, Vec3::new(1.0, 0.0, 1.0), 0.0));
        assert_eq!(
            result.errors,
            vec![
                format!("{}: lamp", COLLISION_PREFIX),
                format!("{}: sofa", COLLISION_PREFIX),
            ]
        );

        let sofa = boxed("sofa", Vec3::ZERO, 2.0, 2.0);
        assert_eq!(
            v.validate(&ctx(&sofa, Vec3::new(0.5, 0.0, 0.0), 0.0)).errors,
            vec![format!("{}: lamp", COLLISION_PREFIX)]
        );
    }

    #[test]
    fn test_touching_footprints_do_not_collide() {
        let placed = vec![boxed("a", Vec3::ZERO, 2.0, 2.0)];
        let v = CollisionValidator::new(Arc::new(move || placed.clone()), 2.0);
        let b = boxed("b", Vec3::ZERO, 2.0, 2.0);
        assert!(v.validate(&ctx(&b, Vec3::new(2.0, 0.0, 0.0), 0.0)).is_valid);
    }

    #[test]
    fn test_entities_without_footprint_pass() {
        let v = create_placement_validator(LotBounds::new(1.0, 1.0), Arc::new(Vec::<Entity>::new));
        let bare = Entity::new(EntityId::new("bare").unwrap());
        assert!(v.validate(&ctx(&bare, Vec3::new(50.0, 0.0, 0.0), 0.0)).is_valid);
    }
}
