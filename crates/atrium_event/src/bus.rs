//! Event bus implementation

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::{BusError, ErrorCode, ErrorEvent, EventKind};

/// Subscriber ID
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(pub u64);

/// Type-erased handler
type DynamicHandler = Arc<dyn Fn(&dyn Any) + Send + Sync>;

#[derive(Clone)]
struct HandlerEntry {
    id: SubscriberId,
    handler: DynamicHandler,
    /// Present for `once` handlers; flips on first delivery
    fired: Option<Arc<AtomicBool>>,
}

struct Channel {
    name: &'static str,
    handlers: Vec<HandlerEntry>,
}

struct ScheduledEmit {
    due: Instant,
    seq: u64,
    name: &'static str,
    fire: Box<dyn FnOnce(&EventBus) + Send>,
}

/// Bus configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventBusConfig {
    /// Maximum nesting of `emit` calls made from inside handlers
    pub max_emit_depth: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self { max_emit_depth: 32 }
    }
}

/// Event bus statistics
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EventBusStats {
    /// Total events emitted
    pub events_emitted: u64,
    /// Total handler invocations
    pub handler_calls: u64,
    /// Handlers that panicked
    pub listener_errors: u64,
    /// Emissions dropped by the depth limit
    pub dropped_recursive: u64,
}

struct BusInner {
    channels: Mutex<HashMap<TypeId, Channel>>,
    scheduled: Mutex<Vec<ScheduledEmit>>,
    stats: Mutex<EventBusStats>,
    next_subscriber_id: AtomicU64,
    next_seq: AtomicU64,
    depth: AtomicUsize,
    config: EventBusConfig,
}

impl BusInner {
    fn remove_handler(&self, type_id: TypeId, id: SubscriberId) -> bool {
        let mut channels = self.channels.lock();
        let Some(channel) = channels.get_mut(&type_id) else {
            return false;
        };
        let before = channel.handlers.len();
        channel.handlers.retain(|h| h.id != id);
        let removed = channel.handlers.len() != before;
        if channel.handlers.is_empty() {
            channels.remove(&type_id);
        }
        removed
    }
}

/// Handle returned by [`EventBus::on`]; removes exactly that handler.
///
/// Dropping the handle does not unsubscribe.
pub struct Subscription {
    id: SubscriberId,
    event_type: TypeId,
    event: &'static str,
    bus: Weak<BusInner>,
}

impl Subscription {
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Name of the event this subscription listens to
    pub fn event(&self) -> &'static str {
        self.event
    }

    /// Remove the handler. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        match self.bus.upgrade() {
            Some(inner) => inner.remove_handler(self.event_type, self.id),
            None => false,
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("event", &self.event)
            .finish()
    }
}

/// Restores the emit depth even when a handler unwinds
struct DepthGuard<'a>(&'a AtomicUsize);

impl Drop for DepthGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Typed publish-subscribe hub.
///
/// Cloning yields another handle to the same bus.
#[derive(Clone)]
pub struct EventBus {
    inner: Arc<BusInner>,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    pub fn with_config(config: EventBusConfig) -> Self {
        Self {
            inner: Arc::new(BusInner {
                channels: Mutex::new(HashMap::new()),
                scheduled: Mutex::new(Vec::new()),
                stats: Mutex::new(EventBusStats::default()),
                next_subscriber_id: AtomicU64::new(1),
                next_seq: AtomicU64::new(0),
                depth: AtomicUsize::new(0),
                config,
            }),
        }
    }

    pub fn config(&self) -> EventBusConfig {
        self.inner.config
    }

    /// Subscribe to an event type. Handlers run in registration order.
    pub fn on<E, F>(&self, handler: F) -> Subscription
    where
        E: EventKind,
        F: Fn(&E::Payload) + Send + Sync + 'static,
    {
        self.subscribe::<E, F>(handler, None)
    }

    /// Subscribe for a single delivery
    pub fn once<E, F>(&self, handler: F) -> Subscription
    where
        E: EventKind,
        F: Fn(&E::Payload) + Send + Sync + 'static,
    {
        self.subscribe::<E, F>(handler, Some(Arc::new(AtomicBool::new(false))))
    }

    fn subscribe<E, F>(&self, handler: F, fired: Option<Arc<AtomicBool>>) -> Subscription
    where
        E: EventKind,
        F: Fn(&E::Payload) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.inner.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
        let type_id = TypeId::of::<E>();

        let wrapped_handler: DynamicHandler = Arc::new(move |any: &dyn Any| {
            if let Some(payload) = any.downcast_ref::<E::Payload>() {
                handler(payload);
            }
        });

        self.inner
            .channels
            .lock()
            .entry(type_id)
            .or_insert_with(|| Channel {
                name: E::NAME,
                handlers: Vec::new(),
            })
            .handlers
            .push(HandlerEntry {
                id,
                handler: wrapped_handler,
                fired,
            });

        log::trace!("Subscribed {:?} to '{}'", id, E::NAME);

        Subscription {
            id,
            event_type: type_id,
            event: E::NAME,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Remove a specific handler. No-op if it is not registered.
    pub fn off<E: EventKind>(&self, id: SubscriberId) -> bool {
        self.inner.remove_handler(TypeId::of::<E>(), id)
    }

    /// Deliver `payload` to every handler registered when the call starts.
    ///
    /// Handlers added during the pass wait for the next emission; handlers
    /// removed during the pass still receive this one. A panicking handler is
    /// reported through [`ErrorEvent`] and the remaining handlers still run.
    pub fn emit<E: EventKind>(&self, payload: E::Payload) {
        let depth = self.inner.depth.fetch_add(1, Ordering::SeqCst);
        let _guard = DepthGuard(&self.inner.depth);

        if depth >= self.inner.config.max_emit_depth {
            self.inner.stats.lock().dropped_recursive += 1;
            log::error!(
                "Dropping '{}': emit depth limit {} reached (event cycle?)",
                E::NAME,
                self.inner.config.max_emit_depth
            );
            return;
        }

        let type_id = TypeId::of::<E>();
        let snapshot: Vec<HandlerEntry> = self
            .inner
            .channels
            .lock()
            .get(&type_id)
            .map(|channel| channel.handlers.clone())
            .unwrap_or_default();

        self.inner.stats.lock().events_emitted += 1;

        for entry in snapshot {
            if let Some(fired) = &entry.fired {
                if fired.swap(true, Ordering::SeqCst) {
                    continue;
                }
                self.inner.remove_handler(type_id, entry.id);
            }

            self.inner.stats.lock().handler_calls += 1;
            let handler = &entry.handler;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| handler(&payload as &dyn Any)));
            if let Err(cause) = outcome {
                self.report_listener_panic::<E>(cause.as_ref());
            }
        }
    }

    fn report_listener_panic<E: EventKind>(&self, cause: &(dyn Any + Send)) {
        let message = panic_message(cause);
        self.inner.stats.lock().listener_errors += 1;
        log::error!("Listener for '{}' failed: {}", E::NAME, message);

        // A failing error listener must not feed itself
        if TypeId::of::<E>() == TypeId::of::<ErrorEvent>() {
            return;
        }

        self.emit::<ErrorEvent>(BusError {
            message,
            code: ErrorCode::ListenerError,
            event: E::NAME,
        });
    }

    /// Emit after `delay`. A zero delay emits immediately.
    ///
    /// Delayed emissions are delivered by [`EventBus::process_scheduled`] and
    /// cannot be cancelled.
    pub fn emit_async<E: EventKind>(&self, payload: E::Payload, delay: Duration) {
        if delay.is_zero() {
            self.emit::<E>(payload);
            return;
        }

        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);
        self.inner.scheduled.lock().push(ScheduledEmit {
            due: Instant::now() + delay,
            seq,
            name: E::NAME,
            fire: Box::new(move |bus: &EventBus| bus.emit::<E>(payload)),
        });
    }

    /// Emit every scheduled event whose delay has elapsed
    pub fn process_scheduled(&self) -> usize {
        self.process_scheduled_at(Instant::now())
    }

    /// Emit every scheduled event due at or before `now`, oldest deadline first
    pub fn process_scheduled_at(&self, now: Instant) -> usize {
        let mut ready = {
            let mut scheduled = self.inner.scheduled.lock();
            let (ready, pending): (Vec<_>, Vec<_>) =
                scheduled.drain(..).partition(|s| s.due <= now);
            *scheduled = pending;
            ready
        };

        ready.sort_by_key(|s| (s.due, s.seq));
        let count = ready.len();
        for scheduled in ready {
            log::trace!("Firing scheduled '{}'", scheduled.name);
            (scheduled.fire)(self);
        }
        count
    }

    /// Deadline of the earliest scheduled emission
    pub fn next_due(&self) -> Option<Instant> {
        self.inner.scheduled.lock().iter().map(|s| s.due).min()
    }

    /// Number of emissions waiting for their delay
    pub fn scheduled_count(&self) -> usize {
        self.inner.scheduled.lock().len()
    }

    /// Remove all handlers of one event type
    pub fn clear<E: EventKind>(&self) {
        self.inner.channels.lock().remove(&TypeId::of::<E>());
    }

    /// Remove every handler
    pub fn clear_all(&self) {
        self.inner.channels.lock().clear();
    }

    pub fn listener_count<E: EventKind>(&self) -> usize {
        self.inner
            .channels
            .lock()
            .get(&TypeId::of::<E>())
            .map_or(0, |channel| channel.handlers.len())
    }

    pub fn has_listeners<E: EventKind>(&self) -> bool {
        self.listener_count::<E>() > 0
    }

    /// Names of all events with at least one listener, sorted
    pub fn event_types(&self) -> Vec<&'static str> {
        let mut names: Vec<&'static str> = self
            .inner
            .channels
            .lock()
            .values()
            .map(|channel| channel.name)
            .collect();
        names.sort_unstable();
        names
    }

    /// Get statistics
    pub fn stats(&self) -> EventBusStats {
        self.inner.stats.lock().clone()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("event_types", &self.event_types())
            .field("scheduled", &self.scheduled_count())
            .finish()
    }
}

fn panic_message(cause: &(dyn Any + Send)) -> String {
    if let Some(msg) = cause.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = cause.downcast_ref::<String>() {
        msg.clone()
    } else {
        "listener panicked".to_string()
    }
}
