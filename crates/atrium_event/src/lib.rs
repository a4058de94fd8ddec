//! # atrium_event - Typed Event Bus
//!
//! Synchronous, in-process publish-subscribe with:
//! - A compile-time event map (`EventKind`) so `on` and `emit` are checked per event
//! - Snapshot dispatch in registration order
//! - Listener panic isolation reported through [`ErrorEvent`]
//! - Deferred emission drained by the host loop
//!
//! ```ignore
//! atrium_event::event!(pub DoorOpened => String, "doorOpened");
//!
//! let bus = EventBus::new();
//! let sub = bus.on::<DoorOpened, _>(|name| println!("{name} opened"));
//! bus.emit::<DoorOpened>("front".to_string());
//! sub.unsubscribe();
//! ```

mod bus;

pub use bus::{EventBus, EventBusConfig, EventBusStats, Subscription, SubscriberId};

/// A named event and the payload type it carries.
///
/// Events are marker types; the payload is what handlers receive.
pub trait EventKind: 'static {
    /// Wire-style name used for logging and introspection
    const NAME: &'static str;
    /// Data delivered to handlers
    type Payload: Send + Sync + 'static;
}

/// Declare an event marker type.
///
/// `event!(pub EntityCreated => EntityCreatedPayload, "entityCreated");`
#[macro_export]
macro_rules! event {
    ($(#[$meta:meta])* $vis:vis $name:ident => $payload:ty, $tag:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis struct $name;

        impl $crate::EventKind for $name {
            const NAME: &'static str = $tag;
            type Payload = $payload;
        }
    };
}

/// Machine-readable error codes carried by [`BusError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// A handler panicked during emission
    ListenerError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ListenerError => "LISTENER_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of [`ErrorEvent`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BusError {
    pub message: String,
    pub code: ErrorCode,
    /// Name of the event whose handler failed
    pub event: &'static str,
}

event!(
    /// Emitted by the bus itself when a listener fails
    pub ErrorEvent => BusError, "error"
);

/// Prelude
pub mod prelude {
    pub use crate::{BusError, ErrorCode, ErrorEvent, EventBus, EventKind, Subscription, SubscriberId};
}
