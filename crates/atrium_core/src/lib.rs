//! # atrium_core - Atrium Core Primitives
//!
//! Value types shared by every layer of the editor:
//! - **Math**: `Vec2`, `Vec3` and the floor-plane `Aabb2`
//! - **Identity**: string-backed `EntityId` and its generator
//! - **Validation**: the `ValidationResult` returned by components and validators
//!
//! Everything here is a plain value. Nothing in this crate owns state that
//! outlives a call.

pub mod error;
pub mod id;
pub mod math;
pub mod validation;

pub use error::*;
pub use id::*;
pub use math::*;
pub use validation::*;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::error::{CoreError, Result};
    pub use crate::id::{EntityId, IdGenerator};
    pub use crate::math::{Aabb2, Vec2, Vec3};
    pub use crate::validation::ValidationResult;
}
