//! Placement validation.
//!
//! [`ValidationSystem`] owns an ordered list of [`Validator`]s. The
//! placement validator checks lot bounds first and collisions second, using
//! a [`SpatialGrid`](crate::spatial::SpatialGrid) as the broad phase.

mod footprint;
mod placement;
mod system;

pub use footprint::{entity_bounds, footprint_bounds, rotated_extents};
pub use placement::{
    create_placement_validator, create_placement_validator_with_grid, placed_objects,
    BoundsValidator, CollisionValidator, EntitySource, LotBounds, PlacementValidator,
    COLLISION_PREFIX, NEAR_EDGE, OUT_OF_BOUNDS,
};
pub use system::{ValidationContext, ValidationSystem, Validator};
