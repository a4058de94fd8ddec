//! World-space bounds of rotated footprints

use std::f32::consts::FRAC_PI_2;

use atrium_core::{Aabb2, Vec2, Vec3};
use atrium_ecs::{Entity, Footprint, FootprintShape, Transform};

/// How far a yaw may sit from a multiple of 90 degrees and still count as one
const QUARTER_TURN_TOLERANCE: f32 = 1e-4;

/// Footprint extents on X/Z after turning by `yaw` radians.
///
/// Quarter turns are exact: 90 and 270 degrees swap width and depth. Other
/// angles use the extents of the rotated rectangle. Polygon footprints keep
/// their unrotated bounds.
pub fn rotated_extents(footprint: &Footprint, yaw: f32) -> Aabb2 {
    let &FootprintShape::Box { width, depth, .. } = &footprint.shape else {
        return footprint.local_bounds();
    };

    let turns = yaw / FRAC_PI_2;
    let nearest = turns.round();
    let size = if (turns - nearest).abs() < QUARTER_TURN_TOLERANCE {
        if nearest.rem_euclid(2.0) == 1.0 {
            Vec2::new(depth, width)
        } else {
            Vec2::new(width, depth)
        }
    } else {
        let (sin, cos) = yaw.sin_cos();
        Vec2::new(
            (width * cos).abs() + (depth * sin).abs(),
            (width * sin).abs() + (depth * cos).abs(),
        )
    };
    Aabb2::from_center_size(Vec2::ZERO, size)
}

/// Floor-plane box covered by `footprint` placed at `position` with `yaw`
pub fn footprint_bounds(footprint: &Footprint, position: Vec3, yaw: f32) -> Aabb2 {
    rotated_extents(footprint, yaw).translate(position.xz())
}

/// Bounds of a stored entity, from its Transform and Footprint
pub fn entity_bounds(entity: &Entity) -> Option<Aabb2> {
    let footprint = entity.get::<Footprint>()?;
    let transform = entity.get::<Transform>()?;
    Some(footprint_bounds(footprint, transform.position, transform.yaw()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::{FRAC_PI_4, PI};

    fn table() -> Footprint {
        Footprint::boxed(2.0, 1.0, 0.8).unwrap()
    }

    #[test]
    fn test_quarter_turns_swap_exactly() {
        for (yaw, expected) in [
            (0.0, Vec2::new(2.0, 1.0)),
            (FRAC_PI_2, Vec2::new(1.0, 2.0)),
            (PI, Vec2::new(2.0, 1.0)),
            (3.0 * FRAC_PI_2, Vec2::new(1.0, 2.0)),
            (-FRAC_PI_2, Vec2::new(1.0, 2.0)),
        ] {
            assert_eq!(rotated_extents(&table(), yaw).size(), expected, "yaw {yaw}");
        }
    }

    #[test]
    fn test_diagonal_uses_rotated_rectangle() {
        let size = rotated_extents(&table(), FRAC_PI_4).size();
        let expected = 3.0 * FRAC_PI_4.cos();
        assert_relative_eq!(size.x, expected, epsilon = 1e-5);
        assert_relative_eq!(size.y, expected, epsilon = 1e-5);
    }

    #[test]
    fn test_polygon_is_not_rotated() {
        let tri = Footprint::polygon(
            vec![Vec2::new(0.0, 0.0), Vec2::new(3.0, 0.0), Vec2::new(0.0, 1.0)],
            1.0,
        )
        .unwrap();
        assert_eq!(rotated_extents(&tri, FRAC_PI_2), tri.local_bounds());
    }

    #[test]
    fn test_bounds_follow_position_xz() {
        let bounds = footprint_bounds(&table(), Vec3::new(3.0, 5.0, -1.0), 0.0);
        assert_eq!(bounds.center(), Vec2::new(3.0, -1.0));
    }
}
