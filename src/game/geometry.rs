//! Planar geometry on 3-D vectors. The y axis is height and is ignored by
//! every gameplay check.
//!
//! Orientation convention: a yaw rotation maps local +x to the heading and
//! local +z to the agent's right-hand side.

use nalgebra::{Rotation3, Vector3};

/// Vectors shorter than this are treated as zero when measuring angles
const EPSILON: f32 = 1e-6;

/// Clamp x and z into `[-half, +half]`, leaving y untouched
pub fn clamp_to_arena(pos: Vector3<f32>, half_x: f32, half_z: f32) -> Vector3<f32> {
    Vector3::new(pos.x.clamp(-half_x, half_x), pos.y, pos.z.clamp(-half_z, half_z))
}

/// Euclidean distance
pub fn distance(a: &Vector3<f32>, b: &Vector3<f32>) -> f32 {
    (a - b).norm()
}

/// Angle between `heading` and the direction from `from` to `to`.
///
/// Positive when the target lies to the right (steer right), negative when
/// it lies to the left. The side is decided by projecting the direction into
/// the agent's local frame with `rotation_transpose`. Degenerate inputs
/// yield 0.
pub fn signed_angle_to(
    heading: &Vector3<f32>,
    from: &Vector3<f32>,
    to: &Vector3<f32>,
    rotation_transpose: &Rotation3<f32>,
) -> f32 {
    let to_target = to - from;
    if to_target.norm() <= EPSILON || heading.norm() <= EPSILON {
        return 0.0;
    }

    let angle = heading.angle(&to_target);
    let local = rotation_transpose * to_target;
    if local.z < 0.0 {
        -angle
    } else {
        angle
    }
}

/// Orientation for a steering angle around the vertical axis
pub fn yaw_rotation(angle: f32) -> Rotation3<f32> {
    Rotation3::from_axis_angle(&Vector3::y_axis(), -angle)
}

/// Forward direction of an orientation
pub fn heading_of(rotation: &Rotation3<f32>) -> Vector3<f32> {
    rotation * Vector3::x()
}

/// True when `pos` sits on a boundary face and `heading` points further out
pub fn pushing_against_edge(pos: &Vector3<f32>, heading: &Vector3<f32>, half: f32) -> bool {
    (pos.x >= half && heading.x > 0.0)
        || (pos.z >= half && heading.z > 0.0)
        || (pos.x <= -half && heading.x < 0.0)
        || (pos.z <= -half && heading.z < 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn clamp_keeps_height() {
        let p = clamp_to_arena(Vector3::new(40.0, 3.0, -31.0), 25.0, 25.0);
        assert_eq!(p, Vector3::new(25.0, 3.0, -25.0));

        let inside = Vector3::new(1.0, 0.2, -2.0);
        assert_eq!(clamp_to_arena(inside, 25.0, 25.0), inside);
    }

    #[test]
    fn yaw_zero_faces_positive_x() {
        let heading = heading_of(&yaw_rotation(0.0));
        assert!(close(heading.x, 1.0));
        assert!(close(heading.z, 0.0));

        let heading = heading_of(&yaw_rotation(std::f32::consts::FRAC_PI_2));
        assert!(close(heading.x, 0.0));
        assert!(close(heading.z, 1.0));
    }

    #[test]
    fn signed_angle_sign_follows_side() {
        let rotation = yaw_rotation(0.0);
        let heading = heading_of(&rotation);
        let origin = Vector3::zeros();
        let transpose = rotation.transpose();

        let right = signed_angle_to(&heading, &origin, &Vector3::new(1.0, 0.0, 1.0), &transpose);
        assert!(close(right, std::f32::consts::FRAC_PI_4));

        let left = signed_angle_to(&heading, &origin, &Vector3::new(1.0, 0.0, -1.0), &transpose);
        assert!(close(left, -std::f32::consts::FRAC_PI_4));

        let ahead = signed_angle_to(&heading, &origin, &Vector3::new(5.0, 0.0, 0.0), &transpose);
        assert!(close(ahead, 0.0));
    }

    #[test]
    fn turning_right_closes_a_positive_angle() {
        let target = Vector3::new(3.0, 0.0, 4.0);
        let origin = Vector3::zeros();

        let before = yaw_rotation(0.0);
        let after = yaw_rotation(0.03);
        let a0 = signed_angle_to(&heading_of(&before), &origin, &target, &before.transpose());
        let a1 = signed_angle_to(&heading_of(&after), &origin, &target, &after.transpose());
        assert!(a0 > 0.0);
        assert!(a1 < a0);
    }

    #[test]
    fn degenerate_target_has_no_angle() {
        let rotation = yaw_rotation(1.0);
        let p = Vector3::new(2.0, 0.0, 2.0);
        assert_eq!(
            signed_angle_to(&heading_of(&rotation), &p, &p, &rotation.transpose()),
            0.0
        );
    }

    #[test]
    fn edge_detection_requires_outward_motion() {
        let pos = Vector3::new(25.0, 0.2, 0.0);
        assert!(pushing_against_edge(&pos, &Vector3::new(1.0, 0.0, 0.0), 25.0));
        assert!(!pushing_against_edge(&pos, &Vector3::new(-1.0, 0.0, 0.0), 25.0));
        assert!(!pushing_against_edge(
            &Vector3::new(0.0, 0.2, 0.0),
            &Vector3::new(1.0, 0.0, 0.0),
            25.0
        ));
        assert_eq!(distance(&Vector3::new(3.0, 0.0, 4.0), &Vector3::zeros()), 5.0);
    }
}
