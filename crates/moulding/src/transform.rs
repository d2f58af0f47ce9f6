//! Rigid transform primitives for joint frames.

use glam::{EulerRot, Quat, Vec3};

/// A rigid transform (rotation then translation), the frame a joint defines.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointTransform {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Default for JointTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl JointTransform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
    };

    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Compose a parent frame with a child-local frame.
    ///
    /// `world_pos = parent_pos + parent_rot * local_offset`,
    /// `world_rot = parent_rot * local_rot`.
    pub fn compose(&self, local: &JointTransform) -> JointTransform {
        JointTransform {
            position: self.position + self.rotation * local.position,
            rotation: self.rotation * local.rotation,
        }
    }

    /// Map a point from this frame's local space to world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Map a world-space point into this frame's local space.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }
}

/// Build a rotation from XYZ Euler angles in radians.
///
/// Edit surfaces express joint rotations as Euler angles; everything
/// downstream works in quaternions.
pub fn euler_to_quat(x: f32, y: f32, z: f32) -> Quat {
    Quat::from_euler(EulerRot::XYZ, x, y, z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_roundtrip() {
        let t = JointTransform::IDENTITY;
        let p = Vec3::new(1.0, 2.0, 3.0);
        assert_eq!(t.transform_point(p), p);
        assert_eq!(t.inverse_transform_point(p), p);
    }

    #[test]
    fn test_compose_applies_parent_rotation_to_child_offset() {
        let parent = JointTransform::new(Vec3::ZERO, Quat::from_rotation_z(FRAC_PI_2));
        let local = JointTransform::new(Vec3::new(1.0, 0.0, 0.0), Quat::IDENTITY);
        let world = parent.compose(&local);
        assert!(world.position.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn test_inverse_transform_point_inverts() {
        let t = JointTransform::new(
            Vec3::new(0.2, -0.5, 1.0),
            euler_to_quat(0.3, -1.1, 0.7),
        );
        let p = Vec3::new(0.4, 0.1, -0.9);
        let back = t.inverse_transform_point(t.transform_point(p));
        assert!(back.abs_diff_eq(p, 1e-5));
    }

    #[test]
    fn test_euler_to_quat_z_quarter_turn() {
        let q = euler_to_quat(0.0, 0.0, FRAC_PI_2);
        let rotated = q * Vec3::X;
        assert!(rotated.abs_diff_eq(Vec3::Y, 1e-6));
    }
}
