//! Default humanoid skeleton and mould construction.
//!
//! Builds the fixed body topology - pelvis/spine/chest/neck/head chain with
//! mirrored arm and leg chains - and one mould per bone segment: profiled
//! capsules for the torso and limbs, a sphere for the head. Proportions
//! derive from a small set of body-shape parameters.

use crate::error::MouldingError;
use crate::mould::{Mould, MouldManager};
use crate::skeleton::{Joint, Skeleton};
use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// Number of profile rows along each profiled capsule
pub const PROFILE_SEGMENTS: usize = 6;

/// Number of control points around each profile ring
pub const PROFILE_POINTS: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AgeGroup {
    Child,
    Teen,
    Adult,
}

/// Per-region multipliers applied on top of the base proportions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyProportions {
    pub head_size: f32,
    pub torso_length: f32,
    pub torso_width: f32,
    pub leg_length: f32,
    pub arm_length: f32,
    pub shoulder_width: f32,
    pub hip_width: f32,
}

impl Default for BodyProportions {
    fn default() -> Self {
        Self {
            head_size: 1.0,
            torso_length: 1.0,
            torso_width: 1.0,
            leg_length: 1.0,
            arm_length: 1.0,
            shoulder_width: 1.0,
            hip_width: 1.0,
        }
    }
}

/// High-level body parameters a user edits directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyShape {
    pub gender: Gender,
    pub age_group: AgeGroup,
    /// Standing height in meters
    pub height: f32,
    /// Mass in kilograms, folded into torso and hip width via BMI
    pub weight: f32,
}

impl Default for BodyShape {
    fn default() -> Self {
        Self {
            gender: Gender::Male,
            age_group: AgeGroup::Adult,
            height: 1.75,
            weight: 70.0,
        }
    }
}

impl BodyShape {
    /// Resolve the shape parameters into per-region proportions.
    pub fn proportions(&self) -> BodyProportions {
        let mut p = match (self.gender, self.age_group) {
            (Gender::Male, AgeGroup::Adult) => BodyProportions {
                shoulder_width: 1.2,
                hip_width: 0.9,
                ..BodyProportions::default()
            },
            (Gender::Female, AgeGroup::Adult) => BodyProportions {
                head_size: 0.95,
                torso_length: 0.95,
                torso_width: 0.85,
                leg_length: 1.05,
                arm_length: 0.95,
                shoulder_width: 1.0,
                hip_width: 1.1,
            },
            (_, AgeGroup::Teen) => BodyProportions {
                head_size: 1.1,
                torso_length: 0.9,
                torso_width: 0.8,
                leg_length: 0.95,
                arm_length: 0.9,
                shoulder_width: 0.9,
                hip_width: 0.85,
            },
            (_, AgeGroup::Child) => BodyProportions {
                head_size: 1.3,
                torso_length: 0.8,
                torso_width: 0.7,
                leg_length: 0.7,
                arm_length: 0.75,
                shoulder_width: 0.8,
                hip_width: 0.75,
            },
        };

        let bmi = self.weight / (self.height * self.height);
        let weight_factor = (bmi / 22.0).clamp(0.5, 2.0);
        p.torso_width *= weight_factor;
        p.hip_width *= weight_factor;
        p
    }
}

/// Uniform profile table at a fixed radius.
pub fn uniform_rings(radius: f32) -> Vec<Vec<f32>> {
    vec![vec![radius; PROFILE_POINTS]; PROFILE_SEGMENTS]
}

/// Profile table tapering linearly from `start_radius` to `end_radius`
/// along the axis.
pub fn tapered_rings(start_radius: f32, end_radius: f32) -> Vec<Vec<f32>> {
    (0..PROFILE_SEGMENTS)
        .map(|row| {
            let t = row as f32 / (PROFILE_SEGMENTS - 1) as f32;
            let r = start_radius * (1.0 - t) + end_radius * t;
            vec![r; PROFILE_POINTS]
        })
        .collect()
}

/// Profile table of elliptical rings, interpolating half-extents from
/// `(start_half_width, start_half_depth)` to the end pair. Angle zero points
/// along the frame's width axis.
pub fn elliptical_rings(start: (f32, f32), end: (f32, f32)) -> Vec<Vec<f32>> {
    (0..PROFILE_SEGMENTS)
        .map(|row| {
            let t = row as f32 / (PROFILE_SEGMENTS - 1) as f32;
            let a = start.0 * (1.0 - t) + end.0 * t;
            let b = start.1 * (1.0 - t) + end.1 * t;
            (0..PROFILE_POINTS)
                .map(|point| {
                    let angle = point as f32 / PROFILE_POINTS as f32 * TAU;
                    a * b / ((b * angle.cos()).powi(2) + (a * angle.sin()).powi(2)).sqrt()
                })
                .collect()
        })
        .collect()
}

/// Build the humanoid skeleton and mould set for a body shape.
pub fn build_body(shape: &BodyShape) -> Result<MouldManager, MouldingError> {
    let scale = shape.height / 1.75;
    let p = shape.proportions();

    let head_radius = 0.12 * p.head_size * scale;
    let neck_height = 0.08 * scale;
    let torso_height = 0.6 * p.torso_length * scale;
    let torso_depth = 0.35 * p.torso_width * scale;
    let shoulder_width = 0.45 * p.shoulder_width * scale;
    let hip_width = 0.35 * p.hip_width * scale;
    let leg_length = 0.9 * p.leg_length * scale;
    let arm_length = 0.65 * p.arm_length * scale;

    let half_leg = leg_length * 0.5;
    let half_arm = arm_length * 0.5;
    let half_torso = torso_height * 0.5;

    let mut skeleton = Skeleton::new();
    skeleton.add_joint(Joint::root("pelvis", Vec3::new(0.0, leg_length, 0.0)))?;
    skeleton.add_joint(child("spine", "pelvis", Vec3::new(0.0, half_torso, 0.0)))?;
    skeleton.add_joint(child("chest", "spine", Vec3::new(0.0, half_torso, 0.0)))?;
    skeleton.add_joint(child("neck", "chest", Vec3::new(0.0, neck_height, 0.0)))?;
    skeleton.add_joint(child("head", "neck", Vec3::new(0.0, head_radius, 0.0)))?;

    for (side, sign) in [("l", -1.0f32), ("r", 1.0f32)] {
        let hip = format!("{side}_hip");
        let knee = format!("{side}_knee");
        let ankle = format!("{side}_ankle");
        skeleton.add_joint(child(&hip, "pelvis", Vec3::new(sign * hip_width * 0.4, 0.0, 0.0)))?;
        skeleton.add_joint(child(&knee, &hip, Vec3::new(0.0, -half_leg, 0.0)))?;
        skeleton.add_joint(child(&ankle, &knee, Vec3::new(0.0, -half_leg, 0.0)))?;

        let shoulder = format!("{side}_shoulder");
        let elbow = format!("{side}_elbow");
        let wrist = format!("{side}_wrist");
        skeleton.add_joint(child(
            &shoulder,
            "chest",
            Vec3::new(sign * shoulder_width * 0.5, half_torso * 0.9, 0.0),
        ))?;
        skeleton.add_joint(child(&elbow, &shoulder, Vec3::new(sign * half_arm, 0.0, 0.0)))?;
        skeleton.add_joint(child(&wrist, &elbow, Vec3::new(sign * half_arm, 0.0, 0.0)))?;
    }

    let mut manager = MouldManager::new();
    manager.set_skeleton(skeleton);

    let torso_blend = 0.06 * scale;
    let limb_blend = 0.04 * scale;

    manager.add_mould(
        Mould::profiled_capsule(
            "torso_lower",
            "pelvis",
            Vec3::ZERO,
            Vec3::new(0.0, half_torso, 0.0),
            elliptical_rings(
                (hip_width * 0.5, torso_depth * 0.5),
                (torso_depth * 0.45, torso_depth * 0.45),
            ),
        )
        .with_blend_radius(torso_blend),
    )?;
    manager.add_mould(
        Mould::profiled_capsule(
            "torso_upper",
            "spine",
            Vec3::ZERO,
            Vec3::new(0.0, half_torso, 0.0),
            elliptical_rings(
                (torso_depth * 0.45, torso_depth * 0.45),
                (shoulder_width * 0.5, torso_depth * 0.5),
            ),
        )
        .with_blend_radius(torso_blend),
    )?;
    manager.add_mould(
        Mould::capsule(
            "neck",
            "chest",
            Vec3::ZERO,
            Vec3::new(0.0, neck_height, 0.0),
            0.06 * scale,
        )
        .with_blend_radius(limb_blend),
    )?;
    manager.add_mould(
        Mould::sphere("head", "head", Vec3::ZERO, head_radius).with_blend_radius(limb_blend),
    )?;

    for (side, sign) in [("l", -1.0f32), ("r", 1.0f32)] {
        manager.add_mould(
            Mould::profiled_capsule(
                format!("{side}_thigh"),
                &format!("{side}_hip"),
                Vec3::ZERO,
                Vec3::new(0.0, -half_leg, 0.0),
                tapered_rings(0.09 * scale, 0.06 * scale),
            )
            .with_blend_radius(limb_blend),
        )?;
        manager.add_mould(
            Mould::profiled_capsule(
                format!("{side}_shin"),
                &format!("{side}_knee"),
                Vec3::ZERO,
                Vec3::new(0.0, -half_leg, 0.0),
                tapered_rings(0.06 * scale, 0.04 * scale),
            )
            .with_blend_radius(limb_blend),
        )?;
        manager.add_mould(
            Mould::profiled_capsule(
                format!("{side}_upper_arm"),
                &format!("{side}_shoulder"),
                Vec3::ZERO,
                Vec3::new(sign * half_arm, 0.0, 0.0),
                tapered_rings(0.05 * scale, 0.04 * scale),
            )
            .with_blend_radius(limb_blend),
        )?;
        manager.add_mould(
            Mould::profiled_capsule(
                format!("{side}_forearm"),
                &format!("{side}_elbow"),
                Vec3::ZERO,
                Vec3::new(sign * half_arm, 0.0, 0.0),
                tapered_rings(0.04 * scale, 0.03 * scale),
            )
            .with_blend_radius(limb_blend),
        )?;
    }

    manager.rebuild_transforms()?;
    Ok(manager)
}

fn child(id: &str, parent: &str, offset: Vec3) -> Joint {
    Joint::new(id, offset, Quat::IDENTITY, Some(parent))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SdfField;

    #[test]
    fn test_default_body_builds() {
        let manager = build_body(&BodyShape::default()).expect("build");
        assert_eq!(manager.skeleton().joint_count(), 17);
        assert_eq!(manager.mould_count(), 12);
    }

    #[test]
    fn test_head_sits_above_pelvis() {
        let manager = build_body(&BodyShape::default()).expect("build");
        let head = manager.skeleton().world_position("head").expect("head");
        let pelvis = manager.skeleton().world_position("pelvis").expect("pelvis");
        assert!(head.y > pelvis.y);
        // A 1.75m figure's head center should sit near the top
        assert!(head.y > 1.4 && head.y < 1.9);
    }

    #[test]
    fn test_field_is_inside_the_chest() {
        let manager = build_body(&BodyShape::default()).expect("build");
        let chest = manager.skeleton().world_position("chest").expect("chest");
        assert!(manager.evaluate_sdf(chest) < 0.0);
        // Far outside the figure
        assert!(manager.evaluate_sdf(Vec3::new(3.0, 1.0, 0.0)) > 0.5);
    }

    #[test]
    fn test_arms_are_mirrored() {
        let manager = build_body(&BodyShape::default()).expect("build");
        let l = manager.skeleton().world_position("l_wrist").expect("l");
        let r = manager.skeleton().world_position("r_wrist").expect("r");
        assert!((l.x + r.x).abs() < 1e-6);
        assert!((l.y - r.y).abs() < 1e-6);
    }

    #[test]
    fn test_weight_widens_hips() {
        let light = BodyShape {
            weight: 55.0,
            ..BodyShape::default()
        };
        let heavy = BodyShape {
            weight: 100.0,
            ..BodyShape::default()
        };
        assert!(heavy.proportions().hip_width > light.proportions().hip_width);
    }

    #[test]
    fn test_child_proportions_shrink_legs() {
        let child = BodyShape {
            age_group: AgeGroup::Child,
            ..BodyShape::default()
        };
        assert!(child.proportions().leg_length < 1.0);
    }
}
