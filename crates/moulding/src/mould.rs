//! Mould primitives and the combined signed-distance field.
//!
//! A mould is a single implicit primitive attached to a skeleton joint; the
//! manager folds every mould's distance into one field with a polynomial
//! smooth minimum. World-to-local mappings are cached per mould and must be
//! rebuilt after any skeleton or mould edit before the field is sampled.

use crate::error::MouldingError;
use crate::sdf::{
    self, ProfileInterpolation, capsule_sdf, profiled_capsule_sdf, smooth_min, sphere_sdf,
};
use crate::skeleton::Skeleton;
use crate::transform::JointTransform;
use crate::SdfField;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::TAU;
use tracing::trace;

/// The primitive kinds a mould can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouldShape {
    Sphere,
    Capsule,
    ProfiledCapsule,
}

/// One implicit primitive attached to a joint.
///
/// `center` and `end_point` are expressed in the parent joint's local frame.
/// `radius` and `blend_radius` must be positive.
#[derive(Debug, Clone)]
pub struct Mould {
    pub id: String,
    pub shape: MouldShape,
    pub center: Vec3,
    pub radius: f32,
    pub blend_radius: f32,
    pub parent_joint_id: String,
    /// Capsule and profiled-capsule axis end, local to the parent joint
    pub end_point: Option<Vec3>,
    /// `[segment_along_axis][control_point_around_ring]` radius table
    pub radial_profiles: Option<Vec<Vec<f32>>>,
    pub interpolation: ProfileInterpolation,
}

impl Mould {
    pub fn sphere(id: impl Into<String>, parent: &str, center: Vec3, radius: f32) -> Self {
        Self {
            id: id.into(),
            shape: MouldShape::Sphere,
            center,
            radius,
            blend_radius: radius * 0.5,
            parent_joint_id: parent.to_owned(),
            end_point: None,
            radial_profiles: None,
            interpolation: ProfileInterpolation::default(),
        }
    }

    pub fn capsule(
        id: impl Into<String>,
        parent: &str,
        center: Vec3,
        end_point: Vec3,
        radius: f32,
    ) -> Self {
        Self {
            id: id.into(),
            shape: MouldShape::Capsule,
            center,
            radius,
            blend_radius: radius * 0.5,
            parent_joint_id: parent.to_owned(),
            end_point: Some(end_point),
            radial_profiles: None,
            interpolation: ProfileInterpolation::default(),
        }
    }

    pub fn profiled_capsule(
        id: impl Into<String>,
        parent: &str,
        center: Vec3,
        end_point: Vec3,
        radial_profiles: Vec<Vec<f32>>,
    ) -> Self {
        let mean = radial_profiles
            .first()
            .map(|ring| ring.iter().sum::<f32>() / ring.len().max(1) as f32)
            .unwrap_or(0.1);
        Self {
            id: id.into(),
            shape: MouldShape::ProfiledCapsule,
            center,
            radius: mean,
            blend_radius: mean * 0.5,
            parent_joint_id: parent.to_owned(),
            end_point: Some(end_point),
            radial_profiles: Some(radial_profiles),
            interpolation: ProfileInterpolation::default(),
        }
    }

    pub fn with_blend_radius(mut self, blend_radius: f32) -> Self {
        self.blend_radius = blend_radius;
        self
    }
}

/// World-space placement of a profiled-capsule control point, for handle
/// visualization.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileHandle {
    pub mould_id: String,
    pub segment: usize,
    pub point: usize,
    pub position: Vec3,
}

#[derive(Debug, Clone, Copy)]
struct MouldFrame {
    world: JointTransform,
}

/// Owns the mould set and the skeleton they attach to, and evaluates the
/// combined field.
#[derive(Debug, Clone, Default)]
pub struct MouldManager {
    moulds: HashMap<String, Mould>,
    /// Insertion order, for a deterministic blend fold
    order: Vec<String>,
    skeleton: Skeleton,
    frames: HashMap<String, MouldFrame>,
    frames_valid: bool,
}

impl MouldManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the manager to a skeleton. Subsequent field queries resolve each
    /// mould's parent joint against it.
    pub fn set_skeleton(&mut self, skeleton: Skeleton) {
        self.skeleton = skeleton;
        self.frames_valid = false;
    }

    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Mutable skeleton access; invalidates cached mould frames.
    pub fn skeleton_mut(&mut self) -> &mut Skeleton {
        self.frames_valid = false;
        &mut self.skeleton
    }

    /// Insert a mould after validating its parent joint and profile table.
    pub fn add_mould(&mut self, mould: Mould) -> Result<(), MouldingError> {
        if !self.skeleton.contains(&mould.parent_joint_id) {
            return Err(MouldingError::UnknownJoint(mould.parent_joint_id.clone()));
        }
        if mould.shape == MouldShape::ProfiledCapsule {
            let profiles = mould.radial_profiles.as_deref().ok_or_else(|| {
                MouldingError::InvalidProfile(format!("{}: missing profile rows", mould.id))
            })?;
            validate_profiles(&mould.id, profiles)?;
        }
        self.order.push(mould.id.clone());
        self.moulds.insert(mould.id.clone(), mould);
        self.frames_valid = false;
        Ok(())
    }

    pub fn mould(&self, id: &str) -> Option<&Mould> {
        self.moulds.get(id)
    }

    pub fn moulds(&self) -> impl Iterator<Item = &Mould> {
        self.order.iter().filter_map(|id| self.moulds.get(id))
    }

    pub fn mould_count(&self) -> usize {
        self.moulds.len()
    }

    /// Replace a mould's base radius.
    pub fn set_radius(&mut self, id: &str, radius: f32) -> Result<(), MouldingError> {
        let mould = self
            .moulds
            .get_mut(id)
            .ok_or_else(|| MouldingError::UnknownMould(id.to_owned()))?;
        mould.radius = radius;
        Ok(())
    }

    /// Replace a mould's blend radius.
    pub fn set_blend_radius(&mut self, id: &str, blend_radius: f32) -> Result<(), MouldingError> {
        let mould = self
            .moulds
            .get_mut(id)
            .ok_or_else(|| MouldingError::UnknownMould(id.to_owned()))?;
        mould.blend_radius = blend_radius;
        Ok(())
    }

    /// Write one profile cell of a profiled capsule.
    pub fn set_profile_value(
        &mut self,
        id: &str,
        segment: usize,
        point: usize,
        value: f32,
    ) -> Result<(), MouldingError> {
        let mould = self
            .moulds
            .get_mut(id)
            .ok_or_else(|| MouldingError::UnknownMould(id.to_owned()))?;
        let profiles = mould.radial_profiles.as_mut().ok_or_else(|| {
            MouldingError::InvalidProfile(format!("{id}: mould has no profile rows"))
        })?;
        let row = profiles.get_mut(segment).ok_or_else(|| {
            MouldingError::InvalidProfile(format!("{id}: segment {segment} out of range"))
        })?;
        let cell = row.get_mut(point).ok_or_else(|| {
            MouldingError::InvalidProfile(format!("{id}: control point {point} out of range"))
        })?;
        *cell = value;
        Ok(())
    }

    /// Resolve every mould's parent-joint world transform and cache it.
    ///
    /// Must be called after any skeleton or mould edit and before field
    /// evaluation. Fails loudly when a mould references a joint the bound
    /// skeleton does not have.
    pub fn rebuild_transforms(&mut self) -> Result<(), MouldingError> {
        if self.frames_valid {
            return Ok(());
        }
        let worlds = self.skeleton.world_transforms();
        self.frames.clear();
        for mould in self.moulds.values() {
            let world = worlds
                .get(&mould.parent_joint_id)
                .copied()
                .ok_or_else(|| MouldingError::UnknownJoint(mould.parent_joint_id.clone()))?;
            self.frames.insert(mould.id.clone(), MouldFrame { world });
        }
        self.frames_valid = true;
        trace!(moulds = self.moulds.len(), "rebuilt mould frames");
        Ok(())
    }

    /// World-space control point positions for every profiled capsule.
    /// Cheap enough to refresh synchronously on each edit.
    pub fn profile_handles(&self) -> Result<Vec<ProfileHandle>, MouldingError> {
        let mut handles = Vec::new();

        for mould in self.moulds() {
            let (Some(profiles), Some(end_point)) =
                (mould.radial_profiles.as_deref(), mould.end_point)
            else {
                continue;
            };
            let world = self.skeleton.world_transform(&mould.parent_joint_id)?;
            let a = world.transform_point(mould.center);
            let b = world.transform_point(end_point);
            let ba = b - a;
            if ba.length_squared() < 1e-8 {
                continue;
            }
            let axis = ba.normalize();
            let reference = if axis.y.abs() > 0.9 { Vec3::Z } else { Vec3::Y };
            let right = axis.cross(reference).normalize();
            let forward = right.cross(axis).normalize();

            let rows = profiles.len();
            for (segment, ring) in profiles.iter().enumerate() {
                let t = if rows == 1 {
                    0.5
                } else {
                    segment as f32 / (rows - 1) as f32
                };
                let ring_center = a + ba * t;
                for (point, &radius) in ring.iter().enumerate() {
                    let angle = point as f32 / ring.len() as f32 * TAU;
                    let position =
                        ring_center + (right * angle.cos() + forward * angle.sin()) * radius;
                    handles.push(ProfileHandle {
                        mould_id: mould.id.clone(),
                        segment,
                        point,
                        position,
                    });
                }
            }
        }

        Ok(handles)
    }

    fn mould_distance(&self, mould: &Mould, local_point: Vec3) -> f32 {
        match mould.shape {
            MouldShape::Sphere => sphere_sdf(local_point, mould.center, mould.radius),
            MouldShape::Capsule => match mould.end_point {
                Some(end) => capsule_sdf(local_point, mould.center, end, mould.radius),
                None => sphere_sdf(local_point, mould.center, mould.radius),
            },
            MouldShape::ProfiledCapsule => match (mould.end_point, &mould.radial_profiles) {
                (Some(end), Some(profiles)) => profiled_capsule_sdf(
                    local_point,
                    mould.center,
                    end,
                    profiles,
                    mould.interpolation,
                ),
                _ => sphere_sdf(local_point, mould.center, mould.radius),
            },
        }
    }

    /// Central-difference gradient of the combined field.
    pub fn gradient(&self, point: Vec3) -> Vec3 {
        sdf::gradient(point, |p| self.evaluate_sdf(p))
    }
}

impl SdfField for MouldManager {
    /// Combined signed distance at a world-space point.
    ///
    /// Distances fold through the smooth minimum in insertion order; where
    /// two blend radii differ, the larger one wins so seams stay smooth.
    /// Panics if [`MouldManager::rebuild_transforms`] has not run since the
    /// last edit - evaluating through a stale frame is a programming error.
    fn evaluate_sdf(&self, point: Vec3) -> f32 {
        if self.moulds.is_empty() {
            return 1.0;
        }
        assert!(self.frames_valid, "mould frames stale: call rebuild_transforms after edits");

        let mut result = f32::INFINITY;
        let mut nearest_blend = 0.0f32;

        for mould in self.moulds() {
            let frame = self
                .frames
                .get(&mould.id)
                .expect("mould frame missing after rebuild");
            let local = frame.world.inverse_transform_point(point);
            let distance = self.mould_distance(mould, local);

            let k = nearest_blend.max(mould.blend_radius);
            let blended = smooth_min(result, distance, k);
            if distance < result {
                nearest_blend = mould.blend_radius;
            }
            result = blended;
        }

        result
    }
}

fn validate_profiles(id: &str, profiles: &[Vec<f32>]) -> Result<(), MouldingError> {
    let Some(first) = profiles.first() else {
        return Err(MouldingError::InvalidProfile(format!(
            "{id}: profile table is empty"
        )));
    };
    if first.is_empty() {
        return Err(MouldingError::InvalidProfile(format!(
            "{id}: profile rows have no control points"
        )));
    }
    let width = first.len();
    if profiles.iter().any(|row| row.len() != width) {
        return Err(MouldingError::InvalidProfile(format!(
            "{id}: profile rows have mismatched lengths"
        )));
    }
    Ok(())
}
