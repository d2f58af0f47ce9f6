//! Maquette field definition layer - skeleton and implicit moulds
//!
//! This crate provides the data types that define the implicit body surface:
//! - [`skeleton`] - joint hierarchy with parent-relative transforms
//! - [`mould`] - implicit primitives attached to joints, blended into one field
//! - [`sdf`] - signed distance functions for the primitive shapes
//! - [`spline`] - Catmull-Rom interpolation for radial profiles
//! - [`body`] - default humanoid skeleton and mould construction
//!
//! The combined field is exposed through the [`SdfField`] trait; sampling and
//! surface extraction live in the `meshing` crate.

pub mod body;
pub mod error;
pub mod mould;
pub mod sdf;
pub mod skeleton;
pub mod spline;
pub mod transform;

pub use body::{AgeGroup, BodyProportions, BodyShape, Gender, build_body};
pub use error::MouldingError;
pub use mould::{Mould, MouldManager, MouldShape, ProfileHandle};
pub use sdf::ProfileInterpolation;
pub use skeleton::{Joint, Skeleton};
pub use transform::JointTransform;

use glam::Vec3;

/// Contract between a combined signed-distance field and its samplers.
///
/// The voxel grid depends on this trait alone, not on the mould manager.
pub trait SdfField {
    /// Signed distance from `point` (world space) to the surface.
    /// Negative inside, positive outside.
    fn evaluate_sdf(&self, point: Vec3) -> f32;
}
