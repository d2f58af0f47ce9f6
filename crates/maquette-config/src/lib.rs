//! Shared configuration for Maquette
//!
//! This crate provides the single source of truth for grid resolutions,
//! sampling bounds, and update-scheduling intervals shared between the
//! engine and any embedding host.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Grid resolutions the engine accepts. Anything else is rejected before a
/// grid is allocated.
pub const ALLOWED_RESOLUTIONS: [u32; 6] = [32, 48, 64, 96, 128, 256];

/// Default resolution for throttled fast-mode previews
pub const DEFAULT_PREVIEW_RESOLUTION: u32 = 32;

/// Default resolution for debounced final passes
pub const DEFAULT_TARGET_RESOLUTION: u32 = 96;

/// Minimum interval between low-resolution preview passes, in milliseconds
pub const DEFAULT_THROTTLE_MS: u64 = 100;

/// Quiet period after the last edit before a high-resolution pass fires,
/// in milliseconds
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

/// Returns true if `resolution` is one of [`ALLOWED_RESOLUTIONS`].
pub fn is_allowed_resolution(resolution: u32) -> bool {
    ALLOWED_RESOLUTIONS.contains(&resolution)
}

/// Axis-aligned sampling bounds for the voxel grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingBounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for SamplingBounds {
    fn default() -> Self {
        // Encloses a standing figure up to ~1.9m with margin for limb edits
        Self {
            min: [-1.1, -0.1, -1.1],
            max: [1.1, 2.1, 1.1],
        }
    }
}

impl SamplingBounds {
    pub fn min_vec3(&self) -> Vec3 {
        Vec3::from(self.min)
    }

    pub fn max_vec3(&self) -> Vec3 {
        Vec3::from(self.max)
    }
}

/// Engine-level configuration: resolutions, bounds, and scheduling intervals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Resolution for debounced final passes
    pub target_resolution: u32,
    /// Resolution for throttled preview passes
    pub preview_resolution: u32,
    /// Sampling bounds for both pass kinds
    pub bounds: SamplingBounds,
    /// Minimum interval between preview passes in milliseconds
    pub throttle_ms: u64,
    /// Quiet period before the final pass fires in milliseconds
    pub debounce_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            target_resolution: DEFAULT_TARGET_RESOLUTION,
            preview_resolution: DEFAULT_PREVIEW_RESOLUTION,
            bounds: SamplingBounds::default(),
            throttle_ms: DEFAULT_THROTTLE_MS,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.target_resolution, DEFAULT_TARGET_RESOLUTION);
        assert_eq!(config.preview_resolution, DEFAULT_PREVIEW_RESOLUTION);
        assert!(is_allowed_resolution(config.target_resolution));
        assert!(is_allowed_resolution(config.preview_resolution));
    }

    #[test]
    fn test_allowed_resolutions() {
        assert!(is_allowed_resolution(32));
        assert!(is_allowed_resolution(256));
        assert!(!is_allowed_resolution(0));
        assert!(!is_allowed_resolution(100));
    }

    #[test]
    fn test_default_bounds_contain_figure() {
        let bounds = SamplingBounds::default();
        assert!(bounds.min_vec3().y < 0.0);
        assert!(bounds.max_vec3().y > 1.9);
    }
}
