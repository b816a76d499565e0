//! Model-centering offset and the scene default marker radius.

use glam::Vec3;

use crate::bounds::AABB;

/// Conversion between the stored (world) frame and the recentered render frame.
///
/// Built once per scene load from the model bounds. Stored positions stay in
/// the original frame; the renderer sees `world - offset`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateFrame {
    offset: Vec3,
    default_radius: f32,
    max_extent: f32,
}

impl CoordinateFrame {
    /// Radius used when the bounds give no usable size.
    pub const FALLBACK_RADIUS: f32 = 0.015;

    /// Fraction of the largest model extent used for the default radius.
    pub const DEFAULT_RADIUS_FRACTION: f32 = 0.05;

    pub fn from_bounds(bounds: &AABB, radius_fraction: f32) -> Self {
        let max_extent = bounds.max_extent();
        let derived = max_extent * radius_fraction;
        let default_radius = if derived.is_finite() && derived > 0.0 {
            derived
        } else {
            Self::FALLBACK_RADIUS
        };

        Self {
            offset: bounds.center(),
            default_radius,
            max_extent,
        }
    }

    /// Frame with no recentering.
    pub fn identity() -> Self {
        Self {
            offset: Vec3::ZERO,
            default_radius: Self::FALLBACK_RADIUS,
            max_extent: 0.0,
        }
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn default_radius(&self) -> f32 {
        self.default_radius
    }

    pub fn max_extent(&self) -> f32 {
        self.max_extent
    }

    pub fn to_render(&self, world: Vec3) -> Vec3 {
        world - self.offset
    }

    pub fn to_world(&self, render: Vec3) -> Vec3 {
        render + self.offset
    }
}

impl Default for CoordinateFrame {
    fn default() -> Self {
        Self::identity()
    }
}
