//! Marker colors and emphasis styling.

use crate::point::PointState;

/// 24-bit sRGB color stored as `0xRRGGBB`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u32);

impl Rgb {
    /// Channels normalized to `0.0..=1.0`.
    pub fn to_array(self) -> [f32; 3] {
        [
            ((self.0 >> 16) & 0xFF) as f32 / 255.0,
            ((self.0 >> 8) & 0xFF) as f32 / 255.0,
            (self.0 & 0xFF) as f32 / 255.0,
        ]
    }

    pub fn to_rgba(self, alpha: f32) -> [f32; 4] {
        let [r, g, b] = self.to_array();
        [r, g, b, alpha]
    }
}

pub const PENDING: Rgb = Rgb(0x9ca3af); // gray
pub const IN_PROGRESS: Rgb = Rgb(0xf59e0b); // amber
pub const DONE: Rgb = Rgb(0x10b981); // green
pub const ERROR: Rgb = Rgb(0xef4444); // red

/// Scale multiplier of an emphasized proxy.
pub const EMPHASIS_SCALE: f32 = 1.35;
pub const EMPHASIS_EMISSIVE: Rgb = Rgb(0x38bdf8);
pub const EMPHASIS_INTENSITY: f32 = 0.5;

pub fn state_color(state: PointState) -> Rgb {
    match state {
        PointState::Pending => PENDING,
        PointState::InProgress => IN_PROGRESS,
        PointState::Done => DONE,
        PointState::Error => ERROR,
    }
}

/// Color for a stored state label; unknown labels use the pending color.
pub fn color_for_label(label: &str) -> Rgb {
    state_color(PointState::for_display(label))
}
