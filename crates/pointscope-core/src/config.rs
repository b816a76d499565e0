//! Scene configuration.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::frame::CoordinateFrame;
use crate::interaction::{InteractionMode, SelectionGating};
use crate::loader::SceneLocators;

pub const DEFAULT_MODEL_URL: &str = "./models/engine.glb";
pub const DEFAULT_POINTS_URL: &str = "./points.json";

/// Viewport size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn size(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SceneConfig {
    pub model_url: String,
    pub points_url: String,
    /// Default marker radius as a fraction of the largest model extent
    pub default_radius_fraction: f32,
    pub selection_gating: SelectionGating,
    pub initial_mode: InteractionMode,
    pub viewport: Viewport,
    pub log_level: String,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            model_url: DEFAULT_MODEL_URL.to_string(),
            points_url: DEFAULT_POINTS_URL.to_string(),
            default_radius_fraction: CoordinateFrame::DEFAULT_RADIUS_FRACTION,
            selection_gating: SelectionGating::default(),
            initial_mode: InteractionMode::default(),
            viewport: Viewport::default(),
            log_level: "info".to_string(),
        }
    }
}

impl SceneConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: SceneConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.default_radius_fraction;
        if !(fraction.is_finite() && fraction > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "defaultRadiusFraction",
                reason: format!("must be a positive number, got {fraction}"),
            });
        }
        if self.model_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "modelUrl",
                reason: "must not be empty".to_string(),
            });
        }
        if self.points_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "pointsUrl",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn locators(&self) -> SceneLocators {
        SceneLocators {
            model_url: self.model_url.clone(),
            points_url: self.points_url.clone(),
        }
    }

    /// Unknown level names fall back to `Info`.
    pub fn log_level_filter(&self) -> log::LevelFilter {
        self.log_level.parse().unwrap_or(log::LevelFilter::Info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SceneConfig::default();
        assert_eq!(config.model_url, DEFAULT_MODEL_URL);
        assert_eq!(config.points_url, DEFAULT_POINTS_URL);
        assert_eq!(config.selection_gating, SelectionGating::ModeGated);
        assert_eq!(config.initial_mode, InteractionMode::Orbiting);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_partial() {
        let config = SceneConfig::from_json(
            r#"{"pointsUrl": "./other.json", "selectionGating": "always"}"#,
        )
        .unwrap();
        assert_eq!(config.points_url, "./other.json");
        assert_eq!(config.model_url, DEFAULT_MODEL_URL);
        assert_eq!(config.selection_gating, SelectionGating::Always);
    }

    #[test]
    fn test_invalid_fraction() {
        let result = SceneConfig::from_json(r#"{"defaultRadiusFraction": -1}"#);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { field: "defaultRadiusFraction", .. })
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(SceneConfig::from_json("{"), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_log_level() {
        let mut config = SceneConfig::default();
        config.log_level = "debug".into();
        assert_eq!(config.log_level_filter(), log::LevelFilter::Debug);
        config.log_level = "loud".into();
        assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
    }
}
