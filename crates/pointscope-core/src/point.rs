//! Point entity and the persisted point-list record format.

use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Deserializer, Serialize};

/// State label stored when a record carries none.
pub const DEFAULT_STATE: &str = "pending";

/// Known marker states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointState {
    #[default]
    Pending,
    InProgress,
    Done,
    Error,
}

impl PointState {
    pub fn as_str(self) -> &'static str {
        match self {
            PointState::Pending => "pending",
            PointState::InProgress => "in_progress",
            PointState::Done => "done",
            PointState::Error => "error",
        }
    }

    /// State used for display; unknown labels show as pending.
    pub fn for_display(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }
}

impl FromStr for PointState {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "in_progress" => PointState::InProgress,
            "done" => PointState::Done,
            "error" => PointState::Error,
            _ => PointState::Pending,
        })
    }
}

impl fmt::Display for PointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the point list as it is fetched and saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    pub id: String,
    pub name: String,
    pub pos: [f32; 3],
    #[serde(
        default,
        deserialize_with = "lenient_radius",
        skip_serializing_if = "Option::is_none"
    )]
    pub radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

/// Any non-numeric radius is treated as absent.
fn lenient_radius<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).map(|r| r as f32))
}

/// Marker stored in the registry. `position` is in the model's original frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: String,
    pub name: String,
    pub position: Vec3,
    pub radius: f32,
    pub state: String,
}

impl Point {
    pub fn from_record(record: &PointRecord, default_radius: f32) -> Self {
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            position: Vec3::from_array(record.pos),
            radius: normalize_radius(record.radius, default_radius),
            state: record
                .state
                .clone()
                .unwrap_or_else(|| DEFAULT_STATE.to_string()),
        }
    }

    pub fn to_record(&self) -> PointRecord {
        PointRecord {
            id: self.id.clone(),
            name: self.name.clone(),
            pos: self.position.to_array(),
            radius: Some(self.radius),
            state: Some(self.state.clone()),
        }
    }
}

/// Positive finite radius, or `default` for anything else.
pub fn normalize_radius(radius: Option<f32>, default: f32) -> f32 {
    match radius {
        Some(r) if r.is_finite() && r > 0.0 => r,
        _ => default,
    }
}
