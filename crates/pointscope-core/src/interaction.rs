//! Interaction mode state machine and pointer routing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What the pointer currently does in the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionMode {
    #[default]
    Orbiting,
    Panning,
    Selecting,
}

impl InteractionMode {
    pub fn as_str(self) -> &'static str {
        match self {
            InteractionMode::Orbiting => "orbiting",
            InteractionMode::Panning => "panning",
            InteractionMode::Selecting => "selecting",
        }
    }

    /// Camera rotation is enabled
    pub fn allows_rotate(self) -> bool {
        self == InteractionMode::Orbiting
    }

    /// Camera panning is enabled
    pub fn allows_pan(self) -> bool {
        self == InteractionMode::Panning
    }

    /// Resting cursor for the mode
    pub fn cursor(self) -> CursorHint {
        match self {
            InteractionMode::Orbiting | InteractionMode::Panning => CursorHint::Grab,
            InteractionMode::Selecting => CursorHint::Default,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown interaction mode: {0}")]
pub struct ParseModeError(pub String);

impl FromStr for InteractionMode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rotate" | "orbit" | "orbiting" => Ok(InteractionMode::Orbiting),
            "pan" | "panning" => Ok(InteractionMode::Panning),
            "select" | "selecting" => Ok(InteractionMode::Selecting),
            _ => Err(ParseModeError(s.to_string())),
        }
    }
}

impl fmt::Display for InteractionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cursor shape the host should show over the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CursorHint {
    #[default]
    Default,
    Pointer,
    Grab,
}

/// Whether pointer-down selection requires `Selecting` mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionGating {
    #[default]
    ModeGated,
    Always,
}

impl SelectionGating {
    pub fn permits(self, mode: InteractionMode) -> bool {
        match self {
            SelectionGating::ModeGated => mode == InteractionMode::Selecting,
            SelectionGating::Always => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerKind {
    Move,
    Down,
}

/// Pointer event in viewport pixels (top-left origin).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointerEvent {
    pub kind: PointerKind,
    pub x: f32,
    pub y: f32,
}

impl PointerEvent {
    pub fn moved(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Move,
            x,
            y,
        }
    }

    pub fn down(x: f32, y: f32) -> Self {
        Self {
            kind: PointerKind::Down,
            x,
            y,
        }
    }
}

/// What a pointer event should do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerRoute {
    /// Leave it to the camera controls
    Ignore,
    /// Pick for the hover cursor only
    Hover,
    /// Pick and select
    Select,
}

/// Single dispatch table for pointer events.
pub fn route(kind: PointerKind, mode: InteractionMode, gating: SelectionGating) -> PointerRoute {
    match (kind, mode) {
        (PointerKind::Move, InteractionMode::Selecting) => PointerRoute::Hover,
        (PointerKind::Move, _) => PointerRoute::Ignore,
        (PointerKind::Down, mode) if gating.permits(mode) => PointerRoute::Select,
        (PointerKind::Down, _) => PointerRoute::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mode() {
        assert_eq!("rotate".parse(), Ok(InteractionMode::Orbiting));
        assert_eq!("Pan".parse(), Ok(InteractionMode::Panning));
        assert_eq!("select".parse(), Ok(InteractionMode::Selecting));
        assert!("zoom".parse::<InteractionMode>().is_err());
    }

    #[test]
    fn test_mode_controls() {
        assert!(InteractionMode::Orbiting.allows_rotate());
        assert!(!InteractionMode::Orbiting.allows_pan());
        assert!(InteractionMode::Panning.allows_pan());
        assert!(!InteractionMode::Selecting.allows_rotate());
        assert!(!InteractionMode::Selecting.allows_pan());
        assert_eq!(InteractionMode::Selecting.cursor(), CursorHint::Default);
        assert_eq!(InteractionMode::Panning.cursor(), CursorHint::Grab);
    }

    #[test]
    fn test_route_mode_gated() {
        let gating = SelectionGating::ModeGated;
        assert_eq!(
            route(PointerKind::Down, InteractionMode::Selecting, gating),
            PointerRoute::Select
        );
        assert_eq!(
            route(PointerKind::Down, InteractionMode::Orbiting, gating),
            PointerRoute::Ignore
        );
        assert_eq!(
            route(PointerKind::Move, InteractionMode::Selecting, gating),
            PointerRoute::Hover
        );
        assert_eq!(
            route(PointerKind::Move, InteractionMode::Panning, gating),
            PointerRoute::Ignore
        );
    }

    #[test]
    fn test_route_always() {
        let gating = SelectionGating::Always;
        assert_eq!(
            route(PointerKind::Down, InteractionMode::Orbiting, gating),
            PointerRoute::Select
        );
        // ホバーは常にモード依存
        assert_eq!(
            route(PointerKind::Move, InteractionMode::Orbiting, gating),
            PointerRoute::Ignore
        );
    }

    #[test]
    fn test_cursor_serialization() {
        assert_eq!(serde_json::to_string(&CursorHint::Pointer).unwrap(), "\"pointer\"");
    }
}
