//! Structured output of a session, drained by the host UI.

use serde::Serialize;

use crate::edit::EditForm;
use crate::interaction::{CursorHint, InteractionMode};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum SessionEvent {
    /// Human-readable status line
    Status(String),
    /// Load failure, rejected edit or consistency problem
    Error(String),
    SelectionChanged(Option<String>),
    FormPopulated(EditForm),
    FormCleared,
    Cursor(CursorHint),
    #[serde(rename_all = "camelCase")]
    ModeChanged {
        mode: InteractionMode,
        rotate_enabled: bool,
        pan_enabled: bool,
        cursor: CursorHint,
    },
}

impl SessionEvent {
    pub fn mode_changed(mode: InteractionMode) -> Self {
        SessionEvent::ModeChanged {
            mode,
            rotate_enabled: mode.allows_rotate(),
            pan_enabled: mode.allows_pan(),
            cursor: mode.cursor(),
        }
    }

    /// Fatal load failure as shown to the operator.
    pub fn load_failed(err: &impl std::fmt::Display) -> Self {
        SessionEvent::Error(format!("Error: {err}"))
    }

    pub fn status(&self) -> Option<&str> {
        match self {
            SessionEvent::Status(text) => Some(text),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionEvent::Error(text) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_json() {
        let value = serde_json::to_value(SessionEvent::Status("hi".into())).unwrap();
        assert_eq!(value, json!({"type": "status", "payload": "hi"}));
    }

    #[test]
    fn test_mode_changed_json() {
        let value = serde_json::to_value(SessionEvent::mode_changed(InteractionMode::Panning)).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "modeChanged",
                "payload": {
                    "mode": "panning",
                    "rotateEnabled": false,
                    "panEnabled": true,
                    "cursor": "grab"
                }
            })
        );
    }

    #[test]
    fn test_load_failed_text() {
        let err = crate::error::LoadError::Fetch {
            locator: "./points.json".into(),
            reason: "HTTP 404".into(),
        };
        assert_eq!(
            SessionEvent::load_failed(&err).error(),
            Some("Error: failed to fetch ./points.json: HTTP 404")
        );
    }

    #[test]
    fn test_accessors() {
        assert_eq!(SessionEvent::Error("x".into()).error(), Some("x"));
        assert_eq!(SessionEvent::FormCleared.status(), None);
    }
}
