//! Events emitted by the session
//!
//! Broadcast to the console screen and to subscribed socket clients.

use serde::{Deserialize, Serialize};

use crate::draw::Outcome;
use crate::navigation::Route;

/// Why the game went back to Idle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdleReason {
    Replay,
    Exit,
}

/// Events emitted on state entry, progress and navigation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Call placed, waiting for the line
    CallStarted,

    /// Line connected
    Connected,

    /// IVR announcement playing
    IvrStarted,

    /// Draw in progress
    DrawStarted,

    /// Draw progress moved forward
    ProgressAdvanced {
        /// Percentage in [0, 100]
        progress: u8,
    },

    /// Draw finished
    ResultAnnounced { outcome: Outcome },

    /// Game returned to Idle
    ReturnedToIdle { reason: IdleReason },

    /// Active view changed
    Navigated { route: Route },

    /// Non-blocking notice for the user
    Notice { title: String, message: String },
}

impl GameEvent {
    pub fn notice(title: impl Into<String>, message: impl Into<String>) -> Self {
        GameEvent::Notice {
            title: title.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for GameEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameEvent::CallStarted => write!(f, "CALL_STARTED"),
            GameEvent::Connected => write!(f, "CONNECTED"),
            GameEvent::IvrStarted => write!(f, "IVR_STARTED"),
            GameEvent::DrawStarted => write!(f, "DRAW_STARTED"),
            GameEvent::ProgressAdvanced { progress } => {
                write!(f, "PROGRESS_ADVANCED ({}%)", progress)
            }
            GameEvent::ResultAnnounced { outcome } => {
                write!(f, "RESULT_ANNOUNCED (winner={}, amount={})", outcome.is_winner, outcome.amount)
            }
            GameEvent::ReturnedToIdle { reason } => write!(f, "RETURNED_TO_IDLE ({:?})", reason),
            GameEvent::Navigated { route } => write!(f, "NAVIGATED ({})", route),
            GameEvent::Notice { title, .. } => write!(f, "NOTICE ({})", title),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = GameEvent::ResultAnnounced {
            outcome: Outcome::win(7500),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("result_announced"));
        assert!(json.contains("7500"));
    }

    #[test]
    fn test_event_deserialization() {
        let json = r#"{"type":"returned_to_idle","reason":"replay"}"#;
        let event: GameEvent = serde_json::from_str(json).unwrap();
        assert_eq!(
            event,
            GameEvent::ReturnedToIdle {
                reason: IdleReason::Replay
            }
        );
    }

    #[test]
    fn test_navigated_carries_route() {
        let event = GameEvent::Navigated { route: Route::Rules };
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"type":"navigated","route":"rules"}"#);
    }
}
