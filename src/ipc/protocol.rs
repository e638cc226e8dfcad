//! IPC message protocol definitions
//!
//! All messages are JSON-encoded, prefixed with a 4-byte little-endian length.

use serde::{Deserialize, Serialize};

use crate::events::GameEvent;
use crate::session::{Action, SessionStatus};

/// Largest accepted message body
pub const MAX_MESSAGE_LEN: usize = 1024 * 1024;

/// Requests from a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Request {
    /// Request current status
    GetStatus,

    /// Ping to check connectivity
    Ping,

    /// Subscribe to event notifications
    Subscribe,

    /// Enter a phone number on the landing view
    SubmitPhone { number: String },

    /// Accept the rules
    AcceptRules,

    /// Decline the rules
    DeclineRules,

    /// Start a call from the game view
    Start,

    /// Play again after a result
    Replay,

    /// Leave the current view
    Exit,
}

impl Request {
    /// The player action carried by this request, if any
    pub fn into_action(self) -> Option<Action> {
        match self {
            Request::GetStatus | Request::Ping | Request::Subscribe => None,
            Request::SubmitPhone { number } => Some(Action::SubmitPhone { number }),
            Request::AcceptRules => Some(Action::AcceptRules),
            Request::DeclineRules => Some(Action::DeclineRules),
            Request::Start => Some(Action::Start),
            Request::Replay => Some(Action::Replay),
            Request::Exit => Some(Action::Exit),
        }
    }
}

/// Responses to a client
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Current status
    Status(DaemonStatus),

    /// Action applied
    Accepted { status: SessionStatus },

    /// Pong response to ping
    Pong,

    /// Subscription confirmed
    Subscribed,

    /// Error response
    Error { code: String, message: String },
}

/// Push notification for subscribed clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    Event { event: GameEvent },
}

/// Full status snapshot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaemonStatus {
    /// Uptime in seconds
    pub uptime_secs: u64,

    pub session: SessionStatus,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization() {
        let req = Request::SubmitPhone {
            number: "3331234567".into(),
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("submit_phone"));
        assert!(json.contains("3331234567"));
    }

    #[test]
    fn test_request_deserialization() {
        let req: Request = serde_json::from_str(r#"{"type":"accept_rules"}"#).unwrap();
        assert_eq!(req.into_action(), Some(Action::AcceptRules));

        let req: Request = serde_json::from_str(r#"{"type":"ping"}"#).unwrap();
        assert_eq!(req.into_action(), None);
    }

    #[test]
    fn test_response_serialization() {
        let resp = Response::Status(DaemonStatus {
            uptime_secs: 3,
            session: SessionStatus::default(),
        });
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains(r#""type":"status""#));
        assert!(json.contains(r#""route":"landing""#));
    }

    #[test]
    fn test_notification_serialization() {
        let note = Notification::Event {
            event: GameEvent::Connected,
        };
        let json = serde_json::to_string(&note).unwrap();
        assert_eq!(json, r#"{"type":"event","event":{"type":"connected"}}"#);
    }
}
