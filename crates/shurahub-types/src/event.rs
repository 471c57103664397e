//! Server-to-client frames for the debate websocket.
//!
//! Frames are serialized untagged so each variant produces exactly the JSON
//! object the browser client expects. Only the typing and stream frames carry
//! a `type` discriminator; the others are recognised by their fields.

use serde::Serialize;

use crate::debate::StageRole;
use crate::session::SessionMode;

/// Text of the acknowledgement frame sent before every debate.
pub const ACK_TEXT: &str = "Initiating collaborative debate...";

/// Discriminator for the frames that carry a `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    Typing,
    Stream,
}

/// A single frame emitted while a debate runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DebateEvent {
    /// Acknowledges the user message and reports the session mode.
    Ack {
        sender: String,
        text: String,
        mode: SessionMode,
    },

    /// A stage is starting; `sender` is the requested model.
    Typing {
        #[serde(rename = "type")]
        kind: FrameKind,
        sender: String,
        role: StageRole,
    },

    /// One streamed chunk; `sender` is the model currently reported by the provider.
    Stream {
        #[serde(rename = "type")]
        kind: FrameKind,
        sender: String,
        text: String,
        role: StageRole,
    },

    /// Final text of a stage; `sender` is the actual model.
    Final {
        sender: String,
        text: String,
        role: StageRole,
    },

    /// Error notification.
    Error { sender: String, text: String },
}

impl DebateEvent {
    pub fn ack(sender: impl Into<String>, mode: SessionMode) -> Self {
        DebateEvent::Ack {
            sender: sender.into(),
            text: ACK_TEXT.to_string(),
            mode,
        }
    }

    pub fn typing(requested_model: impl Into<String>, role: StageRole) -> Self {
        DebateEvent::Typing {
            kind: FrameKind::Typing,
            sender: requested_model.into(),
            role,
        }
    }

    pub fn stream(model: impl Into<String>, delta: impl Into<String>, role: StageRole) -> Self {
        DebateEvent::Stream {
            kind: FrameKind::Stream,
            sender: model.into(),
            text: delta.into(),
            role,
        }
    }

    pub fn stage_final(model: impl Into<String>, text: impl Into<String>, role: StageRole) -> Self {
        DebateEvent::Final {
            sender: model.into(),
            text: text.into(),
            role,
        }
    }

    /// Error frame; the message is prefixed with `Error: `.
    pub fn error(sender: impl Into<String>, message: impl std::fmt::Display) -> Self {
        DebateEvent::Error {
            sender: sender.into(),
            text: format!("Error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ack_frame_shape() {
        let v = serde_json::to_value(DebateEvent::ack("Shurahub", SessionMode::Guest)).unwrap();
        assert_eq!(
            v,
            json!({"sender": "Shurahub", "text": "Initiating collaborative debate...", "mode": "guest"})
        );
    }

    #[test]
    fn typing_frame_shape() {
        let v = serde_json::to_value(DebateEvent::typing("qwen/qwen3-32b", StageRole::Opener)).unwrap();
        assert_eq!(v, json!({"type": "typing", "sender": "qwen/qwen3-32b", "role": "opener"}));
    }

    #[test]
    fn stream_frame_shape() {
        let v = serde_json::to_value(DebateEvent::stream("m1", "Hel", StageRole::Critiquer)).unwrap();
        assert_eq!(
            v,
            json!({"type": "stream", "sender": "m1", "text": "Hel", "role": "critiquer"})
        );
    }

    #[test]
    fn final_frame_has_no_type() {
        let v = serde_json::to_value(DebateEvent::stage_final("m3", "done", StageRole::Synthesizer))
            .unwrap();
        assert_eq!(v, json!({"sender": "m3", "text": "done", "role": "synthesizer"}));
        assert!(v.get("type").is_none());
    }

    #[test]
    fn error_frame_prefixes_message() {
        let ev = DebateEvent::error("Shurahub", "missing field `text`");
        let v = serde_json::to_value(&ev).unwrap();
        assert_eq!(v["text"], "Error: missing field `text`");
    }
}
