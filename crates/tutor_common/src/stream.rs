//! Streaming wire protocol.
//!
//! The streaming endpoint responds with a simplified newline-delimited JSON
//! body: each line is one serialized [`StreamEvent`] followed by `\n`.
//! Ordering contract: any `thinking` events precede all `content` events;
//! exactly one `done` (or `error`) event terminates the stream; the `content`
//! payloads concatenate in emission order to exactly the final answer.

use crate::types::Source;
use serde::{Deserialize, Serialize};

/// One event on the answer stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Announces that generation has started.
    Status { message: String },
    /// One intermediate reasoning step, shown before any content.
    Thinking { thinking: String },
    /// One small chunk of the final answer.
    Content { content: String },
    /// Terminal event carrying the full reconstructed answer.
    #[serde(rename_all = "camelCase")]
    Done {
        full_response: String,
        answer: String,
        provider: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        sources: Vec<Source>,
        thinking_steps: Vec<String>,
        thinking_summary: String,
    },
    /// Terminal event for a post-dispatch failure.
    Error { error: String },
}

impl StreamEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done { .. } | Self::Error { .. })
    }
}

/// Serialize one event as a wire line (JSON + trailing newline).
pub fn encode_line(event: &StreamEvent) -> String {
    // StreamEvent contains only JSON-representable data, so serialization
    // cannot fail in practice; an error event is still the safe fallback.
    match serde_json::to_string(event) {
        Ok(json) => format!("{}\n", json),
        Err(e) => format!(
            "{}\n",
            serde_json::json!({ "type": "error", "error": e.to_string() })
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_tags() {
        let v = serde_json::to_value(StreamEvent::Status {
            message: "generating".to_string(),
        })
        .unwrap();
        assert_eq!(v["type"], "status");
        assert_eq!(v["message"], "generating");

        let v = serde_json::to_value(StreamEvent::Thinking {
            thinking: "step 1".to_string(),
        })
        .unwrap();
        assert_eq!(v["type"], "thinking");
        assert_eq!(v["thinking"], "step 1");

        let v = serde_json::to_value(StreamEvent::Content {
            content: "abc".to_string(),
        })
        .unwrap();
        assert_eq!(v["type"], "content");
    }

    #[test]
    fn test_done_event_wire_names() {
        let v = serde_json::to_value(StreamEvent::Done {
            full_response: "42".to_string(),
            answer: "42".to_string(),
            provider: "gemini".to_string(),
            sources: vec![],
            thinking_steps: vec!["a".to_string()],
            thinking_summary: "b".to_string(),
        })
        .unwrap();
        assert_eq!(v["type"], "done");
        assert_eq!(v["fullResponse"], "42");
        assert_eq!(v["thinkingSteps"][0], "a");
        assert_eq!(v["thinkingSummary"], "b");
        // Empty source lists stay off the wire.
        assert!(v.get("sources").is_none());
    }

    #[test]
    fn test_encode_line_is_newline_terminated_json() {
        let line = encode_line(&StreamEvent::Content {
            content: "x".to_string(),
        });
        assert!(line.ends_with('\n'));
        let parsed: StreamEvent = serde_json::from_str(line.trim_end()).unwrap();
        assert_eq!(
            parsed,
            StreamEvent::Content {
                content: "x".to_string()
            }
        );
    }

    #[test]
    fn test_terminal_events() {
        assert!(StreamEvent::Error {
            error: "boom".to_string()
        }
        .is_terminal());
        assert!(!StreamEvent::Status {
            message: "go".to_string()
        }
        .is_terminal());
    }
}
