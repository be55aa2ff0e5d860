use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::RunStatus;
use crate::streaming::ParsedEvent;

/// Event emitted by the virtual assistant `/chat` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatEvent {
    /// `RunStarted`, `RunResponseContent`, `RunCompleted`, `RunError`, ...
    pub event: String,

    /// Text for content events; tool and completion events may carry
    /// structured payloads
    #[serde(default)]
    pub content: Option<Value>,
}

impl ChatEvent {
    /// `content` when it is a string
    pub fn text(&self) -> Option<&str> {
        self.content.as_ref().and_then(Value::as_str)
    }
}

/// Accumulates one assistant reply from a chat event stream
#[derive(Debug, Clone, Default)]
pub struct ChatTranscript {
    text: String,
    status: RunStatus,
}

impl ChatTranscript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one event into the reply, returning whether anything changed
    pub fn apply(&mut self, event: &ParsedEvent) -> bool {
        let chat: ChatEvent = match event.to_typed() {
            Ok(chat) => chat,
            Err(e) => {
                debug!(error = %e, "Ignoring event without chat shape");
                return false;
            }
        };

        match chat.event.as_str() {
            "RunStarted" => {
                self.status = RunStatus::Running;
                true
            }
            "RunResponseContent" => match chat.text() {
                Some(content) if !content.is_empty() => {
                    self.text.push_str(content);
                    self.status = RunStatus::Running;
                    true
                }
                _ => false,
            },
            "RunCompleted" => {
                // A completion payload only stands in for a reply nothing was streamed for
                if let Some(content) = chat.text()
                    && !content.trim().is_empty()
                    && self.text.is_empty()
                {
                    self.text = content.to_string();
                }
                self.status = RunStatus::Completed;
                true
            }
            "RunError" => {
                let message = match chat.content {
                    Some(Value::String(message)) => message,
                    Some(Value::Null) | None => "unknown error".to_string(),
                    Some(other) => other.to_string(),
                };
                self.status = RunStatus::Failed(message);
                true
            }
            other => {
                debug!(event = other, "Ignoring chat event");
                false
            }
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> &RunStatus {
        &self.status
    }

    pub fn is_done(&self) -> bool {
        self.status.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn event(value: serde_json::Value) -> ParsedEvent {
        ParsedEvent::from(value)
    }

    #[test]
    fn test_accumulates_content() {
        let mut transcript = ChatTranscript::new();
        assert!(transcript.apply(&event(json!({"event":"RunStarted"}))));
        assert_eq!(transcript.status(), &RunStatus::Running);

        transcript.apply(&event(json!({"event":"RunResponseContent","content":"Hel"})));
        transcript.apply(&event(json!({"event":"RunResponseContent","content":"lo"})));
        assert!(transcript.apply(&event(json!({"event":"RunCompleted","content":"ignored"}))));

        assert_eq!(transcript.text(), "Hello");
        assert!(transcript.is_done());
    }

    #[test]
    fn test_completed_content_used_when_nothing_streamed() {
        let mut transcript = ChatTranscript::new();
        transcript.apply(&event(json!({"event":"RunCompleted","content":"Final answer"})));
        assert_eq!(transcript.text(), "Final answer");
        assert_eq!(transcript.status(), &RunStatus::Completed);
    }

    #[test]
    fn test_run_error() {
        let mut transcript = ChatTranscript::new();
        transcript.apply(&event(json!({"event":"RunError","content":"model overloaded"})));
        assert_eq!(
            transcript.status(),
            &RunStatus::Failed("model overloaded".to_string())
        );
        assert!(transcript.is_done());
    }

    #[test]
    fn test_structured_content_still_applies() {
        let mut transcript = ChatTranscript::new();
        transcript.apply(&event(json!({"event":"RunStarted"})));
        assert!(!transcript.apply(&event(json!({"event":"RunResponseContent","content":{"tool":"search"}}))));

        assert!(transcript.apply(&event(json!({"event":"RunCompleted","content":{"answer":"hi"}}))));
        assert_eq!(transcript.status(), &RunStatus::Completed);
        assert_eq!(transcript.text(), "");
    }

    #[test]
    fn test_run_error_with_structured_content() {
        let mut transcript = ChatTranscript::new();
        assert!(transcript.apply(&event(json!({"event":"RunError","content":{"code":429}}))));
        assert_eq!(
            transcript.status(),
            &RunStatus::Failed(r#"{"code":429}"#.to_string())
        );
    }

    #[test]
    fn test_ignores_unknown_and_empty() {
        let mut transcript = ChatTranscript::new();
        assert!(!transcript.apply(&event(json!({"event":"ToolCallStarted"}))));
        assert!(!transcript.apply(&event(json!({"event":"RunResponseContent","content":""}))));
        assert!(!transcript.apply(&event(json!({"type":"progress"}))));
        assert_eq!(transcript.status(), &RunStatus::Idle);
    }
}
