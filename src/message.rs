//! Chat transcript model.
//!
//! A [`ChatMessage`] is immutable once appended; the transcript is an
//! append-only sequence owned by [`crate::session::Session`], never reordered
//! or deleted, and memory-only for the lifetime of the process.

use serde::{Deserialize, Serialize};

/// Fixed assistant reply appended when a research call fails. The backend's
/// own error detail is discarded for research failures.
pub const RESEARCH_FALLBACK: &str = "Sorry, I encountered an error while researching.";

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One transcript entry.
///
/// Assistant entries produced from a successful research call carry the
/// backend's confidence score and supporting source-chunk identifiers; user
/// entries and the failure fallback carry neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
}

impl ChatMessage {
    /// A user question, rendered as plain text.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            confidence: None,
            sources: Vec::new(),
        }
    }

    /// A successful research answer.
    pub fn answer(content: impl Into<String>, confidence: f32, sources: Vec<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            confidence: Some(confidence),
            sources,
        }
    }

    /// The fixed-text assistant entry standing in for a failed research call.
    pub fn fallback() -> Self {
        Self {
            role: Role::Assistant,
            content: RESEARCH_FALLBACK.to_string(),
            confidence: None,
            sources: Vec::new(),
        }
    }

    /// Confidence as a whole percentage, e.g. `0.873` → `"87%"`.
    pub fn confidence_label(&self) -> Option<String> {
        self.confidence
            .map(|c| format!("{}%", (c * 100.0).round() as i64))
    }

    /// Source count indicator, e.g. `"3 Sources"`. An empty list renders none.
    pub fn source_label(&self) -> Option<String> {
        if self.sources.is_empty() {
            None
        } else {
            Some(format!("{} Sources", self.sources.len()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_rounds_to_nearest_percent() {
        let msg = ChatMessage::answer("a", 0.873, vec![]);
        assert_eq!(msg.confidence_label().unwrap(), "87%");

        let msg = ChatMessage::answer("a", 0.875, vec![]);
        assert_eq!(msg.confidence_label().unwrap(), "88%");
    }

    #[test]
    fn user_messages_have_no_confidence_label() {
        assert!(ChatMessage::user("q").confidence_label().is_none());
    }

    #[test]
    fn source_label_counts_chunks() {
        let msg = ChatMessage::answer("a", 0.5, vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(msg.source_label().unwrap(), "3 Sources");
    }

    #[test]
    fn empty_source_list_renders_no_indicator() {
        let msg = ChatMessage::answer("a", 0.5, vec![]);
        assert!(msg.source_label().is_none());
    }

    #[test]
    fn fallback_carries_the_fixed_text_and_nothing_else() {
        let msg = ChatMessage::fallback();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, RESEARCH_FALLBACK);
        assert!(msg.confidence.is_none());
        assert!(msg.sources.is_empty());
    }

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&ChatMessage::user("hi")).unwrap();
        assert!(json.contains("\"role\":\"user\""));
    }
}
