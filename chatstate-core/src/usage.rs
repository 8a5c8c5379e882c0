//! Token usage accounting attached to finalized messages.

use serde::{Deserialize, Serialize};

/// Token usage reported for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
    /// Prompt/input tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_tokens: Option<u64>,
    /// Completion/output tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_tokens: Option<u64>,
    /// Total tokens (input + output).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
    /// Provider-specific usage details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl Usage {
    /// Create a new empty usage record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create usage with input and output tokens.
    #[must_use]
    pub fn with_tokens(input_tokens: u64, output_tokens: u64) -> Self {
        Self {
            input_tokens: Some(input_tokens),
            output_tokens: Some(output_tokens),
            total_tokens: Some(input_tokens + output_tokens),
            details: None,
        }
    }

    /// Merge another usage record into this one.
    ///
    /// Used when a message end event reports usage for a message that
    /// already carries some (e.g. from a snapshot).
    pub fn merge(&mut self, other: &Usage) {
        self.input_tokens = add_opt(self.input_tokens, other.input_tokens);
        self.output_tokens = add_opt(self.output_tokens, other.output_tokens);
        self.total_tokens = match (self.input_tokens, self.output_tokens) {
            (Some(i), Some(o)) => Some(i + o),
            _ => add_opt(self.total_tokens, other.total_tokens),
        };
        if other.details.is_some() {
            self.details.clone_from(&other.details);
        }
    }

    /// Whether no counter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.input_tokens.is_none() && self.output_tokens.is_none() && self.total_tokens.is_none()
    }
}

fn add_opt(a: Option<u64>, b: Option<u64>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a + b),
        (Some(a), None) => Some(a),
        (None, b) => b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_tokens() {
        let usage = Usage::with_tokens(10, 5);
        assert_eq!(usage.total_tokens, Some(15));
        assert!(!usage.is_empty());
        assert!(Usage::new().is_empty());
    }

    #[test]
    fn test_merge() {
        let mut usage = Usage::with_tokens(10, 5);
        usage.merge(&Usage::with_tokens(1, 2));
        assert_eq!(usage.input_tokens, Some(11));
        assert_eq!(usage.output_tokens, Some(7));
        assert_eq!(usage.total_tokens, Some(18));
    }

    #[test]
    fn test_merge_partial() {
        let mut usage = Usage::new();
        usage.merge(&Usage {
            total_tokens: Some(42),
            ..Usage::default()
        });
        assert_eq!(usage.total_tokens, Some(42));
        assert_eq!(usage.input_tokens, None);
    }

    #[test]
    fn test_camel_case() {
        let json = serde_json::to_string(&Usage::with_tokens(1, 1)).unwrap();
        assert!(json.contains(r#""inputTokens":1"#));
        assert!(json.contains(r#""totalTokens":2"#));
    }
}
