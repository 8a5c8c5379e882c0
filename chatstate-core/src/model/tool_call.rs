//! Finalized tool-call records.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::identifier::ToolCallId;

/// A completed tool call, attached to exactly one message.
///
/// Arguments are kept as the raw concatenation of the streamed fragments.
/// They are usually JSON but nothing guarantees the upstream agent produced
/// valid JSON, so parsing is left to the consumer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCall {
    /// Tool call identifier.
    pub id: ToolCallId,
    /// Tool name.
    pub name: String,
    /// Raw argument string.
    #[serde(default)]
    pub arguments: String,
}

impl ToolCall {
    /// Create a new tool call record.
    pub fn new(
        id: impl Into<ToolCallId>,
        name: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse the raw arguments as JSON. Empty arguments parse as `{}`.
    pub fn parsed_arguments(&self) -> Result<Value, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            return Ok(Value::Object(serde_json::Map::new()));
        }
        serde_json::from_str(&self.arguments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_arguments() {
        let call = ToolCall::new("tc1", "search", r#"{"q":"rust"}"#);
        assert_eq!(call.parsed_arguments().unwrap()["q"], "rust");
    }

    #[test]
    fn test_empty_arguments_parse_as_object() {
        let call = ToolCall::new("tc1", "now", "");
        assert!(call.parsed_arguments().unwrap().is_object());
    }

    #[test]
    fn test_invalid_arguments_are_kept_raw() {
        let call = ToolCall::new("tc1", "search", r#"{"q":"#);
        assert!(call.parsed_arguments().is_err());
        assert_eq!(call.arguments, r#"{"q":"#);
    }
}
