//! Store configuration.
//!
//! [`StoreSettings`] tunes the session around the reducer. The reduction
//! rules themselves are fixed; settings only cover the explicit context the
//! session hands to the reducer and the size of the event queue.

use serde::{Deserialize, Serialize};

use crate::errors::{ChatStateError, Result};

/// Default title for conversations synthesized on demand.
pub const DEFAULT_CONVERSATION_TITLE: &str = "New conversation";

/// Default bound of the single-writer event queue.
pub const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 256;

/// Settings for a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreSettings {
    /// Title used when a conversation has to be created implicitly
    /// (run started in an unknown thread, auto-created by send).
    pub default_conversation_title: String,

    /// Make the conversation of a `RunStarted` event the session's active
    /// conversation.
    pub adopt_run_conversation: bool,

    /// Bound of the event queue feeding the single writer.
    pub event_queue_capacity: usize,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            default_conversation_title: DEFAULT_CONVERSATION_TITLE.to_string(),
            adopt_run_conversation: true,
            event_queue_capacity: DEFAULT_EVENT_QUEUE_CAPACITY,
        }
    }
}

impl StoreSettings {
    /// Create default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default conversation title.
    #[must_use]
    pub fn default_conversation_title(mut self, title: impl Into<String>) -> Self {
        self.default_conversation_title = title.into();
        self
    }

    /// Set whether run events switch the active conversation.
    #[must_use]
    pub fn adopt_run_conversation(mut self, adopt: bool) -> Self {
        self.adopt_run_conversation = adopt;
        self
    }

    /// Set the event queue capacity.
    #[must_use]
    pub fn event_queue_capacity(mut self, capacity: usize) -> Self {
        self.event_queue_capacity = capacity;
        self
    }

    /// Parse settings from JSON. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check invariants.
    pub fn validate(&self) -> Result<()> {
        if self.event_queue_capacity == 0 {
            return Err(ChatStateError::Configuration(
                "eventQueueCapacity must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = StoreSettings::default();
        assert_eq!(settings.default_conversation_title, "New conversation");
        assert!(settings.adopt_run_conversation);
        assert_eq!(settings.event_queue_capacity, 256);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let settings = StoreSettings::new()
            .default_conversation_title("Untitled")
            .adopt_run_conversation(false)
            .event_queue_capacity(8);
        assert_eq!(settings.default_conversation_title, "Untitled");
        assert!(!settings.adopt_run_conversation);
        assert_eq!(settings.event_queue_capacity, 8);
    }

    #[test]
    fn test_from_json_partial() {
        let settings = StoreSettings::from_json(r#"{"adoptRunConversation": false}"#).unwrap();
        assert!(!settings.adopt_run_conversation);
        assert_eq!(settings.event_queue_capacity, DEFAULT_EVENT_QUEUE_CAPACITY);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = StoreSettings::from_json(r#"{"eventQueueCapacity": 0}"#).unwrap_err();
        assert!(matches!(err, ChatStateError::Configuration(_)));
    }
}
