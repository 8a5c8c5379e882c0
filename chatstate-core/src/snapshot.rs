//! The flattened, serializable form of the whole store.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{Attachment, Conversation, Message};

/// A complete, self-describing statement of settled state.
///
/// Entities are ordered lists rather than keyed maps: JSON patch paths such
/// as `/messages/3/content` address this shape, so list order is part of
/// the contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Revision marker.
    #[serde(default)]
    pub revision: u64,
    /// Session metadata (opaque to the store).
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// Conversations.
    #[serde(default)]
    pub conversations: Vec<Conversation>,
    /// Messages of all conversations.
    #[serde(default)]
    pub messages: Vec<Message>,
    /// Attachments.
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Snapshot {
    /// Create an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a snapshot from a JSON value.
    pub fn from_value(value: Value) -> crate::Result<Self> {
        serde_json::from_value(value)
            .map_err(|e| crate::ChatStateError::InvalidSnapshot(e.to_string()))
    }

    /// Encode as a JSON value.
    pub fn to_value(&self) -> crate::Result<Value> {
        Ok(serde_json::to_value(self)?)
    }
}
