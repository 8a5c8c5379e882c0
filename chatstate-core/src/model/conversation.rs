//! Conversation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identifier::ConversationId;

/// Lifecycle status of a conversation. Conversations are never deleted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationStatus {
    /// Open for new messages.
    #[default]
    Active,
    /// Archived; kept for history.
    Archived,
}

/// A conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    /// Conversation identifier.
    pub id: ConversationId,
    /// Display title.
    #[serde(default)]
    pub title: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
    /// Monotonically increasing revision stamp.
    #[serde(default)]
    pub revision: u64,
    /// Lifecycle status.
    #[serde(default)]
    pub status: ConversationStatus,
    /// Opaque application metadata.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl Conversation {
    /// Create an active conversation at revision 0.
    pub fn new(id: impl Into<ConversationId>, title: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            created_at: now,
            updated_at: now,
            revision: 0,
            status: ConversationStatus::Active,
            metadata: Map::new(),
        }
    }

    /// Set the metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the revision.
    #[must_use]
    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    /// Whether the conversation has been archived.
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.status == ConversationStatus::Archived
    }
}
