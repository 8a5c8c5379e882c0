//! Attachment records. Messages reference attachments by id only.

use serde::{Deserialize, Serialize};

use crate::identifier::AttachmentId;

/// Availability of an attachment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentState {
    /// Bytes received by the backend.
    #[default]
    Uploaded,
    /// Being processed (scanning, extraction, ...).
    Processing,
    /// Ready to be referenced by messages.
    Available,
    /// Processing failed.
    Failed,
}

/// A file attached to a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// Attachment identifier.
    pub id: AttachmentId,
    /// Original filename.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    #[serde(default)]
    pub size: u64,
    /// Where the bytes live (URL or storage key).
    #[serde(default)]
    pub location: String,
    /// Availability state.
    #[serde(default)]
    pub state: AttachmentState,
    /// Failure reason, set when `state` is `failed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Attachment {
    /// Create an attachment in the `uploaded` state.
    pub fn new(
        id: impl Into<AttachmentId>,
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            location: location.into(),
            state: AttachmentState::Uploaded,
            error: None,
        }
    }

    /// Set the availability state.
    #[must_use]
    pub fn with_state(mut self, state: AttachmentState) -> Self {
        self.state = state;
        self
    }

    /// Mark as failed with a reason.
    pub fn fail(&mut self, error: impl Into<String>) {
        self.state = AttachmentState::Failed;
        self.error = Some(error.into());
    }

    /// Whether the attachment can be referenced by messages.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state == AttachmentState::Available
    }
}
