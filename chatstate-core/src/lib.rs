//! # chatstate-core
//!
//! Core types, events, and error handling for the chatstate framework.
//!
//! This crate provides the foundational types shared by every other crate:
//!
//! - **Model**: conversations, messages, attachments and tool calls
//! - **Events**: the canonical [`StoreEvent`] every wire format is adapted into
//! - **Snapshots & patches**: the flattened state shape and JSON patch operations
//! - **Errors**: [`ChatStateError`] and the crate-wide [`Result`]
//! - **Settings**: [`StoreSettings`] for the session around the reducer
//! - **Identifiers**: type-safe ids and timestamp helpers
//!
//! ## Example
//!
//! ```rust
//! use chatstate_core::{Message, MessageStatus, Role, StoreEvent, now_utc};
//!
//! let message = Message::new("m1", "c1", Role::User, MessageStatus::Completed, now_utc())
//!     .with_content("Hello!");
//! let event = StoreEvent::MessageUpserted(message);
//! assert_eq!(event.kind(), "message_upserted");
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod errors;
pub mod events;
pub mod identifier;
pub mod model;
pub mod patch;
pub mod settings;
pub mod snapshot;
pub mod usage;

pub use errors::{ChatStateError, PatchError, Result};
pub use events::{MessageRecord, StoreEvent};
pub use identifier::{
    now_utc, AttachmentId, ClientMessageId, ConversationId, MessageId, ToolCallId,
};
pub use model::{
    Attachment, AttachmentState, ContentPart, Conversation, ConversationStatus, Message,
    MessageStatus, Role, ToolCall,
};
pub use patch::PatchOperation;
pub use settings::StoreSettings;
pub use snapshot::Snapshot;
pub use usage::Usage;

/// Prelude module for common imports.
///
/// ```rust
/// use chatstate_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::errors::{ChatStateError, Result};
    pub use crate::events::{MessageRecord, StoreEvent};
    pub use crate::identifier::{
        now_utc, AttachmentId, ClientMessageId, ConversationId, MessageId, ToolCallId,
    };
    pub use crate::model::{
        Attachment, AttachmentState, ContentPart, Conversation, ConversationStatus, Message,
        MessageStatus, Role, ToolCall,
    };
    pub use crate::patch::PatchOperation;
    pub use crate::settings::StoreSettings;
    pub use crate::snapshot::Snapshot;
    pub use crate::usage::Usage;
}
