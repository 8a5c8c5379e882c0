//! Normalized (dotted-name) event adapter.
//!
//! | Type | Store event |
//! |------|-------------|
//! | `conversation.created` / `conversation.updated` | `ConversationCreated` / `ConversationUpdated` |
//! | `conversation.archived` | `ConversationArchived` |
//! | `message.created` | `MessageUpserted` |
//! | `message.started` / `message.delta` / `message.completed` | `MessageStarted` / `MessageContent` / `MessageEnded` |
//! | `message.errored` / `message.canceled` | `MessageErrored` / `MessageCanceled` |
//! | `attachment.available` / `attachment.updated` | `AttachmentUpdated` |
//! | `attachment.failed` | `AttachmentFailed` |

mod adapter;
mod types;

pub use types::{
    is_normalized_type, AttachmentFailedPayload, AttachmentPayload, ConversationPayload,
    ConversationRef, MessageCompletedPayload, MessageDeltaPayload, MessageErroredPayload,
    MessagePayload, MessageRef, MessageStartedPayload, NormalizedEvent, NORMALIZED_EVENT_TYPES,
};
