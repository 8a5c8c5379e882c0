//! Translation from normalized events into store events.

use chatstate_core::{AttachmentState, Role, StoreEvent};

use super::types::NormalizedEvent;

impl NormalizedEvent {
    /// Translate into the store vocabulary.
    #[must_use]
    pub fn into_store_events(self) -> Vec<StoreEvent> {
        let event = match self {
            NormalizedEvent::ConversationCreated(p) => StoreEvent::ConversationCreated(p.conversation),
            NormalizedEvent::ConversationUpdated(p) => StoreEvent::ConversationUpdated(p.conversation),
            NormalizedEvent::ConversationArchived(p) => StoreEvent::ConversationArchived {
                conversation_id: p.conversation_id,
            },
            NormalizedEvent::MessageCreated(p) => StoreEvent::MessageUpserted(p.message),
            NormalizedEvent::MessageStarted(p) => StoreEvent::MessageStarted {
                message_id: p.message_id,
                conversation_id: p.conversation_id,
                role: p.role.unwrap_or(Role::Assistant),
                client_message_id: p.client_message_id,
                created_at: p.created_at,
            },
            NormalizedEvent::MessageDelta(p) => StoreEvent::message_content(p.message_id, p.delta),
            NormalizedEvent::MessageCompleted(p) => StoreEvent::MessageEnded {
                message_id: p.message_id,
                usage: p.usage,
            },
            NormalizedEvent::MessageErrored(p) => StoreEvent::MessageErrored {
                message_id: p.message_id,
                error: p.error,
            },
            NormalizedEvent::MessageCanceled(p) => StoreEvent::MessageCanceled {
                message_id: p.message_id,
            },
            NormalizedEvent::AttachmentAvailable(p) => {
                StoreEvent::AttachmentUpdated(p.attachment.with_state(AttachmentState::Available))
            }
            NormalizedEvent::AttachmentUpdated(p) => StoreEvent::AttachmentUpdated(p.attachment),
            NormalizedEvent::AttachmentFailed(p) => StoreEvent::AttachmentFailed {
                attachment_id: p.attachment_id,
                error: p.error,
            },
        };
        vec![event]
    }
}
