//! The conversation data model.
//!
//! Conversations, messages and attachments are the durable entities of the
//! store. Tool calls are only ever stored attached to their owning message.

mod attachment;
mod conversation;
mod message;
mod tool_call;

pub use attachment::{Attachment, AttachmentState};
pub use conversation::{Conversation, ConversationStatus};
pub use message::{ContentPart, Message, MessageStatus, Role};
pub use tool_call::ToolCall;
