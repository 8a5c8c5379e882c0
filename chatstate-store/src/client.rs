//! Outbound intents.
//!
//! Intents are requests to the backend. They never touch the store; their
//! effects come back later as inbound events.

use std::sync::Arc;

use async_trait::async_trait;
use chatstate_core::{
    AttachmentId, ChatStateError, ClientMessageId, ConversationId, MessageId, Result,
    StoreSettings,
};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A request to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    /// Create a conversation under a client-chosen id.
    #[serde(rename_all = "camelCase")]
    CreateConversation {
        /// New conversation id.
        conversation_id: ConversationId,
        /// Title.
        title: String,
        /// Application metadata.
        #[serde(default, skip_serializing_if = "Map::is_empty")]
        metadata: Map<String, Value>,
    },
    /// Send a user message. Without a conversation the backend creates one.
    #[serde(rename_all = "camelCase")]
    SendMessage {
        /// Target conversation.
        conversation_id: Option<ConversationId>,
        /// Idempotency identifier; a retry reuses it.
        client_message_id: ClientMessageId,
        /// Message text.
        text: String,
        /// Attachments to reference.
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        attachment_ids: Vec<AttachmentId>,
    },
    /// Abort an in-flight message.
    #[serde(rename_all = "camelCase")]
    CancelMessage {
        /// Conversation of the message.
        conversation_id: ConversationId,
        /// Message to cancel.
        message_id: MessageId,
    },
    /// Register an uploaded file.
    RegisterAttachment(AttachmentRegistration),
}

impl Intent {
    /// Stable name for logging.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CreateConversation { .. } => "create_conversation",
            Self::SendMessage { .. } => "send_message",
            Self::CancelMessage { .. } => "cancel_message",
            Self::RegisterAttachment(_) => "register_attachment",
        }
    }
}

/// Attachment metadata handed to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentRegistration {
    /// Attachment id (generated when absent).
    pub id: Option<AttachmentId>,
    /// Original filename.
    pub name: String,
    /// MIME type.
    pub mime_type: String,
    /// Size in bytes.
    pub size: u64,
    /// Where the bytes were uploaded.
    pub location: String,
}

impl AttachmentRegistration {
    /// Create a registration with a generated id.
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        size: u64,
        location: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            mime_type: mime_type.into(),
            size,
            location: location.into(),
        }
    }

    /// Use a caller-chosen id.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<AttachmentId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// What a send returns: enough to recognize the echo and to retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    /// Idempotency identifier of the send.
    pub client_message_id: ClientMessageId,
    /// Conversation the message was sent to, if one was named.
    pub conversation_id: Option<ConversationId>,
}

/// Delivers intents to the backend.
#[async_trait]
pub trait IntentTransport: Send + Sync {
    /// Deliver one intent. Returning does not mean the effect is visible.
    async fn dispatch(&self, intent: Intent) -> Result<()>;
}

#[async_trait]
impl<T: IntentTransport + ?Sized> IntentTransport for Arc<T> {
    async fn dispatch(&self, intent: Intent) -> Result<()> {
        (**self).dispatch(intent).await
    }
}

/// Transport that records intents instead of sending them.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    sent: Arc<RwLock<Vec<Intent>>>,
}

impl RecordingTransport {
    /// Create an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Intents dispatched so far.
    #[must_use]
    pub fn sent(&self) -> Vec<Intent> {
        self.sent.read().clone()
    }
}

#[async_trait]
impl IntentTransport for RecordingTransport {
    async fn dispatch(&self, intent: Intent) -> Result<()> {
        self.sent.write().push(intent);
        Ok(())
    }
}

/// Issues intents over a transport.
#[derive(Debug, Clone)]
pub struct ChatClient<T> {
    transport: T,
    settings: StoreSettings,
}

impl<T: IntentTransport> ChatClient<T> {
    /// Create a client with default settings.
    pub fn new(transport: T) -> Self {
        Self::with_settings(transport, StoreSettings::default())
    }

    /// Create a client with explicit settings.
    pub fn with_settings(transport: T, settings: StoreSettings) -> Self {
        Self { transport, settings }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Request a new conversation. The id is chosen here so the caller can
    /// make it active before the backend confirms.
    pub async fn create_conversation(
        &self,
        title: Option<String>,
        metadata: Option<Map<String, Value>>,
    ) -> Result<ConversationId> {
        let conversation_id = ConversationId::generate();
        let title = title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.settings.default_conversation_title.clone());
        self.send(Intent::CreateConversation {
            conversation_id: conversation_id.clone(),
            title,
            metadata: metadata.unwrap_or_default(),
        })
        .await?;
        Ok(conversation_id)
    }

    /// Send a user message with a fresh idempotency identifier.
    pub async fn send_message(
        &self,
        conversation_id: Option<ConversationId>,
        text: impl Into<String>,
        attachment_ids: Vec<AttachmentId>,
    ) -> Result<SendReceipt> {
        let receipt = SendReceipt {
            client_message_id: ClientMessageId::generate(),
            conversation_id,
        };
        self.resend(&receipt, text, attachment_ids).await?;
        Ok(receipt)
    }

    /// Retry a send under the same idempotency identifier.
    pub async fn resend(
        &self,
        receipt: &SendReceipt,
        text: impl Into<String>,
        attachment_ids: Vec<AttachmentId>,
    ) -> Result<()> {
        let text = text.into();
        if text.trim().is_empty() && attachment_ids.is_empty() {
            return Err(ChatStateError::InvalidIntent(
                "message has neither text nor attachments".to_string(),
            ));
        }
        self.send(Intent::SendMessage {
            conversation_id: receipt.conversation_id.clone(),
            client_message_id: receipt.client_message_id.clone(),
            text,
            attachment_ids,
        })
        .await
    }

    /// Ask the backend to abort a message.
    pub async fn cancel_message(
        &self,
        conversation_id: ConversationId,
        message_id: MessageId,
    ) -> Result<()> {
        self.send(Intent::CancelMessage {
            conversation_id,
            message_id,
        })
        .await
    }

    /// Register an uploaded file, returning its id.
    pub async fn register_attachment(
        &self,
        mut registration: AttachmentRegistration,
    ) -> Result<AttachmentId> {
        if registration.name.trim().is_empty() {
            return Err(ChatStateError::InvalidIntent("attachment name is empty".to_string()));
        }
        let parsed: mime::Mime = registration.mime_type.parse().map_err(|e| {
            ChatStateError::InvalidIntent(format!(
                "invalid MIME type `{}`: {e}",
                registration.mime_type
            ))
        })?;
        registration.mime_type = parsed.essence_str().to_string();
        let id = registration.id.get_or_insert_with(AttachmentId::generate).clone();
        self.send(Intent::RegisterAttachment(registration)).await?;
        Ok(id)
    }

    async fn send(&self, intent: Intent) -> Result<()> {
        let kind = intent.kind();
        tracing::debug!(target: "chatstate::client", kind, "dispatching intent");
        self.transport.dispatch(intent).await.map_err(|e| {
            tracing::warn!(target: "chatstate::client", kind, error = %e, "intent dispatch failed");
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    struct FailingTransport;

    #[async_trait]
    impl IntentTransport for FailingTransport {
        async fn dispatch(&self, _intent: Intent) -> Result<()> {
            Err(ChatStateError::transport("connection reset"))
        }
    }

    #[tokio::test]
    async fn test_create_conversation() {
        let client = ChatClient::new(RecordingTransport::new());
        let id = client.create_conversation(None, None).await.unwrap();
        assert!(id.as_str().starts_with("conv_"));
        assert_eq!(
            client.transport().sent(),
            vec![Intent::CreateConversation {
                conversation_id: id,
                title: "New conversation".to_string(),
                metadata: Map::new(),
            }]
        );
    }

    #[tokio::test]
    async fn test_send_and_resend_share_idempotency_id() {
        let client = ChatClient::new(RecordingTransport::new());
        let receipt = client
            .send_message(Some("c1".into()), "hello", vec![])
            .await
            .unwrap();
        client.resend(&receipt, "hello", vec![]).await.unwrap();

        let sent = client.transport().sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0], sent[1]);
        let Intent::SendMessage { client_message_id, .. } = &sent[0] else {
            panic!("expected send");
        };
        assert_eq!(client_message_id, &receipt.client_message_id);
    }

    #[tokio::test]
    async fn test_empty_message_rejected() {
        let client = ChatClient::new(RecordingTransport::new());
        let err = client.send_message(None, "  ", vec![]).await.unwrap_err();
        assert!(matches!(err, ChatStateError::InvalidIntent(_)));
        assert!(client.transport().sent().is_empty());

        // Attachment-only messages are allowed.
        assert!(client.send_message(None, "", vec!["a1".into()]).await.is_ok());
    }

    #[tokio::test]
    async fn test_register_attachment() {
        let client = ChatClient::new(RecordingTransport::new());
        let id = client
            .register_attachment(AttachmentRegistration::new("cat.png", "Image/PNG", 10, "s3://x"))
            .await
            .unwrap();
        assert!(id.as_str().starts_with("att_"));
        let sent = client.transport().sent();
        let Intent::RegisterAttachment(registration) = &sent[0] else {
            panic!("expected registration");
        };
        assert_eq!(registration.mime_type, "image/png");
        assert_eq!(registration.id.as_ref(), Some(&id));
    }

    #[tokio::test]
    async fn test_register_attachment_validation() {
        let client = ChatClient::new(RecordingTransport::new());
        let bad_mime = AttachmentRegistration::new("a.bin", "not a mime", 1, "s3://x");
        assert!(client.register_attachment(bad_mime).await.is_err());
        let no_name = AttachmentRegistration::new(" ", "text/plain", 1, "s3://x");
        assert!(client.register_attachment(no_name).await.is_err());
        assert!(client.transport().sent().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let client = ChatClient::new(FailingTransport);
        let err = client
            .cancel_message("c1".into(), "m1".into())
            .await
            .unwrap_err();
        assert!(matches!(err, ChatStateError::Transport(_)));
    }

    #[test]
    fn test_intent_wire_shape() {
        let intent = Intent::CancelMessage {
            conversation_id: "c1".into(),
            message_id: "m1".into(),
        };
        assert_eq!(
            serde_json::to_value(&intent).unwrap(),
            json!({"kind": "cancel_message", "conversationId": "c1", "messageId": "m1"})
        );
    }
}
