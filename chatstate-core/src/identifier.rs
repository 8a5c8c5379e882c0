//! Identifiers and timestamps.
//!
//! Every entity in the store is keyed by a string newtype. Ids minted on the
//! client (new conversations, idempotency keys, attachments) are UUID v4
//! based; ids coming off the wire are taken verbatim.

use chrono::{DateTime, TimeZone, Utc};
use uuid::Uuid;

/// Generate a unique conversation ID (`conv_` + 32 hex chars).
///
/// # Example
///
/// ```rust
/// use chatstate_core::identifier::generate_conversation_id;
///
/// let id = generate_conversation_id();
/// assert!(id.starts_with("conv_"));
/// assert_eq!(id.len(), 37);
/// ```
#[must_use]
pub fn generate_conversation_id() -> String {
    format!("conv_{}", Uuid::new_v4().simple())
}

/// Generate a unique message ID (`msg_` prefix).
#[must_use]
pub fn generate_message_id() -> String {
    format!("msg_{}", Uuid::new_v4().simple())
}

/// Generate a unique tool call ID (`call_` prefix).
#[must_use]
pub fn generate_tool_call_id() -> String {
    format!("call_{}", Uuid::new_v4().simple())
}

/// Generate an idempotency identifier for a send-message intent.
#[must_use]
pub fn generate_client_message_id() -> String {
    format!("cmsg_{}", Uuid::new_v4().simple())
}

/// Generate a unique attachment ID (`att_` prefix).
#[must_use]
pub fn generate_attachment_id() -> String {
    format!("att_{}", Uuid::new_v4().simple())
}

/// Get the current UTC timestamp.
#[must_use]
pub fn now_utc() -> DateTime<Utc> {
    Utc::now()
}

/// Convert a protocol timestamp (milliseconds since the Unix epoch).
///
/// Returns `None` for values chrono cannot represent.
#[must_use]
pub fn timestamp_from_millis(millis: i64) -> Option<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis).single()
}

/// Format a timestamp as RFC 3339.
#[must_use]
pub fn format_timestamp(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $generate:path) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Mint a fresh, random ID.
            #[must_use]
            pub fn generate() -> Self {
                Self($generate())
            }

            /// Create from an existing string.
            #[must_use]
            pub fn from_string(s: impl Into<String>) -> Self {
                Self(s.into())
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

string_id!(
    /// Type-safe wrapper for a conversation ID.
    ConversationId,
    generate_conversation_id
);

string_id!(
    /// Type-safe wrapper for a message ID.
    MessageId,
    generate_message_id
);

string_id!(
    /// Type-safe wrapper for a tool call ID.
    ToolCallId,
    generate_tool_call_id
);

string_id!(
    /// Type-safe wrapper for an attachment ID.
    AttachmentId,
    generate_attachment_id
);

string_id!(
    /// Client-generated idempotency identifier for a sent message.
    ClientMessageId,
    generate_client_message_id
);

impl MessageId {
    /// Deterministic id for a message synthesized to carry a tool call
    /// whose start event named no parent.
    #[must_use]
    pub fn tool_call_carrier(tool_call_id: &ToolCallId) -> Self {
        Self(format!("{}-carrier", tool_call_id.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_conversation_id() {
        let id = generate_conversation_id();
        assert!(id.starts_with("conv_"));
        assert_eq!(id.len(), 37);
    }

    #[test]
    fn test_generate_unique_ids() {
        assert_ne!(generate_message_id(), generate_message_id());
        assert_ne!(ClientMessageId::generate(), ClientMessageId::generate());
    }

    #[test]
    fn test_typed_ids() {
        let id = ConversationId::generate();
        assert!(id.as_str().starts_with("conv_"));

        let from_str = MessageId::from_string("m1");
        assert_eq!(from_str.as_str(), "m1");
        assert_eq!(from_str.to_string(), "m1");
    }

    #[test]
    fn test_tool_call_carrier_is_deterministic() {
        let tc = ToolCallId::from("tc1");
        assert_eq!(MessageId::tool_call_carrier(&tc), MessageId::tool_call_carrier(&tc));
        assert_eq!(MessageId::tool_call_carrier(&tc).as_str(), "tc1-carrier");
    }

    #[test]
    fn test_timestamp_from_millis() {
        let ts = timestamp_from_millis(1_700_000_000_000).unwrap();
        assert_eq!(ts.timestamp_millis(), 1_700_000_000_000);
        let parsed: DateTime<Utc> = format_timestamp(&ts).parse().unwrap();
        assert_eq!(parsed, ts);
    }

    #[test]
    fn test_serde_transparent() {
        let id = MessageId::from("msg-1");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, r#""msg-1""#);
        let parsed: MessageId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, parsed);
    }
}
