//! Per-message text buffers for streamed content.
//!
//! A buffer exists only while its message is streaming. Content fragments
//! are appended in delivery order and the concatenation is handed back once
//! the message reaches a terminal event.

use std::collections::HashMap;

use chatstate_core::MessageId;

/// Accumulates streamed text keyed by message id.
///
/// # Example
///
/// ```rust
/// use chatstate_streaming::StreamingBuffers;
///
/// let mut buffers = StreamingBuffers::new();
/// buffers.open(&"m1".into());
/// buffers.append(&"m1".into(), "Hel");
/// buffers.append(&"m1".into(), "lo");
/// assert_eq!(buffers.take(&"m1".into()).as_deref(), Some("Hello"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct StreamingBuffers {
    buffers: HashMap<MessageId, String>,
}

impl StreamingBuffers {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an empty buffer. An existing buffer is kept as is, since some
    /// transports deliver the first fragment before the start event.
    ///
    /// Returns `true` if a buffer was created.
    pub fn open(&mut self, message_id: &MessageId) -> bool {
        self.open_seeded(message_id, "")
    }

    /// Open a buffer that starts with `seed` (text already settled on the
    /// message). No-op if one is open.
    pub fn open_seeded(&mut self, message_id: &MessageId, seed: &str) -> bool {
        if self.buffers.contains_key(message_id) {
            return false;
        }
        self.buffers.insert(message_id.clone(), seed.to_string());
        true
    }

    /// Append a fragment, creating the buffer empty-first if needed.
    ///
    /// Returns `true` if the buffer had to be synthesized.
    pub fn append(&mut self, message_id: &MessageId, delta: &str) -> bool {
        if let Some(buffer) = self.buffers.get_mut(message_id) {
            buffer.push_str(delta);
            return false;
        }
        tracing::trace!(
            target: "chatstate::buffers",
            message_id = %message_id,
            "synthesizing buffer for fragment without start"
        );
        self.buffers.insert(message_id.clone(), delta.to_string());
        true
    }

    /// Current text of a buffer.
    #[must_use]
    pub fn get(&self, message_id: &MessageId) -> Option<&str> {
        self.buffers.get(message_id).map(String::as_str)
    }

    /// Whether a buffer is open.
    #[must_use]
    pub fn contains(&self, message_id: &MessageId) -> bool {
        self.buffers.contains_key(message_id)
    }

    /// Remove a buffer, returning its text.
    pub fn take(&mut self, message_id: &MessageId) -> Option<String> {
        self.buffers.remove(message_id)
    }

    /// Keep only the buffers whose id satisfies `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&MessageId) -> bool) {
        self.buffers.retain(|id, _| keep(id));
    }

    /// Number of open buffers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    /// Whether no buffer is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn id(s: &str) -> MessageId {
        MessageId::from(s)
    }

    #[rstest]
    #[case(&[], "")]
    #[case(&["Hello"], "Hello")]
    #[case(&["Hel", "lo"], "Hello")]
    #[case(&["a", "", "b", "c"], "abc")]
    #[case(&["héllo ", "wörld", " 🦀"], "héllo wörld 🦀")]
    fn test_concatenation_in_delivery_order(#[case] deltas: &[&str], #[case] expected: &str) {
        let mut buffers = StreamingBuffers::new();
        buffers.open(&id("m1"));
        for delta in deltas {
            buffers.append(&id("m1"), delta);
        }
        assert_eq!(buffers.take(&id("m1")).as_deref(), Some(expected));
        assert!(buffers.is_empty());
    }

    #[test]
    fn test_append_without_open_synthesizes() {
        let mut buffers = StreamingBuffers::new();
        assert!(buffers.append(&id("m1"), "early"));
        assert!(!buffers.append(&id("m1"), " bird"));
        assert_eq!(buffers.get(&id("m1")), Some("early bird"));
    }

    #[test]
    fn test_open_keeps_existing_buffer() {
        let mut buffers = StreamingBuffers::new();
        buffers.append(&id("m1"), "first");
        assert!(!buffers.open(&id("m1")));
        assert_eq!(buffers.get(&id("m1")), Some("first"));
    }

    #[test]
    fn test_open_seeded() {
        let mut buffers = StreamingBuffers::new();
        assert!(buffers.open_seeded(&id("m1"), "Hel"));
        buffers.append(&id("m1"), "lo");
        assert_eq!(buffers.get(&id("m1")), Some("Hello"));
    }

    #[test]
    fn test_buffers_are_independent() {
        let mut buffers = StreamingBuffers::new();
        buffers.append(&id("m1"), "one");
        buffers.append(&id("m2"), "two");
        buffers.append(&id("m1"), "!");
        assert_eq!(buffers.get(&id("m1")), Some("one!"));
        assert_eq!(buffers.get(&id("m2")), Some("two"));

        buffers.retain(|m| m.as_str() == "m2");
        assert_eq!(buffers.len(), 1);
        assert!(!buffers.contains(&id("m1")));
    }
}
