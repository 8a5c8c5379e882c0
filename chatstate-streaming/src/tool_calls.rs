//! Tool-call correlation.
//!
//! Tool calls arrive as start / args / end sequences sharing a tool call
//! id. The correlator holds one [`ToolCallInProgress`] per open id until the
//! end event consumes it into a finalized [`ToolCall`].

use chatstate_core::{MessageId, ToolCall, ToolCallId};
use indexmap::IndexMap;

use crate::error::{StreamError, StreamResult};

/// A tool call between its start and end events.
///
/// The name arrives with the start event; arguments arrive piece by piece
/// as raw JSON fragments and are only concatenated here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCallInProgress {
    /// Tool call identifier.
    pub tool_call_id: ToolCallId,
    /// Tool name.
    pub tool_name: String,
    /// Buffer for accumulating JSON argument fragments.
    pub args_buffer: String,
    /// Message the finalized call will be attached to.
    pub owner: MessageId,
}

impl ToolCallInProgress {
    /// Create a record with an empty argument buffer.
    pub fn new(
        tool_call_id: impl Into<ToolCallId>,
        tool_name: impl Into<String>,
        owner: impl Into<MessageId>,
    ) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args_buffer: String::new(),
            owner: owner.into(),
        }
    }

    /// Consume into a finalized tool call.
    #[must_use]
    pub fn into_tool_call(self) -> ToolCall {
        ToolCall::new(self.tool_call_id, self.tool_name, self.args_buffer)
    }
}

/// Table of in-progress tool calls, in start order.
#[derive(Debug, Clone, Default)]
pub struct ToolCallCorrelator {
    in_progress: IndexMap<ToolCallId, ToolCallInProgress>,
}

impl ToolCallCorrelator {
    /// Create an empty correlator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a record. A second start for an open id is rejected so the
    /// already-accumulated arguments survive a replayed start.
    pub fn start(&mut self, record: ToolCallInProgress) -> StreamResult<()> {
        if self.in_progress.contains_key(&record.tool_call_id) {
            return Err(StreamError::DuplicateToolCall(record.tool_call_id));
        }
        self.in_progress.insert(record.tool_call_id.clone(), record);
        Ok(())
    }

    /// Append an argument fragment.
    pub fn append_args(&mut self, tool_call_id: &ToolCallId, delta: &str) -> StreamResult<()> {
        match self.in_progress.get_mut(tool_call_id) {
            Some(record) => {
                record.args_buffer.push_str(delta);
                Ok(())
            }
            None => Err(StreamError::UnknownToolCall(tool_call_id.clone())),
        }
    }

    /// Remove and return the record for a terminal event.
    pub fn finish(&mut self, tool_call_id: &ToolCallId) -> StreamResult<ToolCallInProgress> {
        self.in_progress
            .shift_remove(tool_call_id)
            .ok_or_else(|| StreamError::UnknownToolCall(tool_call_id.clone()))
    }

    /// Look up an open record.
    #[must_use]
    pub fn get(&self, tool_call_id: &ToolCallId) -> Option<&ToolCallInProgress> {
        self.in_progress.get(tool_call_id)
    }

    /// Whether a record is open.
    #[must_use]
    pub fn contains(&self, tool_call_id: &ToolCallId) -> bool {
        self.in_progress.contains_key(tool_call_id)
    }

    /// Owning message of an open record.
    #[must_use]
    pub fn owner_of(&self, tool_call_id: &ToolCallId) -> Option<&MessageId> {
        self.in_progress.get(tool_call_id).map(|r| &r.owner)
    }

    /// Open records owned by `message_id`, in start order.
    pub fn for_message<'a>(
        &'a self,
        message_id: &'a MessageId,
    ) -> impl Iterator<Item = &'a ToolCallInProgress> + 'a {
        self.in_progress.values().filter(move |r| &r.owner == message_id)
    }

    /// Iterate over all open records in start order.
    pub fn iter(&self) -> impl Iterator<Item = &ToolCallInProgress> {
        self.in_progress.values()
    }

    /// Keep only the records satisfying `keep`.
    pub fn retain(&mut self, mut keep: impl FnMut(&ToolCallInProgress) -> bool) {
        self.in_progress.retain(|_, r| keep(r));
    }

    /// Number of open records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.in_progress.len()
    }

    /// Whether no record is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.in_progress.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tc(s: &str) -> ToolCallId {
        ToolCallId::from(s)
    }

    #[test]
    fn test_tool_call_lifecycle() {
        let mut correlator = ToolCallCorrelator::new();
        correlator
            .start(ToolCallInProgress::new("tc1", "get_weather", "m1"))
            .unwrap();
        correlator.append_args(&tc("tc1"), r#"{"city":"#).unwrap();
        correlator.append_args(&tc("tc1"), r#" "NYC"}"#).unwrap();

        let record = correlator.finish(&tc("tc1")).unwrap();
        assert_eq!(record.owner.as_str(), "m1");
        assert_eq!(
            record.into_tool_call(),
            ToolCall::new("tc1", "get_weather", r#"{"city": "NYC"}"#)
        );
        assert!(correlator.is_empty());
    }

    #[test]
    fn test_args_for_unknown_tool_call() {
        let mut correlator = ToolCallCorrelator::new();
        let err = correlator.append_args(&tc("ghost"), "{}").unwrap_err();
        assert_eq!(err, StreamError::UnknownToolCall(tc("ghost")));
    }

    #[test]
    fn test_end_before_start_is_unknown() {
        let mut correlator = ToolCallCorrelator::new();
        assert!(correlator.finish(&tc("tc1")).is_err());
        assert!(correlator.is_empty());
    }

    #[test]
    fn test_second_finish_is_unknown() {
        let mut correlator = ToolCallCorrelator::new();
        correlator.start(ToolCallInProgress::new("tc1", "search", "m1")).unwrap();
        assert!(correlator.finish(&tc("tc1")).is_ok());
        assert!(matches!(
            correlator.finish(&tc("tc1")),
            Err(StreamError::UnknownToolCall(_))
        ));
    }

    #[test]
    fn test_duplicate_start_keeps_arguments() {
        let mut correlator = ToolCallCorrelator::new();
        correlator.start(ToolCallInProgress::new("tc1", "search", "m1")).unwrap();
        correlator.append_args(&tc("tc1"), "{}").unwrap();

        let err = correlator
            .start(ToolCallInProgress::new("tc1", "search", "m1"))
            .unwrap_err();
        assert!(err.is_duplicate());
        assert_eq!(correlator.get(&tc("tc1")).unwrap().args_buffer, "{}");
    }

    #[test]
    fn test_interleaved_calls_and_owner_lookup() {
        let mut correlator = ToolCallCorrelator::new();
        correlator.start(ToolCallInProgress::new("a", "one", "m1")).unwrap();
        correlator.start(ToolCallInProgress::new("b", "two", "m2")).unwrap();
        correlator.start(ToolCallInProgress::new("c", "three", "m1")).unwrap();
        correlator.append_args(&tc("b"), "[2]").unwrap();
        correlator.append_args(&tc("a"), "[1]").unwrap();

        assert_eq!(correlator.owner_of(&tc("b")).map(MessageId::as_str), Some("m2"));
        let m1 = MessageId::from("m1");
        let owned: Vec<_> = correlator
            .for_message(&m1)
            .map(|r| r.tool_call_id.as_str())
            .collect();
        assert_eq!(owned, vec!["a", "c"]);
        assert_eq!(correlator.get(&tc("a")).unwrap().args_buffer, "[1]");

        correlator.retain(|r| r.owner != m1);
        assert_eq!(correlator.len(), 1);
    }
}
