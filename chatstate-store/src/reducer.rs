//! The event reducer.
//!
//! [`reduce`] applies one [`StoreEvent`] to a [`ChatState`] in place. It
//! never fails: events that cannot be applied are logged and dropped, and
//! the return value says whether anything changed.

use chatstate_core::settings::DEFAULT_CONVERSATION_TITLE;
use chatstate_core::{
    now_utc, Attachment, AttachmentId, ClientMessageId, Conversation, ConversationId,
    ConversationStatus, Message, MessageId, MessageRecord, MessageStatus, PatchOperation, Role,
    Snapshot, StoreEvent, StoreSettings, ToolCallId, Usage,
};
use chatstate_streaming::ToolCallInProgress;
use chrono::{DateTime, Utc};

use crate::state::ChatState;

const TARGET: &str = "chatstate::reducer";

/// Everything the reducer needs besides the event itself.
#[derive(Debug, Clone, PartialEq)]
pub struct ReduceContext {
    /// Conversation to fall back on when an event does not name one.
    pub conversation_id: Option<ConversationId>,
    /// Clock reading used for timestamps the event does not carry.
    pub now: DateTime<Utc>,
    /// Title for conversations created on demand.
    pub default_conversation_title: String,
}

impl Default for ReduceContext {
    fn default() -> Self {
        Self {
            conversation_id: None,
            now: now_utc(),
            default_conversation_title: DEFAULT_CONVERSATION_TITLE.to_string(),
        }
    }
}

impl ReduceContext {
    /// Context reading the clock now, with no active conversation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context built from settings and the caller's active conversation.
    #[must_use]
    pub fn from_settings(settings: &StoreSettings, conversation_id: Option<ConversationId>) -> Self {
        Self {
            conversation_id,
            now: now_utc(),
            default_conversation_title: settings.default_conversation_title.clone(),
        }
    }

    /// Set the fallback conversation.
    #[must_use]
    pub fn with_conversation(mut self, conversation_id: impl Into<ConversationId>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Pin the clock.
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = now;
        self
    }

    fn resolve(&self, explicit: Option<ConversationId>) -> Option<ConversationId> {
        explicit.or_else(|| self.conversation_id.clone())
    }
}

/// Apply `event` to `state`.
///
/// Returns `true` if the state changed. Every change bumps the store
/// revision (a snapshot sets it instead).
pub fn reduce(state: &mut ChatState, event: StoreEvent, ctx: &ReduceContext) -> bool {
    let kind = event.kind();
    let changed = match event {
        StoreEvent::ConversationCreated(c) | StoreEvent::ConversationUpdated(c) => {
            upsert_conversation(state, c)
        }
        StoreEvent::ConversationArchived { conversation_id } => {
            archive_conversation(state, &conversation_id, ctx)
        }
        StoreEvent::RunStarted { conversation_id, .. } => {
            state.ensure_conversation(&conversation_id, &ctx.default_conversation_title, ctx.now)
        }
        StoreEvent::RunFinished { conversation_id, .. } => run_finished(state, &conversation_id, ctx),
        StoreEvent::RunErrored { conversation_id, error } => {
            run_errored(state, ctx.resolve(conversation_id), &error)
        }
        StoreEvent::MessageStarted {
            message_id,
            conversation_id,
            role,
            client_message_id,
            created_at,
        } => message_started(
            state,
            message_id,
            ctx.resolve(conversation_id),
            role,
            client_message_id,
            created_at.unwrap_or(ctx.now),
            ctx,
        ),
        StoreEvent::MessageContent { message_id, delta } => message_content(state, &message_id, &delta),
        StoreEvent::MessageChunk {
            message_id,
            role,
            delta,
            created_at,
        } => message_chunk(state, message_id, role, &delta, created_at.unwrap_or(ctx.now), ctx),
        StoreEvent::MessageEnded { message_id, usage } => message_ended(state, &message_id, usage, ctx),
        StoreEvent::MessageUpserted(message) => upsert_message(state, message, ctx),
        StoreEvent::MessageErrored { message_id, error } => {
            finish_message(state, &message_id, MessageStatus::Errored, Some(error))
        }
        StoreEvent::MessageCanceled { message_id } => {
            finish_message(state, &message_id, MessageStatus::Canceled, None)
        }
        StoreEvent::MessagesSnapshot { conversation_id, messages } => {
            messages_snapshot(state, ctx.resolve(conversation_id), messages, ctx)
        }
        StoreEvent::ToolCallStarted {
            tool_call_id,
            tool_call_name,
            parent_message_id,
            conversation_id,
        } => tool_call_started(
            state,
            tool_call_id,
            tool_call_name,
            parent_message_id,
            ctx.resolve(conversation_id),
            ctx,
        ),
        StoreEvent::ToolCallArgs { tool_call_id, delta } => tool_call_args(state, &tool_call_id, &delta),
        StoreEvent::ToolCallChunk {
            tool_call_id,
            tool_call_name,
            parent_message_id,
            delta,
        } => tool_call_chunk(state, tool_call_id, tool_call_name, parent_message_id, &delta, ctx),
        StoreEvent::ToolCallEnded { tool_call_id } => tool_call_ended(state, &tool_call_id),
        StoreEvent::ToolCallResult {
            message_id,
            tool_call_id,
            content,
            conversation_id,
            created_at,
        } => tool_call_result(
            state,
            message_id,
            tool_call_id,
            content,
            conversation_id,
            created_at.unwrap_or(ctx.now),
            ctx,
        ),
        // Revision is set by the snapshot or the delta itself.
        StoreEvent::StateSnapshot(snapshot) => {
            state_snapshot(state, snapshot);
            tracing::debug!(target: TARGET, kind, revision = state.revision, "applied");
            return true;
        }
        StoreEvent::StateDelta(operations) => {
            let changed = state_delta(state, &operations);
            if changed {
                tracing::debug!(target: TARGET, kind, revision = state.revision, "applied");
            }
            return changed;
        }
        StoreEvent::AttachmentUpdated(attachment) => upsert_attachment(state, attachment),
        StoreEvent::AttachmentFailed { attachment_id, error } => {
            attachment_failed(state, &attachment_id, error)
        }
    };
    if changed {
        state.bump();
        tracing::trace!(target: TARGET, kind, revision = state.revision, "applied");
    }
    changed
}

// ============================================================================
// Conversations
// ============================================================================

fn upsert_conversation(state: &mut ChatState, conversation: Conversation) -> bool {
    if let Some(existing) = state.conversations.get(&conversation.id) {
        if conversation.revision < existing.revision {
            tracing::debug!(
                target: TARGET,
                conversation_id = %conversation.id,
                incoming = conversation.revision,
                stored = existing.revision,
                "ignoring stale conversation record"
            );
            return false;
        }
        if existing == &conversation {
            return false;
        }
    }
    state.index.entry(conversation.id.clone()).or_default();
    state.conversations.insert(conversation.id.clone(), conversation);
    true
}

fn archive_conversation(state: &mut ChatState, id: &ConversationId, ctx: &ReduceContext) -> bool {
    let Some(conversation) = state.conversations.get_mut(id) else {
        tracing::warn!(target: TARGET, conversation_id = %id, "archive for unknown conversation");
        return false;
    };
    if conversation.status == ConversationStatus::Archived {
        return false;
    }
    conversation.status = ConversationStatus::Archived;
    conversation.revision = conversation.revision.saturating_add(1);
    conversation.updated_at = ctx.now;
    true
}

fn run_errored(state: &mut ChatState, conversation_id: Option<ConversationId>, error: &str) -> bool {
    let Some(conversation_id) = conversation_id else {
        tracing::warn!(target: TARGET, error, "run error with no conversation to attribute it to");
        return false;
    };
    let streaming: Vec<MessageId> = state
        .message_ids(&conversation_id)
        .iter()
        .filter(|id| {
            state
                .messages
                .get(*id)
                .is_some_and(|m| m.status == MessageStatus::Streaming)
        })
        .cloned()
        .collect();
    let mut changed = false;
    for id in streaming {
        changed |= finish_message(state, &id, MessageStatus::Errored, Some(error.to_string()));
    }
    changed
}

/// Settle what the run left open in its conversation. Tool calls end
/// first so they attach before their owners complete.
fn run_finished(state: &mut ChatState, conversation_id: &ConversationId, ctx: &ReduceContext) -> bool {
    let open_calls: Vec<ToolCallId> = state
        .tool_calls
        .iter()
        .filter(|r| {
            state
                .messages
                .get(&r.owner)
                .is_some_and(|m| &m.conversation_id == conversation_id)
        })
        .map(|r| r.tool_call_id.clone())
        .collect();
    let mut changed = false;
    for id in &open_calls {
        changed |= tool_call_ended(state, id);
    }

    let streaming: Vec<MessageId> = state
        .message_ids(conversation_id)
        .iter()
        .filter(|id| {
            state
                .messages
                .get(*id)
                .is_some_and(|m| m.status == MessageStatus::Streaming)
        })
        .cloned()
        .collect();
    for id in &streaming {
        changed |= message_ended(state, id, None, ctx);
    }

    if state.chunked_message.as_ref().is_some_and(|id| streaming.contains(id)) {
        state.chunked_message = None;
    }
    if state.chunked_tool_call.as_ref().is_some_and(|id| open_calls.contains(id)) {
        state.chunked_tool_call = None;
    }
    if changed {
        tracing::debug!(
            target: TARGET,
            conversation_id = %conversation_id,
            tool_calls = open_calls.len(),
            messages = streaming.len(),
            "run finished with open streams"
        );
    }
    changed
}

// ============================================================================
// Text messages
// ============================================================================

fn message_started(
    state: &mut ChatState,
    message_id: MessageId,
    conversation_id: Option<ConversationId>,
    role: Role,
    client_message_id: Option<ClientMessageId>,
    created_at: DateTime<Utc>,
    ctx: &ReduceContext,
) -> bool {
    if state.messages.contains_key(&message_id) {
        tracing::debug!(target: TARGET, message_id = %message_id, "ignoring duplicate message start");
        return false;
    }
    let Some(conversation_id) = conversation_id else {
        tracing::warn!(target: TARGET, message_id = %message_id, "message start with no conversation");
        return false;
    };
    if let Some(client_id) = &client_message_id {
        if let Some(existing) = find_by_client_id(state, client_id) {
            tracing::debug!(
                target: TARGET,
                message_id = %message_id,
                existing = %existing,
                "ignoring retried send already delivered under another id"
            );
            return false;
        }
    }
    state.ensure_conversation(&conversation_id, &ctx.default_conversation_title, ctx.now);
    let mut message = Message::new(
        message_id.clone(),
        conversation_id,
        role,
        MessageStatus::Streaming,
        created_at,
    );
    message.client_message_id = client_message_id;
    state.put_message(message);
    state.buffers.open(&message_id);
    true
}

fn message_content(state: &mut ChatState, message_id: &MessageId, delta: &str) -> bool {
    match state.messages.get(message_id) {
        Some(message) if message.is_terminal() => {
            tracing::debug!(target: TARGET, message_id = %message_id, "dropping delta for settled message");
            false
        }
        Some(message) => {
            let seed = message.content.clone();
            state.buffers.open_seeded(message_id, &seed);
            state.buffers.append(message_id, delta);
            true
        }
        // Transports that chunk start and content together may deliver
        // the fragment first.
        None => {
            state.buffers.append(message_id, delta);
            true
        }
    }
}

/// Chunked messages have no end event. A chunk for another id closes the
/// open one.
fn message_chunk(
    state: &mut ChatState,
    message_id: MessageId,
    role: Role,
    delta: &str,
    created_at: DateTime<Utc>,
    ctx: &ReduceContext,
) -> bool {
    let mut changed = false;
    if let Some(open) = state.chunked_message.take() {
        if open != message_id {
            changed |= message_ended(state, &open, None, ctx);
        }
    }
    if !state.messages.contains_key(&message_id) {
        changed |= message_started(
            state,
            message_id.clone(),
            ctx.conversation_id.clone(),
            role,
            None,
            created_at,
            ctx,
        );
    }
    if !delta.is_empty() {
        changed |= message_content(state, &message_id, delta);
    }
    let open = match state.messages.get(&message_id) {
        Some(message) => message.status == MessageStatus::Streaming,
        None => state.buffers.contains(&message_id),
    };
    if open {
        state.chunked_message = Some(message_id);
    }
    changed
}

fn message_ended(
    state: &mut ChatState,
    message_id: &MessageId,
    usage: Option<Usage>,
    ctx: &ReduceContext,
) -> bool {
    if !state.messages.contains_key(message_id) {
        let Some(text) = state.buffers.take(message_id) else {
            tracing::debug!(target: TARGET, message_id = %message_id, "end for unknown message");
            return false;
        };
        let Some(conversation_id) = ctx.conversation_id.clone() else {
            tracing::warn!(
                target: TARGET,
                message_id = %message_id,
                "dropping buffered text with no conversation to place it in"
            );
            return true;
        };
        state.ensure_conversation(&conversation_id, &ctx.default_conversation_title, ctx.now);
        let mut message = Message::new(
            message_id.clone(),
            conversation_id,
            Role::Assistant,
            MessageStatus::Completed,
            ctx.now,
        )
        .with_content(text);
        message.usage = usage;
        state.put_message(message);
        return true;
    }
    let buffered = state.buffers.take(message_id);
    let Some(message) = state.messages.get_mut(message_id) else {
        return false;
    };
    if message.is_terminal() {
        tracing::debug!(target: TARGET, message_id = %message_id, "duplicate message end");
        return buffered.is_some();
    }
    if let Some(text) = buffered {
        message.content = text;
    }
    message.status = MessageStatus::Completed;
    if let Some(usage) = usage {
        match &mut message.usage {
            Some(existing) => existing.merge(&usage),
            None => message.usage = Some(usage),
        }
    }
    true
}

fn finish_message(
    state: &mut ChatState,
    message_id: &MessageId,
    status: MessageStatus,
    error: Option<String>,
) -> bool {
    let Some(message) = state.messages.get_mut(message_id) else {
        tracing::debug!(target: TARGET, message_id = %message_id, ?status, "terminal event for unknown message");
        return state.buffers.take(message_id).is_some();
    };
    if message.is_terminal() {
        tracing::debug!(target: TARGET, message_id = %message_id, ?status, "message already settled");
        return false;
    }
    if let Some(text) = state.buffers.take(message_id) {
        message.content = text;
    }
    message.status = status;
    message.error = error;
    true
}

fn upsert_message(state: &mut ChatState, mut message: Message, ctx: &ReduceContext) -> bool {
    if let Some(client_id) = &message.client_message_id {
        if let Some(existing) = find_by_client_id(state, client_id) {
            if existing != message.id {
                tracing::debug!(
                    target: TARGET,
                    message_id = %message.id,
                    existing = %existing,
                    "ignoring duplicate delivery of a retried send"
                );
                return false;
            }
        }
    }
    if let Some(existing) = state.messages.get(&message.id) {
        if existing.is_terminal() && message.status == MessageStatus::Streaming {
            message.status = existing.status;
        }
        if existing == &message {
            return false;
        }
    }
    if message.is_terminal() {
        state.buffers.take(&message.id);
    }
    state.ensure_conversation(&message.conversation_id, &ctx.default_conversation_title, ctx.now);
    state.put_message(message);
    true
}

fn find_by_client_id(state: &ChatState, client_id: &ClientMessageId) -> Option<MessageId> {
    state
        .messages
        .values()
        .find(|m| m.client_message_id.as_ref() == Some(client_id))
        .map(|m| m.id.clone())
}

fn messages_snapshot(
    state: &mut ChatState,
    conversation_id: Option<ConversationId>,
    records: Vec<MessageRecord>,
    ctx: &ReduceContext,
) -> bool {
    let Some(conversation_id) = conversation_id else {
        tracing::warn!(target: TARGET, "messages snapshot with no conversation");
        return false;
    };
    let created = state.ensure_conversation(&conversation_id, &ctx.default_conversation_title, ctx.now);
    let before = conversation_messages(state, &conversation_id);

    let mut keep: Vec<MessageId> = Vec::with_capacity(records.len());
    for record in &records {
        if !keep.contains(&record.id) {
            keep.push(record.id.clone());
        }
    }
    let stale: Vec<MessageId> = state
        .message_ids(&conversation_id)
        .iter()
        .filter(|id| !keep.contains(id))
        .cloned()
        .collect();
    for id in &stale {
        state.remove_message(id);
    }

    for record in records {
        let created_at = record
            .created_at
            .or_else(|| state.messages.get(&record.id).map(|m| m.created_at));
        let mut message =
            MessageRecord { created_at, ..record }.into_message(conversation_id.clone(), ctx.now);
        if let Some(existing) = state.messages.get(&message.id) {
            message.usage = existing.usage.clone();
            message.client_message_id = existing.client_message_id.clone();
            message.parts = existing.parts.clone();
        }
        state.buffers.take(&message.id);
        state.put_message(message);
    }
    state.index.insert(conversation_id.clone(), keep);
    created || conversation_messages(state, &conversation_id) != before
}

fn conversation_messages(state: &ChatState, conversation_id: &ConversationId) -> Vec<Message> {
    state
        .message_ids(conversation_id)
        .iter()
        .filter_map(|id| state.messages.get(id).cloned())
        .collect()
}

// ============================================================================
// Tool calls
// ============================================================================

fn tool_call_started(
    state: &mut ChatState,
    tool_call_id: ToolCallId,
    tool_call_name: String,
    parent_message_id: Option<MessageId>,
    conversation_id: Option<ConversationId>,
    ctx: &ReduceContext,
) -> bool {
    if state.tool_calls.contains(&tool_call_id) || state.tool_call_owners.contains_key(&tool_call_id) {
        tracing::debug!(target: TARGET, tool_call_id = %tool_call_id, "ignoring duplicate tool call start");
        return false;
    }

    let owner = match parent_message_id {
        Some(parent) if state.messages.contains_key(&parent) => parent,
        Some(parent) => {
            let Some(conversation_id) = conversation_id else {
                tracing::warn!(
                    target: TARGET,
                    tool_call_id = %tool_call_id,
                    parent_message_id = %parent,
                    "tool call names an unknown message and no conversation"
                );
                return false;
            };
            synthesize_carrier(state, parent, conversation_id, ctx)
        }
        None => {
            let Some(conversation_id) = conversation_id else {
                tracing::warn!(target: TARGET, tool_call_id = %tool_call_id, "tool call with no owner");
                return false;
            };
            match state.last_assistant_message(&conversation_id) {
                Some(last) => last.clone(),
                None => synthesize_carrier(
                    state,
                    MessageId::tool_call_carrier(&tool_call_id),
                    conversation_id,
                    ctx,
                ),
            }
        }
    };

    match state
        .tool_calls
        .start(ToolCallInProgress::new(tool_call_id, tool_call_name, owner))
    {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(target: TARGET, error = %e, "tool call start rejected");
            false
        }
    }
}

/// Create an empty completed assistant message for tool calls whose
/// carrier was never announced.
fn synthesize_carrier(
    state: &mut ChatState,
    message_id: MessageId,
    conversation_id: ConversationId,
    ctx: &ReduceContext,
) -> MessageId {
    state.ensure_conversation(&conversation_id, &ctx.default_conversation_title, ctx.now);
    tracing::debug!(target: TARGET, message_id = %message_id, "synthesizing tool call carrier message");
    state.put_message(Message::new(
        message_id.clone(),
        conversation_id,
        Role::Assistant,
        MessageStatus::Completed,
        ctx.now,
    ));
    message_id
}

fn tool_call_args(state: &mut ChatState, tool_call_id: &ToolCallId, delta: &str) -> bool {
    match state.tool_calls.append_args(tool_call_id, delta) {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(target: TARGET, error = %e, "dropping tool call arguments");
            false
        }
    }
}

/// Chunked tool calls have no end event. A chunk for another id ends the
/// open one. Only a chunk carrying a name can open a call.
fn tool_call_chunk(
    state: &mut ChatState,
    tool_call_id: ToolCallId,
    tool_call_name: Option<String>,
    parent_message_id: Option<MessageId>,
    delta: &str,
    ctx: &ReduceContext,
) -> bool {
    let mut changed = false;
    if let Some(open) = state.chunked_tool_call.take() {
        if open != tool_call_id {
            changed |= tool_call_ended(state, &open);
        }
    }
    if let Some(name) = tool_call_name {
        if !state.tool_calls.contains(&tool_call_id) {
            changed |= tool_call_started(
                state,
                tool_call_id.clone(),
                name,
                parent_message_id,
                ctx.conversation_id.clone(),
                ctx,
            );
        }
    }
    if !delta.is_empty() {
        changed |= tool_call_args(state, &tool_call_id, delta);
    }
    if state.tool_calls.contains(&tool_call_id) {
        state.chunked_tool_call = Some(tool_call_id);
    }
    changed
}

fn tool_call_ended(state: &mut ChatState, tool_call_id: &ToolCallId) -> bool {
    let record = match state.tool_calls.finish(tool_call_id) {
        Ok(record) => record,
        Err(e) => {
            tracing::debug!(target: TARGET, error = %e, "ignoring tool call end");
            return false;
        }
    };
    let owner = record.owner.clone();
    let Some(message) = state.messages.get_mut(&owner) else {
        tracing::warn!(
            target: TARGET,
            tool_call_id = %tool_call_id,
            owner = %owner,
            "owner of finished tool call no longer exists"
        );
        return true;
    };
    if !message.attach_tool_call(record.into_tool_call()) {
        tracing::debug!(target: TARGET, tool_call_id = %tool_call_id, "tool call already attached");
    }
    state.tool_call_owners.insert(tool_call_id.clone(), owner);
    true
}

fn tool_call_result(
    state: &mut ChatState,
    message_id: MessageId,
    tool_call_id: ToolCallId,
    content: String,
    conversation_id: Option<ConversationId>,
    created_at: DateTime<Utc>,
    ctx: &ReduceContext,
) -> bool {
    if let Some(existing) = state.messages.get_mut(&message_id) {
        if existing.role != Role::Tool {
            tracing::warn!(
                target: TARGET,
                message_id = %message_id,
                "tool result addresses a non-tool message"
            );
            return false;
        }
        if existing.content == content && existing.tool_call_id.as_ref() == Some(&tool_call_id) {
            return false;
        }
        existing.content = content;
        existing.tool_call_id = Some(tool_call_id);
        existing.status = MessageStatus::Completed;
        return true;
    }

    let from_owner = state
        .tool_call_owners
        .get(&tool_call_id)
        .or_else(|| state.tool_calls.owner_of(&tool_call_id))
        .and_then(|owner| state.messages.get(owner))
        .map(|m| m.conversation_id.clone());
    let Some(conversation_id) = from_owner.or(conversation_id).or_else(|| ctx.conversation_id.clone())
    else {
        tracing::warn!(
            target: TARGET,
            tool_call_id = %tool_call_id,
            "tool result with no conversation to place it in"
        );
        return false;
    };
    state.ensure_conversation(&conversation_id, &ctx.default_conversation_title, ctx.now);
    state.put_message(
        Message::new(message_id, conversation_id, Role::Tool, MessageStatus::Completed, created_at)
            .with_content(content)
            .with_tool_call_id(tool_call_id),
    );
    true
}

// ============================================================================
// State synchronization
// ============================================================================

fn state_snapshot(state: &mut ChatState, snapshot: Snapshot) {
    *state = ChatState::from_snapshot(snapshot);
}

fn state_delta(state: &mut ChatState, operations: &[PatchOperation]) -> bool {
    if operations.is_empty() {
        return false;
    }
    match state.patched(operations) {
        Ok(next) => {
            *state = next;
            true
        }
        Err(e) => {
            tracing::warn!(
                target: "chatstate::patch",
                error = %e,
                operations = operations.len(),
                "rejecting state delta"
            );
            false
        }
    }
}

// ============================================================================
// Attachments
// ============================================================================

fn upsert_attachment(state: &mut ChatState, attachment: Attachment) -> bool {
    if state.attachments.get(&attachment.id) == Some(&attachment) {
        return false;
    }
    state.attachments.insert(attachment.id.clone(), attachment);
    true
}

fn attachment_failed(state: &mut ChatState, attachment_id: &AttachmentId, error: String) -> bool {
    let Some(attachment) = state.attachments.get_mut(attachment_id) else {
        tracing::warn!(target: TARGET, attachment_id = %attachment_id, "failure for unknown attachment");
        return false;
    };
    attachment.fail(error);
    true
}
