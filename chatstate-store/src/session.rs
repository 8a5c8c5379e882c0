//! The single writer around the store.
//!
//! A [`Session`] owns the [`ChatState`] exclusively and is the only thing
//! that reduces events into it. Producers on other tasks hand raw events
//! over through a bounded queue (see [`Session::event_queue`]); readers
//! watch the revision and read projections through [`Session::state`].

use chatstate_core::{ConversationId, Result, StoreEvent, StoreSettings};
use chatstate_ui::{adapt, RawEvent};
use futures::{Stream, StreamExt};
use serde_json::Value;
use tokio::sync::{mpsc, watch};

use crate::reducer::{reduce, ReduceContext};
use crate::state::ChatState;

/// Store plus the context the reducer needs.
#[derive(Debug)]
pub struct Session {
    state: ChatState,
    settings: StoreSettings,
    active_conversation: Option<ConversationId>,
    revision: watch::Sender<u64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::from_state(ChatState::new(), StoreSettings::default())
    }
}

impl Session {
    /// Create an empty session after validating `settings`.
    pub fn new(settings: StoreSettings) -> Result<Self> {
        settings.validate()?;
        Ok(Self::from_state(ChatState::new(), settings))
    }

    /// Wrap an existing store (for instance one restored from a snapshot).
    #[must_use]
    pub fn from_state(state: ChatState, settings: StoreSettings) -> Self {
        let (revision, _) = watch::channel(state.revision());
        Self {
            state,
            settings,
            active_conversation: None,
            revision,
        }
    }

    /// Bounded queue for handing raw events to the writer.
    #[must_use]
    pub fn event_queue(settings: &StoreSettings) -> (mpsc::Sender<RawEvent>, mpsc::Receiver<RawEvent>) {
        mpsc::channel(settings.event_queue_capacity.max(1))
    }

    /// Read access for projections.
    #[must_use]
    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Consume the session, keeping the store.
    #[must_use]
    pub fn into_state(self) -> ChatState {
        self.state
    }

    /// Settings in effect.
    #[must_use]
    pub fn settings(&self) -> &StoreSettings {
        &self.settings
    }

    /// Conversation used for events that do not name one.
    #[must_use]
    pub fn active_conversation(&self) -> Option<&ConversationId> {
        self.active_conversation.as_ref()
    }

    /// Change the conversation used for events that do not name one.
    pub fn set_active_conversation(&mut self, conversation_id: Option<ConversationId>) {
        self.active_conversation = conversation_id;
    }

    /// Receiver that sees the store revision after every effective change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Reduce one store event. Returns `true` if the store changed.
    pub fn apply(&mut self, event: StoreEvent) -> bool {
        if self.settings.adopt_run_conversation {
            if let StoreEvent::RunStarted { conversation_id, .. } = &event {
                self.active_conversation = Some(conversation_id.clone());
            }
        }
        let ctx = ReduceContext::from_settings(&self.settings, self.active_conversation.clone());
        let changed = reduce(&mut self.state, event, &ctx);
        if changed {
            self.revision.send_replace(self.state.revision());
        }
        changed
    }

    /// Adapt and reduce a `(type, payload)` pair. Unknown types and
    /// malformed payloads change nothing.
    pub fn apply_raw(&mut self, event_type: &str, payload: Value) -> bool {
        adapt(event_type, payload)
            .into_iter()
            .fold(false, |changed, event| self.apply(event) | changed)
    }

    /// Adapt and reduce a [`RawEvent`].
    pub fn apply_raw_event(&mut self, event: RawEvent) -> bool {
        self.apply_raw(&event.event_type, event.payload)
    }

    /// Drain a stream of raw events in order. Returns how many were read.
    pub async fn consume<S>(&mut self, stream: S) -> usize
    where
        S: Stream<Item = RawEvent>,
    {
        futures::pin_mut!(stream);
        let mut count = 0;
        while let Some(event) = stream.next().await {
            self.apply_raw_event(event);
            count += 1;
        }
        count
    }

    /// Drain the event queue until every sender is dropped. Returns how
    /// many events were read.
    pub async fn run_queue(&mut self, mut queue: mpsc::Receiver<RawEvent>) -> usize {
        let mut count = 0;
        while let Some(event) = queue.recv().await {
            self.apply_raw_event(event);
            count += 1;
        }
        tracing::debug!(target: "chatstate::session", count, "event queue closed");
        count
    }
}
