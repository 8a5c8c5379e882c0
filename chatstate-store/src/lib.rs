//! # chatstate-store
//!
//! The normalized conversation store and the reducer that drives it.
//!
//! - **[`ChatState`]**: keyed conversations, messages and attachments, the
//!   per-conversation message index, and the ephemeral streaming tables
//! - **[`reduce`]**: applies one [`StoreEvent`](chatstate_core::StoreEvent)
//!   in place and reports whether anything changed
//! - **Snapshots & deltas**: [`ChatState::to_snapshot`],
//!   [`ChatState::from_snapshot`] and transactional [`apply_patch`]
//! - **Projections**: ordered message lists, streaming flags, live text and
//!   pending tool calls
//! - **[`Session`]**: the single writer, fed from streams or a bounded queue
//! - **[`ChatClient`]**: outbound intents over an [`IntentTransport`]
//!
//! ## Example
//!
//! ```rust
//! use chatstate_core::{Role, StoreEvent};
//! use chatstate_store::{reduce, ChatState, ReduceContext};
//!
//! let mut state = ChatState::new();
//! let ctx = ReduceContext::new().with_conversation("c1");
//!
//! reduce(&mut state, StoreEvent::message_started("m1", Role::Assistant), &ctx);
//! reduce(&mut state, StoreEvent::message_content("m1", "Hel"), &ctx);
//! reduce(&mut state, StoreEvent::message_content("m1", "lo"), &ctx);
//! reduce(&mut state, StoreEvent::message_ended("m1"), &ctx);
//!
//! assert_eq!(state.message(&"m1".into()).unwrap().content, "Hello");
//! assert!(!state.is_streaming(&"c1".into()));
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![deny(unsafe_code)]

pub mod client;
pub mod patch;
pub mod projections;
pub mod reducer;
pub mod session;
pub mod snapshot;
pub mod state;

pub use client::{
    AttachmentRegistration, ChatClient, Intent, IntentTransport, RecordingTransport, SendReceipt,
};
pub use patch::apply_patch;
pub use projections::{PendingToolCall, ToolCallPhase};
pub use reducer::{reduce, ReduceContext};
pub use session::Session;
pub use state::ChatState;
