//! # chatstate-streaming
//!
//! Ephemeral accumulation state for chatstate.
//!
//! Streamed protocol data never lands in the entity store piecemeal. It is
//! absorbed here first and finalized into the store by the reducer:
//!
//! - **[`StreamingBuffers`]**: per-message text buffers for content fragments
//! - **[`ToolCallCorrelator`]**: per-tool-call records absorbing the tool name
//!   and streamed argument fragments until the end event
//!
//! Neither table is part of a snapshot; both are discarded when a snapshot
//! replaces the store.
//!
//! ## Example
//!
//! ```rust
//! use chatstate_streaming::{ToolCallCorrelator, ToolCallInProgress};
//!
//! let mut correlator = ToolCallCorrelator::new();
//! correlator.start(ToolCallInProgress::new("tc1", "search", "m1")).unwrap();
//! correlator.append_args(&"tc1".into(), r#"{"q":"rust"}"#).unwrap();
//!
//! let call = correlator.finish(&"tc1".into()).unwrap().into_tool_call();
//! assert_eq!(call.name, "search");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod buffers;
pub mod error;
pub mod tool_calls;

pub use buffers::StreamingBuffers;
pub use error::{StreamError, StreamResult};
pub use tool_calls::{ToolCallCorrelator, ToolCallInProgress};
