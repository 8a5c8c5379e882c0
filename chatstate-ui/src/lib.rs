//! # chatstate-ui
//!
//! Wire protocol adapters for chatstate.
//!
//! Every supported wire format is decoded from a `(type, payload)` pair and
//! translated into [`StoreEvent`](chatstate_core::StoreEvent)s, so the
//! reducer only ever sees one event vocabulary:
//!
//! - **[`ag_ui`]**: the AG-UI event set (fine-grained text and tool-call
//!   streaming, state snapshots and JSON patch deltas)
//! - **[`normalized`]**: the coarse dotted-name lifecycle events
//!   (`message.delta`, `attachment.failed`, ...)
//!
//! # Feature Flags
//!
//! - `ag-ui` (default): Enable the AG-UI adapter
//! - `normalized` (default): Enable the normalized adapter
//! - `full`: Enable all adapters
//!
//! # Example
//!
//! ```rust
//! use chatstate_ui::RawEvent;
//!
//! let raw = RawEvent::from_json_line(r#"{"type":"TEXT_MESSAGE_START","messageId":"m1"}"#)
//!     .unwrap()
//!     .unwrap();
//! let events = raw.into_store_events();
//! assert_eq!(events[0].kind(), "message_started");
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

#[cfg(feature = "ag-ui")]
pub mod ag_ui;

#[cfg(feature = "normalized")]
pub mod normalized;

pub mod envelope;

pub use envelope::{adapt, try_adapt, RawEvent};

#[cfg(feature = "ag-ui")]
pub use ag_ui::{AgUiEvent, EventType};

#[cfg(feature = "normalized")]
pub use normalized::NormalizedEvent;
