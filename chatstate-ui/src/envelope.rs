//! Raw `(type, payload)` envelopes and adapter dispatch.
//!
//! Transports hand over events as a type name plus a JSON payload. The
//! functions here route the pair to whichever wire format knows the name
//! and return the translated [`StoreEvent`]s.

use chatstate_core::{ChatStateError, Result, StoreEvent};
use serde_json::{Map, Value};

/// An undecoded event as delivered by a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEvent {
    /// Wire type name (`TEXT_MESSAGE_CONTENT`, `message.delta`, ...).
    pub event_type: String,
    /// Payload object, without the `type` key.
    pub payload: Value,
}

impl RawEvent {
    /// Create a raw event.
    pub fn new(event_type: impl Into<String>, payload: Value) -> Self {
        Self {
            event_type: event_type.into(),
            payload,
        }
    }

    /// Parse one NDJSON line or SSE `data:` line holding a flat event
    /// object (`{"type": ..., ...fields}`).
    ///
    /// Blank lines yield `Ok(None)`.
    pub fn from_json_line(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        let line = line.strip_prefix("data:").map_or(line, str::trim_start);
        if line.is_empty() {
            return Ok(None);
        }
        let mut object: Map<String, Value> = serde_json::from_str(line)?;
        let event_type = match object.remove("type") {
            Some(Value::String(t)) => t,
            _ => return Err(ChatStateError::malformed("<envelope>", "missing string `type`")),
        };
        Ok(Some(Self::new(event_type, Value::Object(object))))
    }

    /// Encode as a flat NDJSON line (no trailing newline).
    #[must_use]
    pub fn to_json_line(&self) -> String {
        let mut object = match &self.payload {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        object.insert("type".to_string(), Value::String(self.event_type.clone()));
        Value::Object(object).to_string()
    }

    /// Translate this event, see [`adapt`].
    #[must_use]
    pub fn into_store_events(self) -> Vec<StoreEvent> {
        adapt(&self.event_type, self.payload)
    }
}

/// Decode and translate a `(type, payload)` pair.
///
/// `Ok(None)` means no enabled wire format knows `event_type`. A known
/// type with an undecodable payload is an error.
#[cfg_attr(not(any(feature = "ag-ui", feature = "normalized")), allow(unused_variables))]
pub fn try_adapt(event_type: &str, payload: Value) -> Result<Option<Vec<StoreEvent>>> {
    #[cfg(feature = "ag-ui")]
    {
        if crate::ag_ui::EventType::parse(event_type).is_some() {
            return crate::ag_ui::AgUiEvent::decode(event_type, payload)
                .map(|e| e.map(crate::ag_ui::AgUiEvent::into_store_events));
        }
    }

    #[cfg(feature = "normalized")]
    {
        if crate::normalized::is_normalized_type(event_type) {
            return crate::normalized::NormalizedEvent::decode(event_type, payload)
                .map(|e| e.map(crate::normalized::NormalizedEvent::into_store_events));
        }
    }

    Ok(None)
}

/// Decode and translate a `(type, payload)` pair, degrading instead of
/// failing.
///
/// Unknown types are ignored for forward compatibility; malformed payloads
/// are logged and dropped. Either way the result is empty.
#[must_use]
pub fn adapt(event_type: &str, payload: Value) -> Vec<StoreEvent> {
    match try_adapt(event_type, payload) {
        Ok(Some(events)) => events,
        Ok(None) => {
            tracing::trace!(target: "chatstate::adapter", event_type, "ignoring unknown event type");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(target: "chatstate::adapter", event_type, error = %e, "dropping malformed event");
            Vec::new()
        }
    }
}
