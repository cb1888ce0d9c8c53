//! Transport
//!
//! The bidirectional event channel to the server. The runtime only emits;
//! inbound traffic is handed to [`Session::handle_transport_event`](crate::Session::handle_transport_event)
//! by whoever owns the connection.

use serde::Serialize;
use serde_json::Value;

use crate::TransportError;

/// Event names on the channel
pub mod events {
    /// Client → server: component id, acked with its custom listeners
    pub const INIT: &str = "meld-init";
    /// Client → server: an action batch
    pub const MESSAGE: &str = "meld-message";
    /// Server → client: response to a batch
    pub const RESPONSE: &str = "meld-response";
    /// Server → client: custom in-page event
    pub const EVENT: &str = "meld-event";
}

/// Outbound half of the channel. Emits are best-effort.
pub trait Transport {
    fn emit(&mut self, event: &str, payload: Value) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn emit(&mut self, event: &str, payload: Value) -> Result<(), TransportError> {
        (**self).emit(event, payload)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn emit(&mut self, event: &str, payload: Value) -> Result<(), TransportError> {
        (**self).emit(event, payload)
    }
}

/// Encode `payload` and emit it
pub fn emit_json<T: Transport + ?Sized, S: Serialize>(
    transport: &mut T,
    event: &str,
    payload: &S,
) -> Result<(), TransportError> {
    let value = serde_json::to_value(payload).map_err(|source| TransportError::Encode {
        event: event.to_string(),
        source,
    })?;
    transport.emit(event, value)
}

/// Transport that keeps every emit in memory
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<(String, Value)>,
    closed: bool,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payloads emitted under `event`, oldest first
    pub fn payloads<'a>(&'a self, event: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.sent.iter().filter(move |(e, _)| e == event).map(|(_, p)| p)
    }

    /// Drain everything recorded so far
    pub fn take(&mut self) -> Vec<(String, Value)> {
        std::mem::take(&mut self.sent)
    }

    /// Make further emits fail
    pub fn close(&mut self) {
        self.closed = true;
    }
}

impl Transport for RecordingTransport {
    fn emit(&mut self, event: &str, payload: Value) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        tracing::trace!("emit {}", event);
        self.sent.push((event.to_string(), payload));
        Ok(())
    }
}
