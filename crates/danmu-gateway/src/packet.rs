//! Decoded protocol packets handed over by the transport layer.

use bytes::Bytes;
use std::borrow::Cow;

/// Wire operation codes.
mod op {
    pub const HEARTBEAT_RESPONSE: u32 = 3;
    pub const NOTIFICATION: u32 = 5;
    pub const ROOM_ENTER_RESPONSE: u32 = 8;
}

/// Packet operation, decoded from the wire operation code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Reply to a client heartbeat; carries the room popularity counter.
    HeartbeatResponse,
    /// Server notification with a JSON body tagged by a `cmd` field.
    Notification,
    /// Acknowledgement of the room-enter (auth) packet.
    RoomEnterResponse,
    /// Any operation code this client does not model.
    Unknown(u32),
}

impl From<u32> for Operation {
    fn from(code: u32) -> Self {
        match code {
            op::HEARTBEAT_RESPONSE => Self::HeartbeatResponse,
            op::NOTIFICATION => Self::Notification,
            op::ROOM_ENTER_RESPONSE => Self::RoomEnterResponse,
            other => Self::Unknown(other),
        }
    }
}

impl Operation {
    /// The wire code for this operation.
    pub fn code(&self) -> u32 {
        match self {
            Self::HeartbeatResponse => op::HEARTBEAT_RESPONSE,
            Self::Notification => op::NOTIFICATION,
            Self::RoomEnterResponse => op::ROOM_ENTER_RESPONSE,
            Self::Unknown(code) => *code,
        }
    }
}

/// A fully decoded protocol packet.
///
/// Framing, decompression and keepalive belong to the transport layer; by the time a
/// packet reaches the gateway its body is plain text/bytes.
#[derive(Debug, Clone)]
pub struct Packet {
    pub protocol_version: u16,
    pub operation: Operation,
    pub body: Bytes,
}

impl Packet {
    /// Create a packet from already-decoded parts.
    pub fn new(protocol_version: u16, operation: Operation, body: impl Into<Bytes>) -> Self {
        Self {
            protocol_version,
            operation,
            body: body.into(),
        }
    }

    /// Convenience constructor for a notification packet.
    pub fn notification(body: impl Into<Bytes>) -> Self {
        Self::new(0, Operation::Notification, body)
    }

    /// The body as text. Notification bodies are JSON; invalid UTF-8 is replaced
    /// lossily rather than rejected.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_from_wire_code() {
        assert_eq!(Operation::from(3), Operation::HeartbeatResponse);
        assert_eq!(Operation::from(5), Operation::Notification);
        assert_eq!(Operation::from(8), Operation::RoomEnterResponse);
        assert_eq!(Operation::from(42), Operation::Unknown(42));
    }

    #[test]
    fn test_operation_code_round_trip() {
        for code in [3u32, 5, 8, 42] {
            assert_eq!(Operation::from(code).code(), code);
        }
    }

    #[test]
    fn test_body_text() {
        let packet = Packet::notification(r#"{"cmd":"LIVE"}"#);
        assert_eq!(packet.body_text(), r#"{"cmd":"LIVE"}"#);
        assert_eq!(packet.operation, Operation::Notification);
    }
}
