//! Notifications raised to the application.

use std::sync::Arc;

use crate::protocol::{InboundMessage, MessageKind};
use crate::transport::ConnectionState;

// ============================================================================
// Notification
// ============================================================================

/// Something the application may want to react to.
///
/// Delivered on the notification thread, in arrival order.
#[derive(Debug, Clone)]
pub enum Notification {
    /// A server event not swallowed by a callback.
    Event(InboundMessage),
    /// A keyboard event.
    KeyEvent(InboundMessage),
    /// A message from another client.
    ClientMessage(InboundMessage),
    /// A server warning.
    Warning(InboundMessage),
    /// A server syntax error.
    SyntaxError(InboundMessage),
    /// A server error or an undecodable line.
    Error(InboundMessage),
    /// A ping acknowledgement.
    PingAck(InboundMessage),
    /// The connection state moved.
    ConnectionStateChanged(ConnectionState),
    /// A socket failed; the connection is down until reconnected.
    SocketError(String),
}

/// Handler for notifications.
pub type NotificationHandler = Arc<dyn Fn(Notification) + Send + Sync>;

impl Notification {
    /// Wraps a main-socket message in the matching variant.
    ///
    /// Immediate replies never reach the main socket; if one somehow does it
    /// is reported as an error.
    #[must_use]
    pub fn from_message(message: InboundMessage) -> Self {
        match message.kind {
            MessageKind::Event { .. } => Self::Event(message),
            MessageKind::KeyEvent { .. } => Self::KeyEvent(message),
            MessageKind::ClientMessage { .. } => Self::ClientMessage(message),
            MessageKind::Warning(_) => Self::Warning(message),
            MessageKind::SyntaxError(_) => Self::SyntaxError(message),
            MessageKind::Error(_) | MessageKind::ImmediateReply(_) => Self::Error(message),
            MessageKind::PingAck => Self::PingAck(message),
        }
    }

    /// The message carried, if any.
    #[must_use]
    pub fn message(&self) -> Option<&InboundMessage> {
        match self {
            Self::Event(m)
            | Self::KeyEvent(m)
            | Self::ClientMessage(m)
            | Self::Warning(m)
            | Self::SyntaxError(m)
            | Self::Error(m)
            | Self::PingAck(m) => Some(m),
            Self::ConnectionStateChanged(_) | Self::SocketError(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::decode_main;

    #[test]
    fn test_from_message_routes_by_kind() {
        assert!(matches!(
            Notification::from_message(decode_main("Event: lever")),
            Notification::Event(_)
        ));
        assert!(matches!(
            Notification::from_message(decode_main("KeyEvent: 65 down doc1")),
            Notification::KeyEvent(_)
        ));
        assert!(matches!(
            Notification::from_message(decode_main("Warning: careful")),
            Notification::Warning(_)
        ));
        assert!(matches!(
            Notification::from_message(decode_main("PingAcknowledged")),
            Notification::PingAck(_)
        ));
        assert!(matches!(
            Notification::from_message(decode_main("gibberish")),
            Notification::Error(_)
        ));
    }

    #[test]
    fn test_state_change_has_no_message() {
        let n = Notification::ConnectionStateChanged(ConnectionState::FullyConnected);
        assert!(n.message().is_none());
    }
}
