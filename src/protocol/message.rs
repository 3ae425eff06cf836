//! Inbound message decoding.
//!
//! Every line the server sends is decoded once into an [`InboundMessage`]
//! whose [`MessageKind`] is then matched exhaustively downstream.
//!
//! Decoding is tolerant: a line that cannot be parsed becomes an
//! [`MessageKind::Error`] message instead of failing, so a bad line can
//! never stop the receive loop.
//!
//! # Main Socket
//!
//! | Line | Kind |
//! |------|------|
//! | `Event: <name> [ts]` | [`MessageKind::Event`] |
//! | `KeyEvent: <key> <down/up> <doc> [ts]` | [`MessageKind::KeyEvent`] |
//! | `ClientMessage: <client> <text> [ts]` | [`MessageKind::ClientMessage`] |
//! | `Warning: <text>` | [`MessageKind::Warning`] |
//! | `SyntaxError: <text>` | [`MessageKind::SyntaxError`] |
//! | `Error: <text>` | [`MessageKind::Error`] |
//! | `PingAcknowledged` | [`MessageKind::PingAck`] |
//!
//! # Immediate Socket
//!
//! Every line is an [`MessageKind::ImmediateReply`] carrying a [`Reply`],
//! unless it is a structured reply with the wrong shape.

// ============================================================================
// Imports
// ============================================================================

use std::sync::LazyLock;
use std::time::Instant;

use regex::Regex;

use super::constants::{
    CLIENT_MESSAGE_PREFIX, CODE_PREFIX, ERROR_PREFIX, EVENT_PREFIX, IMMPORT_PREFIX,
    KEY_EVENT_PREFIX, MSG_AUTHENTICATE_CHALLENGE, MSG_DURATION, MSG_EXTENT, MSG_SIZE,
    MSG_VIDEO_TIME, PING_ACK, REPLY_FAILURE, REPLY_SUCCESS, SYNTAX_ERROR_PREFIX, VAL_DOWN,
    VAL_UP, WARNING_PREFIX,
};
use super::types::{Rect, Size};

// ============================================================================
// Constants
// ============================================================================

/// Trailing server timestamp, present when timestamps are switched on.
static TIMESTAMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*\[(\d+)\]\s*$").expect("timestamp regex is valid")
});

// ============================================================================
// Reply
// ============================================================================

/// A decoded immediate-socket reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Command acknowledged.
    Success,
    /// Command refused, with any reason text the server gave.
    Failure(String),
    /// `MSG_SIZE <w> <h>`.
    Size(Size),
    /// `MSG_EXTENT <l> <r> <t> <b>`.
    Extent(Rect),
    /// `MSG_VIDEO_TIME <ms>`.
    VideoTime(u32),
    /// `MSG_DURATION <ms>`.
    Duration(u32),
    /// `MSG_AUTHENTICATE_CHALLENGE <token>`.
    AuthenticateChallenge(String),
    /// Any other bare value (`on`, a version number, a client number...).
    Value(String),
}

// ============================================================================
// MessageKind
// ============================================================================

/// Classification of an inbound line, decided once at decode time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageKind {
    /// A server event the client subscribed to.
    Event {
        /// Event name.
        event: String,
    },
    /// A keyboard event on a display document.
    KeyEvent {
        /// Virtual key code.
        key: i32,
        /// `true` for key-down, `false` for key-up.
        down: bool,
        /// Document the key was pressed on.
        document: String,
    },
    /// A message from another client.
    ClientMessage {
        /// Sending client number.
        source_client: i32,
        /// Message text.
        text: String,
    },
    /// Server warning.
    Warning(String),
    /// Server syntax error.
    SyntaxError(String),
    /// Server error, undecodable line, or synthesized transport failure.
    Error(String),
    /// Ping acknowledgement.
    PingAck,
    /// Reply to an immediate-socket command.
    ImmediateReply(Reply),
}

// ============================================================================
// InboundMessage
// ============================================================================

/// A line received from the server.
///
/// Immutable once decoded; callback subscribers receive it by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Line text with any server timestamp removed.
    pub message: String,
    /// Decoded classification.
    pub kind: MessageKind,
    /// Local receipt time.
    pub received: Instant,
    /// Server timestamp in ms, when the server sends timestamps.
    pub server_timestamp_ms: Option<u64>,
    /// The command this line replies to (immediate socket only).
    pub causal_command: Option<String>,
}

impl InboundMessage {
    /// Builds a synthesized failure for a command that got no usable reply.
    #[must_use]
    pub fn failure(reason: impl Into<String>, causal_command: Option<String>) -> Self {
        let reason = reason.into();
        Self {
            message: reason.clone(),
            kind: MessageKind::Error(reason),
            received: Instant::now(),
            server_timestamp_ms: None,
            causal_command,
        }
    }

    /// Returns the event name if this is an event.
    #[inline]
    #[must_use]
    pub fn event(&self) -> Option<&str> {
        match &self.kind {
            MessageKind::Event { event } => Some(event),
            _ => None,
        }
    }

    /// Returns the decoded reply if this is an immediate reply.
    #[inline]
    #[must_use]
    pub fn reply(&self) -> Option<&Reply> {
        match &self.kind {
            MessageKind::ImmediateReply(reply) => Some(reply),
            _ => None,
        }
    }

    /// Returns `true` if this is a `Success` acknowledgement.
    #[inline]
    #[must_use]
    pub fn immediate_reply_succeeded(&self) -> bool {
        matches!(self.reply(), Some(Reply::Success))
    }

    /// Returns the reply text, or `""` if this is not an immediate reply.
    #[inline]
    #[must_use]
    pub fn reply_text(&self) -> &str {
        if self.reply().is_some() {
            &self.message
        } else {
            ""
        }
    }

    /// Returns `true` if this message reports a failure of any kind.
    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(
            self.kind,
            MessageKind::Error(_) | MessageKind::SyntaxError(_)
        )
    }
}

// ============================================================================
// Decoding: Main Socket
// ============================================================================

/// Decodes a main-socket line.
#[must_use]
pub fn decode_main(line: &str) -> InboundMessage {
    let (text, server_timestamp_ms) = split_timestamp(line);
    let kind = classify_main(&text);
    InboundMessage {
        message: text,
        kind,
        received: Instant::now(),
        server_timestamp_ms,
        causal_command: None,
    }
}

fn split_timestamp(line: &str) -> (String, Option<u64>) {
    let line = line.trim_end();
    match TIMESTAMP_RE.captures(line) {
        Some(caps) => {
            let timestamp = caps[2].parse::<u64>().ok();
            match timestamp {
                Some(ts) => (caps[1].to_string(), Some(ts)),
                None => (line.to_string(), None),
            }
        }
        None => (line.to_string(), None),
    }
}

fn classify_main(text: &str) -> MessageKind {
    if let Some(rest) = text.strip_prefix(EVENT_PREFIX) {
        let event = rest.trim();
        if event.is_empty() {
            return MessageKind::Error(format!("event without a name: {text}"));
        }
        return MessageKind::Event {
            event: event.to_string(),
        };
    }
    if let Some(rest) = text.strip_prefix(KEY_EVENT_PREFIX) {
        return parse_key_event(rest)
            .unwrap_or_else(|| MessageKind::Error(format!("malformed key event: {text}")));
    }
    if let Some(rest) = text.strip_prefix(CLIENT_MESSAGE_PREFIX) {
        return parse_client_message(rest)
            .unwrap_or_else(|| MessageKind::Error(format!("malformed client message: {text}")));
    }
    if let Some(rest) = text.strip_prefix(WARNING_PREFIX) {
        return MessageKind::Warning(rest.trim().to_string());
    }
    if let Some(rest) = text.strip_prefix(SYNTAX_ERROR_PREFIX) {
        return MessageKind::SyntaxError(rest.trim().to_string());
    }
    if let Some(rest) = text.strip_prefix(ERROR_PREFIX) {
        return MessageKind::Error(rest.trim().to_string());
    }
    if text.trim() == PING_ACK {
        return MessageKind::PingAck;
    }
    MessageKind::Error(format!("unrecognized main-socket message: {text}"))
}

fn parse_key_event(rest: &str) -> Option<MessageKind> {
    let mut parts = rest.split_whitespace();
    let key = parts.next()?.parse::<i32>().ok()?;
    let down = match parts.next()? {
        VAL_DOWN => true,
        VAL_UP => false,
        _ => return None,
    };
    let document = parts.next()?.to_string();
    if parts.next().is_some() {
        return None;
    }
    Some(MessageKind::KeyEvent {
        key,
        down,
        document,
    })
}

fn parse_client_message(rest: &str) -> Option<MessageKind> {
    let rest = rest.trim_start();
    let (client, text) = rest.split_once(' ').unwrap_or((rest, ""));
    let source_client = client.parse::<i32>().ok()?;
    Some(MessageKind::ClientMessage {
        source_client,
        text: text.trim().to_string(),
    })
}

// ============================================================================
// Decoding: Immediate Socket
// ============================================================================

/// Decodes an immediate-socket reply to `causal_command`.
#[must_use]
pub fn decode_reply(line: &str, causal_command: Option<String>) -> InboundMessage {
    let text = line.trim_end().to_string();
    let kind = match parse_reply(&text) {
        Ok(reply) => MessageKind::ImmediateReply(reply),
        Err(reason) => MessageKind::Error(reason),
    };
    InboundMessage {
        message: text,
        kind,
        received: Instant::now(),
        server_timestamp_ms: None,
        causal_command,
    }
}

fn parse_reply(text: &str) -> std::result::Result<Reply, String> {
    let (token, rest) = text.split_once(' ').unwrap_or((text, ""));
    let args: Vec<&str> = rest.split_whitespace().collect();

    match token {
        REPLY_SUCCESS if args.is_empty() => Ok(Reply::Success),
        REPLY_FAILURE => Ok(Reply::Failure(rest.trim().to_string())),
        MSG_SIZE => match args.as_slice() {
            [w, h] => Ok(Reply::Size(Size::new(int(w, text)?, int(h, text)?))),
            _ => Err(malformed(MSG_SIZE, text)),
        },
        MSG_EXTENT => match args.as_slice() {
            [l, r, t, b] => Ok(Reply::Extent(Rect::from_edges(
                int(l, text)?,
                int(r, text)?,
                int(t, text)?,
                int(b, text)?,
            ))),
            _ => Err(malformed(MSG_EXTENT, text)),
        },
        MSG_VIDEO_TIME => match args.as_slice() {
            [t] => Ok(Reply::VideoTime(uint(t, text)?)),
            _ => Err(malformed(MSG_VIDEO_TIME, text)),
        },
        MSG_DURATION => match args.as_slice() {
            [d] => Ok(Reply::Duration(uint(d, text)?)),
            _ => Err(malformed(MSG_DURATION, text)),
        },
        MSG_AUTHENTICATE_CHALLENGE => match args.as_slice() {
            [challenge] => Ok(Reply::AuthenticateChallenge((*challenge).to_string())),
            _ => Err(malformed(MSG_AUTHENTICATE_CHALLENGE, text)),
        },
        _ => Ok(Reply::Value(text.to_string())),
    }
}

fn malformed(token: &str, text: &str) -> String {
    format!("malformed {token} reply: {text}")
}

fn int(s: &str, text: &str) -> std::result::Result<i32, String> {
    s.parse::<i32>()
        .map_err(|_| format!("non-numeric field {s:?} in reply: {text}"))
}

fn uint(s: &str, text: &str) -> std::result::Result<u32, String> {
    s.parse::<u32>()
        .map_err(|_| format!("non-numeric field {s:?} in reply: {text}"))
}

// ============================================================================
// Handshake
// ============================================================================

/// Main-socket greeting lines that set up the immediate socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handshake {
    /// `ImmPort: <port>`: where to open the immediate socket.
    ImmPort(u16),
    /// `Code: <code>`: the link code to send on the immediate socket.
    Code(String),
}

/// Recognises a handshake line; returns `None` for anything else.
#[must_use]
pub fn parse_handshake(line: &str) -> Option<Handshake> {
    let line = line.trim();
    if let Some(rest) = line.strip_prefix(IMMPORT_PREFIX) {
        return rest.trim().parse::<u16>().ok().map(Handshake::ImmPort);
    }
    if let Some(rest) = line.strip_prefix(CODE_PREFIX) {
        let code = rest.trim();
        if !code.is_empty() && !code.contains(char::is_whitespace) {
            return Some(Handshake::Code(code.to_string()));
        }
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
