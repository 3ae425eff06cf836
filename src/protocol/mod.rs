//! Whisker wire protocol.
//!
//! Pure text framing: no state, no I/O. The transport layer moves the lines
//! produced and consumed here.
//!
//! # Protocol Overview
//!
//! | Message | Direction | Socket |
//! |---------|-----------|--------|
//! | Command | Client → Server | main or immediate |
//! | Reply | Server → Client | immediate |
//! | Event, KeyEvent, ClientMessage | Server → Client | main |
//! | Warning, SyntaxError, Error, PingAcknowledged | Server → Client | main |
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `command` | Command line building and quoting |
//! | `constants` | Command tokens, flags and markers |
//! | `message` | Inbound decoding into typed messages |
//! | `types` | Typed command options and geometry |

// ============================================================================
// Submodules
// ============================================================================

/// Command line building and quoting.
pub mod command;

/// Command tokens, flags and message markers.
pub mod constants;

/// Inbound message decoding.
pub mod message;

/// Typed options and geometry.
pub mod types;

// ============================================================================
// Re-exports
// ============================================================================

pub use command::{CommandLine, OutboundCommand, Socket, quote, quote_if_needed, split_args};
pub use message::{
    Handshake, InboundMessage, MessageKind, Reply, decode_main, decode_reply, parse_handshake,
};
pub use types::{
    Brush, Colour, DisplayCreationOptions, DisplayObject, DocEventType, KeyEventType,
    LineDirection, LineEventType, LogOptions, Pen, PenStyle, Point, Rect, ResetState,
    SafetyState, Size, ToneType, on_val,
};
