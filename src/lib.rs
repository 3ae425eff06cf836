//! Whisker client - control behavioural-research hardware over TCP.
//!
//! This library talks to a Whisker server, which arbitrates digital lines,
//! sound devices and displays between experiment programs.
//!
//! # Architecture
//!
//! The client holds two sockets to the server:
//!
//! - **Main socket**: carries asynchronous events (`Event: ...`) and warnings
//! - **Immediate socket**: carries commands and their synchronous replies
//!
//! Key design principles:
//!
//! - One background worker thread owns both sockets
//! - Callers block on their own reply, never on each other's events
//! - Events run through a callback registry before reaching the application
//! - Commands report failure as `false`, `""` or `None`, never by panicking
//!
//! # Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//! use whisker_client::{LineDirection, LineEventType, Manager, Notification, ReplyMode, ResetState, WhiskerConfig, Result};
//!
//! fn main() -> Result<()> {
//!     let manager = Manager::new(WhiskerConfig::new().with_host("localhost"))?;
//!     manager.set_notification_handler(|n| {
//!         if let Notification::Event(msg) = n {
//!             println!("event: {}", msg.message);
//!         }
//!     });
//!     manager.connect_and_wait(Duration::from_secs(5))?;
//!
//!     manager.claim_line(3, LineDirection::Input, Some("lever"), ResetState::Leave);
//!     manager.line_set_event("lever", "lever_pressed", LineEventType::On, ReplyMode::Wait);
//!     manager.call_on_event("lever_pressed", |_| println!("press"), false);
//!
//!     std::thread::sleep(Duration::from_secs(60));
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`callback`] | Event subscriptions with expiry policies |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`identifiers`] | Type-safe ID wrappers |
//! | [`manager`] | The [`Manager`] and its commands |
//! | [`protocol`] | Wire format: command building, message decoding |
//! | [`transport`] | Sockets and the worker thread (internal) |

// ============================================================================
// Modules
// ============================================================================

/// Client-side event subscriptions.
///
/// Callbacks fire when a named event arrives on the main socket, and expire
/// after a number of calls, a lifetime, or never.
pub mod callback;

/// Error types and result aliases.
///
/// Only construction and connection return [`Result<T>`]; commands use
/// failure values instead.
pub mod error;

/// Type-safe identifiers for callbacks and commands.
pub mod identifiers;

/// High-level client.
///
/// Use [`Manager::new()`] with a [`WhiskerConfig`] to create one.
pub mod manager;

/// Whisker wire protocol.
///
/// Line-oriented text; no I/O.
pub mod protocol;

/// TCP transport layer.
///
/// Internal module owning the sockets and the worker thread.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Manager types
pub use manager::{Manager, Notification, NotificationHandler, ReplyMode, WhiskerConfig};

// Callback types
pub use callback::{CallbackRegistry, CallbackSummary, Expiry};

// Error types
pub use error::{Error, Result};

// Identifier types
pub use identifiers::{CallbackId, CommandSeq};

// Protocol types
pub use protocol::{
    Brush, Colour, DisplayCreationOptions, DisplayObject, DocEventType, InboundMessage,
    KeyEventType, LineDirection, LineEventType, LogOptions, MessageKind, Pen, PenStyle, Point,
    Rect, Reply, ResetState, SafetyState, Size, ToneType,
};

// Transport types
pub use transport::ConnectionState;
