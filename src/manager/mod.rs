//! High-level Whisker client.
//!
//! A [`Manager`] owns one connection worker and one callback registry, and
//! exposes every server command as a blocking method.
//!
//! # Module Structure
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | Manager struct, connection control, send primitives |
//! | `config` | Connection settings |
//! | `notification` | Messages raised to the application |
//! | `meta` | Clock, version, client messaging, authentication |
//! | `log` | Server-side logging |
//! | `timer` | Server timers |
//! | `claim` | Claiming and aliasing devices |
//! | `line` | Digital lines |
//! | `audio` | Sounds |
//! | `display` | Display documents and objects |
//! | `video` | Video objects |
//! | `scheduling` | Delayed calls, event callbacks, line flashing |
//!
//! # Return Conventions
//!
//! Commands never fail with an error once the manager exists. A command
//! returns `false`, an empty string or `None` when the server refuses it,
//! the link is down, or the reply does not arrive within the configured
//! timeout. A reply timeout also drops the link, since later replies could
//! no longer be matched; reconnect to continue.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use whisker_client::{LineDirection, Manager, ReplyMode, ResetState, WhiskerConfig};
//!
//! # fn main() -> whisker_client::Result<()> {
//! let manager = Manager::new(WhiskerConfig::new().with_host("rig-3"))?;
//! manager.connect_and_wait(Duration::from_secs(5))?;
//!
//! manager.claim_line(5, LineDirection::Output, Some("pellet"), ResetState::Off);
//! manager.line_on("pellet", ReplyMode::Wait);
//! manager.send_after_delay(500, "LINE_SET_STATE pellet off", None);
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Submodules
// ============================================================================

mod audio;
mod claim;
mod core;
mod display;
mod line;
mod log;
mod meta;
mod scheduling;
mod timer;
mod video;

/// Connection settings.
pub mod config;

/// Notifications raised to the application.
pub mod notification;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::WhiskerConfig;
pub use core::{Manager, ReplyMode};
pub use notification::{Notification, NotificationHandler};
