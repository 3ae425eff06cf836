//! TCP transport layer.
//!
//! This module owns the two sockets to the Whisker server and the thread
//! that services them.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    WorkerCommand    ┌─────────────────┐   main   ┌──────────┐
//! │  Manager        │────────────────────►│  Worker thread  │◄────────►│  Whisker │
//! │  (caller)       │◄────────────────────│  (tokio loop)   │◄────────►│  server  │
//! └─────────────────┘  WorkerEvent /      └─────────────────┘ immediate└──────────┘
//!                      ImmediateMailbox
//! ```
//!
//! # Connection Lifecycle
//!
//! 1. `Worker::spawn` - Start the worker thread
//! 2. `WorkerCommand::Connect` - Open the main socket, then the immediate socket
//! 3. `WorkerCommand::Send` - Write commands; replies go to the mailbox
//! 4. `WorkerCommand::Shutdown` - Close everything and stop the thread
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `mailbox` | Single-slot reply handoff |
//! | `state` | Connection state machine |
//! | `worker` | Worker thread and event loop |

// ============================================================================
// Submodules
// ============================================================================

/// Single-slot reply handoff.
pub(crate) mod mailbox;

/// Connection state.
pub mod state;

/// Worker thread and event loop.
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

// ============================================================================
// Re-exports
// ============================================================================

pub use state::ConnectionState;
pub use worker::WorkerEvent;
