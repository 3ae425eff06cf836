//! Client-side event subscriptions.
//!
//! Maps server event names to callbacks with one-shot, counted,
//! time-limited or permanent lifetimes.
//!
//! # Expiry
//!
//! | Policy | Expires when |
//! |--------|--------------|
//! | `Infinite` | never |
//! | `Count(n)` | calls ≥ n |
//! | `Time(d)` | now > created + d |
//! | `TimeOrCount` | either limit is reached |
//!
//! # Example
//!
//! ```no_run
//! use whisker_client::callback::{CallbackRegistry, Expiry};
//!
//! let registry = CallbackRegistry::new();
//! registry.add("lever", "count presses", |msg| println!("{}", msg.message), Expiry::Count(10), true);
//! ```

// ============================================================================
// Submodules
// ============================================================================

/// Definitions and expiry policies.
pub mod definition;

/// Registry and dispatch.
pub mod registry;

// ============================================================================
// Re-exports
// ============================================================================

pub use definition::{CallbackDefinition, EventCallback, Expiry};
pub use registry::{CallbackRegistry, CallbackSummary, DispatchOutcome};
