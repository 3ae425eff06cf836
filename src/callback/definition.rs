//! Callback definitions and expiry policies.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::identifiers::CallbackId;
use crate::protocol::InboundMessage;

// ============================================================================
// Types
// ============================================================================

/// Function invoked when a subscribed event arrives.
pub type EventCallback = Arc<dyn Fn(&InboundMessage) + Send + Sync>;

// ============================================================================
// Expiry
// ============================================================================

/// When a callback definition stops firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expiry {
    /// Never expires; remove explicitly.
    Infinite,
    /// Expires after this many calls.
    Count(u32),
    /// Expires once this much time has passed since registration.
    Time(Duration),
    /// Expires on whichever limit is reached first.
    TimeOrCount {
        /// Call limit.
        calls: u32,
        /// Time limit.
        lifetime: Duration,
    },
}

impl Expiry {
    /// A one-shot policy.
    pub const ONCE: Self = Self::Count(1);

    fn target_calls(self) -> Option<u32> {
        match self {
            Self::Count(n) | Self::TimeOrCount { calls: n, .. } => Some(n),
            Self::Infinite | Self::Time(_) => None,
        }
    }

    fn lifetime(self) -> Option<Duration> {
        match self {
            Self::Time(d) | Self::TimeOrCount { lifetime: d, .. } => Some(d),
            Self::Infinite | Self::Count(_) => None,
        }
    }
}

impl fmt::Display for Expiry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Infinite => f.write_str("infinite"),
            Self::Count(n) => write!(f, "count {n}"),
            Self::Time(d) => write!(f, "time {}ms", d.as_millis()),
            Self::TimeOrCount { calls, lifetime } => {
                write!(f, "count {calls} or time {}ms", lifetime.as_millis())
            }
        }
    }
}

// ============================================================================
// CallbackDefinition
// ============================================================================

/// A registered subscription to one event name.
#[derive(Clone)]
pub struct CallbackDefinition {
    id: CallbackId,
    event: String,
    name: String,
    callback: EventCallback,
    expiry: Expiry,
    created: Instant,
    expires_at: Option<Instant>,
    swallow_event: bool,
    n_calls: u32,
}

impl CallbackDefinition {
    pub(crate) fn new(
        id: CallbackId,
        event: impl Into<String>,
        name: impl Into<String>,
        callback: EventCallback,
        expiry: Expiry,
        swallow_event: bool,
    ) -> Self {
        let created = Instant::now();
        Self {
            id,
            event: event.into(),
            name: name.into(),
            callback,
            expiry,
            created,
            expires_at: expiry.lifetime().and_then(|d| created.checked_add(d)),
            swallow_event,
            n_calls: 0,
        }
    }

    /// Registry-assigned identifier.
    #[inline]
    #[must_use]
    pub fn id(&self) -> CallbackId {
        self.id
    }

    /// Event name this definition listens for.
    #[inline]
    #[must_use]
    pub fn event(&self) -> &str {
        &self.event
    }

    /// Display name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Expiry policy.
    #[inline]
    #[must_use]
    pub fn expiry(&self) -> Expiry {
        self.expiry
    }

    /// Registration time.
    #[inline]
    #[must_use]
    pub fn created(&self) -> Instant {
        self.created
    }

    /// Whether a matched event should stop here.
    #[inline]
    #[must_use]
    pub fn swallow_event(&self) -> bool {
        self.swallow_event
    }

    /// Calls made so far.
    #[inline]
    #[must_use]
    pub fn n_calls(&self) -> u32 {
        self.n_calls
    }

    /// Returns `true` once the policy's limits are reached at `now`.
    ///
    /// A count limit of zero can never be satisfied and is treated as
    /// already expired.
    #[must_use]
    pub fn has_expired(&self, now: Instant) -> bool {
        let count_done = self
            .expiry
            .target_calls()
            .is_some_and(|target| self.n_calls >= target);
        let time_done = self.expires_at.is_some_and(|deadline| now > deadline);

        match self.expiry {
            Expiry::Infinite => false,
            Expiry::Count(_) => count_done,
            Expiry::Time(_) => time_done,
            Expiry::TimeOrCount { .. } => count_done || time_done,
        }
    }

    pub(crate) fn record_call(&mut self) {
        self.n_calls = self.n_calls.saturating_add(1);
    }

    pub(crate) fn callback(&self) -> EventCallback {
        Arc::clone(&self.callback)
    }
}

impl fmt::Debug for CallbackDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackDefinition")
            .field("id", &self.id)
            .field("event", &self.event)
            .field("name", &self.name)
            .field("expiry", &self.expiry)
            .field("swallow_event", &self.swallow_event)
            .field("n_calls", &self.n_calls)
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Tests
// ============================================================================
