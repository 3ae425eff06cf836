//! Connection state shared between the worker and its readers.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

// ============================================================================
// ConnectionState
// ============================================================================

/// Progress of socket establishment.
///
/// Moves forward one step per successful connect stage and drops back to
/// [`ConnectionState::Disconnected`] on any socket error or disconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum ConnectionState {
    /// No sockets open.
    #[default]
    Disconnected,
    /// Main socket open; waiting for the immediate port and link code.
    MainSocketConnected,
    /// Immediate socket open; link command sent.
    ImmediateSocketConnected,
    /// Link acknowledged; commands may be sent.
    FullyConnected,
}

impl ConnectionState {
    /// Returns `true` once the link handshake has completed.
    #[inline]
    #[must_use]
    pub const fn is_fully_connected(self) -> bool {
        matches!(self, Self::FullyConnected)
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Disconnected => "disconnected",
            Self::MainSocketConnected => "main socket connected",
            Self::ImmediateSocketConnected => "immediate socket connected",
            Self::FullyConnected => "fully connected",
        };
        f.write_str(name)
    }
}

// ============================================================================
// SharedState
// ============================================================================

#[derive(Debug, Default)]
struct Status {
    state: ConnectionState,
    /// Why the current connection attempt failed, if it has.
    failure: Option<String>,
}

/// Outcome of waiting for the link handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LinkWait {
    /// Fully connected.
    Linked,
    /// The attempt failed with this socket error.
    Failed(String),
    /// Still connecting when the wait ran out; holds the last state.
    TimedOut(ConnectionState),
}

/// Process-wide connection state: written by the worker only, read by anyone.
#[derive(Debug, Default)]
pub(crate) struct SharedState {
    status: Mutex<Status>,
    changed: Condvar,
}

impl SharedState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[inline]
    pub(crate) fn get(&self) -> ConnectionState {
        self.status.lock().state
    }

    /// Stores `new`; returns `true` if the state actually changed.
    pub(crate) fn set(&self, new: ConnectionState) -> bool {
        let mut status = self.status.lock();
        if status.state == new {
            return false;
        }
        status.state = new;
        self.changed.notify_all();
        true
    }

    /// Records a socket error against the current connection attempt.
    pub(crate) fn record_failure(&self, message: &str) {
        self.status.lock().failure = Some(message.to_string());
        self.changed.notify_all();
    }

    /// Forgets any earlier failure before a new attempt starts.
    pub(crate) fn begin_attempt(&self) {
        self.status.lock().failure = None;
    }

    /// Blocks until `done(state)` holds or `timeout` elapses.
    ///
    /// Returns the last observed state and whether `done` was satisfied.
    pub(crate) fn wait_until(
        &self,
        timeout: Duration,
        mut done: impl FnMut(ConnectionState) -> bool,
    ) -> (ConnectionState, bool) {
        let deadline = Instant::now() + timeout;
        let mut status = self.status.lock();
        loop {
            if done(status.state) {
                return (status.state, true);
            }
            if self.changed.wait_until(&mut status, deadline).timed_out() {
                let ok = done(status.state);
                return (status.state, ok);
            }
        }
    }

    /// Blocks until the link is up, the attempt fails, or `timeout` elapses.
    pub(crate) fn wait_for_link(&self, timeout: Duration) -> LinkWait {
        let deadline = Instant::now() + timeout;
        let mut status = self.status.lock();
        loop {
            if status.state.is_fully_connected() {
                return LinkWait::Linked;
            }
            if let Some(message) = &status.failure {
                return LinkWait::Failed(message.clone());
            }
            if self.changed.wait_until(&mut status, deadline).timed_out() {
                return match (&status.failure, status.state) {
                    (_, ConnectionState::FullyConnected) => LinkWait::Linked,
                    (Some(message), _) => LinkWait::Failed(message.clone()),
                    (None, state) => LinkWait::TimedOut(state),
                };
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_states_are_ordered() {
        assert!(ConnectionState::Disconnected < ConnectionState::MainSocketConnected);
        assert!(ConnectionState::ImmediateSocketConnected < ConnectionState::FullyConnected);
        assert!(ConnectionState::FullyConnected.is_fully_connected());
    }

    #[test]
    fn test_set_reports_changes_only() {
        let shared = SharedState::new();
        assert!(!shared.set(ConnectionState::Disconnected));
        assert!(shared.set(ConnectionState::MainSocketConnected));
        assert_eq!(shared.get(), ConnectionState::MainSocketConnected);
    }

    #[test]
    fn test_wait_until_wakes_on_change() {
        let shared = Arc::new(SharedState::new());
        let writer = Arc::clone(&shared);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.set(ConnectionState::FullyConnected);
        });

        let (state, ok) = shared.wait_until(Duration::from_secs(5), |s| s.is_fully_connected());
        assert!(ok);
        assert_eq!(state, ConnectionState::FullyConnected);
        handle.join().expect("writer thread");
    }

    #[test]
    fn test_wait_until_times_out() {
        let shared = SharedState::new();
        let started = Instant::now();
        let (state, ok) = shared.wait_until(Duration::from_millis(30), |s| s.is_fully_connected());
        assert!(!ok);
        assert_eq!(state, ConnectionState::Disconnected);
        assert!(started.elapsed() >= Duration::from_millis(30));
    }

    #[test]
    fn test_wait_for_link_returns_failure_early() {
        let shared = Arc::new(SharedState::new());
        shared.begin_attempt();
        let writer = Arc::clone(&shared);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.record_failure("connection refused");
        });

        let started = Instant::now();
        let outcome = shared.wait_for_link(Duration::from_secs(5));
        assert_eq!(outcome, LinkWait::Failed("connection refused".to_string()));
        assert!(started.elapsed() < Duration::from_secs(2));
        handle.join().expect("writer thread");
    }

    #[test]
    fn test_begin_attempt_forgets_old_failure() {
        let shared = SharedState::new();
        shared.record_failure("old");
        shared.begin_attempt();
        assert_eq!(
            shared.wait_for_link(Duration::from_millis(10)),
            LinkWait::TimedOut(ConnectionState::Disconnected)
        );
    }
}
