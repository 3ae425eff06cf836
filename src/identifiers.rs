//! Type-safe identifiers.
//!
//! Newtype wrappers prevent mixing a callback ID with a command sequence
//! number at compile time.
//!
//! | Type | Identifies |
//! |------|------------|
//! | [`CallbackId`] | A registered callback definition |
//! | [`CommandSeq`] | An immediate command awaiting its reply |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

// ============================================================================
// CallbackId
// ============================================================================

/// Identifier of a registered callback definition.
///
/// Returned by every registration call and accepted by removal calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CallbackId(u64);

impl CallbackId {
    /// Returns the raw numeric value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CallbackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cb#{}", self.0)
    }
}

// ============================================================================
// CommandSeq
// ============================================================================

/// Sequence number correlating an awaited immediate command with its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandSeq(u64);

impl CommandSeq {
    /// Returns the raw numeric value.
    #[inline]
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CommandSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// IdGenerator
// ============================================================================

/// Monotonic generator for the identifiers above.
///
/// Each owner keeps its own generator; values start at 1.
#[derive(Debug, Default)]
pub(crate) struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    /// Creates a generator whose first value is 1.
    #[inline]
    pub(crate) const fn new() -> Self {
        Self {
            last: AtomicU64::new(0),
        }
    }

    #[inline]
    fn next_raw(&self) -> u64 {
        self.last.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Returns the next callback ID.
    #[inline]
    pub(crate) fn next_callback(&self) -> CallbackId {
        CallbackId(self.next_raw())
    }

    /// Returns the next command sequence number.
    #[inline]
    pub(crate) fn next_seq(&self) -> CommandSeq {
        CommandSeq(self.next_raw())
    }

    /// Returns the next raw counter value.
    #[inline]
    pub(crate) fn next_u64(&self) -> u64 {
        self.next_raw()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_is_monotonic() {
        let ids = IdGenerator::new();
        let a = ids.next_callback();
        let b = ids.next_callback();
        assert_eq!(a.as_u64(), 1);
        assert!(b > a);
    }

    #[test]
    fn test_display() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_callback().to_string(), "cb#1");
        assert_eq!(ids.next_seq().to_string(), "#2");
    }
}
