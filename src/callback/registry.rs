//! Event name to callback dispatch.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::time::Instant;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::identifiers::{CallbackId, IdGenerator};
use crate::protocol::InboundMessage;

use super::definition::{CallbackDefinition, EventCallback, Expiry};

// ============================================================================
// DispatchOutcome
// ============================================================================

/// Result of routing one event through the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchOutcome {
    /// Definitions that matched and were invoked.
    pub n_called: usize,
    /// Whether any invoked definition asked to swallow the event.
    pub swallow: bool,
}

// ============================================================================
// CallbackSummary
// ============================================================================

/// Snapshot of one live definition, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallbackSummary {
    /// Registry-assigned ID.
    pub id: CallbackId,
    /// Event name the callback listens for.
    pub event: String,
    /// Name given at registration.
    pub name: String,
    /// Expiry policy.
    pub expiry: Expiry,
    /// Times the callback has fired.
    pub n_calls: u32,
    /// Whether a call hides the event from the application.
    pub swallow_event: bool,
}

impl fmt::Display for CallbackSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} event={} name={} expiry=({}) calls={} swallow={}",
            self.id, self.event, self.name, self.expiry, self.n_calls, self.swallow_event
        )
    }
}

// ============================================================================
// CallbackRegistry
// ============================================================================

/// Thread-safe map from event names to callback definitions.
///
/// Callbacks run outside the registry lock, so they may add or remove
/// definitions (their own included). Such changes apply from the next
/// dispatch.
pub struct CallbackRegistry {
    definitions: Mutex<FxHashMap<String, Vec<CallbackDefinition>>>,
    ids: IdGenerator,
}

impl Default for CallbackRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CallbackRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallbackRegistry")
            .field("len", &self.len())
            .finish()
    }
}

impl CallbackRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            definitions: Mutex::new(FxHashMap::default()),
            ids: IdGenerator::new(),
        }
    }

    /// Registers `callback` for `event`.
    pub fn add<F>(
        &self,
        event: impl Into<String>,
        name: impl Into<String>,
        callback: F,
        expiry: Expiry,
        swallow_event: bool,
    ) -> CallbackId
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        self.add_arc(event, name, std::sync::Arc::new(callback), expiry, swallow_event)
    }

    pub(crate) fn add_arc(
        &self,
        event: impl Into<String>,
        name: impl Into<String>,
        callback: EventCallback,
        expiry: Expiry,
        swallow_event: bool,
    ) -> CallbackId {
        let id = self.ids.next_callback();
        let definition =
            CallbackDefinition::new(id, event, name, callback, expiry, swallow_event);
        debug!(%id, event = %definition.event(), expiry = %expiry, "Callback registered");
        self.definitions
            .lock()
            .entry(definition.event().to_string())
            .or_default()
            .push(definition);
        id
    }

    /// Registers a one-shot callback.
    pub fn add_single<F>(
        &self,
        event: impl Into<String>,
        name: impl Into<String>,
        callback: F,
        swallow_event: bool,
    ) -> CallbackId
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        self.add(event, name, callback, Expiry::ONCE, swallow_event)
    }

    /// Registers a callback that lives until removed.
    pub fn add_persistent<F>(
        &self,
        event: impl Into<String>,
        name: impl Into<String>,
        callback: F,
        swallow_event: bool,
    ) -> CallbackId
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        self.add(event, name, callback, Expiry::Infinite, swallow_event)
    }

    /// Removes definitions for `event`: all of them, or just `id`.
    ///
    /// Returns the number removed.
    pub fn remove(&self, event: &str, id: Option<CallbackId>) -> usize {
        let mut definitions = self.definitions.lock();
        let Some(list) = definitions.get_mut(event) else {
            return 0;
        };

        let before = list.len();
        match id {
            Some(id) => list.retain(|d| d.id() != id),
            None => list.clear(),
        }
        let removed = before - list.len();
        if list.is_empty() {
            definitions.remove(event);
        }
        if removed > 0 {
            debug!(event, removed, "Callbacks removed");
        }
        removed
    }

    /// Removes the definition with `id`, whatever its event.
    pub fn remove_id(&self, id: CallbackId) -> bool {
        let mut definitions = self.definitions.lock();
        let mut found = false;
        definitions.retain(|_, list| {
            let before = list.len();
            list.retain(|d| d.id() != id);
            found |= list.len() != before;
            !list.is_empty()
        });
        found
    }

    /// Removes every definition.
    pub fn clear(&self) {
        let mut definitions = self.definitions.lock();
        let n: usize = definitions.values().map(Vec::len).sum();
        definitions.clear();
        debug!(removed = n, "All callbacks cleared");
    }

    /// Number of live definitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.definitions.lock().values().map(Vec::len).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.lock().is_empty()
    }

    /// Returns `true` if anything listens for `event`.
    #[must_use]
    pub fn contains(&self, event: &str) -> bool {
        self.definitions.lock().contains_key(event)
    }

    /// Describes every live definition, ordered by ID.
    #[must_use]
    pub fn summaries(&self) -> Vec<CallbackSummary> {
        let definitions = self.definitions.lock();
        let mut out: Vec<CallbackSummary> = definitions
            .values()
            .flatten()
            .map(|d| CallbackSummary {
                id: d.id(),
                event: d.event().to_string(),
                name: d.name().to_string(),
                expiry: d.expiry(),
                n_calls: d.n_calls(),
                swallow_event: d.swallow_event(),
            })
            .collect();
        out.sort_by_key(|s| s.id);
        out
    }

    /// Routes `event` to its live definitions.
    ///
    /// Definitions already past their limits are dropped without being
    /// called. The rest have their counters advanced, expire if their limits
    /// are now met, and are then invoked in registration order.
    pub fn process_event(&self, event: &str, message: &InboundMessage) -> DispatchOutcome {
        let now = Instant::now();

        let to_call: Vec<(EventCallback, bool)> = {
            let mut definitions = self.definitions.lock();
            let Some(list) = definitions.get_mut(event) else {
                return DispatchOutcome::default();
            };

            list.retain(|d| {
                let expired = d.has_expired(now);
                if expired {
                    debug!(id = %d.id(), event, "Dropping expired callback unfired");
                }
                !expired
            });

            let calls = list
                .iter_mut()
                .map(|d| {
                    d.record_call();
                    (d.callback(), d.swallow_event())
                })
                .collect();

            list.retain(|d| !d.has_expired(now));
            if list.is_empty() {
                definitions.remove(event);
            }
            calls
        };

        let outcome = DispatchOutcome {
            n_called: to_call.len(),
            swallow: to_call.iter().any(|(_, swallow)| *swallow),
        };

        for (callback, _) in to_call {
            callback(message);
        }

        trace!(event, n_called = outcome.n_called, swallow = outcome.swallow, "Event dispatched");
        outcome
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    use crate::protocol::decode_main;

    fn counter() -> (Arc<AtomicUsize>, impl Fn(&InboundMessage) + Send + Sync + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move |_: &InboundMessage| {
            inner.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_one_shot_fires_exactly_once() {
        let registry = CallbackRegistry::new();
        let (count, callback) = counter();
        registry.add_single("X", "once", callback, false);

        let msg = decode_main("Event: X");
        let first = registry.process_event("X", &msg);
        let second = registry.process_event("X", &msg);

        assert_eq!(first.n_called, 1);
        assert_eq!(second.n_called, 0);
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(!registry.contains("X"));
    }

    #[test]
    fn test_counted_definition_expires_after_target() {
        let registry = CallbackRegistry::new();
        let (count, callback) = counter();
        registry.add("tick", "three", callback, Expiry::Count(3), false);

        let msg = decode_main("Event: tick");
        for _ in 0..5 {
            registry.process_event("tick", &msg);
        }
        assert_eq!(count.load(Ordering::SeqCst), 3);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_late_time_definition_never_fires() {
        let registry = CallbackRegistry::new();
        let (count, callback) = counter();
        registry.add("late", "short", callback, Expiry::Time(Duration::from_millis(10)), false);

        thread::sleep(Duration::from_millis(30));
        let outcome = registry.process_event("late", &decode_main("Event: late"));

        assert_eq!(outcome.n_called, 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!registry.contains("late"));
    }

    #[test]
    fn test_zero_count_definition_is_pruned() {
        let registry = CallbackRegistry::new();
        let (count, callback) = counter();
        registry.add("bad", "broken", callback, Expiry::Count(0), false);

        let outcome = registry.process_event("bad", &decode_main("Event: bad"));
        assert_eq!(outcome.n_called, 0);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_swallow_reported_when_any_definition_swallows() {
        let registry = CallbackRegistry::new();
        registry.add_persistent("X", "quiet", |_| {}, false);
        registry.add_persistent("X", "greedy", |_| {}, true);

        let outcome = registry.process_event("X", &decode_main("Event: X"));
        assert_eq!(outcome, DispatchOutcome { n_called: 2, swallow: true });
    }

    #[test]
    fn test_unmatched_event_calls_nothing() {
        let registry = CallbackRegistry::new();
        registry.add_persistent("X", "x", |_| {}, true);
        let outcome = registry.process_event("Y", &decode_main("Event: Y"));
        assert_eq!(outcome, DispatchOutcome::default());
    }

    #[test]
    fn test_callback_can_register_during_dispatch() {
        let registry = Arc::new(CallbackRegistry::new());
        let (count, inner_callback) = counter();
        let inner_callback = Arc::new(inner_callback);

        let reg = Arc::clone(&registry);
        registry.add_single(
            "X",
            "chain",
            move |_| {
                let cb = Arc::clone(&inner_callback);
                reg.add_single("X", "chained", move |m| cb(m), false);
            },
            false,
        );

        let msg = decode_main("Event: X");
        assert_eq!(registry.process_event("X", &msg).n_called, 1);
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(registry.process_event("X", &msg).n_called, 1);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_callback_can_remove_itself_during_dispatch() {
        let registry = Arc::new(CallbackRegistry::new());
        let reg = Arc::clone(&registry);
        registry.add_persistent("X", "self-removing", move |_| {
            reg.remove("X", None);
        }, false);

        let msg = decode_main("Event: X");
        assert_eq!(registry.process_event("X", &msg).n_called, 1);
        assert!(registry.is_empty());
        assert_eq!(registry.process_event("X", &msg).n_called, 0);
    }

    #[test]
    fn test_remove_by_id_leaves_others() {
        let registry = CallbackRegistry::new();
        let a = registry.add_persistent("X", "a", |_| {}, false);
        let b = registry.add_persistent("X", "b", |_| {}, false);

        assert_eq!(registry.remove("X", Some(a)), 1);
        assert_eq!(registry.len(), 1);
        assert!(registry.remove_id(b));
        assert!(!registry.remove_id(b));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_summaries_are_ordered_by_id() {
        let registry = CallbackRegistry::new();
        registry.add_persistent("b", "second", |_| {}, false);
        registry.add_single("a", "first", |_| {}, true);

        let summaries = registry.summaries();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].id < summaries[1].id);
        assert_eq!(summaries[1].expiry, Expiry::ONCE);

        registry.clear();
        assert!(registry.summaries().is_empty());
    }

    #[test]
    fn test_summary_tracks_calls() {
        let registry = CallbackRegistry::new();
        let id = registry.add_persistent("lever", "count_presses", |_| {}, true);
        let msg = decode_main("Event: lever");
        registry.process_event("lever", &msg);
        registry.process_event("lever", &msg);

        let summary = &registry.summaries()[0];
        assert_eq!(summary.id, id);
        assert_eq!(summary.event, "lever");
        assert_eq!(summary.name, "count_presses");
        assert_eq!(summary.n_calls, 2);
        assert!(summary.swallow_event);
    }
}
