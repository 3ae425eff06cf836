//! Client-side scheduling built on server timers and the callback registry.
//!
//! Generated event names start with the configured sysevent prefix, so the
//! application never sees them even when no callback matches.

// ============================================================================
// Imports
// ============================================================================

use std::sync::{Arc, Weak};

use tracing::debug;

use crate::callback::CallbackSummary;
use crate::error::{Error, Result};
use crate::identifiers::CallbackId;
use crate::protocol::{InboundMessage, decode_main};
use crate::protocol::constants::EVENT_PREFIX;

use super::core::{Manager, ManagerInner, ReplyMode};

// ============================================================================
// Manager - Sysevents
// ============================================================================

impl Manager {
    /// Generates a unique event name: prefix, counter, then `parts`.
    ///
    /// Whitespace is stripped so the name is a single protocol word.
    pub fn new_sysevent(&self, parts: &[&str]) -> String {
        let n = self.inner.sysevents.next_u64();
        let mut name = format!("{}{n}", self.inner.config.sysevent_prefix);
        for part in parts {
            name.push('_');
            name.extend(part.chars().filter(|c| !c.is_whitespace()));
        }
        name
    }

    /// Runs `event` through the callback registry as if the server had sent
    /// it. Returns `true` if the application need not see it: a callback
    /// swallowed it, or it carries the sysevent prefix.
    pub fn process_backend_event(&self, event: &str) -> bool {
        let message = decode_main(&format!("{EVENT_PREFIX} {event}"));
        self.route_event(event, &message)
    }
}

// ============================================================================
// Manager - Callbacks
// ============================================================================

impl Manager {
    /// Calls `callback` once, `delay_ms` from now, via a server timer.
    ///
    /// Uses `event` as the timer's event name, or a generated one. Returns
    /// `None` (and registers nothing) if the timer could not be set.
    pub fn call_after_delay<F>(
        &self,
        delay_ms: u32,
        callback: F,
        event: Option<&str>,
    ) -> Option<CallbackId>
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        let event = match event {
            Some(e) if !e.is_empty() => e.to_string(),
            _ => self.new_sysevent(&["call"]),
        };

        let id = self
            .inner
            .callbacks
            .add_single(event.as_str(), "call_after_delay", callback, false);
        if self.timer_set_event(&event, delay_ms, 0, ReplyMode::Wait) {
            Some(id)
        } else {
            self.inner.callbacks.remove_id(id);
            None
        }
    }

    /// Sends `command` on the immediate socket `delay_ms` from now.
    pub fn send_after_delay(
        &self,
        delay_ms: u32,
        command: &str,
        event: Option<&str>,
    ) -> Option<CallbackId> {
        let event = match event {
            Some(e) if !e.is_empty() => e.to_string(),
            _ => self.new_sysevent(&["send", command]),
        };
        let weak = Arc::downgrade(&self.inner);
        let command = command.to_string();
        self.call_after_delay(
            delay_ms,
            move |_| {
                if let Some(manager) = upgrade(&weak) {
                    manager.send_immediate_get_reply(&command);
                }
            },
            Some(&event),
        )
    }

    /// Calls `callback` on every `event` until cleared.
    pub fn call_on_event<F>(&self, event: &str, callback: F, swallow_event: bool) -> CallbackId
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        self.inner
            .callbacks
            .add_persistent(event, "call_on_event", callback, swallow_event)
    }

    /// Removes the callbacks for `event`: all of them, or just `id`.
    pub fn clear_event_callback(&self, event: &str, id: Option<CallbackId>) -> usize {
        self.inner.callbacks.remove(event, id)
    }

    /// Removes every callback, including pending delayed calls.
    pub fn clear_all_callbacks(&self) {
        self.inner.callbacks.clear();
    }

    /// Logs every live callback and returns the same list.
    pub fn debug_callbacks(&self) -> Vec<CallbackSummary> {
        let summaries = self.inner.callbacks.summaries();
        debug!(count = summaries.len(), "Live callbacks");
        for summary in &summaries {
            debug!(%summary, "Callback");
        }
        summaries
    }
}

fn upgrade(weak: &Weak<ManagerInner>) -> Option<Manager> {
    weak.upgrade().map(|inner| Manager { inner })
}

// ============================================================================
// Manager - Line Flashing
// ============================================================================

impl Manager {
    /// Flashes `line` `count` times and returns the total duration in ms.
    ///
    /// Each step sets one server timer and schedules the next step from its
    /// callback, so a slow link delays the sequence instead of bunching it.
    /// With `on_at_rest` the line is on between flashes and each flash is an
    /// off period.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `count` is zero, `line` is
    /// empty, or the total overflows.
    pub fn flash_line_pulses(
        &self,
        line: &str,
        count: u32,
        on_ms: u32,
        off_ms: u32,
        on_at_rest: bool,
    ) -> Result<u32> {
        if count == 0 {
            return Err(Error::invalid_argument("flash count must be at least 1"));
        }
        if line.is_empty() {
            return Err(Error::invalid_argument("line name must not be empty"));
        }

        let (on_now, first, pair) = if on_at_rest {
            (false, off_ms, [on_ms, off_ms])
        } else {
            (true, on_ms, [off_ms, on_ms])
        };
        let mut timing = Vec::with_capacity(1 + 2 * (count as usize - 1));
        timing.push(first);
        for _ in 1..count {
            timing.extend_from_slice(&pair);
        }

        let total = timing
            .iter()
            .try_fold(0u32, |acc, &ms| acc.checked_add(ms))
            .ok_or_else(|| Error::invalid_argument("total flash duration overflows"))?;

        debug!(line, count, on_ms, off_ms, total_ms = total, "Flashing line");
        self.flash_step(line.to_string(), on_now, timing);
        Ok(total)
    }

    fn flash_step(&self, line: String, on_now: bool, mut timing: Vec<u32>) {
        self.line_set_state(&line, on_now, ReplyMode::Ignore);
        if timing.is_empty() {
            return;
        }
        let delay_ms = timing.remove(0);
        let event = self.new_sysevent(&[&line, if on_now { "off" } else { "on" }]);

        let weak = Arc::downgrade(&self.inner);
        self.call_after_delay(
            delay_ms,
            move |_| {
                if let Some(manager) = upgrade(&weak) {
                    manager.flash_step(line.clone(), !on_now, timing.clone());
                }
            },
            Some(&event),
        );
    }
}
