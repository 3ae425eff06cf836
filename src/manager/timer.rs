//! Server-side timers.

use crate::protocol::CommandLine;
use crate::protocol::constants::{
    CMD_TIMER_CLEAR_ALL_EVENTS, CMD_TIMER_CLEAR_EVENT, CMD_TIMER_SET_EVENT,
};

use super::core::{Manager, ReplyMode, rejected};

// ============================================================================
// Manager - Timers
// ============================================================================

impl Manager {
    /// Asks the server to raise `event` after `duration_ms`.
    ///
    /// The timer then reloads `reload_count` more times; `-1` reloads
    /// forever.
    pub fn timer_set_event(
        &self,
        event: &str,
        duration_ms: u32,
        reload_count: i32,
        mode: ReplyMode,
    ) -> bool {
        if event.is_empty() {
            return rejected("timer_set_event", "empty event name");
        }
        if reload_count < -1 {
            return rejected("timer_set_event", "reload count below -1");
        }
        self.imm_bool(
            CommandLine::new(CMD_TIMER_SET_EVENT)
                .arg(event)
                .num(duration_ms)
                .num(reload_count),
            mode,
        )
    }

    pub fn timer_clear_event(&self, event: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_TIMER_CLEAR_EVENT).arg(event), mode)
    }

    pub fn timer_clear_all_events(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_TIMER_CLEAR_ALL_EVENTS), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::tests::{connected, last_immediate};
    use super::*;

    #[test]
    fn test_timer_set_event_encoding() {
        let (manager, server) = connected(1000);
        assert!(manager.timer_set_event("iti_done", 2500, 0, ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "TIMER_SET_EVENT iti_done 2500 0");
    }

    #[test]
    fn test_timer_rejects_bad_arguments_locally() {
        let (manager, server) = connected(1000);
        assert!(!manager.timer_set_event("", 100, 0, ReplyMode::Wait));
        assert!(!manager.timer_set_event("x", 100, -2, ReplyMode::Wait));
        assert!(server.received(crate::protocol::Socket::Immediate).is_empty());
    }
}
