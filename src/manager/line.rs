//! Digital line state, events and safety timers.

use crate::protocol::constants::{
    CMD_LINE_CLEAR_ALL_EVENTS, CMD_LINE_CLEAR_EVENT, CMD_LINE_CLEAR_EVENTS_BY_LINE,
    CMD_LINE_CLEAR_SAFETY_TIMER, CMD_LINE_READ_STATE, CMD_LINE_SET_EVENT,
    CMD_LINE_SET_SAFETY_TIMER, CMD_LINE_SET_STATE, VAL_OFF, VAL_ON,
};
use crate::protocol::{CommandLine, LineEventType, Reply, SafetyState, on_val};

use super::core::{Manager, ReplyMode, rejected};

// ============================================================================
// Manager - Line State
// ============================================================================

impl Manager {
    /// Switches an output line on or off.
    ///
    /// Succeeds on `Success`, or on a reply echoing the requested state.
    /// Repeating the call leaves the line in the same state.
    pub fn line_set_state(&self, line: &str, on: bool, mode: ReplyMode) -> bool {
        if line.is_empty() {
            return rejected("line_set_state", "empty line name");
        }
        let command = CommandLine::new(CMD_LINE_SET_STATE).arg(line).arg(on_val(on));
        match mode {
            ReplyMode::Ignore => self.imm_bool(command, mode),
            ReplyMode::Wait => match self.imm_reply(command).reply() {
                Some(Reply::Success) => true,
                Some(Reply::Value(value)) => value.trim() == on_val(on),
                _ => false,
            },
        }
    }

    /// Switches `line` on.
    pub fn line_on(&self, line: &str, mode: ReplyMode) -> bool {
        self.line_set_state(line, true, mode)
    }

    /// Switches `line` off.
    pub fn line_off(&self, line: &str, mode: ReplyMode) -> bool {
        self.line_set_state(line, false, mode)
    }

    /// Reads a line: `Some(true)` for on, `Some(false)` for off.
    pub fn line_read_state(&self, line: &str) -> Option<bool> {
        if line.is_empty() {
            return rejected("line_read_state", "empty line name");
        }
        match self
            .imm_resp(CommandLine::new(CMD_LINE_READ_STATE).arg(line))
            .trim()
        {
            VAL_ON => Some(true),
            VAL_OFF => Some(false),
            _ => None,
        }
    }
}

// ============================================================================
// Manager - Line Events
// ============================================================================

impl Manager {
    /// Asks the server to raise `event` when `line` makes a transition.
    pub fn line_set_event(
        &self,
        line: &str,
        event: &str,
        event_type: LineEventType,
        mode: ReplyMode,
    ) -> bool {
        if line.is_empty() || event.is_empty() {
            return rejected("line_set_event", "empty line or event name");
        }
        self.imm_bool(
            CommandLine::new(CMD_LINE_SET_EVENT)
                .arg(line)
                .arg(event_type.as_str())
                .arg(event),
            mode,
        )
    }

    pub fn line_clear_event(&self, event: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_LINE_CLEAR_EVENT).arg(event), mode)
    }

    /// Clears the events on `line` for the given transition.
    pub fn line_clear_event_by_line(
        &self,
        line: &str,
        event_type: LineEventType,
        mode: ReplyMode,
    ) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_LINE_CLEAR_EVENTS_BY_LINE)
                .arg(line)
                .arg(event_type.as_str()),
            mode,
        )
    }

    pub fn line_clear_all_events(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_LINE_CLEAR_ALL_EVENTS), mode)
    }
}

// ============================================================================
// Manager - Safety Timers
// ============================================================================

impl Manager {
    /// Forces `line` to `state` if it is not changed again within `time_ms`.
    pub fn line_set_safety_timer(
        &self,
        line: &str,
        time_ms: u32,
        state: SafetyState,
        mode: ReplyMode,
    ) -> bool {
        if line.is_empty() {
            return rejected("line_set_safety_timer", "empty line name");
        }
        self.imm_bool(
            CommandLine::new(CMD_LINE_SET_SAFETY_TIMER)
                .arg(line)
                .num(time_ms)
                .arg(state.as_str()),
            mode,
        )
    }

    pub fn line_clear_safety_timer(&self, line: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_LINE_CLEAR_SAFETY_TIMER).arg(line), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::tests::{connected, last_immediate};
    use super::*;

    use crate::protocol::{LineDirection, ResetState};

    #[test]
    fn test_line_on_after_alias_claim() {
        let (manager, server) = connected(1000);
        assert!(manager.claim_line(5, LineDirection::Output, Some("reward"), ResetState::Off));

        server.reply_to("LINE_SET_STATE", "on");
        assert!(manager.line_on("reward", ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "LINE_SET_STATE reward on");
    }

    #[test]
    fn test_line_off_accepts_matching_echo() {
        let (manager, server) = connected(1000);
        server.reply_to("LINE_SET_STATE", "off");
        assert!(manager.line_off("reward", ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "LINE_SET_STATE reward off");
    }

    #[test]
    fn test_line_set_state_is_idempotent() {
        let (manager, server) = connected(1000);
        server.reply_to("LINE_READ_STATE", "on");

        assert!(manager.line_set_state("3", true, ReplyMode::Wait));
        let once = manager.line_read_state("3");
        assert!(manager.line_set_state("3", true, ReplyMode::Wait));
        let twice = manager.line_read_state("3");

        assert_eq!(once, Some(true));
        assert_eq!(once, twice);
    }

    #[test]
    fn test_mismatched_echo_is_failure() {
        let (manager, server) = connected(1000);
        server.reply_to("LINE_SET_STATE", "off");
        assert!(!manager.line_on("reward", ReplyMode::Wait));
    }

    #[test]
    fn test_read_state_garbage_is_none() {
        let (manager, server) = connected(1000);
        server.reply_to("LINE_READ_STATE", "maybe");
        assert_eq!(manager.line_read_state("lever"), None);
    }

    #[test]
    fn test_line_event_and_safety_encoding() {
        let (manager, server) = connected(1000);
        assert!(manager.line_set_event("lever", "press", LineEventType::On, ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "LINE_SET_EVENT lever on press");

        assert!(manager.line_set_safety_timer("pump", 10_000, SafetyState::Off, ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "LINE_SET_SAFETY_TIMER pump 10000 off");

        assert!(manager.line_clear_event_by_line("lever", LineEventType::Both, ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "LINE_CLEAR_EVENTS_BY_LINE lever both");
    }
}
