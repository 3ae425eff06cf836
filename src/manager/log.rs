//! Server-side log file control.

use crate::protocol::constants::{
    CMD_LOG_CLOSE, CMD_LOG_OPEN, CMD_LOG_PAUSE, CMD_LOG_RESUME, CMD_LOG_SET_OPTIONS,
    CMD_LOG_WRITE,
};
use crate::protocol::{CommandLine, LogOptions};

use super::core::{Manager, ReplyMode, rejected};

// ============================================================================
// Manager - Logging
// ============================================================================

impl Manager {
    /// Opens a log file on the server.
    pub fn log_open(&self, filename: &str, mode: ReplyMode) -> bool {
        if filename.is_empty() {
            return rejected("log_open", "empty filename");
        }
        self.imm_bool(CommandLine::new(CMD_LOG_OPEN).quoted(filename), mode)
    }

    /// Chooses what the server log records.
    pub fn log_set_options(&self, options: &LogOptions, mode: ReplyMode) -> bool {
        let command = options
            .to_args()
            .into_iter()
            .fold(CommandLine::new(CMD_LOG_SET_OPTIONS), CommandLine::raw);
        self.imm_bool(command, mode)
    }

    pub fn log_pause(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_LOG_PAUSE), mode)
    }

    pub fn log_resume(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_LOG_RESUME), mode)
    }

    /// Writes a line of text to the server log.
    pub fn log_write(&self, message: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_LOG_WRITE).raw(message), mode)
    }

    pub fn log_close(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_LOG_CLOSE), mode)
    }
}

#[cfg(test)]
mod tests {
    use super::super::core::tests::{connected, last_immediate};
    use super::*;

    #[test]
    fn test_log_open_and_write() {
        let (manager, server) = connected(1000);
        assert!(manager.log_open("session 1.log", ReplyMode::Wait));
        assert_eq!(last_immediate(&server), r#"LOG_OPEN "session 1.log""#);

        assert!(manager.log_write("trial 3 correct", ReplyMode::Wait));
        assert_eq!(last_immediate(&server), "LOG_WRITE trial 3 correct");
    }

    #[test]
    fn test_log_set_options_lists_every_flag() {
        let (manager, server) = connected(1000);
        assert!(manager.log_set_options(&LogOptions::default(), ReplyMode::Wait));
        assert_eq!(
            last_immediate(&server),
            "LOG_SET_OPTIONS -events on -keyevents on -clientclient on -comms off -signature on"
        );
    }

    #[test]
    fn test_failure_reply_is_false() {
        let (manager, server) = connected(1000);
        server.reply_to("LOG_CLOSE", "Failure no log open");
        assert!(!manager.log_close(ReplyMode::Wait));
    }
}
