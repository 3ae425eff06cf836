//! Outbound command encoding.
//!
//! A command is one line of text: the command token followed by its
//! arguments, separated by single spaces. Arguments that would otherwise be
//! split by the server are wrapped in double quotes.
//!
//! # Example
//!
//! ```
//! use whisker_client::protocol::CommandLine;
//!
//! let line = CommandLine::new("LINE_SET_STATE").arg("reward").arg("on").build();
//! assert_eq!(line, "LINE_SET_STATE reward on");
//!
//! let line = CommandLine::new("LOG_WRITE").arg("trial 1 started").build();
//! assert_eq!(line, r#"LOG_WRITE "trial 1 started""#);
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::identifiers::CommandSeq;

// ============================================================================
// Quoting
// ============================================================================

/// Returns `true` if `arg` must be quoted to survive as one argument.
#[inline]
#[must_use]
pub fn needs_quoting(arg: &str) -> bool {
    arg.is_empty() || arg.chars().any(|c| c.is_whitespace() || c == '"' || c == ';')
}

/// Wraps `arg` in double quotes, escaping embedded quotes and backslashes.
#[must_use]
pub fn quote(arg: &str) -> String {
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for c in sanitize(arg).chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Quotes `arg` only if [`needs_quoting`] says so.
#[must_use]
pub fn quote_if_needed(arg: &str) -> String {
    if needs_quoting(arg) {
        quote(arg)
    } else {
        arg.to_string()
    }
}

/// Line breaks would split the command into two frames.
fn sanitize(arg: &str) -> std::borrow::Cow<'_, str> {
    if arg.contains(['\r', '\n']) {
        std::borrow::Cow::Owned(arg.replace(['\r', '\n'], " "))
    } else {
        std::borrow::Cow::Borrowed(arg)
    }
}

/// Splits a line into arguments, honouring double quotes and escapes.
///
/// This is the inverse of the quoting applied by [`CommandLine`].
#[must_use]
pub fn split_args(line: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' if in_quotes => {
                if let Some(escaped) = chars.next() {
                    current.push(escaped);
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if has_token {
        args.push(current);
    }
    args
}

// ============================================================================
// CommandLine
// ============================================================================

/// Builder for one outbound command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    parts: Vec<String>,
}

impl CommandLine {
    /// Starts a command with its token.
    #[inline]
    #[must_use]
    pub fn new(command: &str) -> Self {
        Self {
            parts: vec![command.to_string()],
        }
    }

    /// Appends an argument, quoting it if needed.
    #[inline]
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<str>) -> Self {
        self.parts.push(quote_if_needed(arg.as_ref()));
        self
    }

    /// Appends an optional argument.
    #[inline]
    #[must_use]
    pub fn arg_opt(self, arg: Option<impl AsRef<str>>) -> Self {
        match arg {
            Some(arg) => self.arg(arg),
            None => self,
        }
    }

    /// Appends a number.
    #[inline]
    #[must_use]
    pub fn num(mut self, value: impl fmt::Display) -> Self {
        self.parts.push(value.to_string());
        self
    }

    /// Appends an argument that is always quoted (file names, directories).
    #[inline]
    #[must_use]
    pub fn quoted(mut self, arg: impl AsRef<str>) -> Self {
        self.parts.push(quote(arg.as_ref()));
        self
    }

    /// Appends `flag value`.
    #[inline]
    #[must_use]
    pub fn flag_value(self, flag: &str, value: impl AsRef<str>) -> Self {
        self.raw(flag).arg(value)
    }

    /// Appends `flag value` when a value is present.
    #[inline]
    #[must_use]
    pub fn flag_opt(self, flag: &str, value: Option<impl AsRef<str>>) -> Self {
        match value {
            Some(value) => self.flag_value(flag, value),
            None => self,
        }
    }

    /// Appends pre-formatted text verbatim (option strings, flags).
    ///
    /// Empty text is skipped so it never produces a double space.
    #[inline]
    #[must_use]
    pub fn raw(mut self, text: impl AsRef<str>) -> Self {
        let text = sanitize(text.as_ref()).trim().to_string();
        if !text.is_empty() {
            self.parts.push(text);
        }
        self
    }

    /// Returns the command token.
    #[inline]
    #[must_use]
    pub fn command(&self) -> &str {
        &self.parts[0]
    }

    /// Joins the parts into the wire line (without the newline).
    #[must_use]
    pub fn build(&self) -> String {
        self.parts.join(" ")
    }
}

impl fmt::Display for CommandLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

impl From<CommandLine> for String {
    fn from(line: CommandLine) -> Self {
        line.build()
    }
}

// ============================================================================
// Socket
// ============================================================================

/// Which server connection a command travels on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Socket {
    /// Asynchronous main socket.
    Main,
    /// Synchronous immediate socket.
    Immediate,
}

// ============================================================================
// OutboundCommand
// ============================================================================

/// A command handed to the connection worker.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundCommand {
    text: String,
    socket: Socket,
    reply: Option<CommandSeq>,
}

impl OutboundCommand {
    /// Command for the main socket. The server never replies to these.
    #[inline]
    #[must_use]
    pub fn main(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            socket: Socket::Main,
            reply: None,
        }
    }

    /// Immediate-socket command whose reply is read and discarded.
    #[inline]
    #[must_use]
    pub fn immediate_ignore_reply(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            socket: Socket::Immediate,
            reply: None,
        }
    }

    /// Immediate-socket command whose reply goes to the caller waiting on `seq`.
    #[inline]
    #[must_use]
    pub fn immediate_get_reply(text: impl Into<String>, seq: CommandSeq) -> Self {
        Self {
            text: text.into(),
            socket: Socket::Immediate,
            reply: Some(seq),
        }
    }

    /// The command line text.
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The target socket.
    #[inline]
    #[must_use]
    pub fn socket(&self) -> Socket {
        self.socket
    }

    /// Returns `true` if a caller is waiting for the reply.
    #[inline]
    #[must_use]
    pub fn expects_reply(&self) -> bool {
        self.reply.is_some()
    }

    /// The sequence number a caller is waiting on, if any.
    #[inline]
    #[must_use]
    pub fn reply_seq(&self) -> Option<CommandSeq> {
        self.reply
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifiers::IdGenerator;

    #[test]
    fn test_plain_arguments_are_space_joined() {
        let line = CommandLine::new("TIMER_SET_EVENT")
            .arg("tick")
            .num(1000)
            .num(0)
            .build();
        assert_eq!(line, "TIMER_SET_EVENT tick 1000 0");
    }

    #[test]
    fn test_whitespace_argument_is_quoted() {
        let line = CommandLine::new("REPORT_STATUS").arg("running trial 3").build();
        assert_eq!(line, "REPORT_STATUS \"running trial 3\"");
    }

    #[test]
    fn test_empty_argument_is_quoted() {
        assert_eq!(quote_if_needed(""), "\"\"");
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        assert_eq!(quote(r#"say "hi""#), r#""say \"hi\"""#);
        assert!(needs_quoting("a;b"));
        assert!(!needs_quoting("plain_token-1"));
    }

    #[test]
    fn test_forced_quoting_for_filenames() {
        let line = CommandLine::new("LOG_OPEN").quoted("session.log").build();
        assert_eq!(line, "LOG_OPEN \"session.log\"");
    }

    #[test]
    fn test_newlines_cannot_break_framing() {
        let line = CommandLine::new("LOG_WRITE").arg("two\nlines").build();
        assert!(!line.contains('\n'));
        assert_eq!(line, "LOG_WRITE \"two lines\"");
    }

    #[test]
    fn test_raw_skips_empty_text() {
        let line = CommandLine::new("DISPLAY_ADD_OBJECT").arg("doc").raw("").arg("obj").build();
        assert_eq!(line, "DISPLAY_ADD_OBJECT doc obj");
    }

    #[test]
    fn test_optional_flag() {
        let with = CommandLine::new("AUDIO_CLAIM").num(0).flag_opt(FLAG, Some("speaker"));
        let without = CommandLine::new("AUDIO_CLAIM").num(0).flag_opt(FLAG, None::<&str>);
        assert_eq!(with.build(), "AUDIO_CLAIM 0 -alias speaker");
        assert_eq!(without.build(), "AUDIO_CLAIM 0");
    }

    const FLAG: &str = "-alias";

    #[test]
    fn test_split_args_inverts_quoting() {
        let original = ["LOG_WRITE", "with space", "", r#"has "quotes" and \ slash"#];
        let line = original
            .iter()
            .skip(1)
            .fold(CommandLine::new(original[0]), |line, a| line.arg(a))
            .build();
        assert_eq!(split_args(&line), original);
    }

    #[test]
    fn test_outbound_command_flags() {
        let ids = IdGenerator::new();
        let seq = ids.next_seq();

        let main = OutboundCommand::main("Ping");
        assert_eq!(main.socket(), Socket::Main);
        assert!(!main.expects_reply());

        let ignore = OutboundCommand::immediate_ignore_reply("LINE_SET_STATE 1 on");
        assert_eq!(ignore.socket(), Socket::Immediate);
        assert!(!ignore.expects_reply());

        let wait = OutboundCommand::immediate_get_reply("VERSION", seq);
        assert!(wait.expects_reply());
        assert_eq!(wait.reply_seq(), Some(seq));
        assert_eq!(wait.text(), "VERSION");
    }
}
