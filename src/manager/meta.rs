//! Server housekeeping: clock, identity, client messages, authentication.

use tracing::debug;

use crate::protocol::constants::{
    CMD_AUTHENTICATE, CMD_AUTHENTICATE_RESPONSE, CMD_CLIENT_NUMBER, CMD_PERMIT_CLIENT_MESSAGES,
    CMD_REPORT_COMMENT, CMD_REPORT_NAME, CMD_REPORT_STATUS, CMD_REQUEST_TIME, CMD_RESET_CLOCK,
    CMD_SEND_TO_CLIENT, CMD_SET_MEDIA_DIRECTORY, CMD_SHUTDOWN, CMD_TEST_NETWORK_LATENCY,
    CMD_TIMESTAMPS, CMD_VERSION, PING, PING_ACK, VAL_BROADCAST_TO_ALL_CLIENTS,
};
use crate::protocol::{CommandLine, Reply, on_val};

use super::core::{Manager, ReplyMode, rejected};

// ============================================================================
// Manager - Clock and Identity
// ============================================================================

impl Manager {
    /// Turns server timestamps on main-socket messages on or off.
    pub fn set_timestamps(&self, on: bool, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_TIMESTAMPS).arg(on_val(on)), mode)
    }

    /// Resets the server's clock for this client to zero.
    pub fn reset_clock(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_RESET_CLOCK), mode)
    }

    /// Server version string, or `""`.
    pub fn server_version(&self) -> String {
        self.imm_resp(CommandLine::new(CMD_VERSION))
    }

    /// Server version as a number.
    pub fn server_version_numeric(&self) -> Option<f32> {
        self.server_version().trim().parse().ok()
    }

    /// Server time in ms since this client's clock was reset.
    pub fn server_time_ms(&self) -> Option<u32> {
        self.imm_resp(CommandLine::new(CMD_REQUEST_TIME)).trim().parse().ok()
    }

    /// This client's number on the server.
    pub fn client_number(&self) -> Option<i32> {
        self.imm_resp(CommandLine::new(CMD_CLIENT_NUMBER)).trim().parse().ok()
    }

    pub fn report_name(&self, name: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_REPORT_NAME).raw(name), mode)
    }

    pub fn report_status(&self, status: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_REPORT_STATUS).raw(status), mode)
    }

    pub fn report_comment(&self, comment: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_REPORT_COMMENT).raw(comment), mode)
    }

    /// Sets the directory the server resolves media file names against.
    pub fn set_media_directory(&self, directory: &str, mode: ReplyMode) -> bool {
        if directory.is_empty() {
            return rejected("set_media_directory", "empty directory");
        }
        self.imm_bool(CommandLine::new(CMD_SET_MEDIA_DIRECTORY).quoted(directory), mode)
    }
}

// ============================================================================
// Manager - Client Messages
// ============================================================================

impl Manager {
    /// Allows or refuses messages from other clients.
    pub fn permit_client_messages(&self, permit: bool, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_PERMIT_CLIENT_MESSAGES).arg(on_val(permit)),
            mode,
        )
    }

    /// Sends `message` to client `client`; `-1` addresses every client.
    pub fn send_to_client(&self, client: i32, message: &str, mode: ReplyMode) -> bool {
        self.imm_bool(
            CommandLine::new(CMD_SEND_TO_CLIENT).num(client).raw(message),
            mode,
        )
    }

    /// Sends `message` to every client.
    pub fn broadcast(&self, message: &str, mode: ReplyMode) -> bool {
        self.send_to_client(VAL_BROADCAST_TO_ALL_CLIENTS, message, mode)
    }
}

// ============================================================================
// Manager - Diagnostics and Control
// ============================================================================

impl Manager {
    /// Round-trip time to the server in ms, as the server measures it.
    ///
    /// The server answers `TEST_NETWORK_LATENCY` with `Ping`; the client
    /// answers that with `PingAcknowledged` and the server replies with the
    /// latency.
    pub fn network_latency_ms(&self) -> Option<i32> {
        let ping = self.imm_resp(CommandLine::new(CMD_TEST_NETWORK_LATENCY));
        if ping != PING {
            debug!(reply = %ping, "Unexpected latency test reply");
            return None;
        }
        self.imm_resp(CommandLine::new(PING_ACK)).trim().parse().ok()
    }

    /// Returns `true` if the server acknowledges a ping.
    pub fn ping(&self) -> bool {
        self.imm_resp(CommandLine::new(PING)) == PING_ACK
    }

    /// Asks the server to shut down.
    pub fn shutdown_server(&self, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_SHUTDOWN), mode)
    }

    /// Starts authentication; returns the server's challenge token or `""`.
    pub fn authenticate_get_challenge(&self, package: &str, client_name: &str) -> String {
        if package.is_empty() || client_name.is_empty() {
            return rejected("authenticate_get_challenge", "empty package or client name");
        }
        let reply = self.imm_reply(
            CommandLine::new(CMD_AUTHENTICATE)
                .arg(package)
                .arg(client_name),
        );
        match reply.reply() {
            Some(Reply::AuthenticateChallenge(token)) => token.clone(),
            _ => String::new(),
        }
    }

    /// Answers the challenge from [`Manager::authenticate_get_challenge`].
    pub fn authenticate_provide_response(&self, response: &str, mode: ReplyMode) -> bool {
        self.imm_bool(CommandLine::new(CMD_AUTHENTICATE_RESPONSE).arg(response), mode)
    }
}
