//! Core Manager struct, connection control and send primitives.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::{debug, error, trace, warn};

use crate::callback::CallbackRegistry;
use crate::error::{Error, Result};
use crate::identifiers::IdGenerator;
use crate::protocol::{CommandLine, InboundMessage, OutboundCommand};
use crate::transport::ConnectionState;
use crate::transport::WorkerEvent;
use crate::transport::mailbox::ImmediateMailbox;
use crate::transport::state::{LinkWait, SharedState};
use crate::transport::worker::{Worker, WorkerCommand};

use super::config::WhiskerConfig;
use super::notification::{Notification, NotificationHandler};

// ============================================================================
// Constants
// ============================================================================

/// Name of the thread that runs callbacks and the notification handler.
const PUMP_THREAD_NAME: &str = "whisker-events";

// ============================================================================
// ReplyMode
// ============================================================================

/// Whether a command call waits for the server's acknowledgement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyMode {
    /// Block until the reply arrives; report whether it was `Success`.
    #[default]
    Wait,
    /// Return as soon as the command is queued.
    Ignore,
}

// ============================================================================
// ManagerInner
// ============================================================================

/// Internal shared state for the manager.
pub(crate) struct ManagerInner {
    /// Connection settings.
    pub config: WhiskerConfig,
    /// Connection state written by the worker.
    pub state: Arc<SharedState>,
    /// Reply handoff from the worker.
    pub mailbox: Arc<ImmediateMailbox>,
    /// Connection worker.
    pub worker: Worker,
    /// Client-side event subscriptions.
    pub callbacks: CallbackRegistry,
    /// Application notification handler.
    pub handler: Mutex<Option<NotificationHandler>>,
    /// Serializes awaited immediate commands.
    pub immediate_lock: Mutex<()>,
    /// Command sequence numbers.
    pub seqs: IdGenerator,
    /// Counter for generated event names.
    pub sysevents: IdGenerator,
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        debug!("Manager dropped, stopping worker");
        self.mailbox.cancel("manager shut down");
        self.worker.shutdown();
    }
}

// ============================================================================
// Manager
// ============================================================================

/// Client for one Whisker server.
///
/// Cheap to clone; all clones share one connection. Every command method
/// blocks the calling thread until its reply arrives (or the configured
/// timeout passes) unless called with [`ReplyMode::Ignore`].
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use whisker_client::{Manager, ReplyMode, WhiskerConfig};
/// use whisker_client::protocol::{LineDirection, ResetState};
///
/// # fn example() -> whisker_client::Result<()> {
/// let manager = Manager::new(WhiskerConfig::new().with_host("rig-3"))?;
/// manager.connect_and_wait(Duration::from_secs(5))?;
///
/// manager.claim_line(5, LineDirection::Output, Some("reward"), ResetState::Off);
/// manager.line_on("reward", ReplyMode::Wait);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Manager {
    pub(crate) inner: Arc<ManagerInner>,
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("state", &self.connection_state())
            .field("callbacks", &self.inner.callbacks.len())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Manager - Construction
// ============================================================================

impl Manager {
    /// Creates a manager and starts its background threads.
    ///
    /// Does not connect; call [`Manager::connect`] or
    /// [`Manager::connect_and_wait`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `config` is invalid, or [`Error::Io`] if
    /// a thread cannot be started.
    pub fn new(config: WhiskerConfig) -> Result<Self> {
        config.validate()?;

        let state = Arc::new(SharedState::new());
        let mailbox = Arc::new(ImmediateMailbox::new());
        let (worker, events) = Worker::spawn(Arc::clone(&state), Arc::clone(&mailbox))?;

        let inner = Arc::new(ManagerInner {
            config,
            state,
            mailbox,
            worker,
            callbacks: CallbackRegistry::new(),
            handler: Mutex::new(None),
            immediate_lock: Mutex::new(()),
            seqs: IdGenerator::new(),
            sysevents: IdGenerator::new(),
        });

        spawn_pump(Arc::downgrade(&inner), events)?;

        debug!(
            host = %inner.config.host,
            port = inner.config.port,
            "Whisker manager created"
        );
        Ok(Self { inner })
    }
}

/// Starts the thread that turns worker events into callbacks and
/// notifications. It exits when the worker stops.
fn spawn_pump(
    inner: Weak<ManagerInner>,
    mut events: mpsc::UnboundedReceiver<WorkerEvent>,
) -> Result<()> {
    std::thread::Builder::new()
        .name(PUMP_THREAD_NAME.to_string())
        .spawn(move || {
            while let Some(event) = events.blocking_recv() {
                let Some(inner) = inner.upgrade() else {
                    break;
                };
                Manager { inner }.dispatch(event);
            }
            debug!("Notification pump terminated");
        })?;
    Ok(())
}

// ============================================================================
// Manager - Accessors
// ============================================================================

impl Manager {
    /// Connection settings.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &WhiskerConfig {
        &self.inner.config
    }

    /// Client-side event subscriptions.
    #[inline]
    #[must_use]
    pub fn callbacks(&self) -> &CallbackRegistry {
        &self.inner.callbacks
    }

    /// Current connection state.
    #[inline]
    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.state.get()
    }

    /// Returns `true` once both sockets are linked.
    #[inline]
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connection_state().is_fully_connected()
    }

    /// Installs the application's notification handler, replacing any other.
    ///
    /// The handler runs on the notification thread and may call back into
    /// the manager.
    pub fn set_notification_handler<F>(&self, handler: F)
    where
        F: Fn(Notification) + Send + Sync + 'static,
    {
        *self.inner.handler.lock() = Some(Arc::new(handler));
    }

    /// Removes the notification handler.
    pub fn clear_notification_handler(&self) {
        *self.inner.handler.lock() = None;
    }
}

// ============================================================================
// Manager - Connection
// ============================================================================

impl Manager {
    /// Starts connecting to the configured server. Returns at once; watch
    /// [`Notification::ConnectionStateChanged`] for progress.
    ///
    /// Reconnects if already connected.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the manager has been shut down.
    pub fn connect(&self) -> Result<()> {
        let config = &self.inner.config;
        debug!(host = %config.host, port = config.port, "Connecting to Whisker server");
        self.inner.state.begin_attempt();
        self.inner.worker.post(WorkerCommand::Connect {
            host: config.host.clone(),
            port: config.port,
            timeout: config.timeout(),
        })
    }

    /// Connects and blocks until fully linked.
    ///
    /// Returns at once if already connected. A refused socket or a stalled
    /// handshake ends the wait as soon as the worker reports it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connection`] if the attempt fails, or
    /// [`Error::ConnectionTimeout`] if the link is not up within `timeout`.
    /// After a timeout the attempt carries on in the background until the
    /// configured handshake timeout ends it.
    pub fn connect_and_wait(&self, timeout: Duration) -> Result<()> {
        if self.is_connected() {
            return Ok(());
        }
        self.connect()?;

        match self.inner.state.wait_for_link(timeout) {
            LinkWait::Linked => Ok(()),
            LinkWait::Failed(message) => Err(Error::connection(message)),
            LinkWait::TimedOut(state) => {
                debug!(%state, "Gave up waiting for connection");
                Err(Error::connection_timeout(timeout.as_millis() as u64))
            }
        }
    }

    /// Closes both sockets. Any caller waiting on a reply gets a failure.
    pub fn disconnect(&self) {
        debug!("Disconnecting from Whisker server");
        if self.inner.worker.post(WorkerCommand::Disconnect).is_err() {
            debug!("Worker already stopped");
        }
        self.inner.mailbox.cancel("disconnected by client");
    }

    /// Stops the worker. The manager cannot reconnect afterwards.
    ///
    /// Also happens when the last clone is dropped.
    pub fn shutdown(&self) {
        self.inner.mailbox.cancel("manager shut down");
        self.inner.worker.shutdown();
    }
}

// ============================================================================
// Manager - Send Primitives
// ============================================================================

impl Manager {
    /// Sends a raw command on the main socket. The server does not reply.
    ///
    /// Returns `false` if not connected.
    pub fn send_main(&self, command: &str) -> bool {
        self.post_unanswered(OutboundCommand::main(command))
    }

    /// Sends a raw immediate command and discards its reply.
    ///
    /// Returns `false` if not connected.
    pub fn send_immediate_ignore_reply(&self, command: &str) -> bool {
        self.post_unanswered(OutboundCommand::immediate_ignore_reply(command))
    }

    /// Sends a raw immediate command and blocks for its reply.
    ///
    /// Always returns a message. On timeout, disconnect or any transport
    /// failure it is an `Error`-kind message naming the command.
    ///
    /// A timeout also drops the connection, since later replies could no
    /// longer be matched to their commands; a
    /// [`Notification::SocketError`] reports it.
    pub fn send_immediate_get_reply(&self, command: &str) -> InboundMessage {
        if !self.is_connected() {
            warn!(command, "Not connected; command not sent");
            return InboundMessage::failure("not connected", Some(command.to_string()));
        }

        let _guard = self.inner.immediate_lock.lock();
        let seq = self.inner.seqs.next_seq();
        self.inner.mailbox.arm(seq);

        let outbound = OutboundCommand::immediate_get_reply(command, seq);
        if let Err(e) = self.inner.worker.post(WorkerCommand::Send(outbound)) {
            return InboundMessage::failure(e.to_string(), Some(command.to_string()));
        }

        let timeout = self.inner.config.timeout();
        let (reply, timed_out) = self.inner.mailbox.wait(seq, timeout, command);
        if timed_out {
            let _ = self
                .inner
                .worker
                .post(WorkerCommand::ReplyTimedOut { seq, timeout });
        }
        trace!(%seq, command, reply = %reply.message, "Immediate reply");
        if reply.is_error() {
            warn!(command, reply = %reply.message, "Immediate command failed");
        }
        reply
    }

    fn post_unanswered(&self, outbound: OutboundCommand) -> bool {
        if !self.is_connected() {
            warn!(command = %outbound.text(), "Not connected; command not sent");
            return false;
        }
        self.inner.worker.post(WorkerCommand::Send(outbound)).is_ok()
    }

    /// Sends `command`; reports success per `mode`.
    pub(crate) fn imm_bool(&self, command: CommandLine, mode: ReplyMode) -> bool {
        let text = command.build();
        match mode {
            ReplyMode::Ignore => self.send_immediate_ignore_reply(&text),
            ReplyMode::Wait => self.send_immediate_get_reply(&text).immediate_reply_succeeded(),
        }
    }

    /// Sends `command` and returns the reply text, or `""` on failure.
    pub(crate) fn imm_resp(&self, command: CommandLine) -> String {
        self.send_immediate_get_reply(&command.build())
            .reply_text()
            .to_string()
    }

    /// Sends `command` and returns the decoded reply message.
    pub(crate) fn imm_reply(&self, command: CommandLine) -> InboundMessage {
        self.send_immediate_get_reply(&command.build())
    }
}

/// Logs a locally rejected call and returns its sentinel.
pub(crate) fn rejected<T: Default>(operation: &str, reason: &str) -> T {
    warn!(operation, reason, "Command rejected before sending");
    T::default()
}

// ============================================================================
// Manager - Notification Pump
// ============================================================================

impl Manager {
    fn dispatch(&self, event: WorkerEvent) {
        match event {
            WorkerEvent::StateChanged(state) => {
                self.notify(Notification::ConnectionStateChanged(state));
            }
            WorkerEvent::SocketError(message) => {
                self.notify(Notification::SocketError(message));
            }
            WorkerEvent::Message(message) => {
                if let Some(event) = message.event()
                    && self.route_event(event, &message)
                {
                    return;
                }
                self.notify(Notification::from_message(message));
            }
        }
    }

    /// Runs `event` through the callback registry; returns `true` if the
    /// application should not see it.
    pub(crate) fn route_event(&self, event: &str, message: &InboundMessage) -> bool {
        let outcome = self.inner.callbacks.process_event(event, message);
        let handled = (outcome.n_called > 0 && outcome.swallow)
            || event.starts_with(&self.inner.config.sysevent_prefix);
        if handled {
            trace!(event, n_called = outcome.n_called, "Event handled internally");
        }
        handled
    }

    fn notify(&self, notification: Notification) {
        let handler = self.inner.handler.lock().clone();
        match handler {
            Some(handler) => handler(notification),
            None => match &notification {
                Notification::SocketError(message) => {
                    error!(error = %message, "Whisker socket error");
                }
                other => debug!(notification = ?other, "Unhandled notification"),
            },
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
