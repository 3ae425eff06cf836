//! Connection worker and its event loop.
//!
//! The worker is the only code that touches the sockets. It runs on a
//! dedicated OS thread hosting a single-threaded tokio runtime and talks to
//! the rest of the crate through channels only.
//!
//! # Event Loop
//!
//! The loop multiplexes:
//!
//! - commands from the manager (connect, disconnect, send, shutdown)
//! - lines from the main socket (handshake, then server-pushed messages)
//! - lines from the immediate socket (replies, matched FIFO to commands)
//! - the handshake deadline while a connection is being linked
//!
//! Replies carry no correlation ID, so a reply that never arrives leaves the
//! FIFO out of step. When a caller gives up on a reply that is still
//! outstanding, the worker treats it as a socket error and tears down.
//!
//! # Handshake
//!
//! ```text
//! client                         server
//!   │── connect main ──────────────►│   MainSocketConnected
//!   │◄──────────── ImmPort: <port> ─│
//!   │◄──────────────── Code: <code> ─│
//!   │── connect immediate ─────────►│   ImmediateSocketConnected
//!   │── Link <code> ───────────────►│
//!   │◄────────────────────── Success ─│   FullyConnected
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use parking_lot::Mutex;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until, timeout};
use tokio_util::codec::{Framed, LinesCodec, LinesCodecError};
use tracing::{debug, error, trace, warn};

use crate::error::{Error, Result};
use crate::identifiers::CommandSeq;
use crate::protocol::constants::{CMD_LINK, REPLY_SUCCESS};
use crate::protocol::{
    CommandLine, Handshake, InboundMessage, OutboundCommand, Socket, decode_main, decode_reply,
    parse_handshake,
};

use super::mailbox::ImmediateMailbox;
use super::state::{ConnectionState, SharedState};

// ============================================================================
// Constants
// ============================================================================

/// Longest line accepted from the server.
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Name of the worker thread.
const WORKER_THREAD_NAME: &str = "whisker-worker";

// ============================================================================
// Types
// ============================================================================

type LineFramed = Framed<TcpStream, LinesCodec>;
type LineSink = SplitSink<LineFramed, String>;
type LineStream = SplitStream<LineFramed>;

/// Requests into the worker.
#[derive(Debug)]
pub(crate) enum WorkerCommand {
    /// Open both sockets.
    Connect {
        host: String,
        port: u16,
        timeout: Duration,
    },
    /// Close both sockets.
    Disconnect,
    /// Write a command line.
    Send(OutboundCommand),
    /// A caller stopped waiting for the reply to `seq`.
    ReplyTimedOut { seq: CommandSeq, timeout: Duration },
    /// Close everything and stop the thread.
    Shutdown,
}

/// Notifications out of the worker.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    /// The connection state moved.
    StateChanged(ConnectionState),
    /// A decoded main-socket message.
    Message(InboundMessage),
    /// A socket-level failure; the connection has been torn down.
    SocketError(String),
}

// ============================================================================
// Worker
// ============================================================================

/// Handle to the worker thread.
#[derive(Debug)]
pub(crate) struct Worker {
    command_tx: mpsc::UnboundedSender<WorkerCommand>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl Worker {
    /// Starts the worker thread.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the runtime or the thread cannot be created.
    pub(crate) fn spawn(
        state: Arc<SharedState>,
        mailbox: Arc<ImmediateMailbox>,
    ) -> Result<(Self, mpsc::UnboundedReceiver<WorkerEvent>)> {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let event_loop = EventLoop {
            command_rx,
            event_tx,
            state,
            mailbox,
            session: None,
        };

        let thread = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || runtime.block_on(event_loop.run()))?;

        debug!("Connection worker started");

        Ok((
            Self {
                command_tx,
                thread: Mutex::new(Some(thread)),
            },
            event_rx,
        ))
    }

    /// Queues a command for the worker.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConnectionClosed`] if the worker has stopped.
    pub(crate) fn post(&self, command: WorkerCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| Error::ConnectionClosed)
    }

    /// Stops the worker and waits for its thread to finish.
    pub(crate) fn shutdown(&self) {
        let _ = self.command_tx.send(WorkerCommand::Shutdown);
        if let Some(handle) = self.thread.lock().take()
            && handle.join().is_err()
        {
            error!("Connection worker thread panicked");
        }
    }
}

// ============================================================================
// Session
// ============================================================================

/// What the next immediate-socket reply belongs to.
#[derive(Debug)]
enum PendingReply {
    /// The handshake `Link` command.
    Link,
    /// A command sent with ignore-reply semantics.
    Discard { command: String },
    /// A command whose caller is blocked in the mailbox.
    Caller { seq: CommandSeq, command: String },
}

struct ImmediateLink {
    write: LineSink,
    read: LineStream,
}

struct Session {
    host: String,
    timeout: Duration,
    main_write: LineSink,
    main_read: LineStream,
    immediate: Option<ImmediateLink>,
    imm_port: Option<u16>,
    code: Option<String>,
    pending: VecDeque<PendingReply>,
    /// Set until the link is acknowledged.
    handshake_deadline: Option<Instant>,
}

impl Session {
    fn awaits(&self, seq: CommandSeq) -> bool {
        self.pending
            .iter()
            .any(|p| matches!(p, PendingReply::Caller { seq: s, .. } if *s == seq))
    }
}

/// A line (or the end of a stream) from one of the sockets.
enum Inbound {
    Main(Option<std::result::Result<String, LinesCodecError>>),
    Immediate(Option<std::result::Result<String, LinesCodecError>>),
}

/// Waits for the next line on whichever socket is open.
async fn next_inbound(session: &mut Option<Session>) -> Inbound {
    let Some(session) = session else {
        return std::future::pending().await;
    };
    match &mut session.immediate {
        Some(link) => tokio::select! {
            line = session.main_read.next() => Inbound::Main(line),
            line = link.read.next() => Inbound::Immediate(line),
        },
        None => Inbound::Main(session.main_read.next().await),
    }
}

/// Completes at `deadline`, or never if there is none.
async fn expire(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn open_socket(host: &str, port: u16, limit: Duration) -> std::result::Result<LineFramed, String> {
    match timeout(limit, TcpStream::connect((host, port))).await {
        Ok(Ok(stream)) => {
            let _ = stream.set_nodelay(true);
            Ok(Framed::new(
                stream,
                LinesCodec::new_with_max_length(MAX_LINE_LENGTH),
            ))
        }
        Ok(Err(e)) => Err(format!("connect to {host}:{port} failed: {e}")),
        Err(_) => Err(format!(
            "connect to {host}:{port} timed out after {}ms",
            limit.as_millis()
        )),
    }
}

// ============================================================================
// EventLoop
// ============================================================================

struct EventLoop {
    command_rx: mpsc::UnboundedReceiver<WorkerCommand>,
    event_tx: mpsc::UnboundedSender<WorkerEvent>,
    state: Arc<SharedState>,
    mailbox: Arc<ImmediateMailbox>,
    session: Option<Session>,
}

impl EventLoop {
    async fn run(mut self) {
        loop {
            let handshake_deadline = self
                .session
                .as_ref()
                .and_then(|s| s.handshake_deadline);

            tokio::select! {
                command = self.command_rx.recv() => {
                    match command {
                        Some(WorkerCommand::Connect { host, port, timeout }) => {
                            self.connect(host, port, timeout).await;
                        }
                        Some(WorkerCommand::Disconnect) => {
                            self.teardown("disconnected by client").await;
                        }
                        Some(WorkerCommand::Send(command)) => {
                            self.send(command).await;
                        }
                        Some(WorkerCommand::ReplyTimedOut { seq, timeout }) => {
                            self.reply_timed_out(seq, timeout).await;
                        }
                        Some(WorkerCommand::Shutdown) | None => {
                            debug!("Connection worker shutting down");
                            self.teardown("client shut down").await;
                            break;
                        }
                    }
                }

                () = expire(handshake_deadline) => {
                    let limit = self.session.as_ref().map_or(0, |s| s.timeout.as_millis());
                    let state = self.state.get();
                    self.fail(format!("handshake timed out after {limit}ms in state {state}")).await;
                }

                inbound = next_inbound(&mut self.session) => {
                    match inbound {
                        Inbound::Main(Some(Ok(line))) => self.on_main_line(line).await,
                        Inbound::Immediate(Some(Ok(line))) => self.on_immediate_line(line).await,
                        Inbound::Main(Some(Err(e))) => {
                            self.fail(format!("main socket read error: {e}")).await;
                        }
                        Inbound::Immediate(Some(Err(e))) => {
                            self.fail(format!("immediate socket read error: {e}")).await;
                        }
                        Inbound::Main(None) => {
                            self.fail("main socket closed by server".to_string()).await;
                        }
                        Inbound::Immediate(None) => {
                            self.fail("immediate socket closed by server".to_string()).await;
                        }
                    }
                }
            }
        }

        debug!("Connection worker terminated");
    }

    // ------------------------------------------------------------------------
    // State and errors
    // ------------------------------------------------------------------------

    fn set_state(&self, new: ConnectionState) {
        if self.state.set(new) {
            debug!(state = %new, "Connection state changed");
            let _ = self.event_tx.send(WorkerEvent::StateChanged(new));
        }
    }

    /// Reports a socket error and tears the connection down.
    async fn fail(&mut self, message: String) {
        debug!(error = %message, "Tearing down after socket error");
        self.state.record_failure(&message);
        let _ = self.event_tx.send(WorkerEvent::SocketError(message.clone()));
        self.teardown(&message).await;
    }

    /// Closes both sockets and fails every awaited reply.
    async fn teardown(&mut self, reason: &str) {
        if let Some(mut session) = self.session.take() {
            let mut failed = 0usize;
            for pending in session.pending.drain(..) {
                if let PendingReply::Caller { seq, command } = pending {
                    self.mailbox
                        .deliver(seq, InboundMessage::failure(reason, Some(command)));
                    failed += 1;
                }
            }
            if failed > 0 {
                debug!(failed, "Failed pending replies on teardown");
            }
            let _ = session.main_write.close().await;
            if let Some(mut link) = session.immediate.take() {
                let _ = link.write.close().await;
            }
        }
        self.set_state(ConnectionState::Disconnected);
    }

    // ------------------------------------------------------------------------
    // Connecting
    // ------------------------------------------------------------------------

    async fn connect(&mut self, host: String, port: u16, limit: Duration) {
        if self.session.is_some() {
            self.teardown("reconnecting").await;
        }

        debug!(%host, port, "Connecting main socket");
        match open_socket(&host, port, limit).await {
            Ok(framed) => {
                let (main_write, main_read) = framed.split();
                self.session = Some(Session {
                    host,
                    timeout: limit,
                    main_write,
                    main_read,
                    immediate: None,
                    imm_port: None,
                    code: None,
                    pending: VecDeque::new(),
                    handshake_deadline: Some(Instant::now() + limit),
                });
                self.set_state(ConnectionState::MainSocketConnected);
            }
            Err(message) => {
                self.fail(format!("main socket {message}")).await;
            }
        }
    }

    async fn on_handshake(&mut self, handshake: Handshake) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        match handshake {
            Handshake::ImmPort(port) => session.imm_port = Some(port),
            Handshake::Code(code) => session.code = Some(code),
        }
        if session.imm_port.is_some() && session.code.is_some() {
            self.open_immediate().await;
        }
    }

    async fn open_immediate(&mut self) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let (Some(port), Some(code)) = (session.imm_port, session.code.clone()) else {
            return;
        };
        let host = session.host.clone();
        let limit = session.timeout;

        debug!(%host, port, "Connecting immediate socket");
        let framed = match open_socket(&host, port, limit).await {
            Ok(framed) => framed,
            Err(message) => {
                self.fail(format!("immediate socket {message}")).await;
                return;
            }
        };

        let (mut write, read) = framed.split();
        let link = CommandLine::new(CMD_LINK).arg(&code).build();
        trace!(line = %link, "immediate ->");
        if let Err(e) = write.send(link).await {
            self.fail(format!("immediate socket write error: {e}")).await;
            return;
        }

        if let Some(session) = self.session.as_mut() {
            session.immediate = Some(ImmediateLink { write, read });
            session.pending.push_back(PendingReply::Link);
        }
        self.set_state(ConnectionState::ImmediateSocketConnected);
    }

    // ------------------------------------------------------------------------
    // Inbound
    // ------------------------------------------------------------------------

    async fn on_main_line(&mut self, line: String) {
        trace!(%line, "main <-");
        let linking = self.session.as_ref().is_some_and(|s| s.immediate.is_none());
        if linking && let Some(handshake) = parse_handshake(&line) {
            self.on_handshake(handshake).await;
            return;
        }

        let message = decode_main(&line);
        let _ = self.event_tx.send(WorkerEvent::Message(message));
    }

    async fn on_immediate_line(&mut self, line: String) {
        trace!(%line, "immediate <-");
        let Some(session) = self.session.as_mut() else {
            return;
        };

        match session.pending.pop_front() {
            None => {
                warn!(%line, "Unsolicited immediate-socket reply");
            }
            Some(PendingReply::Link) => {
                if line.trim() == REPLY_SUCCESS {
                    session.handshake_deadline = None;
                    self.set_state(ConnectionState::FullyConnected);
                } else {
                    self.fail(format!("server refused link: {line}")).await;
                }
            }
            Some(PendingReply::Discard { command }) => {
                trace!(%command, reply = %line, "Discarding ignored reply");
            }
            Some(PendingReply::Caller { seq, command }) => {
                let reply = decode_reply(&line, Some(command));
                if reply.is_error() {
                    warn!(reply = %reply.message, "Undecodable immediate reply");
                }
                if !self.mailbox.deliver(seq, reply) {
                    debug!(%seq, "Reply arrived after its caller gave up");
                }
            }
        }
    }

    // ------------------------------------------------------------------------
    // Outbound
    // ------------------------------------------------------------------------

    async fn send(&mut self, command: OutboundCommand) {
        let text = command.text().to_string();

        let fully_connected = self.state.get().is_fully_connected();
        let Some(session) = self.session.as_mut() else {
            self.refuse(&command, "not connected");
            return;
        };

        let result = match command.socket() {
            Socket::Main => {
                trace!(line = %text, "main ->");
                session.main_write.send(text.clone()).await
            }
            Socket::Immediate => {
                let Some(link) = session.immediate.as_mut().filter(|_| fully_connected) else {
                    self.refuse(&command, "immediate socket not linked");
                    return;
                };
                trace!(line = %text, "immediate ->");
                let result = link.write.send(text.clone()).await;
                if result.is_ok() {
                    session.pending.push_back(match command.reply_seq() {
                        Some(seq) => PendingReply::Caller {
                            seq,
                            command: text.clone(),
                        },
                        None => PendingReply::Discard {
                            command: text.clone(),
                        },
                    });
                }
                result
            }
        };

        if let Err(e) = result {
            self.refuse(&command, "write failed");
            self.fail(format!("socket write error: {e}")).await;
        }
    }

    /// Tears down if the reply to `seq` is still outstanding.
    ///
    /// A reply that arrived in the meantime was already matched and dropped
    /// by the mailbox, so the FIFO is still in step and nothing is done.
    async fn reply_timed_out(&mut self, seq: CommandSeq, limit: Duration) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        if !session.awaits(seq) {
            debug!(%seq, "Timed-out reply was already consumed");
            return;
        }
        self.fail(format!(
            "no immediate reply within {}ms; replies are out of step",
            limit.as_millis()
        ))
        .await;
    }

    /// Completes a command that could not be sent.
    fn refuse(&self, command: &OutboundCommand, reason: &str) {
        warn!(command = %command.text(), reason, "Command not sent");
        if let Some(seq) = command.reply_seq() {
            self.mailbox.deliver(
                seq,
                InboundMessage::failure(reason, Some(command.text().to_string())),
            );
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    use crate::identifiers::IdGenerator;
    use crate::protocol::MessageKind;
    use crate::transport::testing::FakeServer;

    const WAIT: Duration = Duration::from_secs(5);

    fn spawn_worker() -> (
        Worker,
        mpsc::UnboundedReceiver<WorkerEvent>,
        Arc<SharedState>,
        Arc<ImmediateMailbox>,
    ) {
        let state = Arc::new(SharedState::new());
        let mailbox = Arc::new(ImmediateMailbox::new());
        let (worker, events) =
            Worker::spawn(Arc::clone(&state), Arc::clone(&mailbox)).expect("spawn worker");
        (worker, events, state, mailbox)
    }

    fn next_event(events: &mut mpsc::UnboundedReceiver<WorkerEvent>) -> WorkerEvent {
        let deadline = std::time::Instant::now() + WAIT;
        loop {
            match events.try_recv() {
                Ok(event) => return event,
                Err(_) if std::time::Instant::now() < deadline => {
                    thread::sleep(Duration::from_millis(5));
                }
                Err(e) => panic!("no worker event: {e}"),
            }
        }
    }

    fn connect(worker: &Worker, server: &FakeServer) {
        worker
            .post(WorkerCommand::Connect {
                host: "127.0.0.1".to_string(),
                port: server.port(),
                timeout: WAIT,
            })
            .expect("post connect");
    }

    #[test]
    fn test_handshake_reaches_fully_connected() {
        let server = FakeServer::start();
        let (worker, mut events, state, _mailbox) = spawn_worker();
        connect(&worker, &server);

        let (reached, ok) = state.wait_until(WAIT, |s| s.is_fully_connected());
        assert!(ok, "stuck in {reached}");

        let mut seen = Vec::new();
        while seen.last() != Some(&ConnectionState::FullyConnected) {
            match next_event(&mut events) {
                WorkerEvent::StateChanged(s) => seen.push(s),
                other => panic!("unexpected {other:?}"),
            }
        }
        assert_eq!(
            seen,
            vec![
                ConnectionState::MainSocketConnected,
                ConnectionState::ImmediateSocketConnected,
                ConnectionState::FullyConnected,
            ]
        );
        worker.shutdown();
    }

    #[test]
    fn test_awaited_reply_goes_to_mailbox() {
        let server = FakeServer::start();
        server.reply_to("VERSION", "2.5");
        let (worker, _events, state, mailbox) = spawn_worker();
        connect(&worker, &server);
        assert!(state.wait_until(WAIT, |s| s.is_fully_connected()).1);

        let seq = IdGenerator::new().next_seq();
        mailbox.arm(seq);
        worker
            .post(WorkerCommand::Send(OutboundCommand::immediate_get_reply(
                "VERSION", seq,
            )))
            .expect("post send");

        let (reply, _) = mailbox.wait(seq, WAIT, "VERSION");
        assert_eq!(reply.reply_text(), "2.5");
        assert_eq!(reply.causal_command.as_deref(), Some("VERSION"));
        worker.shutdown();
    }

    #[test]
    fn test_main_socket_event_is_published() {
        let server = FakeServer::start();
        let (worker, mut events, state, _mailbox) = spawn_worker();
        connect(&worker, &server);
        assert!(state.wait_until(WAIT, |s| s.is_fully_connected()).1);

        server.push_main("Event: lever [77]");

        let message = loop {
            if let WorkerEvent::Message(m) = next_event(&mut events) {
                break m;
            }
        };
        assert_eq!(
            message.kind,
            MessageKind::Event {
                event: "lever".to_string()
            }
        );
        assert_eq!(message.server_timestamp_ms, Some(77));
        worker.shutdown();
    }

    #[test]
    fn test_send_while_disconnected_fails_waiter() {
        let (worker, _events, _state, mailbox) = spawn_worker();
        let seq = IdGenerator::new().next_seq();
        mailbox.arm(seq);
        worker
            .post(WorkerCommand::Send(OutboundCommand::immediate_get_reply(
                "VERSION", seq,
            )))
            .expect("post send");

        let (reply, _) = mailbox.wait(seq, WAIT, "VERSION");
        assert!(reply.is_error());
        worker.shutdown();
    }

    #[test]
    fn test_refused_connection_reports_socket_error() {
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
            listener.local_addr().expect("addr").port()
        };
        let (worker, mut events, state, _mailbox) = spawn_worker();
        worker
            .post(WorkerCommand::Connect {
                host: "127.0.0.1".to_string(),
                port,
                timeout: WAIT,
            })
            .expect("post connect");

        loop {
            if let WorkerEvent::SocketError(message) = next_event(&mut events) {
                assert!(message.contains("main socket"));
                break;
            }
        }
        assert_eq!(state.get(), ConnectionState::Disconnected);
        worker.shutdown();
    }

    #[test]
    fn test_refused_link_tears_down() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind main");
        let imm_listener = TcpListener::bind("127.0.0.1:0").expect("bind immediate");
        let main_port = listener.local_addr().expect("addr").port();
        let imm_port = imm_listener.local_addr().expect("addr").port();

        let server = thread::spawn(move || {
            let (mut main, _) = listener.accept().expect("accept main");
            writeln!(main, "ImmPort: {imm_port}").expect("write");
            writeln!(main, "Code: abc").expect("write");
            let (imm, _) = imm_listener.accept().expect("accept immediate");
            let mut reader = BufReader::new(imm.try_clone().expect("clone"));
            let mut line = String::new();
            reader.read_line(&mut line).expect("read link");
            let mut imm = imm;
            writeln!(imm, "Failure bad code").expect("write");
            thread::sleep(Duration::from_millis(200));
            line
        });

        let (worker, _events, state, _mailbox) = spawn_worker();
        worker
            .post(WorkerCommand::Connect {
                host: "127.0.0.1".to_string(),
                port: main_port,
                timeout: WAIT,
            })
            .expect("post connect");

        let link_line = server.join().expect("server thread");
        assert_eq!(link_line.trim(), "Link abc");
        let (final_state, _) = state.wait_until(WAIT, |s| s == ConnectionState::Disconnected);
        assert_eq!(final_state, ConnectionState::Disconnected);
        worker.shutdown();
    }

    #[test]
    fn test_silent_handshake_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let port = listener.local_addr().expect("addr").port();
        let server = thread::spawn(move || {
            let (main, _) = listener.accept().expect("accept main");
            thread::sleep(Duration::from_secs(2));
            drop(main);
        });

        let (worker, mut events, state, _mailbox) = spawn_worker();
        let started = std::time::Instant::now();
        worker
            .post(WorkerCommand::Connect {
                host: "127.0.0.1".to_string(),
                port,
                timeout: Duration::from_millis(200),
            })
            .expect("post connect");

        let message = loop {
            if let WorkerEvent::SocketError(message) = next_event(&mut events) {
                break message;
            }
        };
        assert!(message.contains("handshake timed out"), "{message}");
        assert!(started.elapsed() >= Duration::from_millis(200));
        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(state.get(), ConnectionState::Disconnected);

        worker.shutdown();
        server.join().expect("server thread");
    }

    #[test]
    fn test_outstanding_reply_timeout_tears_down() {
        let server = FakeServer::start();
        server.stay_silent("RESET_CLOCK");
        let (worker, mut events, state, mailbox) = spawn_worker();
        connect(&worker, &server);
        assert!(state.wait_until(WAIT, |s| s.is_fully_connected()).1);

        let seq = IdGenerator::new().next_seq();
        mailbox.arm(seq);
        worker
            .post(WorkerCommand::Send(OutboundCommand::immediate_get_reply(
                "RESET_CLOCK", seq,
            )))
            .expect("post send");
        let (_, timed_out) = mailbox.wait(seq, Duration::from_millis(50), "RESET_CLOCK");
        assert!(timed_out);

        worker
            .post(WorkerCommand::ReplyTimedOut {
                seq,
                timeout: Duration::from_millis(50),
            })
            .expect("post timeout");

        let message = loop {
            if let WorkerEvent::SocketError(message) = next_event(&mut events) {
                break message;
            }
        };
        assert!(message.contains("no immediate reply"), "{message}");
        let (final_state, ok) = state.wait_until(WAIT, |s| s == ConnectionState::Disconnected);
        assert!(ok, "stuck in {final_state}");
        worker.shutdown();
    }

    #[test]
    fn test_consumed_reply_timeout_keeps_link() {
        let server = FakeServer::start();
        let (worker, mut events, state, mailbox) = spawn_worker();
        connect(&worker, &server);
        assert!(state.wait_until(WAIT, |s| s.is_fully_connected()).1);
        while events.try_recv().is_ok() {}

        let ids = IdGenerator::new();
        let seq = ids.next_seq();
        mailbox.arm(seq);
        worker
            .post(WorkerCommand::Send(OutboundCommand::immediate_get_reply(
                "VERSION", seq,
            )))
            .expect("post send");
        let (_, timed_out) = mailbox.wait(seq, WAIT, "VERSION");
        assert!(!timed_out);

        worker
            .post(WorkerCommand::ReplyTimedOut {
                seq,
                timeout: WAIT,
            })
            .expect("post timeout");

        let next = ids.next_seq();
        mailbox.arm(next);
        worker
            .post(WorkerCommand::Send(OutboundCommand::immediate_get_reply(
                "CLIENT_NUMBER", next,
            )))
            .expect("post send");
        let (reply, _) = mailbox.wait(next, WAIT, "CLIENT_NUMBER");
        assert!(reply.immediate_reply_succeeded());
        assert!(state.get().is_fully_connected());
        while let Ok(event) = events.try_recv() {
            assert!(!matches!(event, WorkerEvent::SocketError(_)), "{event:?}");
        }
        worker.shutdown();
    }
}
