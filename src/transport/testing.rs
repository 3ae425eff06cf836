//! Loopback Whisker server for tests.
//!
//! Speaks the handshake, answers immediate-socket commands from a reply
//! table and records every line it receives.

use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing_subscriber::EnvFilter;

use crate::protocol::Socket;

/// Routes crate logs to the test output. Set `RUST_LOG` to change the level.
pub(crate) fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("whisker_client=debug"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_test_writer()
        .try_init();
}

#[derive(Default)]
struct Shared {
    /// Keyed by full line, then by command token. `None` means stay silent.
    replies: Mutex<HashMap<String, Option<String>>>,
    received: Mutex<Vec<(Socket, String)>>,
    received_cv: Condvar,
    main: Mutex<Option<TcpStream>>,
    main_cv: Condvar,
}

impl Shared {
    fn record(&self, socket: Socket, line: String) {
        self.received.lock().push((socket, line));
        self.received_cv.notify_all();
    }

    fn reply_for(&self, line: &str) -> Option<String> {
        let replies = self.replies.lock();
        if let Some(reply) = replies.get(line) {
            return reply.clone();
        }
        let token = line.split_whitespace().next().unwrap_or_default();
        match replies.get(token) {
            Some(reply) => reply.clone(),
            None => Some("Success".to_string()),
        }
    }
}

pub(crate) struct FakeServer {
    port: u16,
    shared: Arc<Shared>,
}

impl FakeServer {
    pub(crate) fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind main");
        let port = listener.local_addr().expect("main addr").port();
        let shared = Arc::new(Shared::default());

        let server = Arc::clone(&shared);
        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(stream) = stream else { break };
                serve(&server, stream);
            }
        });

        Self { port, shared }
    }

    pub(crate) fn port(&self) -> u16 {
        self.port
    }

    /// Answers commands matching `key` (a full line or a command token).
    pub(crate) fn reply_to(&self, key: &str, reply: &str) {
        self.shared
            .replies
            .lock()
            .insert(key.to_string(), Some(reply.to_string()));
    }

    /// Never answers commands matching `key`.
    pub(crate) fn stay_silent(&self, key: &str) {
        self.shared.replies.lock().insert(key.to_string(), None);
    }

    /// Writes `line` to the client's main socket.
    pub(crate) fn push_main(&self, line: &str) {
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut main = self.shared.main.lock();
        while main.is_none() {
            if self.shared.main_cv.wait_until(&mut main, deadline).timed_out() {
                panic!("client never connected");
            }
        }
        if let Some(stream) = main.as_mut() {
            writeln!(stream, "{line}").expect("write main");
        }
    }

    /// Waits for a received line satisfying `pred`.
    pub(crate) fn wait_for(
        &self,
        timeout: Duration,
        mut pred: impl FnMut(Socket, &str) -> bool,
    ) -> Option<String> {
        let deadline = Instant::now() + timeout;
        let mut received = self.shared.received.lock();
        loop {
            if let Some((_, line)) = received.iter().find(|(s, l)| pred(*s, l)) {
                return Some(line.clone());
            }
            if self
                .shared
                .received_cv
                .wait_until(&mut received, deadline)
                .timed_out()
            {
                return None;
            }
        }
    }

    /// Every line received so far on `socket`.
    pub(crate) fn received(&self, socket: Socket) -> Vec<String> {
        self.shared
            .received
            .lock()
            .iter()
            .filter(|(s, _)| *s == socket)
            .map(|(_, l)| l.clone())
            .collect()
    }
}

fn serve(shared: &Arc<Shared>, mut main: TcpStream) {
    let imm_listener = TcpListener::bind("127.0.0.1:0").expect("bind immediate");
    let imm_port = imm_listener.local_addr().expect("immediate addr").port();

    writeln!(main, "ImmPort: {imm_port}").expect("write port");
    writeln!(main, "Code: fake-link").expect("write code");

    let Ok((imm, _)) = imm_listener.accept() else {
        return;
    };
    let mut imm_write = imm.try_clone().expect("clone immediate");
    let mut lines = BufReader::new(imm).lines();

    match lines.next() {
        Some(Ok(link)) if link.trim() == "Link fake-link" => {
            writeln!(imm_write, "Success").expect("write link reply");
        }
        _ => return,
    }

    let reader = main.try_clone().expect("clone main");
    *shared.main.lock() = Some(main);
    shared.main_cv.notify_all();

    let main_shared = Arc::clone(shared);
    thread::spawn(move || {
        for line in BufReader::new(reader).lines() {
            let Ok(line) = line else { break };
            main_shared.record(Socket::Main, line);
        }
    });

    for line in lines {
        let Ok(line) = line else { break };
        let reply = shared.reply_for(&line);
        shared.record(Socket::Immediate, line);
        if let Some(reply) = reply
            && writeln!(imm_write, "{reply}").is_err()
        {
            break;
        }
    }

    *shared.main.lock() = None;
}
