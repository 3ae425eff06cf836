//! Single-slot handoff for immediate-socket replies.
//!
//! The caller arms the slot with its [`CommandSeq`], sends the command, and
//! blocks on the condition variable. The worker fills the slot when the
//! matching reply arrives. Only one awaited request is ever outstanding
//! (callers serialize through the manager's immediate lock), so one slot is
//! all the protocol needs; it is not a queue.
//!
//! A reply carrying any other sequence number (for example a reply that
//! arrives after its caller timed out) is dropped.

// ============================================================================
// Imports
// ============================================================================

use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::debug;

use crate::identifiers::CommandSeq;
use crate::protocol::InboundMessage;

// ============================================================================
// ImmediateMailbox
// ============================================================================

#[derive(Debug, Default)]
struct Slot {
    awaiting: Option<CommandSeq>,
    reply: Option<InboundMessage>,
}

/// One-slot mailbox between the worker and a blocked caller.
#[derive(Debug, Default)]
pub(crate) struct ImmediateMailbox {
    slot: Mutex<Slot>,
    filled: Condvar,
}

impl ImmediateMailbox {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Prepares the slot for the reply to `seq`, discarding anything stale.
    pub(crate) fn arm(&self, seq: CommandSeq) {
        let mut slot = self.slot.lock();
        slot.awaiting = Some(seq);
        slot.reply = None;
    }

    /// Hands `reply` to the caller waiting on `seq`.
    ///
    /// Returns `false` if nobody is waiting for that sequence number.
    pub(crate) fn deliver(&self, seq: CommandSeq, reply: InboundMessage) -> bool {
        let mut slot = self.slot.lock();
        if slot.awaiting != Some(seq) || slot.reply.is_some() {
            debug!(%seq, "Dropping reply with no waiting caller");
            return false;
        }
        slot.reply = Some(reply);
        self.filled.notify_all();
        true
    }

    /// Fails whichever request is currently awaited.
    pub(crate) fn cancel(&self, reason: &str) -> bool {
        let mut slot = self.slot.lock();
        if slot.awaiting.is_none() || slot.reply.is_some() {
            return false;
        }
        slot.reply = Some(InboundMessage::failure(reason, None));
        self.filled.notify_all();
        true
    }

    /// Blocks until the reply to `seq` arrives or `timeout` elapses.
    ///
    /// Always returns a message, plus whether the deadline passed: on
    /// timeout an `Error`-kind message naming `causal_command` is
    /// synthesized. Never returns early on timeout.
    pub(crate) fn wait(
        &self,
        seq: CommandSeq,
        timeout: Duration,
        causal_command: &str,
    ) -> (InboundMessage, bool) {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();

        loop {
            if slot.awaiting != Some(seq) {
                let reply = InboundMessage::failure(
                    "reply slot was re-armed by another request",
                    Some(causal_command.to_string()),
                );
                return (reply, false);
            }

            if let Some(mut reply) = slot.reply.take() {
                slot.awaiting = None;
                if reply.causal_command.is_none() {
                    reply.causal_command = Some(causal_command.to_string());
                }
                return (reply, false);
            }

            if self.filled.wait_until(&mut slot, deadline).timed_out() && slot.reply.is_none() {
                slot.awaiting = None;
                let reply = InboundMessage::failure(
                    format!("no reply within {}ms", timeout.as_millis()),
                    Some(causal_command.to_string()),
                );
                return (reply, true);
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;
    use std::thread;

    use crate::identifiers::IdGenerator;
    use crate::protocol::decode_reply;

    #[test]
    fn test_deliver_then_wait() {
        let ids = IdGenerator::new();
        let mailbox = ImmediateMailbox::new();
        let seq = ids.next_seq();

        mailbox.arm(seq);
        assert!(mailbox.deliver(seq, decode_reply("Success", None)));

        let (reply, timed_out) = mailbox.wait(seq, Duration::from_secs(1), "RESET_CLOCK");
        assert!(!timed_out);
        assert!(reply.immediate_reply_succeeded());
        assert_eq!(reply.causal_command.as_deref(), Some("RESET_CLOCK"));
    }

    #[test]
    fn test_wait_wakes_on_delivery_from_other_thread() {
        let ids = IdGenerator::new();
        let mailbox = Arc::new(ImmediateMailbox::new());
        let seq = ids.next_seq();
        mailbox.arm(seq);

        let worker = Arc::clone(&mailbox);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            worker.deliver(seq, decode_reply("MSG_DURATION 900", None));
        });

        let (reply, _) = mailbox.wait(seq, Duration::from_secs(5), "AUDIO_GET_SOUND_LENGTH a b");
        assert_eq!(reply.reply_text(), "MSG_DURATION 900");
        handle.join().expect("delivery thread");
    }

    #[test]
    fn test_timeout_synthesizes_failure_no_earlier_than_deadline() {
        let ids = IdGenerator::new();
        let mailbox = ImmediateMailbox::new();
        let seq = ids.next_seq();
        mailbox.arm(seq);

        let started = Instant::now();
        let (reply, timed_out) = mailbox.wait(seq, Duration::from_millis(50), "VERSION");
        let elapsed = started.elapsed();

        assert!(timed_out);
        assert!(reply.is_error());
        assert!(elapsed >= Duration::from_millis(50));
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_stale_reply_is_not_delivered_to_next_caller() {
        let ids = IdGenerator::new();
        let mailbox = ImmediateMailbox::new();
        let first = ids.next_seq();
        let second = ids.next_seq();

        mailbox.arm(first);
        let _ = mailbox.wait(first, Duration::from_millis(5), "VERSION");

        mailbox.arm(second);
        assert!(!mailbox.deliver(first, decode_reply("1.0", None)));
        assert!(mailbox.deliver(second, decode_reply("42", None)));
        let (reply, _) = mailbox.wait(second, Duration::from_secs(1), "CLIENT_NUMBER");
        assert_eq!(reply.reply_text(), "42");
    }

    #[test]
    fn test_cancel_unblocks_waiter() {
        let ids = IdGenerator::new();
        let mailbox = Arc::new(ImmediateMailbox::new());
        let seq = ids.next_seq();
        mailbox.arm(seq);

        let canceller = Arc::clone(&mailbox);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            canceller.cancel("disconnected")
        });

        let started = Instant::now();
        let (reply, timed_out) = mailbox.wait(seq, Duration::from_secs(10), "VERSION");
        assert!(!timed_out);
        assert!(reply.is_error());
        assert!(started.elapsed() < Duration::from_secs(5));
        assert!(handle.join().expect("cancel thread"));
    }
}
