// Smell-It — Message Relay Queue
//
// Bounded FIFO hand-off from the TCP task (sole producer) to the display task
// (sole consumer). A full queue makes the producer wait instead of dropping
// messages; the wait is bounded by the caller's timeout.

use std::borrow::Cow;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use heapless::Deque;

use crate::config::*;
use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// RelayMessage
// ---------------------------------------------------------------------------

/// One display update, at most [`RELAY_MSG_SIZE`] bytes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayMessage {
    bytes: heapless::Vec<u8, RELAY_MSG_SIZE>,
}

impl RelayMessage {
    /// Keep the content before the first line terminator (or the whole chunk
    /// when there is none), cut to capacity.
    ///
    /// A chunk without a terminator is delivered as-is rather than held back
    /// for the rest of the line, so a line split across two reads shows up as
    /// two display updates.
    pub fn from_chunk(chunk: &[u8]) -> Self {
        let line_end = chunk
            .iter()
            .position(|&b| b == b'\n' || b == b'\r')
            .unwrap_or(chunk.len());
        let len = line_end.min(RELAY_MSG_SIZE);

        let mut bytes = heapless::Vec::new();
        // `len` never exceeds capacity.
        let _ = bytes.extend_from_slice(&chunk[..len]);
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Content as text; invalid UTF-8 is replaced rather than rejected.
    pub fn as_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }
}

// ---------------------------------------------------------------------------
// RelayQueue
// ---------------------------------------------------------------------------

struct Slots {
    queue: Deque<RelayMessage, RELAY_QUEUE_LENGTH>,
    producer_alive: bool,
    consumer_alive: bool,
}

struct Shared {
    slots: Mutex<Slots>,
    not_empty: Condvar,
    not_full: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Slots> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns the relay storage until [`split`](RelayQueue::split) hands it to the
/// two tasks.
pub struct RelayQueue {
    shared: Arc<Shared>,
}

impl RelayQueue {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                slots: Mutex::new(Slots {
                    queue: Deque::new(),
                    producer_alive: true,
                    consumer_alive: true,
                }),
                not_empty: Condvar::new(),
                not_full: Condvar::new(),
            }),
        }
    }

    pub const fn capacity() -> usize {
        RELAY_QUEUE_LENGTH
    }

    /// Produce the single producer and single consumer handle.
    pub fn split(self) -> (RelayProducer, RelayConsumer) {
        (
            RelayProducer {
                shared: Arc::clone(&self.shared),
            },
            RelayConsumer {
                shared: self.shared,
            },
        )
    }
}

impl Default for RelayQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Network side of the queue.
pub struct RelayProducer {
    shared: Arc<Shared>,
}

impl RelayProducer {
    /// Append `msg`, waiting up to `timeout` for a free slot.
    ///
    /// Returns [`Error::QueueTimeout`] if no slot frees in time; the message is
    /// handed back to nobody and the caller decides what to log.
    pub fn enqueue(&self, msg: RelayMessage, timeout: Duration) -> Result<()> {
        // A timeout too large to add to the clock waits without a deadline.
        let deadline = Instant::now().checked_add(timeout);
        let mut slots = self.shared.lock();

        while slots.queue.is_full() {
            if !slots.consumer_alive {
                return Err(Error::QueueDisconnected);
            }
            slots = match deadline {
                None => self
                    .shared
                    .not_full
                    .wait(slots)
                    .unwrap_or_else(PoisonError::into_inner),
                Some(at) => {
                    let now = Instant::now();
                    if now >= at {
                        return Err(Error::QueueTimeout(timeout));
                    }
                    self.shared
                        .not_full
                        .wait_timeout(slots, at - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
        if !slots.consumer_alive {
            return Err(Error::QueueDisconnected);
        }

        // Checked not full above, under the same lock.
        let _ = slots.queue.push_back(msg);
        drop(slots);
        self.shared.not_empty.notify_one();
        Ok(())
    }
}

impl Drop for RelayProducer {
    fn drop(&mut self) {
        self.shared.lock().producer_alive = false;
        self.shared.not_empty.notify_all();
    }
}

/// Display side of the queue.
pub struct RelayConsumer {
    shared: Arc<Shared>,
}

impl RelayConsumer {
    /// Block until the next message arrives.
    ///
    /// Messages still queued when the producer goes away are drained first.
    pub fn dequeue(&self) -> Result<RelayMessage> {
        self.dequeue_until(None)
    }

    /// Like [`dequeue`](Self::dequeue) but gives up after `timeout`.
    pub fn dequeue_timeout(&self, timeout: Duration) -> Result<RelayMessage> {
        match Instant::now().checked_add(timeout) {
            Some(at) => self.dequeue_until(Some((at, timeout))),
            None => self.dequeue_until(None),
        }
    }

    fn dequeue_until(&self, deadline: Option<(Instant, Duration)>) -> Result<RelayMessage> {
        let mut slots = self.shared.lock();
        loop {
            if let Some(msg) = slots.queue.pop_front() {
                drop(slots);
                self.shared.not_full.notify_one();
                return Ok(msg);
            }
            if !slots.producer_alive {
                return Err(Error::QueueDisconnected);
            }
            slots = match deadline {
                None => self
                    .shared
                    .not_empty
                    .wait(slots)
                    .unwrap_or_else(PoisonError::into_inner),
                Some((at, timeout)) => {
                    let now = Instant::now();
                    if now >= at {
                        return Err(Error::QueueTimeout(timeout));
                    }
                    self.shared
                        .not_empty
                        .wait_timeout(slots, at - now)
                        .unwrap_or_else(PoisonError::into_inner)
                        .0
                }
            };
        }
    }

    /// Messages currently waiting.
    pub fn pending(&self) -> usize {
        self.shared.lock().queue.len()
    }
}

impl Drop for RelayConsumer {
    fn drop(&mut self) {
        self.shared.lock().consumer_alive = false;
        self.shared.not_full.notify_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::mpsc;
    use std::thread;

    fn msg(text: &str) -> RelayMessage {
        RelayMessage::from_chunk(text.as_bytes())
    }

    #[test]
    fn chunk_is_cut_at_first_newline() {
        assert_eq!(msg("hello\nworld").as_bytes(), b"hello");
        assert_eq!(msg("hello\r\n").as_bytes(), b"hello");
    }

    #[test]
    fn chunk_without_terminator_is_kept_whole() {
        assert_eq!(msg("partial line").as_bytes(), b"partial line");
    }

    #[test]
    fn chunk_is_bounded_by_capacity() {
        let long = [b'x'; RELAY_MSG_SIZE + 40];
        let m = RelayMessage::from_chunk(&long);
        assert_eq!(m.len(), RELAY_MSG_SIZE);
    }

    #[test]
    fn leading_newline_yields_empty_message() {
        assert!(msg("\nrest").is_empty());
    }

    #[test]
    fn invalid_utf8_is_rendered_lossily() {
        let m = RelayMessage::from_chunk(&[b'o', b'k', 0xFF]);
        assert_eq!(m.as_text(), "ok\u{FFFD}");
    }

    proptest! {
        #[test]
        fn messages_come_out_in_enqueue_order(
            texts in prop::collection::vec("[a-z ]{0,40}", 0..=RELAY_QUEUE_LENGTH)
        ) {
            let (tx, rx) = RelayQueue::new().split();
            for t in &texts {
                tx.enqueue(msg(t), Duration::ZERO).unwrap();
            }
            for t in &texts {
                let got = rx.dequeue_timeout(Duration::ZERO).unwrap();
                prop_assert_eq!(got.as_bytes(), t.as_bytes());
            }
            prop_assert_eq!(rx.pending(), 0);
        }
    }

    #[test]
    fn full_queue_times_out_without_dropping() {
        let (tx, rx) = RelayQueue::new().split();
        for i in 0..RelayQueue::capacity() {
            tx.enqueue(msg(&format!("m{i}")), Duration::ZERO).unwrap();
        }

        let started = Instant::now();
        let res = tx.enqueue(msg("overflow"), Duration::from_millis(30));
        assert!(matches!(res, Err(Error::QueueTimeout(_))));
        assert!(started.elapsed() >= Duration::from_millis(30));

        // The five queued messages are intact and in order.
        for i in 0..RelayQueue::capacity() {
            assert_eq!(rx.dequeue().unwrap().as_text(), format!("m{i}"));
        }
        assert_eq!(rx.pending(), 0);
    }

    #[test]
    fn sixth_enqueue_blocks_until_a_slot_frees() {
        let (tx, rx) = RelayQueue::new().split();
        for i in 0..5 {
            tx.enqueue(msg(&format!("m{i}")), Duration::ZERO).unwrap();
        }

        let (done_tx, done_rx) = mpsc::channel();
        let producer = thread::spawn(move || {
            let res = tx.enqueue(msg("m5"), Duration::from_secs(5));
            done_tx.send(res.is_ok()).unwrap();
        });

        // Still blocked while nobody consumes.
        assert!(done_rx.recv_timeout(Duration::from_millis(100)).is_err());

        assert_eq!(rx.dequeue().unwrap().as_text(), "m0");
        assert!(done_rx.recv_timeout(Duration::from_secs(5)).unwrap());
        producer.join().unwrap();

        let rest: Vec<String> = (0..5)
            .map(|_| rx.dequeue().unwrap().as_text().into_owned())
            .collect();
        assert_eq!(rest, ["m1", "m2", "m3", "m4", "m5"]);
    }

    #[test]
    fn consumer_wakes_on_enqueue_from_other_thread() {
        let (tx, rx) = RelayQueue::new().split();
        let producer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.enqueue(msg("late"), Duration::ZERO).unwrap();
        });
        assert_eq!(rx.dequeue().unwrap().as_text(), "late");
        producer.join().unwrap();
    }

    #[test]
    fn dequeue_timeout_on_empty_queue() {
        let (_tx, rx) = RelayQueue::new().split();
        assert!(matches!(
            rx.dequeue_timeout(Duration::from_millis(10)),
            Err(Error::QueueTimeout(_))
        ));
    }

    #[test]
    fn unbounded_timeout_waits_without_deadline() {
        let (tx, rx) = RelayQueue::new().split();
        tx.enqueue(msg("hi"), Duration::MAX).unwrap();
        assert_eq!(rx.dequeue_timeout(Duration::MAX).unwrap().as_text(), "hi");

        // Both sides still block and wake normally with no deadline.
        for i in 0..RelayQueue::capacity() {
            tx.enqueue(msg(&format!("m{i}")), Duration::ZERO).unwrap();
        }
        let producer = thread::spawn(move || tx.enqueue(msg("tail"), Duration::MAX).is_ok());
        thread::sleep(Duration::from_millis(20));
        assert_eq!(rx.dequeue_timeout(Duration::MAX).unwrap().as_text(), "m0");
        assert!(producer.join().unwrap());
        assert_eq!(rx.pending(), RelayQueue::capacity());
    }

    #[test]
    fn dropped_producer_drains_then_disconnects() {
        let (tx, rx) = RelayQueue::new().split();
        tx.enqueue(msg("last"), Duration::ZERO).unwrap();
        drop(tx);
        assert_eq!(rx.dequeue().unwrap().as_text(), "last");
        assert!(matches!(rx.dequeue(), Err(Error::QueueDisconnected)));
    }

    #[test]
    fn dropped_consumer_rejects_enqueue() {
        let (tx, rx) = RelayQueue::new().split();
        drop(rx);
        assert!(matches!(
            tx.enqueue(msg("x"), Duration::ZERO),
            Err(Error::QueueDisconnected)
        ));
    }
}
