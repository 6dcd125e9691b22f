//! Bounded hand-off from the transport thread to the session.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::warn;

use crate::events::LinkEvent;

/// Why an event could not be queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboxError {
    /// The queue is at capacity; the event was dropped.
    Full,
    /// The session side has gone away.
    Disconnected,
}

impl fmt::Display for InboxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "inbox full, event dropped"),
            Self::Disconnected => write!(f, "inbox receiver disconnected"),
        }
    }
}

impl std::error::Error for InboxError {}

/// Creates a queue holding at most `capacity` events.
#[must_use]
pub fn channel(capacity: usize) -> (InboxSender, InboxReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    let dropped = Arc::new(AtomicU64::new(0));
    (
        InboxSender {
            tx,
            dropped: Arc::clone(&dropped),
        },
        InboxReceiver { rx, dropped },
    )
}

/// Transport-side handle. Never blocks.
#[derive(Debug, Clone)]
pub struct InboxSender {
    tx: Sender<LinkEvent>,
    dropped: Arc<AtomicU64>,
}

impl InboxSender {
    /// Queues `event`, dropping it if the inbox is full.
    pub fn send(&self, event: LinkEvent) -> Result<(), InboxError> {
        match self.tx.try_send(event) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(event)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                warn!(kind = ?event.packet_kind(), dropped, "inbox full, dropping link event");
                Err(InboxError::Full)
            }
            Err(TrySendError::Disconnected(_)) => Err(InboxError::Disconnected),
        }
    }
}

/// Session-side handle.
#[derive(Debug)]
pub struct InboxReceiver {
    rx: Receiver<LinkEvent>,
    dropped: Arc<AtomicU64>,
}

impl InboxReceiver {
    /// Takes every queued event without blocking.
    pub fn drain(&self) -> impl Iterator<Item = LinkEvent> + '_ {
        self.rx.try_iter()
    }

    /// Events waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    /// Events dropped because the inbox was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivers_in_order() {
        let (tx, rx) = channel(4);
        tx.send(LinkEvent::Input(vec![1])).unwrap();
        tx.send(LinkEvent::Disconnected).unwrap();
        let events: Vec<_> = rx.drain().collect();
        assert_eq!(events, vec![LinkEvent::Input(vec![1]), LinkEvent::Disconnected]);
        assert!(rx.is_empty());
    }

    #[test]
    fn full_inbox_drops_and_counts() {
        let (tx, rx) = channel(2);
        tx.send(LinkEvent::Input(vec![1])).unwrap();
        tx.send(LinkEvent::Input(vec![2])).unwrap();
        assert_eq!(tx.send(LinkEvent::Input(vec![3])), Err(InboxError::Full));
        assert_eq!(rx.dropped(), 1);
        assert_eq!(rx.len(), 2);
    }

    #[test]
    fn disconnected_receiver() {
        let (tx, rx) = channel(2);
        drop(rx);
        assert_eq!(tx.send(LinkEvent::Disconnected), Err(InboxError::Disconnected));
    }

    #[test]
    fn crosses_threads() {
        let (tx, rx) = channel(16);
        let handle = std::thread::spawn(move || {
            for i in 0..10u8 {
                tx.send(LinkEvent::Input(vec![i])).unwrap();
            }
        });
        handle.join().unwrap();
        assert_eq!(rx.drain().count(), 10);
    }
}
