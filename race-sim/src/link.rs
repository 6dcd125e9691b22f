use netsync::inbox::InboxSender;
use netsync::{InboxError, LinkEvent};
use serde::Serialize;
use tracing::{debug, warn};

use crate::Rng;

/// Fault model for one direction of the link.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LinkFaults {
    /// Percent of packets lost.
    pub drop_percent: u32,
    /// Percent of packets with one byte flipped.
    pub corrupt_percent: u32,
    /// Fixed delivery delay in frames.
    pub delay_frames: u32,
    /// Extra random delay, up to this many frames.
    pub jitter_frames: u32,
}

#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct LinkCounters {
    pub sent: u64,
    pub lost: u64,
    pub corrupted: u64,
    pub delivered: u64,
    pub inbox_full: u64,
}

struct InFlight {
    deliver_at: u32,
    event: LinkEvent,
}

/// One direction of a deterministic lossy link feeding a session inbox.
pub struct LossyLink {
    faults: LinkFaults,
    inbox: InboxSender,
    in_flight: Vec<InFlight>,
    counters: LinkCounters,
}

impl LossyLink {
    pub fn new(faults: LinkFaults, inbox: InboxSender) -> Self {
        Self {
            faults,
            inbox,
            in_flight: Vec::new(),
            counters: LinkCounters::default(),
        }
    }

    pub const fn counters(&self) -> LinkCounters {
        self.counters
    }

    /// Queues a packet sent at `frame`, applying loss, corruption and delay.
    pub fn send(&mut self, frame: u32, event: LinkEvent, rng: &mut Rng) {
        self.counters.sent += 1;
        if rng.percent(self.faults.drop_percent) {
            self.counters.lost += 1;
            debug!(frame, kind = ?event.packet_kind(), "link lost packet");
            return;
        }
        let event = if rng.percent(self.faults.corrupt_percent) {
            self.counters.corrupted += 1;
            corrupt(event, rng)
        } else {
            event
        };
        let jitter = if self.faults.jitter_frames == 0 {
            0
        } else {
            rng.next_u32() % (self.faults.jitter_frames + 1)
        };
        self.in_flight.push(InFlight {
            deliver_at: frame + self.faults.delay_frames + jitter,
            event,
        });
    }

    /// Pushes a control event straight into the inbox.
    pub fn notify(&mut self, event: LinkEvent) {
        self.push(event);
    }

    /// Hands every packet due by `frame` to the inbox, oldest first.
    pub fn deliver(&mut self, frame: u32) {
        let (due, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.in_flight)
            .into_iter()
            .partition(|packet| packet.deliver_at <= frame);
        self.in_flight = pending;
        for packet in due {
            self.push(packet.event);
        }
    }

    fn push(&mut self, event: LinkEvent) {
        match self.inbox.send(event) {
            Ok(()) => self.counters.delivered += 1,
            Err(InboxError::Full) => self.counters.inbox_full += 1,
            Err(InboxError::Disconnected) => warn!("session inbox closed"),
        }
    }
}

fn corrupt(event: LinkEvent, rng: &mut Rng) -> LinkEvent {
    let flip = |mut bytes: Vec<u8>, rng: &mut Rng| {
        if !bytes.is_empty() {
            let index = rng.next_u32() as usize % bytes.len();
            bytes[index] ^= 1 << (rng.next_u32() % 8);
        }
        bytes
    };
    match event {
        LinkEvent::Input(bytes) => LinkEvent::Input(flip(bytes, rng)),
        LinkEvent::GameState(bytes) => LinkEvent::GameState(flip(bytes, rng)),
        other => other,
    }
}
