//! Frame counters and link latency estimates.

use tracing::debug;

/// Latency samples averaged before the mean starts to slide.
pub const LATENCY_WINDOW: u32 = 100;

/// Fractional bits kept in the latency and jitter accumulators.
const SCALE_BITS: u32 = 4;

/// Jitter gain is `1 / 2^JITTER_SHIFT`.
const JITTER_SHIFT: u32 = 4;

/// Snapshot of [`FrameTracker`] for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrackerStats {
    pub local_frame: u32,
    pub remote_frame: u32,
    pub average_latency_ms: u32,
    pub jitter_ms: u32,
    pub latency_samples: u32,
    pub connected: bool,
    pub is_host: bool,
}

/// Tracks how far each peer has simulated and how the link is behaving.
#[derive(Debug, Clone, Default)]
pub struct FrameTracker {
    local_frame: u32,
    remote_frame: u32,
    heard_remote: bool,
    /// Mean latency in 1/16 ms.
    average_latency: i64,
    /// Smoothed latency delta in 1/16 ms.
    jitter: i64,
    last_latency: Option<i64>,
    samples: u32,
    connected: bool,
    is_host: bool,
    max_prediction_frames: u32,
}

impl FrameTracker {
    /// Creates a tracker that flags input as late once the remote peer is
    /// more than `max_prediction_frames` behind.
    #[must_use]
    pub fn new(max_prediction_frames: u32) -> Self {
        Self {
            max_prediction_frames,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn local_frame(&self) -> u32 {
        self.local_frame
    }

    #[must_use]
    pub const fn remote_frame(&self) -> u32 {
        self.remote_frame
    }

    #[must_use]
    pub const fn is_connected(&self) -> bool {
        self.connected
    }

    #[must_use]
    pub const fn is_host(&self) -> bool {
        self.is_host
    }

    pub fn set_connected(&mut self, connected: bool, is_host: bool) {
        self.connected = connected;
        self.is_host = is_host;
    }

    /// Advances the local frame counter.
    pub fn advance(&mut self) -> u32 {
        self.local_frame = self.local_frame.wrapping_add(1);
        self.local_frame
    }

    /// Records a packet stamped by the remote peer at `timestamp` and
    /// received at `now_ms`, both on wrapping 16-bit millisecond clocks.
    pub fn record_remote(&mut self, frame: u32, timestamp: u16, now_ms: u16) {
        if !self.heard_remote || frame > self.remote_frame {
            self.remote_frame = frame;
        }
        self.heard_remote = true;

        let latency = i64::from(now_ms.wrapping_sub(timestamp)) << SCALE_BITS;
        self.samples = (self.samples + 1).min(LATENCY_WINDOW);
        self.average_latency += (latency - self.average_latency) / i64::from(self.samples);

        if let Some(last) = self.last_latency {
            let delta = (latency - last).abs();
            self.jitter += (delta - self.jitter) >> JITTER_SHIFT;
        }
        self.last_latency = Some(latency);
    }

    /// Rounded mean one-way latency in milliseconds.
    #[must_use]
    pub const fn average_latency_ms(&self) -> u32 {
        round_scaled(self.average_latency)
    }

    /// Rounded jitter in milliseconds.
    #[must_use]
    pub const fn jitter_ms(&self) -> u32 {
        round_scaled(self.jitter)
    }

    /// Returns `true` if the latest remote input is too old to keep predicting
    /// `frame` from it.
    #[must_use]
    pub const fn is_input_late(&self, frame: u32) -> bool {
        frame.saturating_sub(self.remote_frame) > self.max_prediction_frames
    }

    #[must_use]
    pub const fn stats(&self) -> TrackerStats {
        TrackerStats {
            local_frame: self.local_frame,
            remote_frame: self.remote_frame,
            average_latency_ms: self.average_latency_ms(),
            jitter_ms: self.jitter_ms(),
            latency_samples: self.samples,
            connected: self.connected,
            is_host: self.is_host,
        }
    }

    /// Zeroes counters, estimates and flags. The lateness limit is kept.
    pub fn reset(&mut self) {
        debug!(
            local_frame = self.local_frame,
            remote_frame = self.remote_frame,
            "resetting frame tracker"
        );
        *self = Self::new(self.max_prediction_frames);
    }
}

const fn round_scaled(value: i64) -> u32 {
    let rounded = (value + (1 << (SCALE_BITS - 1))) >> SCALE_BITS;
    if rounded < 0 {
        0
    } else {
        rounded as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_latency_averages_exactly() {
        let mut tracker = FrameTracker::new(8);
        for frame in 0..10u16 {
            tracker.record_remote(u32::from(frame), frame * 16, frame * 16 + 40);
        }
        assert_eq!(tracker.average_latency_ms(), 40);
        assert_eq!(tracker.jitter_ms(), 0);
        assert_eq!(tracker.remote_frame(), 9);
    }

    #[test]
    fn latency_survives_clock_wrap() {
        let mut tracker = FrameTracker::new(8);
        tracker.record_remote(1, 65_530, 20);
        assert_eq!(tracker.average_latency_ms(), 26);
    }

    #[test]
    fn mean_of_two_samples() {
        let mut tracker = FrameTracker::new(8);
        tracker.record_remote(1, 0, 20);
        tracker.record_remote(2, 0, 40);
        assert_eq!(tracker.average_latency_ms(), 30);
    }

    #[test]
    fn window_caps_sample_count() {
        let mut tracker = FrameTracker::new(8);
        for frame in 0..250 {
            tracker.record_remote(frame, 0, 10);
        }
        assert_eq!(tracker.stats().latency_samples, LATENCY_WINDOW);
        assert_eq!(tracker.average_latency_ms(), 10);
    }

    #[test]
    fn jitter_tracks_variation() {
        let mut tracker = FrameTracker::new(8);
        for frame in 0..200u32 {
            let latency = if frame % 2 == 0 { 20 } else { 60 };
            tracker.record_remote(frame, 0, latency);
        }
        // Alternating 40 ms swings converge toward 40 ms of jitter.
        let jitter = tracker.jitter_ms();
        assert!((35..=40).contains(&jitter), "jitter {jitter}");
    }

    #[test]
    fn out_of_order_frames_keep_highest() {
        let mut tracker = FrameTracker::new(8);
        tracker.record_remote(10, 0, 0);
        tracker.record_remote(7, 0, 0);
        assert_eq!(tracker.remote_frame(), 10);
    }

    #[test]
    fn lateness() {
        let mut tracker = FrameTracker::new(8);
        tracker.record_remote(10, 0, 0);
        assert!(!tracker.is_input_late(18));
        assert!(tracker.is_input_late(19));
        assert!(!tracker.is_input_late(3));
    }

    #[test]
    fn reset_clears_everything_but_limit() {
        let mut tracker = FrameTracker::new(5);
        tracker.set_connected(true, true);
        tracker.advance();
        tracker.record_remote(4, 0, 30);
        tracker.reset();
        assert_eq!(tracker.stats(), TrackerStats::default());
        assert!(tracker.is_input_late(6));
    }
}
