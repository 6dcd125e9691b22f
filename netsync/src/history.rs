//! Local and remote input histories with hold-last prediction.

use physics::ControlInput;
use tracing::debug;
use wire::{InputSample, PlayerId};

use crate::ring::{FrameRing, Resolved};

/// Frames retained per history.
pub const HISTORY_CAPACITY: usize = 64;

/// Ring of input samples.
pub type InputRing = FrameRing<InputSample, HISTORY_CAPACITY>;

/// Which rule produced a predicted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PredictionKind {
    /// No usable history; all controls released.
    Neutral,
    /// The sample actually recorded for the frame.
    Stored,
    /// An earlier sample held over and re-stamped.
    Extrapolated,
}

/// Input for one frame plus how it was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Predicted {
    pub sample: InputSample,
    pub kind: PredictionKind,
}

impl Predicted {
    /// The sample as physics controls.
    #[must_use]
    pub fn control(&self) -> ControlInput {
        control_input(&self.sample)
    }
}

/// Converts a quantized sample to fixed-point physics controls.
#[must_use]
pub fn control_input(sample: &InputSample) -> ControlInput {
    ControlInput::new(
        sample.throttle_fixed(),
        sample.brake_fixed(),
        sample.steering_fixed(),
    )
}

/// Predicts `frame` from `ring`, attributing neutral input to `player`.
#[must_use]
pub fn predict(ring: &InputRing, player: PlayerId, frame: u32) -> Predicted {
    match ring.resolve(frame) {
        Resolved::Empty | Resolved::TooOld => Predicted {
            sample: InputSample::neutral(player, frame),
            kind: PredictionKind::Neutral,
        },
        Resolved::Exact(sample) => Predicted {
            sample: *sample,
            kind: PredictionKind::Stored,
        },
        Resolved::Held { value, .. } => Predicted {
            sample: value.with_frame(frame),
            kind: PredictionKind::Extrapolated,
        },
    }
}

/// The global frame counter and both peers' input rings.
#[derive(Debug, Clone, Default)]
pub struct InputHistory {
    current_frame: u32,
    local: InputRing,
    remote: InputRing,
}

impl InputHistory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The frame about to be simulated.
    #[must_use]
    pub const fn current_frame(&self) -> u32 {
        self.current_frame
    }

    #[must_use]
    pub const fn local(&self) -> &InputRing {
        &self.local
    }

    #[must_use]
    pub const fn remote(&self) -> &InputRing {
        &self.remote
    }

    /// Records this peer's sample. Returns `false` if it fell outside the window.
    pub fn store_local(&mut self, sample: InputSample) -> bool {
        self.local.store(sample.frame, sample)
    }

    /// Records the other peer's sample. Returns `false` if it fell outside the window.
    pub fn store_remote(&mut self, sample: InputSample) -> bool {
        let stored = self.remote.store(sample.frame, sample);
        if !stored {
            debug!(
                frame = sample.frame,
                start = self.remote.start_frame(),
                "remote input outside history window"
            );
        }
        stored
    }

    #[must_use]
    pub fn predict_local(&self, player: PlayerId, frame: u32) -> Predicted {
        predict(&self.local, player, frame)
    }

    #[must_use]
    pub fn predict_remote(&self, player: PlayerId, frame: u32) -> Predicted {
        predict(&self.remote, player, frame)
    }

    /// Moves to the next frame, compacting any ring that fell too far behind.
    pub fn advance_frame(&mut self) -> u32 {
        self.current_frame = self.current_frame.wrapping_add(1);
        let current = self.current_frame;
        if self.local.compact(current) {
            debug!(current, start = self.local.start_frame(), "compacted local history");
        }
        if self.remote.compact(current) {
            debug!(current, start = self.remote.start_frame(), "compacted remote history");
        }
        current
    }

    /// Drops both histories and rewinds to frame zero.
    pub fn clear(&mut self) {
        self.current_frame = 0;
        self.local.clear();
        self.remote.clear();
    }
}
