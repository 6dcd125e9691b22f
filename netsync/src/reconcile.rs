//! Divergence detection and correction of the remote car.

use fixmath::{Fixed, Vec2};
use physics::CarState;
use tracing::debug;

/// Heading error that always warrants a correction (0.1 rad).
pub const HEADING_THRESHOLD: Fixed = Fixed::from_raw(6554);

/// The parts of a car's state that peers compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CarSnapshot {
    /// Frame the snapshot describes (state before simulating it).
    pub frame: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: Fixed,
}

impl CarSnapshot {
    #[must_use]
    pub const fn of(frame: u32, car: &CarState) -> Self {
        Self {
            frame,
            position: car.position,
            velocity: car.velocity,
            heading: car.heading,
        }
    }
}

/// How far a prediction was from the authoritative state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Divergence {
    pub position_error: Fixed,
    pub heading_error: Fixed,
}

impl Divergence {
    /// Measures `actual` against `predicted`.
    ///
    /// Heading error is the absolute angular difference wrapped into `[0, pi]`.
    #[must_use]
    pub fn measure(predicted: &CarSnapshot, actual: &CarSnapshot) -> Self {
        Self {
            position_error: predicted.position.distance(actual.position),
            heading_error: angle_between(predicted.heading, actual.heading),
        }
    }

    /// Returns `true` if either error crosses its threshold.
    #[must_use]
    pub fn exceeds(&self, position_threshold: Fixed) -> bool {
        self.position_error > position_threshold || self.heading_error > HEADING_THRESHOLD
    }
}

fn angle_between(a: Fixed, b: Fixed) -> Fixed {
    let two_pi = i64::from(Fixed::TWO_PI.raw());
    let diff = (i64::from(a.raw()) - i64::from(b.raw())).rem_euclid(two_pi);
    Fixed::from_wide(diff.min(two_pi - diff))
}

/// Measures the prediction for a frame against the authoritative state and
/// returns the divergence when it is large enough to warrant a correction.
///
/// This only signals; see [`CorrectionPolicy`] for what the session does next.
#[must_use]
pub fn should_rollback(
    predicted: &CarSnapshot,
    actual: &CarSnapshot,
    threshold: Fixed,
) -> Option<Divergence> {
    let divergence = Divergence::measure(predicted, actual);
    if !divergence.exceeds(threshold) {
        return None;
    }
    debug!(
        frame = actual.frame,
        position_error = %divergence.position_error,
        heading_error = %divergence.heading_error,
        "prediction diverged"
    );
    Some(divergence)
}

/// What to do with the remote car when its prediction diverged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CorrectionPolicy {
    /// Replace velocity and heading, and shift the position by the full
    /// position error at once.
    Snap,
    /// Replace velocity and heading, and spread the position error over
    /// `frames` ticks.
    Blend { frames: u8 },
}

impl Default for CorrectionPolicy {
    fn default() -> Self {
        Self::Blend { frames: 4 }
    }
}

/// An in-progress positional blend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlendCorrection {
    step: Vec2,
    remaining: u8,
}

impl BlendCorrection {
    /// Splits `offset` into `frames` equal steps. Zero frames yields `None`.
    #[must_use]
    pub fn new(offset: Vec2, frames: u8) -> Option<Self> {
        let divisor = Fixed::from_int(i32::from(frames));
        let x = offset.x.try_div(divisor).ok()?;
        let y = offset.y.try_div(divisor).ok()?;
        Some(Self {
            step: Vec2::new(x, y),
            remaining: frames,
        })
    }

    /// Frames left to apply.
    #[must_use]
    pub const fn remaining(&self) -> u8 {
        self.remaining
    }

    /// Applies one step to `car`. Returns `false` once the blend is exhausted.
    pub fn apply(&mut self, car: &mut CarState) -> bool {
        if self.remaining == 0 {
            return false;
        }
        car.position += self.step;
        self.remaining -= 1;
        self.remaining > 0
    }
}

/// Applies `policy` to `car`, returning the blend still to run, if any.
///
/// `car` may already be several frames past `actual.frame`, so the position
/// is moved by the error measured at that frame rather than overwritten.
pub fn correct(
    car: &mut CarState,
    predicted: &CarSnapshot,
    actual: &CarSnapshot,
    policy: CorrectionPolicy,
) -> Option<BlendCorrection> {
    let offset = actual.position - predicted.position;
    car.velocity = actual.velocity;
    car.speed = actual.velocity.length();
    car.heading = actual.heading;
    let blend = match policy {
        CorrectionPolicy::Snap => None,
        CorrectionPolicy::Blend { frames } => BlendCorrection::new(offset, frames),
    };
    if blend.is_none() {
        car.position += offset;
    }
    blend
}
