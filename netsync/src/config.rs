//! Session configuration.

use fixmath::Fixed;
use physics::PhysicsConfig;

use crate::reconcile::CorrectionPolicy;

/// Tuning for a [`SyncSession`](crate::SyncSession).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncConfig {
    /// Simulation tuning; must match on both peers.
    pub physics: PhysicsConfig,
    /// Position error above which a remote prediction is corrected.
    pub rollback_threshold: Fixed,
    /// What to do when a prediction diverged.
    pub correction: CorrectionPolicy,
    /// Link events buffered between the transport and the session.
    pub inbox_capacity: usize,
    /// Frames the remote peer may lag before its input counts as late.
    pub max_prediction_frames: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            rollback_threshold: Fixed::HALF,
            correction: CorrectionPolicy::default(),
            inbox_capacity: 64,
            max_prediction_frames: 8,
        }
    }
}

impl SyncConfig {
    /// Small track, immediate snaps and a tiny inbox.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            physics: PhysicsConfig::for_testing(),
            rollback_threshold: Fixed::HALF,
            correction: CorrectionPolicy::Snap,
            inbox_capacity: 8,
            max_prediction_frames: 4,
        }
    }
}
