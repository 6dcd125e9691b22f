//! Race events emitted by a simulation step.

use fixmath::Fixed;

/// Something that happened during [`RaceWorld::step`](crate::RaceWorld::step).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RaceEvent {
    /// A car entered its next expected checkpoint.
    CheckpointPassed { car: usize, checkpoint: usize },
    /// A car wrapped past the last checkpoint.
    LapCompleted { car: usize, laps: u8 },
    /// A car completed the required laps.
    Finished { car: usize, race_time_ms: u32 },
    /// A car was pushed back inside the track boundary.
    WallContact { car: usize, impact_speed: Fixed },
    /// Two cars overlapped and exchanged velocities.
    CarContact { first: usize, second: usize },
}

impl RaceEvent {
    /// The car the event concerns, or the first of a pair.
    #[must_use]
    pub const fn car(&self) -> usize {
        match *self {
            Self::CheckpointPassed { car, .. }
            | Self::LapCompleted { car, .. }
            | Self::Finished { car, .. }
            | Self::WallContact { car, .. } => car,
            Self::CarContact { first, .. } => first,
        }
    }
}
