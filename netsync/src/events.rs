//! Events crossing into and out of a session.

use fixmath::Fixed;
use physics::RaceEvent;
use wire::PacketKind;

use crate::error::SyncError;
use crate::reconcile::CorrectionPolicy;
use crate::role::Role;

/// Something the transport observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkEvent {
    /// The link came up with this peer in `role`.
    Connected { role: Role },
    /// The link dropped.
    Disconnected,
    /// Raw input packet from the other peer.
    Input(Vec<u8>),
    /// Raw game-state packet from the other peer.
    GameState(Vec<u8>),
}

impl LinkEvent {
    /// The packet layout carried, if any.
    #[must_use]
    pub const fn packet_kind(&self) -> Option<PacketKind> {
        match self {
            Self::Input(_) => Some(PacketKind::Input),
            Self::GameState(_) => Some(PacketKind::GameState),
            Self::Connected { .. } | Self::Disconnected => None,
        }
    }
}

/// Something the session did that the game loop may care about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Emitted by the physics step.
    Race(RaceEvent),
    /// A packet was dropped without touching session state.
    PacketRejected { kind: PacketKind, error: SyncError },
    /// The remote car's prediction crossed a threshold.
    Diverged {
        frame: u32,
        position_error: Fixed,
        heading_error: Fixed,
    },
    /// The remote car was corrected toward authoritative state.
    Corrected { frame: u32, policy: CorrectionPolicy },
    /// The link came up or went down; the race was reset either way.
    ConnectionChanged { connected: bool },
}

impl From<RaceEvent> for SyncEvent {
    fn from(event: RaceEvent) -> Self {
        Self::Race(event)
    }
}
