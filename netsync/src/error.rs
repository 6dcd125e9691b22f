//! Error types for session operations.

use std::fmt;

/// Result type for session operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised while feeding packets into a session.
///
/// None of these are fatal: the offending packet is dropped and the session
/// carries on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The packet failed to decode or came from the wrong peer.
    Decode(wire::DecodeError),

    /// A car slot the world does not have.
    UnknownCar { index: usize },

    /// A game-state packet older than one already accepted.
    StaleGameState { frame: u32, newest: u32 },
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(err) => write!(f, "packet rejected: {err}"),
            Self::UnknownCar { index } => write!(f, "no car in slot {index}"),
            Self::StaleGameState { frame, newest } => {
                write!(f, "game state for frame {frame} is older than frame {newest}")
            }
        }
    }
}

impl std::error::Error for SyncError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Decode(err) => Some(err),
            Self::UnknownCar { .. } | Self::StaleGameState { .. } => None,
        }
    }
}

impl From<wire::DecodeError> for SyncError {
    fn from(err: wire::DecodeError) -> Self {
        Self::Decode(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use wire::{DecodeError, PacketKind};

    #[test]
    fn wraps_decode_errors() {
        let inner = DecodeError::ChecksumMismatch {
            kind: PacketKind::Input,
            expected: 1,
            found: 2,
        };
        let err: SyncError = inner.clone().into();
        assert_eq!(err, SyncError::Decode(inner));
        assert!(err.to_string().contains("checksum"));
        assert!(err.source().is_some());
    }

    #[test]
    fn unknown_car_display() {
        let err = SyncError::UnknownCar { index: 3 };
        assert!(err.to_string().contains('3'));
        assert!(err.source().is_none());
    }

    #[test]
    fn stale_game_state_display() {
        let err = SyncError::StaleGameState {
            frame: 5,
            newest: 12,
        };
        assert!(err.to_string().contains("frame 5"));
        assert!(err.to_string().contains("12"));
    }
}
