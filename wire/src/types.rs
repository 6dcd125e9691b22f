//! Small value types carried in packets.

use crate::error::DecodeError;

/// Identifies one of the two peers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerId(u8);

impl PlayerId {
    /// The hosting peer.
    pub const HOST: Self = Self(0);
    /// The joining peer.
    pub const CLIENT: Self = Self(1);

    /// Creates a player id from a raw byte.
    #[must_use]
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw id.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns the car slot for this player (0 or 1), if it is one of the two peers.
    #[must_use]
    pub const fn slot(self) -> Option<usize> {
        match self.0 {
            0 | 1 => Some(self.0 as usize),
            _ => None,
        }
    }
}

impl From<u8> for PlayerId {
    fn from(raw: u8) -> Self {
        Self(raw)
    }
}

impl From<PlayerId> for u8 {
    fn from(id: PlayerId) -> Self {
        id.0
    }
}

/// Coarse game phase carried in the first byte of a game-state packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum GamePhase {
    Menu = 0,
    Lobby = 1,
    Countdown = 2,
    #[default]
    Racing = 3,
    Results = 4,
    Settings = 5,
}

impl GamePhase {
    /// Parses a phase from its wire code.
    pub fn parse(code: u8) -> Result<Self, DecodeError> {
        match code {
            0 => Ok(Self::Menu),
            1 => Ok(Self::Lobby),
            2 => Ok(Self::Countdown),
            3 => Ok(Self::Racing),
            4 => Ok(Self::Results),
            5 => Ok(Self::Settings),
            _ => Err(DecodeError::InvalidPhase { code }),
        }
    }

    /// Returns the wire code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

/// Button bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Buttons(u8);

impl Buttons {
    /// Boost button.
    pub const BOOST: u8 = 1 << 0;
    /// Handbrake button.
    pub const HANDBRAKE: u8 = 1 << 1;
    /// Horn button.
    pub const HORN: u8 = 1 << 2;
    /// Pause button.
    pub const PAUSE: u8 = 1 << 3;

    /// No buttons held.
    pub const NONE: Self = Self(0);

    /// Creates a bitmask from a raw value.
    #[must_use]
    pub const fn from_raw(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw bits.
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Returns `true` if every bit of `mask` is set.
    #[must_use]
    pub const fn contains(self, mask: u8) -> bool {
        self.0 & mask == mask
    }

    /// Returns a copy with the bits of `mask` set.
    #[must_use]
    pub const fn with(self, mask: u8) -> Self {
        Self(self.0 | mask)
    }
}
