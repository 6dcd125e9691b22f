//! Error types for wire format operations.

use std::fmt;

use crate::types::PlayerId;

/// Result type for wire format operations.
pub type WireResult<T> = Result<T, DecodeError>;

/// Which packet layout an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PacketKind {
    Input,
    GameState,
}

/// Decode errors. A packet that fails to decode is dropped whole.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Buffer is shorter than the fixed packet layout.
    PacketTooSmall {
        kind: PacketKind,
        actual: usize,
        required: usize,
    },

    /// Buffer is longer than the fixed packet layout.
    TrailingBytes {
        kind: PacketKind,
        actual: usize,
        expected: usize,
    },

    /// Stored checksum does not match the recomputed one.
    ChecksumMismatch {
        kind: PacketKind,
        expected: u16,
        found: u16,
    },

    /// Packet is attributed to a peer other than the expected remote.
    WrongPlayerId { expected: PlayerId, found: PlayerId },

    /// Unknown game phase code.
    InvalidPhase { code: u8 },

    /// A field holds a value outside its documented range.
    ValueOutOfRange { field: &'static str, value: i64 },
}

/// Errors that can occur during encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncodeError {
    BufferTooSmall { needed: usize, available: usize },
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Input => "input",
            Self::GameState => "game state",
        };
        write!(f, "{name}")
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PacketTooSmall {
                kind,
                actual,
                required,
            } => {
                write!(
                    f,
                    "{kind} packet too small: {actual} bytes, need {required}"
                )
            }
            Self::TrailingBytes {
                kind,
                actual,
                expected,
            } => {
                write!(
                    f,
                    "{kind} packet has trailing bytes: {actual} bytes, expected {expected}"
                )
            }
            Self::ChecksumMismatch {
                kind,
                expected,
                found,
            } => {
                write!(
                    f,
                    "{kind} packet checksum mismatch: computed 0x{expected:04X}, found 0x{found:04X}"
                )
            }
            Self::WrongPlayerId { expected, found } => {
                write!(
                    f,
                    "packet from player {} but expected player {}",
                    found.raw(),
                    expected.raw()
                )
            }
            Self::InvalidPhase { code } => write!(f, "invalid game phase: {code}"),
            Self::ValueOutOfRange { field, value } => {
                write!(f, "field {field} out of range: {value}")
            }
        }
    }
}

impl fmt::Display for EncodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BufferTooSmall { needed, available } => {
                write!(f, "buffer too small: need {needed}, have {available}")
            }
        }
    }
}

impl std::error::Error for DecodeError {}

impl std::error::Error for EncodeError {}
