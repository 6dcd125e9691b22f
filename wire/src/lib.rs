//! Fixed-layout packets for the slipstream race core.
//!
//! Two packet kinds cross the link: a 13-byte [`InputSample`] sent every
//! frame, and a 33-byte [`GameStatePacket`] carrying one peer's authoritative
//! car state. Both are little-endian with a trailing CRC-16 over every
//! preceding byte.
//!
//! # Design Principles
//!
//! - **Checksum first** - No field is trusted before the CRC validates.
//! - **All or nothing** - A packet that fails any check is dropped whole.
//! - **No floats on the wire** - Physical quantities travel as raw 16.16.
//!
//! # Example
//!
//! ```
//! use wire::{decode_input, ControlState, InputSample, PlayerId};
//!
//! let controls = ControlState { throttle: 0.5, steering: -0.25, ..ControlState::default() };
//! let sample = InputSample::quantize(PlayerId::HOST, 42, 700, &controls);
//! let bytes = sample.to_bytes();
//!
//! assert_eq!(decode_input(&bytes).unwrap(), sample);
//! ```

mod checksum;
mod error;
mod input;
mod state;
mod types;

pub use checksum::crc16;
pub use error::{DecodeError, EncodeError, PacketKind, WireResult};
pub use input::{
    decode_input, encode_input, ControlState, InputSample, CONTROL_SCALE, INPUT_PACKET_SIZE,
};
pub use state::{decode_game_state, encode_game_state, GameStatePacket, GAME_STATE_PACKET_SIZE};
pub use types::{Buttons, GamePhase, PlayerId};
