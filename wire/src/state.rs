//! The 33-byte authoritative game-state packet.

use fixmath::{Fixed, Vec2};

use crate::checksum::crc16;
use crate::error::{DecodeError, EncodeError, PacketKind, WireResult};
use crate::input::{check_length, verify_checksum};
use crate::types::{GamePhase, PlayerId};

/// Size of an encoded game-state packet in bytes.
pub const GAME_STATE_PACKET_SIZE: usize = 33;

const CRC_OFFSET: usize = GAME_STATE_PACKET_SIZE - 2;

/// One peer's view of its own car and race progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameStatePacket {
    pub phase: GamePhase,
    pub player_id: PlayerId,
    pub frame: u32,
    pub position: Vec2,
    pub velocity: Vec2,
    pub heading: Fixed,
    pub checkpoint_index: u8,
    pub lap_count: u8,
    pub finished: bool,
    pub timestamp: u16,
}

impl GameStatePacket {
    /// Encodes into a freshly allocated packet.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; GAME_STATE_PACKET_SIZE] {
        let mut out = [0u8; GAME_STATE_PACKET_SIZE];
        write_state(self, &mut out);
        out
    }
}

/// Encodes a game-state packet into `out`, returning the number of bytes written.
pub fn encode_game_state(packet: &GameStatePacket, out: &mut [u8]) -> Result<usize, EncodeError> {
    if out.len() < GAME_STATE_PACKET_SIZE {
        return Err(EncodeError::BufferTooSmall {
            needed: GAME_STATE_PACKET_SIZE,
            available: out.len(),
        });
    }
    write_state(packet, &mut out[..GAME_STATE_PACKET_SIZE]);
    Ok(GAME_STATE_PACKET_SIZE)
}

fn write_state(packet: &GameStatePacket, out: &mut [u8]) {
    out[0] = packet.phase.code();
    out[1] = packet.player_id.raw();
    out[2..6].copy_from_slice(&packet.frame.to_le_bytes());
    out[6..10].copy_from_slice(&packet.position.x.raw().to_le_bytes());
    out[10..14].copy_from_slice(&packet.position.y.raw().to_le_bytes());
    out[14..18].copy_from_slice(&packet.velocity.x.raw().to_le_bytes());
    out[18..22].copy_from_slice(&packet.velocity.y.raw().to_le_bytes());
    out[22..26].copy_from_slice(&packet.heading.raw().to_le_bytes());
    out[26] = packet.checkpoint_index;
    out[27] = packet.lap_count;
    out[28] = u8::from(packet.finished);
    out[29..31].copy_from_slice(&packet.timestamp.to_le_bytes());
    let crc = crc16(&out[..CRC_OFFSET]);
    out[CRC_OFFSET..GAME_STATE_PACKET_SIZE].copy_from_slice(&crc.to_le_bytes());
}

/// Decodes a game-state packet sent by `expected`.
///
/// Checks run in order: length, checksum, player id, then field ranges. The
/// first failure is returned and nothing is produced.
pub fn decode_game_state(buf: &[u8], expected: PlayerId) -> WireResult<GameStatePacket> {
    check_length(buf, PacketKind::GameState, GAME_STATE_PACKET_SIZE)?;
    verify_checksum(buf, PacketKind::GameState)?;

    let player_id = PlayerId::new(buf[1]);
    if player_id != expected {
        return Err(DecodeError::WrongPlayerId {
            expected,
            found: player_id,
        });
    }

    let phase = GamePhase::parse(buf[0])?;
    let finished = match buf[28] {
        0 => false,
        1 => true,
        other => {
            return Err(DecodeError::ValueOutOfRange {
                field: "race_finished",
                value: i64::from(other),
            })
        }
    };

    Ok(GameStatePacket {
        phase,
        player_id,
        frame: read_u32(buf, 2),
        position: Vec2::new(read_fixed(buf, 6), read_fixed(buf, 10)),
        velocity: Vec2::new(read_fixed(buf, 14), read_fixed(buf, 18)),
        heading: read_fixed(buf, 22),
        checkpoint_index: buf[26],
        lap_count: buf[27],
        finished,
        timestamp: u16::from_le_bytes([buf[29], buf[30]]),
    })
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        buf[offset],
        buf[offset + 1],
        buf[offset + 2],
        buf[offset + 3],
    ])
}

fn read_fixed(buf: &[u8], offset: usize) -> Fixed {
    Fixed::from_raw(read_u32(buf, offset) as i32)
}
