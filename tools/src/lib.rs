//! Inspection and decoding for captured slipstream packets.
//!
//! Captures are raw packet bytes, one packet per file, as written by
//! `race-sim --capture`. This crate provides:
//!
//! - Packet kind detection from length
//! - A checksum-level inspection that works on damaged packets
//! - Full decoding into a JSON-friendly view, or a pretty text rendering
//!
//! # Design Principles
//!
//! - **First-class tooling** - These tools are part of the product, not afterthoughts.
//! - **Human-readable output** - Fixed-point values are shown as decimals next to their raw form.

use std::fmt::Write as _;

use fixmath::{Fixed, Vec2};
use serde::Serialize;
use wire::{
    crc16, decode_game_state, decode_input, GameStatePacket, InputSample, PacketKind, PlayerId,
    WireResult, GAME_STATE_PACKET_SIZE, INPUT_PACKET_SIZE,
};

/// Guesses the packet layout from its length.
#[must_use]
pub const fn detect_kind(bytes: &[u8]) -> Option<PacketKind> {
    match bytes.len() {
        INPUT_PACKET_SIZE => Some(PacketKind::Input),
        GAME_STATE_PACKET_SIZE => Some(PacketKind::GameState),
        _ => None,
    }
}

/// Checksum-level summary of a packet that may not decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InspectReport {
    pub len: usize,
    pub kind: Option<String>,
    pub player_id: Option<u8>,
    pub frame: Option<u32>,
    pub crc_expected: Option<u16>,
    pub crc_found: Option<u16>,
    pub checksum_ok: bool,
    /// Why a full decode failed, if it did.
    pub error: Option<String>,
}

/// Inspects `bytes` without requiring them to be a valid packet.
#[must_use]
pub fn inspect_packet(bytes: &[u8]) -> InspectReport {
    let kind = detect_kind(bytes);
    let (crc_expected, crc_found) = match bytes.len().checked_sub(2) {
        Some(body) if kind.is_some() => (
            Some(crc16(&bytes[..body])),
            Some(u16::from_le_bytes([bytes[body], bytes[body + 1]])),
        ),
        _ => (None, None),
    };
    let (player_id, frame) = match kind {
        Some(PacketKind::Input) => (Some(bytes[0]), Some(read_u32(bytes, 5))),
        Some(PacketKind::GameState) => (Some(bytes[1]), Some(read_u32(bytes, 2))),
        None => (None, None),
    };
    let error = decode_packet(bytes, None, None).err().map(|err| err.to_string());
    InspectReport {
        len: bytes.len(),
        kind: kind.map(|kind| kind.to_string()),
        player_id,
        frame,
        crc_expected,
        crc_found,
        checksum_ok: crc_expected.is_some() && crc_expected == crc_found,
        error,
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

/// A decoded packet shaped for JSON output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedPacket {
    Input(InputView),
    GameState(GameStateView),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputView {
    pub player_id: u8,
    pub frame: u32,
    pub timestamp: u16,
    pub throttle: i8,
    pub brake: i8,
    pub steering: i8,
    pub buttons: u8,
}

impl From<&InputSample> for InputView {
    fn from(sample: &InputSample) -> Self {
        Self {
            player_id: sample.player_id.raw(),
            frame: sample.frame,
            timestamp: sample.timestamp,
            throttle: sample.throttle,
            brake: sample.brake,
            steering: sample.steering,
            buttons: sample.buttons.raw(),
        }
    }
}

/// A 16.16 value with its decimal reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FixedView {
    pub raw: i32,
    pub value: f64,
}

impl From<Fixed> for FixedView {
    fn from(fixed: Fixed) -> Self {
        Self {
            raw: fixed.raw(),
            value: fixed.to_f64(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameStateView {
    pub phase: String,
    pub player_id: u8,
    pub frame: u32,
    pub timestamp: u16,
    pub position: [FixedView; 2],
    pub velocity: [FixedView; 2],
    pub heading: FixedView,
    pub checkpoint_index: u8,
    pub lap_count: u8,
    pub finished: bool,
}

fn vec_view(v: Vec2) -> [FixedView; 2] {
    [v.x.into(), v.y.into()]
}

impl From<&GameStatePacket> for GameStateView {
    fn from(packet: &GameStatePacket) -> Self {
        Self {
            phase: format!("{:?}", packet.phase),
            player_id: packet.player_id.raw(),
            frame: packet.frame,
            timestamp: packet.timestamp,
            position: vec_view(packet.position),
            velocity: vec_view(packet.velocity),
            heading: packet.heading.into(),
            checkpoint_index: packet.checkpoint_index,
            lap_count: packet.lap_count,
            finished: packet.finished,
        }
    }
}

/// Fully decodes a packet.
///
/// `kind` defaults to [`detect_kind`]; an unrecognized length is decoded as
/// input so the decoder reports the size problem. Game-state packets are
/// checked against `expected_player`, which defaults to the id the packet
/// claims.
pub fn decode_packet(
    bytes: &[u8],
    kind: Option<PacketKind>,
    expected_player: Option<PlayerId>,
) -> WireResult<DecodedPacket> {
    match kind.or_else(|| detect_kind(bytes)).unwrap_or(PacketKind::Input) {
        PacketKind::Input => Ok(DecodedPacket::Input((&decode_input(bytes)?).into())),
        PacketKind::GameState => {
            let expected = expected_player
                .or_else(|| bytes.get(1).copied().map(PlayerId::new))
                .unwrap_or(PlayerId::HOST);
            let packet = decode_game_state(bytes, expected)?;
            Ok(DecodedPacket::GameState((&packet).into()))
        }
    }
}

/// Renders a decoded packet as indented text.
#[must_use]
pub fn format_decode_pretty(packet: &DecodedPacket) -> String {
    let mut out = String::new();
    match packet {
        DecodedPacket::Input(input) => {
            let _ = writeln!(
                out,
                "input player={} frame={} timestamp={}",
                input.player_id, input.frame, input.timestamp
            );
            let _ = writeln!(
                out,
                "  throttle={} brake={} steering={} buttons=0x{:02x}",
                input.throttle, input.brake, input.steering, input.buttons
            );
        }
        DecodedPacket::GameState(state) => {
            let _ = writeln!(
                out,
                "game_state phase={} player={} frame={} timestamp={}",
                state.phase, state.player_id, state.frame, state.timestamp
            );
            let _ = writeln!(
                out,
                "  position=({:.4}, {:.4}) velocity=({:.4}, {:.4}) heading={:.4}",
                state.position[0].value,
                state.position[1].value,
                state.velocity[0].value,
                state.velocity[1].value,
                state.heading.value
            );
            let _ = writeln!(
                out,
                "  checkpoint={} laps={} finished={}",
                state.checkpoint_index, state.lap_count, state.finished
            );
        }
    }
    out.trim_end().to_string()
}
