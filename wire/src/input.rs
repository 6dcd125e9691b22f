//! The 13-byte input packet.

use fixmath::{Fixed, FRAC_BITS};

use crate::checksum::crc16;
use crate::error::{DecodeError, EncodeError, PacketKind, WireResult};
use crate::types::{Buttons, PlayerId};

/// Size of an encoded input packet in bytes.
pub const INPUT_PACKET_SIZE: usize = 13;

/// Quantization scale for control axes.
pub const CONTROL_SCALE: i8 = 100;

const CRC_OFFSET: usize = INPUT_PACKET_SIZE - 2;

/// Analog controls as produced by the input collaborator.
///
/// Throttle and brake are in `[0, 1]`, steering in `[-1, 1]`. Out-of-range
/// values are clamped when quantized.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ControlState {
    pub throttle: f32,
    pub brake: f32,
    pub steering: f32,
    pub buttons: Buttons,
}

/// One peer's quantized controls for one frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InputSample {
    pub player_id: PlayerId,
    /// 0..=100
    pub throttle: i8,
    /// 0..=100
    pub brake: i8,
    /// -100..=100
    pub steering: i8,
    pub buttons: Buttons,
    pub frame: u32,
    /// Milliseconds, wrapping at 65536.
    pub timestamp: u16,
}

impl InputSample {
    /// Quantizes analog controls into a sample stamped with `frame` and `timestamp`.
    #[must_use]
    pub fn quantize(
        player_id: PlayerId,
        frame: u32,
        timestamp: u16,
        controls: &ControlState,
    ) -> Self {
        Self {
            player_id,
            throttle: quantize_axis(controls.throttle, 0.0),
            brake: quantize_axis(controls.brake, 0.0),
            steering: quantize_axis(controls.steering, -1.0),
            buttons: controls.buttons,
            frame,
            timestamp,
        }
    }

    /// A sample with no throttle, brake, steering or buttons.
    #[must_use]
    pub const fn neutral(player_id: PlayerId, frame: u32) -> Self {
        Self {
            player_id,
            throttle: 0,
            brake: 0,
            steering: 0,
            buttons: Buttons::NONE,
            frame,
            timestamp: 0,
        }
    }

    /// Returns a copy stamped with a different frame.
    #[must_use]
    pub const fn with_frame(mut self, frame: u32) -> Self {
        self.frame = frame;
        self
    }

    /// Throttle as a fixed-point fraction in `[0, 1]`.
    #[must_use]
    pub const fn throttle_fixed(&self) -> Fixed {
        axis_to_fixed(self.throttle)
    }

    /// Brake as a fixed-point fraction in `[0, 1]`.
    #[must_use]
    pub const fn brake_fixed(&self) -> Fixed {
        axis_to_fixed(self.brake)
    }

    /// Steering as a fixed-point fraction in `[-1, 1]`.
    #[must_use]
    pub const fn steering_fixed(&self) -> Fixed {
        axis_to_fixed(self.steering)
    }

    /// Encodes into a freshly allocated packet.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; INPUT_PACKET_SIZE] {
        let mut out = [0u8; INPUT_PACKET_SIZE];
        write_input(self, &mut out);
        out
    }
}

fn quantize_axis(value: f32, min: f32) -> i8 {
    // NaN clamps to NaN and casts to zero.
    (value.clamp(min, 1.0) * f32::from(CONTROL_SCALE)).round() as i8
}

const fn axis_to_fixed(value: i8) -> Fixed {
    Fixed::from_raw(((value as i32) << FRAC_BITS) / CONTROL_SCALE as i32)
}

/// Encodes an input sample into `out`, returning the number of bytes written.
pub fn encode_input(sample: &InputSample, out: &mut [u8]) -> Result<usize, EncodeError> {
    if out.len() < INPUT_PACKET_SIZE {
        return Err(EncodeError::BufferTooSmall {
            needed: INPUT_PACKET_SIZE,
            available: out.len(),
        });
    }
    write_input(sample, &mut out[..INPUT_PACKET_SIZE]);
    Ok(INPUT_PACKET_SIZE)
}

fn write_input(sample: &InputSample, out: &mut [u8]) {
    out[0] = sample.player_id.raw();
    out[1] = sample.throttle as u8;
    out[2] = sample.brake as u8;
    out[3] = sample.steering as u8;
    out[4] = sample.buttons.raw();
    out[5..9].copy_from_slice(&sample.frame.to_le_bytes());
    out[9..11].copy_from_slice(&sample.timestamp.to_le_bytes());
    let crc = crc16(&out[..CRC_OFFSET]);
    out[CRC_OFFSET..INPUT_PACKET_SIZE].copy_from_slice(&crc.to_le_bytes());
}

/// Decodes an input packet.
///
/// The checksum is validated before any field is read. Player-id filtering is
/// left to the caller, which knows which peer is remote.
pub fn decode_input(buf: &[u8]) -> WireResult<InputSample> {
    check_length(buf, PacketKind::Input, INPUT_PACKET_SIZE)?;
    verify_checksum(buf, PacketKind::Input)?;

    let throttle = buf[1] as i8;
    let brake = buf[2] as i8;
    let steering = buf[3] as i8;
    check_range("throttle", throttle, 0)?;
    check_range("brake", brake, 0)?;
    check_range("steering", steering, -CONTROL_SCALE)?;

    Ok(InputSample {
        player_id: PlayerId::new(buf[0]),
        throttle,
        brake,
        steering,
        buttons: Buttons::from_raw(buf[4]),
        frame: u32::from_le_bytes([buf[5], buf[6], buf[7], buf[8]]),
        timestamp: u16::from_le_bytes([buf[9], buf[10]]),
    })
}

fn check_range(field: &'static str, value: i8, min: i8) -> WireResult<()> {
    if (min..=CONTROL_SCALE).contains(&value) {
        Ok(())
    } else {
        Err(DecodeError::ValueOutOfRange {
            field,
            value: i64::from(value),
        })
    }
}

pub(crate) fn check_length(buf: &[u8], kind: PacketKind, size: usize) -> WireResult<()> {
    if buf.len() < size {
        return Err(DecodeError::PacketTooSmall {
            kind,
            actual: buf.len(),
            required: size,
        });
    }
    if buf.len() > size {
        return Err(DecodeError::TrailingBytes {
            kind,
            actual: buf.len(),
            expected: size,
        });
    }
    Ok(())
}

/// Recomputes the trailing CRC over all preceding bytes.
pub(crate) fn verify_checksum(buf: &[u8], kind: PacketKind) -> WireResult<()> {
    let split = buf.len() - 2;
    let expected = crc16(&buf[..split]);
    let found = u16::from_le_bytes([buf[split], buf[split + 1]]);
    if expected == found {
        Ok(())
    } else {
        Err(DecodeError::ChecksumMismatch {
            kind,
            expected,
            found,
        })
    }
}
