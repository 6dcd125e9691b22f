//! CRC-16 packet checksum.

use crc::{Crc, CRC_16_MODBUS};

const MODBUS: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// CRC-16/MODBUS over `data` (reflected polynomial 0xA001, init 0xFFFF).
#[must_use]
pub fn crc16(data: &[u8]) -> u16 {
    MODBUS.checksum(data)
}
