//! CRC-16 checksum for frame halves.
//!
//! Both halves of a frame carry a CRC-16/MODBUS over their first 22 bytes,
//! stored big-endian in the last two bytes.

use crc::{Crc, CRC_16_MODBUS};

/// CRC-16/MODBUS calculator with lookup table.
static CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Calculate the CRC-16/MODBUS checksum of a byte slice.
#[inline]
#[must_use]
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}
