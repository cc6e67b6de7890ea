//! # 位打包
//!
//! 把一个字节或一个 `u32` 长度分散到一组载体字节的最低有效位中，以及反向还原。
//! 所有函数都只修改每个载体字节的 bit 0，高 7 位保持原样。

use crate::constants::{BYTE_GROUP_LEN, LENGTH_GROUP_LEN};

/// 将 `value` 按最高位在前的顺序写入 8 个载体字节的最低有效位。
pub fn pack_byte(value: u8, carrier: &mut [u8; BYTE_GROUP_LEN]) {
    for (i, byte) in carrier.iter_mut().enumerate() {
        let bit = (value >> (7 - i)) & 1;
        *byte = (*byte & 0xFE) | bit;
    }
}

/// 从 8 个载体字节的最低有效位中还原一个字节。
pub fn unpack_byte(carrier: &[u8; BYTE_GROUP_LEN]) -> u8 {
    carrier
        .iter()
        .fold(0u8, |value, &byte| (value << 1) | (byte & 1))
}

/// 将 32 位长度按最高位在前的顺序写入 32 个载体字节的最低有效位。
pub fn pack_length(value: u32, carrier: &mut [u8; LENGTH_GROUP_LEN]) {
    for (i, byte) in carrier.iter_mut().enumerate() {
        let bit = ((value >> (31 - i)) & 1) as u8;
        *byte = (*byte & 0xFE) | bit;
    }
}

/// 从 32 个载体字节的最低有效位中还原一个 32 位长度。
pub fn unpack_length(carrier: &[u8; LENGTH_GROUP_LEN]) -> u32 {
    carrier
        .iter()
        .fold(0u32, |value, &byte| (value << 1) | u32::from(byte & 1))
}
