//! # 位打包模块
//!
//! 将值按每个载体字节 2 位的方式分散到载体字节的最低位，并可逆地收集回来。
//! 载体字节的高 6 位保持不变。

use crate::constants::{
    BITS_PER_CARRIER_BYTE, BYTES_PER_PAYLOAD_BYTE, CARRIER_BIT_MASK, LENGTH_PREFIX_BYTES,
};
use crate::error::{Result, StegoError};

/// 单个 `u64` 最多能分散到的载体字节数 (64 / 2)。
const MAX_SPREAD_BYTES: usize = u64::BITS as usize / BITS_PER_CARRIER_BYTE;

fn check_region(len: usize, offset: usize, size: usize) -> Result<()> {
    match offset.checked_add(size) {
        Some(end) if end <= len => Ok(()),
        _ => Err(StegoError::Truncated {
            needed: offset.saturating_add(size),
            available: len,
        }),
    }
}

/// 将 `value` 从低位开始，每次 2 位，写入 `carrier[offset..offset + size]` 的最低位。
pub fn spread_bits(mut value: u64, carrier: &mut [u8], offset: usize, size: usize) -> Result<()> {
    check_region(carrier.len(), offset, size)?;

    for byte in carrier[offset..offset + size].iter_mut() {
        *byte = ((value & u64::from(CARRIER_BIT_MASK)) as u8) | (*byte & !CARRIER_BIT_MASK);
        value >>= BITS_PER_CARRIER_BYTE;
    }

    Ok(())
}

/// `spread_bits` 的逆操作。`size` 不能超过 32，否则结果会溢出 64 位。
pub fn gather_bits(carrier: &[u8], offset: usize, size: usize) -> Result<u64> {
    check_region(carrier.len(), offset, size)?;

    if size > MAX_SPREAD_BYTES {
        return Err(StegoError::malformed(
            "bit field",
            format!("{size} carrier bytes exceed the {MAX_SPREAD_BYTES} that fit in 64 bits"),
        ));
    }

    let value = carrier[offset..offset + size]
        .iter()
        .enumerate()
        .fold(0u64, |acc, (i, &byte)| {
            acc | (u64::from(byte & CARRIER_BIT_MASK) << (i * BITS_PER_CARRIER_BYTE))
        });

    Ok(value)
}

/// 将一个负载字节打包进从 `offset` 开始的 4 个载体字节。
pub fn pack_byte(byte: u8, carrier: &mut [u8], offset: usize) -> Result<()> {
    spread_bits(u64::from(byte), carrier, offset, BYTES_PER_PAYLOAD_BYTE)
}

/// 从 `offset` 开始的 4 个载体字节中还原一个负载字节。
pub fn unpack_byte(carrier: &[u8], offset: usize) -> Result<u8> {
    // 4 个字节恰好 8 位，截断不会丢失信息
    gather_bits(carrier, offset, BYTES_PER_PAYLOAD_BYTE).map(|value| value as u8)
}

/// 以小端序把长度前缀直接写入原始区域的前 8 个字节 (不做位打包)。
pub fn write_length_prefix(carrier: &mut [u8], length: u64) -> Result<()> {
    check_region(carrier.len(), 0, LENGTH_PREFIX_BYTES)?;
    carrier[..LENGTH_PREFIX_BYTES].copy_from_slice(&length.to_le_bytes());
    Ok(())
}

/// 读取原始区域前 8 个字节中的小端序长度前缀。
pub fn read_length_prefix(carrier: &[u8]) -> Result<u64> {
    check_region(carrier.len(), 0, LENGTH_PREFIX_BYTES)?;
    let mut prefix = [0u8; LENGTH_PREFIX_BYTES];
    prefix.copy_from_slice(&carrier[..LENGTH_PREFIX_BYTES]);
    Ok(u64::from_le_bytes(prefix))
}
