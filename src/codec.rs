//! # 编解码模块
//!
//! 在载体的原始区域中写入或读出负载。提供两种互不兼容的磁盘格式:
//!
//! * [`Scheme::Packed`]: 前 8 字节为 `u64` 小端长度前缀 (值为负载长度 × 4)，
//!   之后每个负载字节打包进 4 个载体字节的最低 2 位。这是默认格式。
//! * [`Scheme::Delimited`]: 负载原样复制到区域开头，紧随其后写入
//!   12 字节结束签名。

use crate::constants::{BYTES_PER_PAYLOAD_BYTE, EXIT_SIGNATURE, LENGTH_PREFIX_BYTES};
use crate::error::{Result, StegoError, reserve_buffer};
use crate::steganography::{pack_byte, read_length_prefix, unpack_byte, write_length_prefix};
use rayon::prelude::*;
use std::fmt;

/// 负载在原始区域中的编码方式。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Scheme {
    /// 长度前缀 + 4 倍展开的位打包。
    #[default]
    Packed,
    /// 原始负载 + 结束签名。
    Delimited,
}

impl Scheme {
    /// 大小为 `raw_len` 的原始区域能容纳的最大负载字节数。
    pub fn capacity(self, raw_len: usize) -> usize {
        match self {
            Self::Packed => {
                (raw_len.saturating_sub(LENGTH_PREFIX_BYTES) / BYTES_PER_PAYLOAD_BYTE)
                    .saturating_sub(1)
            }
            Self::Delimited => raw_len.saturating_sub(EXIT_SIGNATURE.len()),
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Packed => f.write_str("packed"),
            Self::Delimited => f.write_str("delimited"),
        }
    }
}

/// 编解码选项。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CodecOptions {
    pub scheme: Scheme,
    /// 分隔式方案提取时使用并行签名搜索，结果与顺序搜索相同。
    pub parallel_search: bool,
}

impl CodecOptions {
    pub fn new(scheme: Scheme) -> Self {
        Self {
            scheme,
            ..Self::default()
        }
    }

    pub fn with_parallel_search(mut self, enabled: bool) -> Self {
        self.parallel_search = enabled;
        self
    }
}

/// 把 `payload` 写入 `raw`。
///
/// 所有校验都在修改之前完成，因此失败时 `raw` 保持原样。
///
/// # Errors
///
/// * `EmptyPayload`: 负载为空。
/// * `CapacityExceeded`: 负载超过 [`Scheme::capacity`]。
pub fn implant(raw: &mut [u8], payload: &[u8], options: &CodecOptions) -> Result<()> {
    if payload.is_empty() {
        return Err(StegoError::EmptyPayload);
    }

    let capacity = options.scheme.capacity(raw.len());
    if payload.len() > capacity {
        return Err(StegoError::CapacityExceeded {
            payload: payload.len(),
            capacity,
        });
    }

    match options.scheme {
        Scheme::Packed => implant_packed(raw, payload),
        Scheme::Delimited => implant_delimited(raw, payload),
    }
}

fn implant_packed(raw: &mut [u8], payload: &[u8]) -> Result<()> {
    let expanded = u64::try_from(payload.len())
        .ok()
        .and_then(|len| len.checked_mul(BYTES_PER_PAYLOAD_BYTE as u64))
        .ok_or(StegoError::CapacityExceeded {
            payload: payload.len(),
            capacity: Scheme::Packed.capacity(raw.len()),
        })?;

    write_length_prefix(raw, expanded)?;

    payload.iter().enumerate().try_for_each(|(i, &byte)| {
        pack_byte(
            byte,
            raw,
            LENGTH_PREFIX_BYTES + i * BYTES_PER_PAYLOAD_BYTE,
        )
    })
}

fn implant_delimited(raw: &mut [u8], payload: &[u8]) -> Result<()> {
    let end = payload.len() + EXIT_SIGNATURE.len();
    raw[..payload.len()].copy_from_slice(payload);
    raw[payload.len()..end].copy_from_slice(&EXIT_SIGNATURE);
    Ok(())
}

/// 从 `raw` 中读出负载。
///
/// # Errors
///
/// * `NoData`: 长度前缀为零，或签名位于区域开头。
/// * `CorruptLength`: 长度前缀不是 4 的倍数或超出区域。
/// * `SignatureNotFound`: 分隔式方案找不到结束签名。
pub fn extract(raw: &[u8], options: &CodecOptions) -> Result<Vec<u8>> {
    match options.scheme {
        Scheme::Packed => extract_packed(raw),
        Scheme::Delimited => extract_delimited(raw, options.parallel_search),
    }
}

fn extract_packed(raw: &[u8]) -> Result<Vec<u8>> {
    let declared = read_length_prefix(raw)?;
    if declared == 0 {
        return Err(StegoError::NoData);
    }

    let corrupt = || StegoError::CorruptLength {
        declared,
        available: raw.len(),
    };
    let expanded = usize::try_from(declared).map_err(|_| corrupt())?;
    if expanded % BYTES_PER_PAYLOAD_BYTE != 0 {
        return Err(corrupt());
    }
    let count = expanded / BYTES_PER_PAYLOAD_BYTE;
    if count > Scheme::Packed.capacity(raw.len()) {
        return Err(corrupt());
    }

    let mut payload = reserve_buffer(count)?;
    for i in 0..count {
        payload.push(unpack_byte(
            raw,
            LENGTH_PREFIX_BYTES + i * BYTES_PER_PAYLOAD_BYTE,
        )?);
    }

    if payload.is_empty() {
        return Err(StegoError::NoData);
    }
    Ok(payload)
}

fn extract_delimited(raw: &[u8], parallel: bool) -> Result<Vec<u8>> {
    let end = if parallel {
        find_signature_parallel(raw)
    } else {
        find_signature(raw)
    }
    .ok_or(StegoError::SignatureNotFound)?;

    if end == 0 {
        return Err(StegoError::NoData);
    }

    let mut payload = reserve_buffer(end)?;
    payload.extend_from_slice(&raw[..end]);
    Ok(payload)
}

/// 顺序搜索结束签名首次出现的偏移。
pub fn find_signature(raw: &[u8]) -> Option<usize> {
    raw.windows(EXIT_SIGNATURE.len())
        .position(|window| window[0] == EXIT_SIGNATURE[0] && window == EXIT_SIGNATURE)
}

/// 并行搜索结束签名首次出现的偏移，结果与 [`find_signature`] 一致。
pub fn find_signature_parallel(raw: &[u8]) -> Option<usize> {
    raw.par_windows(EXIT_SIGNATURE.len())
        .position_first(|window| window[0] == EXIT_SIGNATURE[0] && window == EXIT_SIGNATURE)
}
