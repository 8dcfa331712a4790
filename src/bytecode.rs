//! # 字节码文件模块
//!
//! 负载在磁盘上的十六进制文本表示: 以空白分隔的两位十六进制字节。
//! 写出时使用大写字母，每 16 个字节换行。

use crate::constants::HEX_BYTES_PER_LINE;
use crate::error::{Result, StegoError};
use crate::storage;
use std::path::Path;

/// 解析十六进制文本。每个记号可带 `0x` 前缀，且必须能表示为一个字节。
///
/// # Errors
///
/// 记号不是合法的十六进制字节时返回 `InvalidHex`，没有任何记号时返回 `EmptyPayload`。
pub fn parse_hex(text: &str) -> Result<Vec<u8>> {
    let bytes = text
        .split_ascii_whitespace()
        .enumerate()
        .map(|(index, token)| {
            let digits = token
                .strip_prefix("0x")
                .or_else(|| token.strip_prefix("0X"))
                .unwrap_or(token);
            let invalid = || StegoError::InvalidHex {
                token: token.to_string(),
                index,
            };
            // from_str_radix 会接受 `+` 号
            if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(invalid());
            }
            u8::from_str_radix(digits, 16).map_err(|_| invalid())
        })
        .collect::<Result<Vec<u8>>>()?;

    if bytes.is_empty() {
        return Err(StegoError::EmptyPayload);
    }
    Ok(bytes)
}

/// 把字节格式化为 `"DE AD "` 形式的文本，每 16 个字节后换行。
pub fn format_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3 + bytes.len() / HEX_BYTES_PER_LINE);
    for (i, byte) in bytes.iter().enumerate() {
        out.push_str(&format!("{byte:02X} "));
        if (i + 1) % HEX_BYTES_PER_LINE == 0 {
            out.push('\n');
        }
    }
    out
}

pub fn read_hex_file(path: &Path) -> Result<Vec<u8>> {
    let raw = storage::read_file(path)?;
    let text = String::from_utf8_lossy(&raw);
    parse_hex(&text)
}

pub fn write_hex_file(path: &Path, bytes: &[u8]) -> Result<()> {
    storage::write_atomic(path, format_hex(bytes).as_bytes())
}
