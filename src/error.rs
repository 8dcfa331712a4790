//! # 错误类型模块
//!
//! 定义库内所有操作共享的 `StegoError`，以及将其归类为
//! 格式、I/O、容量等错误种类的 `ErrorKind`。

use std::collections::TryReserveError;
use std::io;
use thiserror::Error;

/// 错误的粗粒度分类，便于调用方按类别处理。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 签名、头部字段或负载编码不合法。
    Format,
    /// 打开、读取或写入文件失败。
    Io,
    /// 负载超出载体容量。
    CapacityExceeded,
    /// 负载为空。
    EmptyPayload,
    /// 载体中没有隐藏数据。
    NoData,
    /// 分隔式方案找不到结束签名。
    SignatureNotFound,
    /// 缓冲区无法按需分配。
    Allocation,
}

/// 载体解析与隐写编解码过程中可能出现的错误。
#[derive(Debug, Error)]
pub enum StegoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid {format} signature: expected {expected:02x?}, found {found:02x?}")]
    InvalidSignature {
        format: &'static str,
        expected: Vec<u8>,
        found: Vec<u8>,
    },

    #[error("Unsupported {format} carrier: {message}")]
    Unsupported {
        format: &'static str,
        message: String,
    },

    #[error("Malformed {format} header: {message}")]
    MalformedHeader {
        format: &'static str,
        message: String,
    },

    #[error("Carrier data truncated: need {needed} bytes, have {available}")]
    Truncated { needed: usize, available: usize },

    #[error("Payload of {payload} bytes exceeds carrier capacity of {capacity} bytes")]
    CapacityExceeded { payload: usize, capacity: usize },

    #[error("Payload is empty")]
    EmptyPayload,

    #[error("No hidden data found in carrier")]
    NoData,

    #[error("Exit signature not found in carrier")]
    SignatureNotFound,

    #[error("Hidden length prefix {declared} is invalid for a region of {available} bytes")]
    CorruptLength { declared: u64, available: usize },

    #[error("Invalid hex byte {token:?} at token {index}")]
    InvalidHex { token: String, index: usize },

    #[error("Failed to allocate {requested} bytes: {source}")]
    Allocation {
        requested: usize,
        #[source]
        source: TryReserveError,
    },
}

impl StegoError {
    /// 返回错误所属的种类。
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Io(_) => ErrorKind::Io,
            Self::InvalidSignature { .. }
            | Self::Unsupported { .. }
            | Self::MalformedHeader { .. }
            | Self::Truncated { .. }
            | Self::CorruptLength { .. }
            | Self::InvalidHex { .. } => ErrorKind::Format,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::EmptyPayload => ErrorKind::EmptyPayload,
            Self::NoData => ErrorKind::NoData,
            Self::SignatureNotFound => ErrorKind::SignatureNotFound,
            Self::Allocation { .. } => ErrorKind::Allocation,
        }
    }

    pub(crate) fn malformed(format: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            format,
            message: message.into(),
        }
    }

    pub(crate) fn unsupported(format: &'static str, message: impl Into<String>) -> Self {
        Self::Unsupported {
            format,
            message: message.into(),
        }
    }
}

/// 库内统一使用的 `Result` 别名。
pub type Result<T> = std::result::Result<T, StegoError>;

/// 预留一个恰好容纳 `len` 字节的缓冲区，分配失败时返回 `Allocation`。
pub(crate) fn reserve_buffer(len: usize) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|source| StegoError::Allocation {
            requested: len,
            source,
        })?;
    Ok(buffer)
}
