//! # carrier_hide 库
//!
//! 本库包含在 BMP / WAVE 载体中植入与提取负载的核心逻辑。
//! 数据流: 文件字节 → 载体解析 → 原始区域 → 编解码 → 原子写回。

// 声明库包含的所有模块。

pub mod bmp;
pub mod bytecode;
pub mod carrier;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod error;
pub mod handler;
pub mod report;
pub mod steganography;
pub mod storage;
pub mod wave;

pub use carrier::{Carrier, CarrierFile, CarrierKind, Phase};
pub use codec::{CodecOptions, Scheme, extract, implant};
pub use error::{ErrorKind, Result, StegoError};
