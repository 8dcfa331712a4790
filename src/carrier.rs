//! # 载体模块
//!
//! 根据魔数识别 BMP 或 WAVE 载体，并以 `CarrierFile` 统一管理
//! 文件路径、解析后的载体以及它所处的阶段 (已加载、已修改、已保存)。

use crate::bmp::{BmpHeader, BmpImage};
use crate::codec::{self, CodecOptions, Scheme};
use crate::constants::{BMP_SIGNATURE, RIFF_CHUNK_ID};
use crate::error::{Result, StegoError};
use crate::storage;
use crate::wave::{WaveAudio, WaveHeader};
use std::fmt;
use std::path::{Path, PathBuf};

/// 支持的载体格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarrierKind {
    Bmp,
    Wave,
}

impl CarrierKind {
    /// 通过文件开头的魔数识别格式。
    pub fn detect(bytes: &[u8]) -> Result<Self> {
        if bytes.starts_with(&BMP_SIGNATURE) {
            Ok(Self::Bmp)
        } else if bytes.starts_with(&RIFF_CHUNK_ID) {
            Ok(Self::Wave)
        } else {
            Err(StegoError::InvalidSignature {
                format: "BMP or WAVE",
                expected: BMP_SIGNATURE.to_vec(),
                found: bytes.iter().take(RIFF_CHUNK_ID.len()).copied().collect(),
            })
        }
    }
}

impl fmt::Display for CarrierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bmp => f.write_str("BMP"),
            Self::Wave => f.write_str("WAVE"),
        }
    }
}

/// 载体头部的借用视图。
#[derive(Debug, Clone, Copy)]
pub enum CarrierHeader<'a> {
    Bmp(&'a BmpHeader),
    Wave(&'a WaveHeader),
}

/// 已解析的载体: 头部信息加上可写的原始区域。
#[derive(Debug, Clone)]
pub enum Carrier {
    Bmp(BmpImage),
    Wave(WaveAudio),
}

impl Carrier {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        match CarrierKind::detect(bytes)? {
            CarrierKind::Bmp => BmpImage::from_bytes(bytes).map(Self::Bmp),
            CarrierKind::Wave => WaveAudio::from_bytes(bytes).map(Self::Wave),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Bmp(image) => image.to_bytes(),
            Self::Wave(audio) => audio.to_bytes(),
        }
    }

    pub fn kind(&self) -> CarrierKind {
        match self {
            Self::Bmp(_) => CarrierKind::Bmp,
            Self::Wave(_) => CarrierKind::Wave,
        }
    }

    pub fn header(&self) -> CarrierHeader<'_> {
        match self {
            Self::Bmp(image) => CarrierHeader::Bmp(image.header()),
            Self::Wave(audio) => CarrierHeader::Wave(audio.header()),
        }
    }

    /// 原始区域: 像素或采样字节，不含任何头部与填充。
    pub fn raw(&self) -> &[u8] {
        match self {
            Self::Bmp(image) => image.pixels(),
            Self::Wave(audio) => audio.samples(),
        }
    }

    pub fn raw_mut(&mut self) -> &mut [u8] {
        match self {
            Self::Bmp(image) => image.pixels_mut(),
            Self::Wave(audio) => audio.samples_mut(),
        }
    }
}

/// `CarrierFile` 的生命周期阶段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loaded,
    Mutated,
    Saved,
}

/// 与磁盘文件关联的载体，独占其原始区域。
#[derive(Debug)]
pub struct CarrierFile {
    path: PathBuf,
    carrier: Carrier,
    phase: Phase,
}

impl CarrierFile {
    /// 读取并解析载体文件。任何失败都不会留下部分状态。
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = storage::read_file(path)?;
        Ok(Self {
            path: path.to_path_buf(),
            carrier: Carrier::from_bytes(&bytes)?,
            phase: Phase::Loaded,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn carrier(&self) -> &Carrier {
        &self.carrier
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// 指定方案下此载体可容纳的最大负载字节数。
    pub fn capacity(&self, scheme: Scheme) -> usize {
        scheme.capacity(self.carrier.raw().len())
    }

    /// 把负载写入原始区域。校验失败时原始区域保持不变。
    pub fn implant(&mut self, payload: &[u8], options: &CodecOptions) -> Result<()> {
        codec::implant(self.carrier.raw_mut(), payload, options)?;
        self.phase = Phase::Mutated;
        Ok(())
    }

    pub fn extract(&self, options: &CodecOptions) -> Result<Vec<u8>> {
        codec::extract(self.carrier.raw(), options)
    }

    /// 原子地写回到打开时的路径。
    pub fn save(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.save_as(path)
    }

    /// 原子地写入到 `dest`，此后该载体与 `dest` 关联。
    pub fn save_as(&mut self, dest: impl AsRef<Path>) -> Result<()> {
        let dest = dest.as_ref();
        storage::write_atomic(dest, &self.carrier.to_bytes())?;
        self.path = dest.to_path_buf();
        self.phase = Phase::Saved;
        Ok(())
    }
}
