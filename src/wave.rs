//! # WAVE 载体模块
//!
//! 解析 RIFF/WAVE 容器，校验 PCM 格式，并将 `data` 子块中的采样字节
//! 作为一个平坦的原始区域暴露出来。音频数据没有行或填充的概念。

use crate::constants::{
    CHUNK_HEADER_SIZE, RIFF_CHUNK_ID, RIFF_DESCRIPTOR_SIZE, WAVE_DATA_CHUNK_ID,
    WAVE_FMT_CHUNK_ID, WAVE_FORM_TYPE, WAVE_FORMAT_PCM, WAVE_PCM_FMT_SIZE,
};
use crate::error::{Result, StegoError, reserve_buffer};

const FORMAT: &str = "WAVE";

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn tag(bytes: &[u8], at: usize) -> [u8; 4] {
    [bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]]
}

/// `fmt ` 子块中的 PCM 参数。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatChunk {
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl FormatChunk {
    fn parse(body: &[u8]) -> Result<Self> {
        if body.len() < WAVE_PCM_FMT_SIZE {
            return Err(StegoError::malformed(
                FORMAT,
                format!("fmt chunk of {} bytes is too short", body.len()),
            ));
        }

        let chunk = Self {
            format_tag: read_u16(body, 0),
            channels: read_u16(body, 2),
            sample_rate: read_u32(body, 4),
            byte_rate: read_u32(body, 8),
            block_align: read_u16(body, 12),
            bits_per_sample: read_u16(body, 14),
        };

        if chunk.format_tag != WAVE_FORMAT_PCM {
            return Err(StegoError::unsupported(
                FORMAT,
                format!("format tag {:#06x} (only PCM)", chunk.format_tag),
            ));
        }
        if chunk.channels == 0 || chunk.bits_per_sample == 0 {
            return Err(StegoError::malformed(
                FORMAT,
                "channel count and bits per sample must be non-zero",
            ));
        }
        if u32::from(chunk.block_align) != chunk.expected_block_align() {
            return Err(StegoError::malformed(
                FORMAT,
                format!(
                    "block align {} does not match {} channels of {} bits",
                    chunk.block_align, chunk.channels, chunk.bits_per_sample
                ),
            ));
        }
        Ok(chunk)
    }

    /// 由声道数和位深推导出的块对齐值。
    pub fn expected_block_align(&self) -> u32 {
        u32::from(self.channels) * u32::from(self.bits_per_sample).div_ceil(8)
    }

    /// 由采样率和块对齐推导出的字节率。
    pub fn expected_byte_rate(&self) -> u64 {
        u64::from(self.sample_rate) * u64::from(self.expected_block_align())
    }
}

/// RIFF 描述符、格式子块与数据子块的汇总信息。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveHeader {
    /// RIFF 块声明的大小 (文件大小减 8)。
    pub riff_size: u32,
    pub format: FormatChunk,
    /// 采样数据在文件中的偏移 (紧跟在 `data` 子块头之后)。
    pub data_offset: usize,
    /// `data` 子块声明的大小。
    pub data_size: u32,
}

impl WaveHeader {
    /// 逐块遍历 RIFF 主体，找到 `fmt ` 与 `data` 子块。
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < RIFF_DESCRIPTOR_SIZE {
            return Err(StegoError::Truncated {
                needed: RIFF_DESCRIPTOR_SIZE,
                available: bytes.len(),
            });
        }
        if tag(bytes, 0) != RIFF_CHUNK_ID {
            return Err(StegoError::InvalidSignature {
                format: "RIFF",
                expected: RIFF_CHUNK_ID.to_vec(),
                found: tag(bytes, 0).to_vec(),
            });
        }
        if tag(bytes, 8) != WAVE_FORM_TYPE {
            return Err(StegoError::InvalidSignature {
                format: FORMAT,
                expected: WAVE_FORM_TYPE.to_vec(),
                found: tag(bytes, 8).to_vec(),
            });
        }
        let riff_size = read_u32(bytes, 4);

        let mut format = None;
        let mut cursor = RIFF_DESCRIPTOR_SIZE;
        while cursor + CHUNK_HEADER_SIZE <= bytes.len() {
            let id = tag(bytes, cursor);
            let size = read_u32(bytes, cursor + 4) as usize;
            let body = cursor + CHUNK_HEADER_SIZE;

            if id == WAVE_DATA_CHUNK_ID {
                let format = format.ok_or_else(|| {
                    StegoError::malformed(FORMAT, "data chunk precedes the fmt chunk")
                })?;
                return Ok(Self {
                    riff_size,
                    format,
                    data_offset: body,
                    data_size: size as u32,
                });
            }

            let end = body.checked_add(size).filter(|&end| end <= bytes.len()).ok_or(
                StegoError::Truncated {
                    needed: body.saturating_add(size),
                    available: bytes.len(),
                },
            )?;
            if id == WAVE_FMT_CHUNK_ID {
                format = Some(FormatChunk::parse(&bytes[body..end])?);
            }
            // 子块按偶数字节对齐
            cursor = end + (size & 1);
        }

        match format {
            None => Err(StegoError::InvalidSignature {
                format: "WAVE fmt",
                expected: WAVE_FMT_CHUNK_ID.to_vec(),
                found: Vec::new(),
            }),
            Some(_) => Err(StegoError::malformed(FORMAT, "missing data chunk")),
        }
    }
}

/// 一个加载到内存中的 PCM WAVE 载体。
#[derive(Debug, Clone)]
pub struct WaveAudio {
    header: WaveHeader,
    preamble: Vec<u8>,
    samples: Vec<u8>,
    trailer: Vec<u8>,
}

impl WaveAudio {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = WaveHeader::parse(bytes)?;
        let size = header.data_size as usize;
        let end = header
            .data_offset
            .checked_add(size)
            .filter(|&end| end <= bytes.len())
            .ok_or(StegoError::Truncated {
                needed: header.data_offset.saturating_add(size),
                available: bytes.len(),
            })?;

        let mut samples = reserve_buffer(size)?;
        samples.extend_from_slice(&bytes[header.data_offset..end]);

        Ok(Self {
            preamble: bytes[..header.data_offset].to_vec(),
            trailer: bytes[end..].to_vec(),
            header,
            samples,
        })
    }

    /// 头部原样写回，随后是采样数据与其后的所有字节。
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(self.preamble.len() + self.samples.len() + self.trailer.len());
        out.extend_from_slice(&self.preamble);
        out.extend_from_slice(&self.samples);
        out.extend_from_slice(&self.trailer);
        out
    }

    pub fn header(&self) -> &WaveHeader {
        &self.header
    }

    pub fn samples(&self) -> &[u8] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [u8] {
        &mut self.samples
    }
}
