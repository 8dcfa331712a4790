//! # BMP 载体模块
//!
//! 解析并校验未压缩的 24/32 位 BMP 文件头，计算行跨度与行填充，
//! 把像素数据 (去除每行填充) 读入一个连续缓冲区，并能按原布局写回。
//!
//! 像素行按文件中的存储顺序处理，不做上下翻转。

use crate::constants::{
    BMP_COMPRESSION_RGB, BMP_FILE_HEADER_SIZE, BMP_MIN_DIB_HEADER_SIZE, BMP_ROW_ALIGNMENT,
    BMP_SIGNATURE, BMP_SUPPORTED_BIT_COUNTS,
};
use crate::error::{Result, StegoError, reserve_buffer};

const FORMAT: &str = "BMP";

fn read_u16(bytes: &[u8], at: usize) -> u16 {
    u16::from_le_bytes([bytes[at], bytes[at + 1]])
}

fn read_u32(bytes: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
}

fn read_i32(bytes: &[u8], at: usize) -> i32 {
    read_u32(bytes, at) as i32
}

/// BMP 文件头与 DIB 头中与隐写相关的字段。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmpHeader {
    /// bfSize: 文件头声明的文件大小。
    pub file_size: u32,
    /// bfOffBits: 像素数据在文件中的偏移。
    pub data_offset: u32,
    /// DIB 头的大小 (40 表示 BITMAPINFOHEADER，124 表示 BITMAPV5HEADER)。
    pub dib_header_size: u32,
    pub width: i32,
    /// 正数表示自下而上存储，负数表示自上而下存储。
    pub height: i32,
    pub bits_per_pixel: u16,
    pub compression: u32,
}

impl BmpHeader {
    /// 从文件开头解析并校验头部。
    ///
    /// # Errors
    ///
    /// 签名不是 "BM"、存在压缩、位深不是 24/32、或尺寸字段非法时返回格式错误。
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < BMP_SIGNATURE.len() || bytes[..2] != BMP_SIGNATURE {
            return Err(StegoError::InvalidSignature {
                format: FORMAT,
                expected: BMP_SIGNATURE.to_vec(),
                found: bytes.iter().take(BMP_SIGNATURE.len()).copied().collect(),
            });
        }

        let minimum = BMP_FILE_HEADER_SIZE + BMP_MIN_DIB_HEADER_SIZE;
        if bytes.len() < minimum {
            return Err(StegoError::Truncated {
                needed: minimum,
                available: bytes.len(),
            });
        }

        let header = Self {
            file_size: read_u32(bytes, 2),
            data_offset: read_u32(bytes, 10),
            dib_header_size: read_u32(bytes, 14),
            width: read_i32(bytes, 18),
            height: read_i32(bytes, 22),
            bits_per_pixel: read_u16(bytes, 28),
            compression: read_u32(bytes, 30),
        };
        header.validate()?;
        Ok(header)
    }

    fn validate(&self) -> Result<()> {
        if (self.dib_header_size as usize) < BMP_MIN_DIB_HEADER_SIZE {
            return Err(StegoError::unsupported(
                FORMAT,
                format!("DIB header of {} bytes", self.dib_header_size),
            ));
        }
        if self.compression != BMP_COMPRESSION_RGB {
            return Err(StegoError::unsupported(
                FORMAT,
                format!("compression method {} (only BI_RGB)", self.compression),
            ));
        }
        if !BMP_SUPPORTED_BIT_COUNTS.contains(&self.bits_per_pixel) {
            return Err(StegoError::unsupported(
                FORMAT,
                format!("{} bits per pixel (only 24 or 32)", self.bits_per_pixel),
            ));
        }
        if self.width <= 0 {
            return Err(StegoError::malformed(
                FORMAT,
                format!("width must be positive, got {}", self.width),
            ));
        }
        if self.height == 0 {
            return Err(StegoError::malformed(FORMAT, "height is zero"));
        }
        let headers_end = BMP_FILE_HEADER_SIZE as u64 + u64::from(self.dib_header_size);
        if u64::from(self.data_offset) < headers_end {
            return Err(StegoError::malformed(
                FORMAT,
                format!(
                    "pixel data offset {} lies inside the {} header bytes",
                    self.data_offset, headers_end
                ),
            ));
        }
        Ok(())
    }

    /// 根据头部计算像素数据的行布局。
    pub fn layout(&self) -> Result<BmpLayout> {
        let overflow = || StegoError::malformed(FORMAT, "image dimensions overflow");

        let width = usize::try_from(self.width).map_err(|_| overflow())?;
        let rows = usize::try_from(self.height.unsigned_abs()).map_err(|_| overflow())?;
        let bytes_per_pixel = usize::from(self.bits_per_pixel) / 8;

        let row_stride = width.checked_mul(bytes_per_pixel).ok_or_else(overflow)?;
        let aligned_stride = row_stride
            .checked_next_multiple_of(BMP_ROW_ALIGNMENT)
            .ok_or_else(overflow)?;
        aligned_stride.checked_mul(rows).ok_or_else(overflow)?;

        Ok(BmpLayout {
            data_offset: self.data_offset as usize,
            rows,
            row_stride,
            padding: aligned_stride - row_stride,
        })
    }
}

/// 像素数据在文件中的行布局。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpLayout {
    pub data_offset: usize,
    pub rows: usize,
    /// 每行可用 (非填充) 字节数。
    pub row_stride: usize,
    /// 每行之后的填充字节数，使每行对齐到 4 字节。
    pub padding: usize,
}

impl BmpLayout {
    pub fn is_padded(&self) -> bool {
        self.padding != 0
    }

    /// 原始区域大小: `rows * row_stride`，不含填充。
    pub fn raw_len(&self) -> usize {
        self.rows * self.row_stride
    }

    /// 像素数据在文件中实际占用的字节数 (含填充)。
    pub fn stored_len(&self) -> usize {
        self.rows * (self.row_stride + self.padding)
    }
}

/// 一个加载到内存中的 BMP 载体。
#[derive(Debug, Clone)]
pub struct BmpImage {
    header: BmpHeader,
    layout: BmpLayout,
    /// 像素数据之前的所有字节，写回时原样保留。
    preamble: Vec<u8>,
    pixels: Vec<u8>,
    /// 每行的填充字节 (`rows * padding` 个)，写回时原样保留。
    row_padding: Vec<u8>,
    /// 最后一行之后的字节，写回时原样保留。
    trailer: Vec<u8>,
}

impl BmpImage {
    /// 解析完整的 BMP 文件内容。
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let header = BmpHeader::parse(bytes)?;
        let layout = header.layout()?;

        let end = layout
            .data_offset
            .checked_add(layout.stored_len())
            .ok_or_else(|| StegoError::malformed(FORMAT, "pixel data end overflows"))?;
        if end > bytes.len() {
            return Err(StegoError::Truncated {
                needed: end,
                available: bytes.len(),
            });
        }

        let stored = &bytes[layout.data_offset..end];
        let mut pixels = reserve_buffer(layout.raw_len())?;
        let mut row_padding = Vec::new();
        if layout.is_padded() {
            row_padding = reserve_buffer(layout.rows * layout.padding)?;
            for row in stored.chunks_exact(layout.row_stride + layout.padding) {
                let (data, padding) = row.split_at(layout.row_stride);
                pixels.extend_from_slice(data);
                row_padding.extend_from_slice(padding);
            }
        } else {
            pixels.extend_from_slice(stored);
        }

        Ok(Self {
            preamble: bytes[..layout.data_offset].to_vec(),
            trailer: bytes[end..].to_vec(),
            header,
            layout,
            pixels,
            row_padding,
        })
    }

    /// 按原始布局重新组装文件内容，每行之后写回加载时的填充字节。
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            self.preamble.len() + self.layout.stored_len() + self.trailer.len(),
        );
        out.extend_from_slice(&self.preamble);

        if self.layout.is_padded() {
            let paddings = self.row_padding.chunks_exact(self.layout.padding);
            for (row, padding) in self.rows().zip(paddings) {
                out.extend_from_slice(row);
                out.extend_from_slice(padding);
            }
        } else {
            out.extend_from_slice(&self.pixels);
        }

        out.extend_from_slice(&self.trailer);
        out
    }

    pub fn header(&self) -> &BmpHeader {
        &self.header
    }

    pub fn layout(&self) -> &BmpLayout {
        &self.layout
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// 按行访问像素数据 (不含填充)。
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        self.pixels.chunks_exact(self.layout.row_stride)
    }
}
