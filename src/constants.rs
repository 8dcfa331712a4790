/// 长度前缀占用的原始载体字节数。
/// 前缀以完整宽度的 `u64` 小端序直接写入原始区域，不经过位打包。
pub const LENGTH_PREFIX_BYTES: usize = 8;

/// 隐写单个负载字节所需的载体字节数。
/// 每个载体字节的最低 2 位存储数据，因此 8 / 2 = 4 个载体字节承载一个字节。
pub const BYTES_PER_PAYLOAD_BYTE: usize = 4;

/// 每个载体字节中被替换的位数。
pub const BITS_PER_CARRIER_BYTE: usize = 2;

/// 载体字节中保存数据的低位掩码。
pub const CARRIER_BIT_MASK: u8 = 0x03;

/// 分隔式方案使用的 12 字节结束签名，紧跟在原始负载之后。
pub const EXIT_SIGNATURE: [u8; 12] = [
    0x01, 0x0C, 0x0E, 0x0C, 0x00, 0x0A, 0x01, 0x0E, 0x0D, 0x05, 0x01, 0x06,
];

/// BMP 文件头 (BITMAPFILEHEADER) 的大小。
pub const BMP_FILE_HEADER_SIZE: usize = 14;

/// 可接受的最小 DIB 头大小 (BITMAPINFOHEADER)。
pub const BMP_MIN_DIB_HEADER_SIZE: usize = 40;

/// BMP 签名 "BM"。
pub const BMP_SIGNATURE: [u8; 2] = *b"BM";

/// 未压缩 (BI_RGB) 的压缩方法编号。
pub const BMP_COMPRESSION_RGB: u32 = 0;

/// 支持的每像素位数。
pub const BMP_SUPPORTED_BIT_COUNTS: [u16; 2] = [24, 32];

/// BMP 每行对齐的字节边界。
pub const BMP_ROW_ALIGNMENT: usize = 4;

pub const RIFF_CHUNK_ID: [u8; 4] = *b"RIFF";
pub const WAVE_FORM_TYPE: [u8; 4] = *b"WAVE";
pub const WAVE_FMT_CHUNK_ID: [u8; 4] = *b"fmt ";
pub const WAVE_DATA_CHUNK_ID: [u8; 4] = *b"data";

/// RIFF 描述符大小: "RIFF" + 大小 + "WAVE"。
pub const RIFF_DESCRIPTOR_SIZE: usize = 12;

/// 子块头大小: 4 字节 ID + 4 字节大小。
pub const CHUNK_HEADER_SIZE: usize = 8;

/// PCM fmt 子块的最小长度。
pub const WAVE_PCM_FMT_SIZE: usize = 16;

/// WAVE_FORMAT_PCM。
pub const WAVE_FORMAT_PCM: u16 = 0x0001;

/// 十六进制字节码文件每行输出的字节数。
pub const HEX_BYTES_PER_LINE: usize = 16;
