//! # 帧常量表
//!
//! 编码与解码两个方向共用的全部协议常量都集中在这里，两侧不会各自写死字段宽度。

/// BMP 文件的标准头部大小 (字节)。
/// 头部原样复制，不嵌入任何数据位。
pub const BMP_HEADER_SIZE: usize = 54;

/// 魔数标记的字节数。
pub const MAGIC_LEN: usize = 2;

/// 帧起始处的魔数标记。
pub const MAGIC: &[u8; MAGIC_LEN] = b"#*";

/// 每个载体字节可用的位数 (仅最低有效位)。
pub const BITS_PER_CARRIER_BYTE: u64 = 1;

/// 隐藏一个字节所需的载体字节数 (每个载体字节 1 bit)。
pub const BYTE_GROUP_LEN: usize = 8;

/// 隐藏一个 `u32` 长度字段所需的载体字节数。
pub const LENGTH_GROUP_LEN: usize = 32;

/// 长度字段本身在帧中占用的字节数。
pub const LENGTH_FIELD_BYTES: u64 = 4;

/// 扩展名 (含 `.`) 允许的最大字节数。
pub const MAX_EXTENSION_LEN: usize = 9;

/// BMP 头部中宽度字段的偏移。
pub const BMP_WIDTH_OFFSET: usize = 18;

/// BMP 头部中高度字段的偏移。
pub const BMP_HEIGHT_OFFSET: usize = 22;

/// BMP 头部中每像素位数字段的偏移。
pub const BMP_BPP_OFFSET: usize = 28;

/// BMP 头部中压缩方式字段的偏移。
pub const BMP_COMPRESSION_OFFSET: usize = 30;

/// 唯一支持的像素格式：24 位 RGB。
pub const SUPPORTED_BPP: u16 = 24;
