//! # 错误类型
//!
//! 核心编解码流程返回的全部错误。命令行层再用 `anyhow` 为其补充上下文。

use crate::constants::MAGIC_LEN;
use crate::frame::FrameField;
use std::{fmt, io};
use thiserror::Error;

/// 核心操作的结果类型。
pub type Result<T> = std::result::Result<T, StegoError>;

/// 编码或解码过程中可能出现的错误。
#[derive(Error)]
pub enum StegoError {
    /// 载体容量不足以容纳整个帧。
    #[error("not enough space in the carrier: required {required_bits} bits, available {available_bits} bits")]
    InsufficientCapacity {
        required_bits: u64,
        available_bits: u64,
    },

    /// 载体中的魔数与预期不符，说明不是隐写图像或已损坏。
    #[error("magic marker mismatch: expected {expected:?}, found {found:?}")]
    MagicMismatch {
        expected: [u8; MAGIC_LEN],
        found: [u8; MAGIC_LEN],
    },

    /// 读取某个帧字段时底层流出错 (包括流提前结束)。
    #[error("failed to read {field}")]
    StreamRead {
        field: FrameField,
        #[source]
        source: io::Error,
    },

    /// 写入某个帧字段时底层流出错。
    #[error("failed to write {field}")]
    StreamWrite {
        field: FrameField,
        #[source]
        source: io::Error,
    },

    /// 载体不是未压缩的 24 位 BMP。
    #[error("unsupported carrier format: {reason}")]
    UnsupportedCarrierFormat { reason: String },

    #[error("the file extension must not be empty")]
    EmptyExtension,

    /// 扩展名超出帧允许的最大长度。
    #[error("file extension is {len} bytes long, the maximum is {max}")]
    ExtensionTooLong { len: usize, max: usize },

    #[error("the recovered file extension is not valid UTF-8")]
    InvalidExtension,

    /// 载荷长度无法放进 32 位长度字段。
    #[error("payload of {len} bytes does not fit the 32-bit length field")]
    PayloadTooLarge { len: u64 },
}

impl StegoError {
    pub(crate) fn read(field: FrameField) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::StreamRead { field, source }
    }

    pub(crate) fn write(field: FrameField) -> impl FnOnce(io::Error) -> Self {
        move |source| Self::StreamWrite { field, source }
    }
}

impl fmt::Debug for StegoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")?;
        if let Self::StreamRead { source, .. } | Self::StreamWrite { source, .. } = self {
            write!(f, ": {source}")?;
        }
        Ok(())
    }
}
