//! # 载体图像
//!
//! 识别载体格式、测量载体大小，以及头部的原样复制与跳过。
//! 头部是 BMP 的结构元数据，任何位被改动都会让图像无法打开。

use crate::constants::{
    BMP_BPP_OFFSET, BMP_COMPRESSION_OFFSET, BMP_HEADER_SIZE, BMP_HEIGHT_OFFSET, BMP_WIDTH_OFFSET,
    SUPPORTED_BPP,
};
use crate::error::{Result, StegoError};
use crate::frame::FrameField;
use crate::stream::CarrierWriter;
use image::ImageFormat;
use std::io::{Read, Seek, SeekFrom, Write};

/// 从 BMP 头部读出的几何信息。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierInfo {
    pub width: i32,
    pub height: i32,
    pub bits_per_pixel: u16,
    /// 整个载体流的字节数 (含头部)。
    pub total_len: u64,
}

impl CarrierInfo {
    /// 头部之后可用于嵌入的载体字节数。
    pub fn capacity_bytes(&self) -> u64 {
        self.total_len.saturating_sub(BMP_HEADER_SIZE as u64)
    }

    /// 按头部声明的宽高计算的像素数据大小 (每行按 4 字节对齐)。
    pub fn declared_pixel_bytes(&self) -> u64 {
        let row = (u64::from(self.width.unsigned_abs()) * 3).div_ceil(4) * 4;
        row * u64::from(self.height.unsigned_abs())
    }
}

/// 测量流的总长度，并把游标放回起点。`field` 用于标注出错时的流。
pub fn stream_len<S: Seek>(stream: &mut S, field: FrameField) -> Result<u64> {
    let len = stream
        .seek(SeekFrom::End(0))
        .map_err(StegoError::read(field))?;
    stream.rewind().map_err(StegoError::read(field))?;
    Ok(len)
}

/// 检查载体是否为未压缩的 24 位 BMP，并返回其几何信息。
///
/// 检查完成后游标位于流的起点。
///
/// # Errors
///
/// 签名、位深或压缩方式不符合时返回 [`StegoError::UnsupportedCarrierFormat`]。
pub fn probe<S: Read + Seek>(stream: &mut S) -> Result<CarrierInfo> {
    let total_len = stream_len(stream, FrameField::Header)?;
    if total_len < BMP_HEADER_SIZE as u64 {
        return Err(unsupported(format!(
            "carrier is {total_len} bytes, shorter than the {BMP_HEADER_SIZE}-byte BMP header"
        )));
    }

    let mut header = [0u8; BMP_HEADER_SIZE];
    stream
        .read_exact(&mut header)
        .map_err(StegoError::read(FrameField::Header))?;
    stream
        .rewind()
        .map_err(StegoError::read(FrameField::Header))?;

    match image::guess_format(&header) {
        Ok(ImageFormat::Bmp) => {}
        Ok(other) => return Err(unsupported(format!("carrier is {other:?}, not BMP"))),
        Err(_) => return Err(unsupported("carrier has no BMP signature".to_string())),
    }

    let bits_per_pixel = u16::from_le_bytes([header[BMP_BPP_OFFSET], header[BMP_BPP_OFFSET + 1]]);
    if bits_per_pixel != SUPPORTED_BPP {
        return Err(unsupported(format!(
            "carrier uses {bits_per_pixel} bits per pixel, only {SUPPORTED_BPP} is supported"
        )));
    }

    let compression = read_u32(&header, BMP_COMPRESSION_OFFSET);
    if compression != 0 {
        return Err(unsupported(format!(
            "carrier is compressed (method {compression})"
        )));
    }

    let info = CarrierInfo {
        width: read_u32(&header, BMP_WIDTH_OFFSET) as i32,
        height: read_u32(&header, BMP_HEIGHT_OFFSET) as i32,
        bits_per_pixel,
        total_len,
    };

    if info.declared_pixel_bytes() > info.capacity_bytes() {
        log::warn!(
            "BMP header declares {} pixel bytes but only {} follow the header",
            info.declared_pixel_bytes(),
            info.capacity_bytes()
        );
    }

    Ok(info)
}

/// 从 `src` 的偏移 0 起读取 `header_size` 个字节，原样写入 `dest`。
pub fn copy_header<R, W>(src: &mut R, dest: &mut CarrierWriter<W>, header_size: usize) -> Result<()>
where
    R: Read + Seek,
    W: Write,
{
    let mut header = vec![0u8; header_size];
    src.rewind().map_err(StegoError::read(FrameField::Header))?;
    src.read_exact(&mut header)
        .map_err(StegoError::read(FrameField::Header))?;
    dest.write_group(&header, FrameField::Header)
}

/// 将游标直接移到头部之后。解码过程中唯一的一次定位。
pub fn skip_header<S: Seek>(stream: &mut S, header_size: usize) -> Result<u64> {
    stream
        .seek(SeekFrom::Start(header_size as u64))
        .map_err(StegoError::read(FrameField::Header))
}

fn read_u32(header: &[u8; BMP_HEADER_SIZE], offset: usize) -> u32 {
    u32::from_le_bytes([
        header[offset],
        header[offset + 1],
        header[offset + 2],
        header[offset + 3],
    ])
}

fn unsupported(reason: String) -> StegoError {
    StegoError::UnsupportedCarrierFormat { reason }
}
