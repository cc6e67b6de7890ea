//! # 编码与解码流程
//!
//! 把头部复制、容量检查、帧编解码和尾部复制串成一次完整的运行。
//! 流在传入时即归本次运行所有，任何一步失败都会立刻返回，流随之释放。

use crate::capacity::{CapacityReport, check_capacity};
use crate::carrier::{copy_header, probe, skip_header, stream_len};
use crate::constants::{BMP_HEADER_SIZE, MAGIC};
use crate::error::{Result, StegoError};
use crate::frame::{FrameField, FrameLayout, decode_frame, encode_frame, validate_extension};
use crate::stream::{CarrierReader, CarrierWriter};
use std::io::{BufReader, BufWriter, Read, Seek, Write};

/// 一次成功编码的摘要。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodeReport {
    pub capacity: CapacityReport,
    pub layout: FrameLayout,
    /// 写入目标载体的总字节数，等于源载体大小。
    pub carrier_len: u64,
}

/// 一次成功解码的摘要。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeReport {
    /// 恢复出的扩展名 (含 `.`)，由调用方决定如何用于命名输出文件。
    pub extension: String,
    pub payload_len: u32,
}

/// 将 `payload` 连同扩展名 `extension` 隐藏到 `source` 载体中，结果写入 `dest`。
///
/// # Arguments
///
/// * `source` - 未压缩的 24 位 BMP 载体。
/// * `payload` - 要隐藏的文件内容，逐字节读取。
/// * `extension` - 载荷文件的扩展名，例如 `.txt`。
/// * `dest` - 目标载体。失败时其中可能已有部分数据，应由调用方丢弃。
///
/// # Errors
///
/// * 扩展名为空或过长。
/// * 载体不是受支持的 BMP 格式。
/// * 载体容量不足 (此时尚未写出任何字节)。
/// * 任何底层读写失败。
pub fn encode<S, P, D>(
    mut source: S,
    mut payload: P,
    extension: &str,
    dest: D,
) -> Result<EncodeReport>
where
    S: Read + Seek,
    P: Read + Seek,
    D: Write,
{
    validate_extension(extension)?;
    let info = probe(&mut source)?;

    let payload_size = stream_len(&mut payload, FrameField::Payload)?;
    let payload_len =
        u32::try_from(payload_size).map_err(|_| StegoError::PayloadTooLarge { len: payload_size })?;
    let planned = FrameLayout::new(extension, payload_len)?;

    let capacity = check_capacity(
        info.capacity_bytes(),
        MAGIC.len() as u64,
        u64::from(planned.extension_len()),
        u64::from(planned.payload_len()),
    )?;
    log::info!("Image capacity is sufficient");

    let mut writer = CarrierWriter::new(BufWriter::new(dest));

    log::info!("Copying BMP header...");
    copy_header(&mut source, &mut writer, BMP_HEADER_SIZE)?;

    let mut reader = CarrierReader::new(BufReader::new(source), BMP_HEADER_SIZE as u64);
    let layout = encode_frame(
        &mut reader,
        extension,
        BufReader::new(payload),
        payload_len,
        &mut writer,
    )?;

    log::info!("Copying remaining image data...");
    let tail = reader.copy_rest(&mut writer)?;
    log::debug!("Copied {tail} untouched tail bytes");

    let carrier_len = writer.position();
    writer.finish()?;
    log::info!("Encoding completed successfully");

    Ok(EncodeReport {
        capacity,
        layout,
        carrier_len,
    })
}

/// 从隐写载体 `stego` 中恢复隐藏的文件，内容写入 `payload_out`。
///
/// # Errors
///
/// * 魔数不符 (此时不会写出任何载荷字节)。
/// * 载体在某个字段读完之前结束。
/// * 恢复的扩展名过长或不是 UTF-8。
/// * 写入 `payload_out` 失败。失败时其中可能只有部分载荷，应由调用方丢弃。
pub fn decode<S, W>(mut stego: S, payload_out: W) -> Result<DecodeReport>
where
    S: Read + Seek,
    W: Write,
{
    let start = skip_header(&mut stego, BMP_HEADER_SIZE)?;

    let mut reader = CarrierReader::new(BufReader::new(stego), start);
    let mut writer = CarrierWriter::new(BufWriter::new(payload_out));
    let (extension, layout) = decode_frame(&mut reader, &mut writer)?;
    writer.finish()?;
    log::info!("Decoding completed successfully");

    Ok(DecodeReport {
        extension,
        payload_len: layout.payload_len(),
    })
}
