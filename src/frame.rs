//! # 帧编解码
//!
//! 帧在载体中的顺序固定为：魔数、扩展名长度、扩展名、载荷长度、载荷。
//! 每个字段都紧接着上一个字段消耗载体字节，不回读、不填充。

use crate::bits::{pack_byte, pack_length, unpack_byte, unpack_length};
use crate::constants::{
    BYTE_GROUP_LEN, LENGTH_FIELD_BYTES, LENGTH_GROUP_LEN, MAGIC, MAGIC_LEN, MAX_EXTENSION_LEN,
};
use crate::error::{Result, StegoError};
use crate::stream::{CarrierReader, CarrierWriter};
use std::fmt;
use std::io::{Read, Write};

/// 帧中的各个区段，用于标注错误发生的位置。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameField {
    Header,
    Magic,
    ExtensionLength,
    Extension,
    PayloadLength,
    Payload,
    Tail,
}

impl fmt::Display for FrameField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Header => "carrier header",
            Self::Magic => "magic marker",
            Self::ExtensionLength => "extension length",
            Self::Extension => "extension",
            Self::PayloadLength => "payload length",
            Self::Payload => "payload",
            Self::Tail => "carrier tail",
        };
        f.write_str(name)
    }
}

/// 一个帧的尺寸描述。只能由扩展名本身或解码结果构造，长度前缀总与其后的字段一致。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameLayout {
    extension_len: u32,
    payload_len: u32,
}

impl FrameLayout {
    /// 由要写入的扩展名和载荷长度构造帧描述。
    ///
    /// # Errors
    ///
    /// 扩展名为空或过长时返回错误，见 [`validate_extension`]。
    pub fn new(extension: &str, payload_len: u32) -> Result<Self> {
        Ok(Self {
            extension_len: validate_extension(extension)?,
            payload_len,
        })
    }

    pub fn extension_len(&self) -> u32 {
        self.extension_len
    }

    pub fn payload_len(&self) -> u32 {
        self.payload_len
    }

    /// 帧中所有字段合计的字节数。
    pub fn frame_bytes(&self) -> u64 {
        Self::frame_bytes_for(
            MAGIC.len() as u64,
            u64::from(self.extension_len),
            u64::from(self.payload_len),
        )
    }

    /// 嵌入该帧所需的位数，同时也是消耗的载体字节数。
    pub fn required_bits(&self) -> u64 {
        self.frame_bytes() * 8
    }

    pub fn required_bits_for(magic_len: u64, extension_len: u64, payload_len: u64) -> u64 {
        Self::frame_bytes_for(magic_len, extension_len, payload_len) * 8
    }

    fn frame_bytes_for(magic_len: u64, extension_len: u64, payload_len: u64) -> u64 {
        magic_len + LENGTH_FIELD_BYTES + extension_len + LENGTH_FIELD_BYTES + payload_len
    }
}

/// 检查扩展名是否可以写入帧，并返回其长度。
pub fn validate_extension(extension: &str) -> Result<u32> {
    if extension.is_empty() {
        return Err(StegoError::EmptyExtension);
    }
    if extension.len() > MAX_EXTENSION_LEN {
        return Err(StegoError::ExtensionTooLong {
            len: extension.len(),
            max: MAX_EXTENSION_LEN,
        });
    }
    Ok(extension.len() as u32)
}

/// 按帧顺序把扩展名和载荷嵌入载体。
///
/// `carrier` 必须位于头部之后；`payload` 会被逐字节读取，恰好读 `payload_len` 个字节。
/// 扩展名长度前缀直接取自 `extension`。返回时 `carrier` 位于帧的末尾，剩余字节由调用方原样复制。
///
/// # Errors
///
/// 扩展名为空或过长时在读写任何字节之前返回错误；载体或载荷提前结束时返回
/// [`StegoError::StreamRead`]，写入失败时返回 [`StegoError::StreamWrite`]。
pub fn encode_frame<R, P, W>(
    carrier: &mut CarrierReader<R>,
    extension: &str,
    payload: P,
    payload_len: u32,
    dest: &mut CarrierWriter<W>,
) -> Result<FrameLayout>
where
    R: Read,
    P: Read,
    W: Write,
{
    let layout = FrameLayout::new(extension, payload_len)?;

    log::info!("Encoding magic marker...");
    for &byte in MAGIC {
        encode_byte(carrier, byte, FrameField::Magic, dest)?;
    }

    log::info!("Encoding secret file extension size...");
    encode_length(carrier, layout.extension_len, FrameField::ExtensionLength, dest)?;

    log::info!("Encoding secret file extension...");
    for &byte in extension.as_bytes() {
        encode_byte(carrier, byte, FrameField::Extension, dest)?;
    }

    log::info!("Encoding secret file size...");
    encode_length(carrier, layout.payload_len, FrameField::PayloadLength, dest)?;

    log::info!("Encoding secret file data...");
    let mut remaining = u64::from(layout.payload_len);
    for byte in payload.take(remaining).bytes() {
        let byte = byte.map_err(StegoError::read(FrameField::Payload))?;
        encode_byte(carrier, byte, FrameField::Payload, dest)?;
        remaining -= 1;
    }
    if remaining > 0 {
        return Err(StegoError::read(FrameField::Payload)(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            format!("payload ended {remaining} bytes early"),
        )));
    }

    log::debug!("Frame ends at carrier offset {}", carrier.position());
    Ok(layout)
}

/// 从载体中解出帧：先校验魔数，再依次读取扩展名与载荷。
///
/// `carrier` 必须位于头部之后。载荷按字节顺序写入 `payload_out`，扩展名作为返回值交给调用方。
///
/// # Errors
///
/// 魔数不符时返回 [`StegoError::MagicMismatch`]，此时不会读取后续字段，也不会写出任何载荷。
pub fn decode_frame<R, W>(
    carrier: &mut CarrierReader<R>,
    payload_out: &mut CarrierWriter<W>,
) -> Result<(String, FrameLayout)>
where
    R: Read,
    W: Write,
{
    let mut found = [0u8; MAGIC_LEN];
    for slot in found.iter_mut() {
        *slot = decode_byte(carrier, FrameField::Magic)?;
    }
    if &found != MAGIC {
        return Err(StegoError::MagicMismatch {
            expected: *MAGIC,
            found,
        });
    }
    log::info!("Magic marker verified");

    let extension_len = decode_length(carrier, FrameField::ExtensionLength)?;
    if extension_len as usize > MAX_EXTENSION_LEN {
        return Err(StegoError::ExtensionTooLong {
            len: extension_len as usize,
            max: MAX_EXTENSION_LEN,
        });
    }

    let extension = (0..extension_len)
        .map(|_| decode_byte(carrier, FrameField::Extension))
        .collect::<Result<Vec<u8>>>()?;
    let extension = String::from_utf8(extension).map_err(|_| StegoError::InvalidExtension)?;
    log::info!("Recovered secret file extension: {extension}");

    let payload_len = decode_length(carrier, FrameField::PayloadLength)?;
    log::info!("Decoding {payload_len} bytes of secret file data...");
    for _ in 0..payload_len {
        let byte = decode_byte(carrier, FrameField::Payload)?;
        payload_out.write_group(&[byte], FrameField::Payload)?;
    }

    Ok((
        extension,
        FrameLayout {
            extension_len,
            payload_len,
        },
    ))
}

fn encode_byte<R: Read, W: Write>(
    carrier: &mut CarrierReader<R>,
    value: u8,
    field: FrameField,
    dest: &mut CarrierWriter<W>,
) -> Result<()> {
    let mut group: [u8; BYTE_GROUP_LEN] = carrier.read_group(field)?;
    pack_byte(value, &mut group);
    dest.write_group(&group, field)
}

fn encode_length<R: Read, W: Write>(
    carrier: &mut CarrierReader<R>,
    value: u32,
    field: FrameField,
    dest: &mut CarrierWriter<W>,
) -> Result<()> {
    let mut group: [u8; LENGTH_GROUP_LEN] = carrier.read_group(field)?;
    pack_length(value, &mut group);
    dest.write_group(&group, field)
}

fn decode_byte<R: Read>(carrier: &mut CarrierReader<R>, field: FrameField) -> Result<u8> {
    let group: [u8; BYTE_GROUP_LEN] = carrier.read_group(field)?;
    Ok(unpack_byte(&group))
}

fn decode_length<R: Read>(carrier: &mut CarrierReader<R>, field: FrameField) -> Result<u32> {
    let group: [u8; LENGTH_GROUP_LEN] = carrier.read_group(field)?;
    Ok(unpack_length(&group))
}
