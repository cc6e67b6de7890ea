//! # 载体游标
//!
//! 帧编解码期间对载体的访问只允许向前推进：读取端每次取出下一组固定宽度的字节，
//! 写入端按顺序追加。两者都记录当前位置，并把 I/O 错误标注为正在处理的帧字段。

use crate::error::{Result, StegoError};
use crate::frame::FrameField;
use std::io::{self, Read, Write};

/// 只能向前读取的载体游标。
#[derive(Debug)]
pub struct CarrierReader<R> {
    inner: R,
    position: u64,
}

impl<R: Read> CarrierReader<R> {
    /// 包装一个已经定位到 `position` 的读取器。
    pub fn new(inner: R, position: u64) -> Self {
        Self { inner, position }
    }

    /// 读取下一组 `N` 个载体字节。
    ///
    /// # Errors
    ///
    /// 流提前结束或读取失败时返回 [`StegoError::StreamRead`]。
    pub fn read_group<const N: usize>(&mut self, field: FrameField) -> Result<[u8; N]> {
        let mut group = [0u8; N];
        self.inner
            .read_exact(&mut group)
            .map_err(StegoError::read(field))?;
        self.position += N as u64;
        Ok(group)
    }

    /// 把剩余的全部字节原样转交给 `writer`，返回复制的字节数。
    pub fn copy_rest<W: Write>(&mut self, writer: &mut CarrierWriter<W>) -> Result<u64> {
        let mut buffer = [0u8; 8 * 1024];
        let mut copied = 0u64;
        loop {
            let n = match self.inner.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(StegoError::read(FrameField::Tail)(e)),
            };
            writer.write_group(&buffer[..n], FrameField::Tail)?;
            copied += n as u64;
        }
        self.position += copied;
        Ok(copied)
    }

    /// 当前在载体中的绝对位置。
    pub fn position(&self) -> u64 {
        self.position
    }
}

/// 只能顺序追加的写入端。
///
/// 编码时用于写出目标载体，解码时同样用于写出恢复的载荷；错误都按帧字段标注。
#[derive(Debug)]
pub struct CarrierWriter<W> {
    inner: W,
    position: u64,
}

impl<W: Write> CarrierWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, position: 0 }
    }

    /// 追加一组字节。
    ///
    /// # Errors
    ///
    /// 写入失败时返回 [`StegoError::StreamWrite`]。
    pub fn write_group(&mut self, group: &[u8], field: FrameField) -> Result<()> {
        self.inner
            .write_all(group)
            .map_err(StegoError::write(field))?;
        self.position += group.len() as u64;
        Ok(())
    }

    /// 已写入的字节数。
    pub fn position(&self) -> u64 {
        self.position
    }

    /// 刷新缓冲区并交还底层写入器。
    pub fn finish(mut self) -> Result<W> {
        self.inner
            .flush()
            .map_err(StegoError::write(FrameField::Tail))?;
        Ok(self.inner)
    }
}
