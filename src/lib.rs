//! # bmp_lsb 库
//!
//! 本库包含 BMP 图像 1 位 LSB 隐写工具的核心逻辑：位打包、容量规划、
//! 帧编解码，以及把它们串起来的编码/解码流程。

// 声明库包含的所有模块。

pub mod bits;
pub mod capacity;
pub mod carrier;
pub mod cli;
pub mod constants;
pub mod error;
pub mod frame;
pub mod handler;
pub mod pipeline;
pub mod stream;

pub use error::{Result, StegoError};
pub use pipeline::{DecodeReport, EncodeReport, decode, encode};
