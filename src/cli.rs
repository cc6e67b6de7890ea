//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use clap::Parser;
use std::path::PathBuf;

/// 一款基于 1 位 LSB (最低有效位) 隐写术的命令行工具，可将任意文件隐藏在 24 位 BMP 图像中。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款基于 1 位 LSB (最低有效位) 隐写术的命令行工具，可将任意文件连同其扩展名隐藏在未压缩的 24 位 BMP 图像中，并从中恢复。\n\n日志级别可通过环境变量 RUST_LOG 调整，默认为 info。"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (隐藏) 和 decode (恢复)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 在 24 位 BMP 图像中隐藏一个文件。
    #[command(visible_alias = "hide")]
    Encode(EncodeArgs),

    /// 从经过隐写的 BMP 图像中恢复隐藏的文件。
    #[command(visible_alias = "recover")]
    Decode(DecodeArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// 用作载体的 24 位 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 要隐藏的文件路径，必须带有扩展名。
    #[arg(short, long)]
    pub secret: PathBuf,

    /// 隐写结果图像的输出路径 (.bmp)。默认为载体所在目录下的 `stego.bmp`。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 输出文件已存在时直接覆盖。
    #[arg(short, long)]
    pub force: bool,
}

/// 'decode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// 已隐藏数据的 BMP 图像路径。
    #[arg(short, long)]
    pub image: PathBuf,

    /// 恢复文件的输出路径。没有扩展名时自动追加恢复出的扩展名；
    /// 默认为图像所在目录下的 `decoded_secret`。
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 输出文件已存在时直接覆盖。
    #[arg(short, long)]
    pub force: bool,
}
