use clap::Parser;

use bmp_lsb::{
    cli::{Cli, Commands},
    handler::{handle_decode, handle_encode},
};

/// 程序的主入口点
///
/// 初始化日志，解析命令行参数，并根据指定的子命令（`encode` 或 `decode`）
/// 将执行分派到相应的处理函数
fn main() -> anyhow::Result<()> {
    // 默认输出 info 级别日志，可通过 RUST_LOG 覆盖
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    // 解析命令行参数
    let cli = Cli::parse();

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Encode(args) => handle_encode(args),
        Commands::Decode(args) => handle_decode(args),
    }
}
