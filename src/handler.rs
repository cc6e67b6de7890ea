//! # 命令处理逻辑模块
//!
//! 包含处理 `encode` 和 `decode` 子命令的高级业务逻辑。
//! 本模块负责校验文件名、打开文件、调用核心编解码流程以及向用户报告结果。

use crate::cli::{DecodeArgs, EncodeArgs};
use crate::pipeline::{decode, encode};
use anyhow::{Context, Result};
use colored::Colorize;
use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// 未指定输出路径时使用的隐写图像文件名。
pub const DEFAULT_STEGO_NAME: &str = "stego.bmp";

/// 未指定输出路径时使用的恢复文件名 (不含扩展名)。
pub const DEFAULT_DECODED_STEM: &str = "decoded_secret";

/// 处理 'Encode' 命令的执行逻辑。
///
/// 校验输入输出路径、提取秘密文件的扩展名，然后把载体、秘密文件和输出目录下的临时文件交给
/// [`encode`] 流程。只有编码成功后临时文件才会改名为目标文件，因此失败时已有的文件
/// (包括与载体同名的目标) 保持不变。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `EncodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 载体或输出文件不是 `.bmp`，或秘密文件没有扩展名。
/// * 输出文件已存在且未指定 `--force`。
/// * 无法打开输入文件或创建临时输出文件。
/// * 编码流程失败。
/// * 无法将临时文件改名为目标文件。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    ensure_bmp(&args.image, "Source image")?;

    let dest = match args.dest {
        Some(dest) => {
            ensure_bmp(&dest, "Output image")?;
            dest
        }
        None => {
            let dest = sibling(&args.image, DEFAULT_STEGO_NAME);
            log::info!(
                "Output file not provided. Using default: {}",
                dest.to_string_lossy()
            );
            dest
        }
    };
    check_overwrite(&dest, args.force)?;

    let extension = secret_extension(&args.secret)?;

    let image = File::open(&args.image).with_context(|| {
        format!(
            "Unable to open image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let secret = File::open(&args.secret).with_context(|| {
        format!(
            "Unable to open secret file: {}",
            args.secret.to_string_lossy().red().bold()
        )
    })?;

    let mut staging = staging_file(&dest)?;

    let report = encode(image, secret, &extension, &mut staging).with_context(|| {
        format!(
            "Failed to hide '{}' in '{}'.",
            args.secret.to_string_lossy().red().bold(),
            args.image.to_string_lossy().red().bold()
        )
    })?;

    staging.persist(&dest).with_context(|| {
        format!(
            "Unable to write to target image file: {}",
            dest.to_string_lossy().red().bold()
        )
    })?;

    log::debug!(
        "Used {} of {} available bits",
        report.capacity.required_bits,
        report.capacity.available_bits
    );

    println!(
        "The file has been successfully hidden and saved: {}",
        dest.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 先把载荷恢复到输出目录下的临时文件，拿到扩展名之后再确定最终文件名并改名。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `DecodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输入图像不是 `.bmp`。
/// * 图像中没有可识别的隐藏数据，或数据已损坏。
/// * 输出文件已存在且未指定 `--force`。
/// * 无法创建临时文件或将其改名为目标文件。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    ensure_bmp(&args.image, "Input stego image")?;

    let target = args
        .output
        .unwrap_or_else(|| sibling(&args.image, DEFAULT_DECODED_STEM));
    let explicit_extension = target.extension().is_some();
    if explicit_extension {
        check_overwrite(&target, args.force)?;
    }

    let image = File::open(&args.image).with_context(|| {
        format!(
            "Unable to open image file: {}",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let mut staging = staging_file(&target)?;

    let report = decode(image, &mut staging).with_context(|| {
        format!(
            "Failed to recover hidden data from '{}'. \nThe image may not contain a hidden file or is corrupted.",
            args.image.to_string_lossy().red().bold()
        )
    })?;

    let final_path = if explicit_extension {
        target
    } else {
        let path = checked_suffix(&target, &report.extension)?;
        check_overwrite(&path, args.force)?;
        path
    };

    staging.persist(&final_path).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            final_path.to_string_lossy().red().bold()
        )
    })?;

    println!(
        "The hidden file ({} bytes, extension {}) has been successfully recovered and saved: {}",
        report.payload_len.to_string().green(),
        report.extension.green(),
        final_path.to_string_lossy().green().bold()
    );

    Ok(())
}

/// 从秘密文件名中取出扩展名 (含 `.`)。
pub fn secret_extension(path: &Path) -> Result<String> {
    let extension = path.extension().with_context(|| {
        format!(
            "Secret file has no extension: {}",
            path.to_string_lossy().red().bold()
        )
    })?;
    let extension = extension.to_str().with_context(|| {
        format!(
            "Secret file extension is not valid UTF-8: {}",
            path.to_string_lossy().red().bold()
        )
    })?;
    Ok(format!(".{extension}"))
}

fn ensure_bmp(path: &Path, role: &str) -> Result<()> {
    let is_bmp = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("bmp"));
    anyhow::ensure!(
        is_bmp,
        "{} must have .bmp extension: {}",
        role,
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn check_overwrite(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn sibling(path: &Path, name: &str) -> PathBuf {
    path.parent()
        .map_or_else(|| PathBuf::from(name), |dir| dir.join(name))
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

/// 只允许恢复出的扩展名作为文件名后缀，不能借此跳到其他目录。
fn checked_suffix(path: &Path, extension: &str) -> Result<PathBuf> {
    anyhow::ensure!(
        !extension.chars().any(std::path::is_separator),
        "Recovered extension is not a valid file suffix: {}",
        extension.red().bold()
    );
    Ok(with_suffix(path, extension))
}

/// 在 `target` 所在目录创建一个唯一命名的临时文件，未被改名前丢弃时自动删除。
fn staging_file(target: &Path) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    NamedTempFile::new_in(dir).with_context(|| {
        format!(
            "Unable to create a temporary output file in: {}",
            dir.to_string_lossy().red().bold()
        )
    })
}
