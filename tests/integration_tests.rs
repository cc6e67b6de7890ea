use bmp_lsb::{
    cli::{DecodeArgs, EncodeArgs},
    handler::{handle_decode, handle_encode},
};
use image::{ImageBuffer, Rgb};
use rand::RngCore;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的 24 位 BMP 测试图像
fn create_test_image(path: &Path, width: u32, height: u32) {
    let mut img_buf = ImageBuffer::new(width, height);
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    img_buf
        .pixels_mut()
        .zip(raw_pixels.chunks_exact(3))
        .for_each(|(pixel, chunk)| {
            *pixel = Rgb([chunk[0], chunk[1], chunk[2]]);
        });

    img_buf.save(path).expect("Failed to create test image.");
}

/// 列出目录中的文件名，用于确认没有残留的临时文件
fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to list directory.")
        .map(|entry| {
            entry
                .expect("Failed to read directory entry.")
                .file_name()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    names.sort();
    names
}

/// 验证从隐藏到恢复的完整流程
#[test]
fn test_handle_encode_and_decode_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.bmp");
    let hidden_image_path = dir.path().join("hidden.bmp");
    let source_text_path = dir.path().join("source.txt");
    let recovered_text_path = dir.path().join("recovered.txt");

    create_test_image(&original_image_path, 100, 100);
    let original_text = "This is a test message for the handler! 这是一个给处理器的测试信息！";
    fs::write(&source_text_path, original_text)?;

    // 2. 测试 handle_encode
    let encode_args = EncodeArgs {
        image: original_image_path.clone(),
        secret: source_text_path.clone(),
        dest: Some(hidden_image_path.clone()),
        force: false,
    };
    handle_encode(encode_args)?;
    assert!(
        hidden_image_path.exists(),
        "Hidden image should be created."
    );
    assert_eq!(
        fs::metadata(&hidden_image_path)?.len(),
        fs::metadata(&original_image_path)?.len()
    );

    // 3. 测试 handle_decode
    let decode_args = DecodeArgs {
        image: hidden_image_path.clone(),
        output: Some(recovered_text_path.clone()),
        force: false,
    };
    handle_decode(decode_args)?;
    assert!(
        recovered_text_path.exists(),
        "Recovered text file should be created."
    );

    // 4. 验证结果
    let recovered_text = fs::read_to_string(&recovered_text_path)?;
    assert_eq!(
        original_text, recovered_text,
        "Recovered text must match the original."
    );

    Ok(())
}

/// 验证当用户不提供输出路径时，是否能正确生成默认路径并使用恢复出的扩展名
#[test]
fn test_handle_encode_and_decode_with_defaults() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let original_image_path = dir.path().join("original.bmp");
    let source_path = dir.path().join("payload.bin");

    create_test_image(&original_image_path, 64, 64);
    // 目录中已有的同名无关文件，不能被解码过程覆盖
    let unrelated_path = dir.path().join("decoded_secret.partial");
    fs::write(&unrelated_path, "unrelated")?;
    let mut original_bytes = vec![0u8; 2048];
    rand::rng().fill_bytes(&mut original_bytes);
    fs::write(&source_path, &original_bytes)?;

    // 2. 测试 handle_encode，不提供 dest 路径
    let encode_args = EncodeArgs {
        image: original_image_path.clone(),
        secret: source_path.clone(),
        dest: None,
        force: false,
    };
    handle_encode(encode_args)?;

    let expected_hidden_path = dir.path().join("stego.bmp");
    assert!(
        expected_hidden_path.exists(),
        "Default hidden image should be created at: {:?}",
        expected_hidden_path
    );

    // 3. 测试 handle_decode，不提供输出路径
    let decode_args = DecodeArgs {
        image: expected_hidden_path,
        output: None,
        force: false,
    };
    handle_decode(decode_args)?;

    // 默认文件名加上恢复出的扩展名
    let expected_recovered_path = dir.path().join("decoded_secret.bin");
    assert!(
        expected_recovered_path.exists(),
        "Default recovered file should be created at: {:?}",
        expected_recovered_path
    );
    assert_eq!(fs::read_to_string(&unrelated_path)?, "unrelated");
    assert_eq!(
        file_names(dir.path()),
        [
            "decoded_secret.bin",
            "decoded_secret.partial",
            "original.bmp",
            "payload.bin",
            "stego.bmp"
        ]
    );

    // 4. 验证结果
    assert_eq!(fs::read(&expected_recovered_path)?, original_bytes);

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("image.bmp");
    let text_path = dir.path().join("text.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_image(&image_path, 50, 50);
    fs::write(&text_path, "some text")?;

    // 2. 场景一：测试覆盖保护
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;
    assert!(dest_path.exists());

    let encode_args_no_force = EncodeArgs {
        image: image_path.clone(),
        secret: text_path.clone(),
        dest: Some(dest_path.clone()),
        force: false,
    };

    let result = handle_encode(encode_args_no_force);
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let encode_args_with_force = EncodeArgs {
        image: image_path.clone(),
        secret: text_path.clone(),
        dest: Some(dest_path.clone()),
        force: true,
    };

    let result = handle_encode(encode_args_with_force);
    assert!(result.is_ok(), "Execution should succeed with --force when file exists.");

    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    // 4. 场景三：解码时同样受保护
    let existing = dir.path().join("decoded_secret.txt");
    fs::write(&existing, "keep me")?;
    let decode_args = DecodeArgs {
        image: dest_path.clone(),
        output: None,
        force: false,
    };
    let result = handle_decode(decode_args);
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&existing)?, "keep me");
    assert_eq!(
        file_names(dir.path()),
        ["decoded_secret.txt", "dest.bmp", "image.bmp", "text.txt"]
    );

    Ok(())
}

/// 验证空间不足时的错误处理
#[test]
fn test_handle_encode_not_enough_space() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let image_path = dir.path().join("small.bmp");
    let text_path = dir.path().join("large.txt");
    let dest_path = dir.path().join("dest.bmp");

    // 创建一个非常小的图片
    create_test_image(&image_path, 10, 10);
    // 创建一个非常大的文本
    let large_text = "a".repeat(5000);
    fs::write(&text_path, large_text)?;

    // 2. 执行并断言错误
    let encode_args = EncodeArgs {
        image: image_path,
        secret: text_path,
        dest: Some(dest_path.clone()),
        force: false,
    };
    let result = handle_encode(encode_args);

    assert!(result.is_err());
    if let Err(e) = result {
        assert!(format!("{e:#}").contains("not enough space"));
    }
    assert!(!dest_path.exists(), "Failed output must be discarded.");
    assert_eq!(file_names(dir.path()), ["large.txt", "small.bmp"]);

    Ok(())
}

/// 验证容量不足时，使用 `--force` 指定的已有输出文件保持不变
#[test]
fn test_existing_dest_survives_capacity_failure() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("tiny.bmp");
    let text_path = dir.path().join("big.txt");
    let dest_path = dir.path().join("keep.bmp");

    create_test_image(&image_path, 4, 4);
    fs::write(&text_path, "x".repeat(500))?;
    fs::write(&dest_path, "precious")?;

    let result = handle_encode(EncodeArgs {
        image: image_path,
        secret: text_path,
        dest: Some(dest_path.clone()),
        force: true,
    });

    assert!(result.is_err_and(|e| format!("{e:#}").contains("not enough space")));
    assert_eq!(fs::read_to_string(&dest_path)?, "precious");
    assert_eq!(file_names(dir.path()), ["big.txt", "keep.bmp", "tiny.bmp"]);

    Ok(())
}

/// 验证输出路径与载体相同时，载体不会在读取前被截断
#[test]
fn test_encode_in_place() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("cover.bmp");
    let text_path = dir.path().join("note.txt");
    let recovered_path = dir.path().join("note_back.txt");

    create_test_image(&image_path, 32, 32);
    fs::write(&text_path, "written over the cover itself")?;
    let original_image = fs::read(&image_path)?;

    // 未指定 --force 时拒绝覆盖，载体保持原样
    let result = handle_encode(EncodeArgs {
        image: image_path.clone(),
        secret: text_path.clone(),
        dest: Some(image_path.clone()),
        force: false,
    });
    assert!(result.is_err_and(|e| e.to_string().contains("Output file already exists")));
    assert_eq!(fs::read(&image_path)?, original_image);

    // 指定 --force 时载体被替换为隐写结果
    handle_encode(EncodeArgs {
        image: image_path.clone(),
        secret: text_path.clone(),
        dest: Some(image_path.clone()),
        force: true,
    })?;

    let stego_image = fs::read(&image_path)?;
    assert_eq!(stego_image.len(), original_image.len());
    assert_ne!(stego_image, original_image);
    for (after, before) in stego_image.iter().zip(original_image.iter()) {
        assert_eq!(after & 0xFE, before & 0xFE);
    }

    handle_decode(DecodeArgs {
        image: image_path.clone(),
        output: Some(recovered_path.clone()),
        force: false,
    })?;
    assert_eq!(
        fs::read_to_string(&recovered_path)?,
        "written over the cover itself"
    );
    assert_eq!(
        file_names(dir.path()),
        ["cover.bmp", "note.txt", "note_back.txt"]
    );

    Ok(())
}

/// 验证非 BMP 文件与无隐藏数据的图像会被拒绝
#[test]
fn test_rejects_bad_inputs() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let image_path = dir.path().join("plain.bmp");
    let text_path = dir.path().join("secret.txt");
    let png_path = dir.path().join("picture.png");

    create_test_image(&image_path, 20, 20);
    fs::write(&text_path, "hello")?;
    fs::write(&png_path, "not really a png")?;

    let result = handle_encode(EncodeArgs {
        image: png_path,
        secret: text_path.clone(),
        dest: None,
        force: false,
    });
    assert!(result.is_err_and(|e| e.to_string().contains(".bmp")));

    let no_extension = dir.path().join("secret");
    fs::write(&no_extension, "hello")?;
    let result = handle_encode(EncodeArgs {
        image: image_path.clone(),
        secret: no_extension,
        dest: None,
        force: false,
    });
    assert!(result.is_err_and(|e| e.to_string().contains("no extension")));

    // 随机像素的图像几乎不可能以魔数开头
    let output = dir.path().join("out.txt");
    let result = handle_decode(DecodeArgs {
        image: image_path,
        output: Some(output.clone()),
        force: false,
    });
    if let Err(e) = result {
        assert!(format!("{e:#}").contains("magic marker mismatch"));
        assert!(!output.exists());
    }

    Ok(())
}
