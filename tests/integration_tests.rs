use carrier_hide::{
    CarrierFile, CodecOptions, ErrorKind, Scheme, StegoError,
    cli::{ExtractArgs, ImplantArgs, InfoArgs, SchemeArg},
    handler::{handle_extract, handle_implant, handle_info},
    report::{QuietReporter, Reporter},
};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use image::{ImageBuffer, ImageFormat, Rgb};
use rand::RngCore;
use std::cell::RefCell;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

/// 一个辅助函数，用于创建一个带有随机像素的 24 位 BMP 测试图像
fn create_test_bmp(path: &Path, width: u32, height: u32) {
    let mut raw_pixels = vec![0u8; (width * height * 3) as usize];
    rand::rng().fill_bytes(&mut raw_pixels);

    let img_buf: ImageBuffer<Rgb<u8>, Vec<u8>> =
        ImageBuffer::from_raw(width, height, raw_pixels).expect("Pixel buffer size mismatch.");
    img_buf
        .save_with_format(path, ImageFormat::Bmp)
        .expect("Failed to create test image.");
}

/// 创建一个单声道 16 位 PCM WAVE，采样数据共 `samples * 2` 字节
fn create_test_wave(path: &Path, samples: usize) {
    let spec = WavSpec {
        channels: 1,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("Failed to create test wave.");
    let mut rng = rand::rng();
    for _ in 0..samples {
        writer
            .write_sample(rng.next_u32() as i16)
            .expect("Failed to write sample.");
    }
    writer.finalize().expect("Failed to finalize test wave.");
}

fn implant_args(bytecode: &Path, carrier: &Path) -> ImplantArgs {
    ImplantArgs {
        bytecode: bytecode.to_path_buf(),
        carrier: carrier.to_path_buf(),
        dest: None,
        force: false,
        raw: false,
        scheme: SchemeArg::Packed,
    }
}

fn extract_args(carrier: &Path, bytecode: &Path) -> ExtractArgs {
    ExtractArgs {
        carrier: carrier.to_path_buf(),
        bytecode: bytecode.to_path_buf(),
        force: false,
        raw: false,
        scheme: SchemeArg::Packed,
        parallel_search: false,
    }
}

/// 64x64 的 24 位 BMP (无行填充) 植入 DE AD BE EF 后能原样提取
#[test]
fn test_bmp_implant_and_extract_integration() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("cover.bmp");
    let source_path = dir.path().join("payload.txt");
    let recovered_path = dir.path().join("recovered.txt");

    create_test_bmp(&carrier_path, 64, 64);
    fs::write(&source_path, "DE AD BE EF")?;

    // 2. 原地植入
    handle_implant(implant_args(&source_path, &carrier_path), &QuietReporter)?;

    // 3. 提取到字节码文件
    handle_extract(extract_args(&carrier_path, &recovered_path), &QuietReporter)?;

    // 4. 验证结果
    let recovered = fs::read_to_string(&recovered_path)?;
    assert_eq!(recovered, "DE AD BE EF ");

    let carrier = CarrierFile::open(&carrier_path)?;
    assert_eq!(
        carrier.extract(&CodecOptions::default())?,
        [0xDE, 0xAD, 0xBE, 0xEF]
    );

    Ok(())
}

/// 宽度不是 4 的倍数时，加载后不做修改直接保存应与原文件逐字节一致
#[test]
fn test_padded_bmp_load_save_is_byte_exact() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original_path = dir.path().join("padded.bmp");
    let copy_path = dir.path().join("copy.bmp");
    create_test_bmp(&original_path, 30, 17);

    let mut carrier = CarrierFile::open(&original_path)?;
    carrier.save_as(&copy_path)?;

    assert_eq!(fs::read(&original_path)?, fs::read(&copy_path)?);
    Ok(())
}

/// 植入后的带填充 BMP 仍是合法图像，且只有最低 2 位 (以及长度前缀) 发生变化
#[test]
fn test_padded_bmp_remains_valid_image() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let original_path = dir.path().join("original.bmp");
    let hidden_path = dir.path().join("hidden.bmp");
    let payload_path = dir.path().join("payload.bin");
    let recovered_path = dir.path().join("recovered.bin");

    create_test_bmp(&original_path, 30, 30);
    let payload: Vec<u8> = (0..=255u8).cycle().take(600).collect();
    fs::write(&payload_path, &payload)?;

    let mut args = implant_args(&payload_path, &original_path);
    args.dest = Some(hidden_path.clone());
    args.raw = true;
    handle_implant(args, &QuietReporter)?;

    let before = image::open(&original_path)?.to_rgb8();
    let after = image::open(&hidden_path)?.to_rgb8();
    assert_eq!(before.dimensions(), after.dimensions());

    let high_bit_changes = before
        .as_raw()
        .iter()
        .zip(after.as_raw())
        .filter(|(a, b)| (*a & 0xFC) != (*b & 0xFC))
        .count();
    assert!(high_bit_changes <= 8, "{high_bit_changes} bytes changed above the low bits");

    let mut args = extract_args(&hidden_path, &recovered_path);
    args.raw = true;
    handle_extract(args, &QuietReporter)?;
    assert_eq!(fs::read(&recovered_path)?, payload);

    Ok(())
}

/// 1000 字节采样数据的 WAVE: 200 字节负载可以植入，250 字节负载空间不足
#[test]
fn test_wave_capacity_scenario() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let carrier_path = dir.path().join("voice.wav");
    let small_path = dir.path().join("small.txt");
    let large_path = dir.path().join("large.txt");
    let recovered_path = dir.path().join("recovered.txt");

    create_test_wave(&carrier_path, 500);
    fs::write(&small_path, "5A ".repeat(200))?;
    fs::write(&large_path, "A5 ".repeat(250))?;

    let original = fs::read(&carrier_path)?;
    let result = handle_implant(implant_args(&large_path, &carrier_path), &QuietReporter);
    assert!(result.is_err());
    if let Err(e) = result {
        assert!(e.to_string().contains("Not enough space"));
    }
    assert_eq!(fs::read(&carrier_path)?, original, "Failed implant must not touch the file.");

    handle_implant(implant_args(&small_path, &carrier_path), &QuietReporter)?;
    handle_extract(extract_args(&carrier_path, &recovered_path), &QuietReporter)?;

    let recovered = carrier_hide::bytecode::read_hex_file(&recovered_path)?;
    assert_eq!(recovered, vec![0x5A; 200]);

    // 其他读取器仍能正常解析植入后的文件
    let reader = WavReader::open(&carrier_path)?;
    assert_eq!(reader.spec().bits_per_sample, 16);
    assert_eq!(reader.len(), 500);

    Ok(())
}

/// 分隔式方案配合并行签名搜索的完整流程
#[test]
fn test_delimited_scheme_with_parallel_search() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let carrier_path = dir.path().join("tone.wav");
    let payload_path = dir.path().join("payload.txt");
    let recovered_path = dir.path().join("recovered.txt");

    create_test_wave(&carrier_path, 2048);
    fs::write(&payload_path, "01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F 10 11")?;

    let mut args = implant_args(&payload_path, &carrier_path);
    args.scheme = SchemeArg::Delimited;
    handle_implant(args, &QuietReporter)?;

    let mut args = extract_args(&carrier_path, &recovered_path);
    args.scheme = SchemeArg::Delimited;
    args.parallel_search = true;
    handle_extract(args, &QuietReporter)?;

    assert_eq!(
        fs::read_to_string(&recovered_path)?,
        "01 02 03 04 05 06 07 08 09 0A 0B 0C 0D 0E 0F 10 \n11 "
    );

    let carrier = CarrierFile::open(&carrier_path)?;
    let sequential = carrier.extract(&CodecOptions::new(Scheme::Delimited))?;
    assert_eq!(sequential, (1..=0x11).collect::<Vec<u8>>());

    Ok(())
}

/// 验证覆盖保护机制以及 `--force` 标志是否按预期工作
#[test]
fn test_overwrite_protection_and_force_flag() -> anyhow::Result<()> {
    // 1. 准备环境
    let dir = tempdir()?;
    let carrier_path = dir.path().join("image.bmp");
    let payload_path = dir.path().join("payload.txt");
    let dest_path = dir.path().join("dest.bmp");

    create_test_bmp(&carrier_path, 20, 20);
    fs::write(&payload_path, "00 11 22 33")?;

    // 2. 场景一：测试覆盖保护
    fs::write(&dest_path, "this is a dummy file to be overwritten")?;

    let mut args = implant_args(&payload_path, &carrier_path);
    args.dest = Some(dest_path.clone());
    let result = handle_implant(args, &QuietReporter);
    assert!(result.is_err(), "Execution should fail without --force when file exists.");
    if let Err(e) = result {
        assert!(e.to_string().contains("Output file already exists"));
    }

    // 3. 场景二：测试强制覆盖
    let mut args = implant_args(&payload_path, &carrier_path);
    args.dest = Some(dest_path.clone());
    args.force = true;
    handle_implant(args, &QuietReporter)?;

    let dummy_content = fs::read(&dest_path)?;
    assert_ne!(dummy_content, b"this is a dummy file to be overwritten");

    // 4. 提取输出同样受保护
    let existing_output = dir.path().join("existing.txt");
    fs::write(&existing_output, "keep me")?;
    let result = handle_extract(extract_args(&dest_path, &existing_output), &QuietReporter);
    assert!(result.is_err());
    assert_eq!(fs::read_to_string(&existing_output)?, "keep me");

    Ok(())
}

/// 签名被改为 0x0000 的 BMP 会被拒绝，且文件保持不变
#[test]
fn test_invalid_signature_is_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let carrier_path = dir.path().join("broken.bmp");
    let payload_path = dir.path().join("payload.txt");

    create_test_bmp(&carrier_path, 8, 8);
    let mut bytes = fs::read(&carrier_path)?;
    bytes[0] = 0;
    bytes[1] = 0;
    fs::write(&carrier_path, &bytes)?;
    fs::write(&payload_path, "FF")?;

    let err = CarrierFile::open(&carrier_path).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);

    let result = handle_implant(implant_args(&payload_path, &carrier_path), &QuietReporter);
    let err = result.unwrap_err();
    assert!(err.to_string().contains("Unable to load carrier file"));
    assert!(matches!(
        err.downcast_ref::<StegoError>(),
        Some(StegoError::InvalidSignature { .. })
    ));
    assert_eq!(fs::read(&carrier_path)?, bytes);

    Ok(())
}

/// 从未植入过数据的载体中提取应失败，且不会创建输出文件
#[test]
fn test_extract_from_clean_carrier_fails() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let carrier_path = dir.path().join("silence.wav");
    let output_path = dir.path().join("out.txt");

    let spec = WavSpec {
        channels: 2,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(&carrier_path, spec)?;
    for _ in 0..256 {
        writer.write_sample(0i16)?;
    }
    writer.finalize()?;

    let result = handle_extract(extract_args(&carrier_path, &output_path), &QuietReporter);
    assert!(result.is_err());
    let kind = result
        .unwrap_err()
        .downcast_ref::<StegoError>()
        .map(StegoError::kind);
    assert_eq!(kind, Some(ErrorKind::NoData));
    assert!(!output_path.exists());

    Ok(())
}

/// 非法的字节码文件在读取阶段就被拒绝
#[test]
fn test_invalid_bytecode_is_rejected() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let carrier_path = dir.path().join("cover.bmp");
    let payload_path = dir.path().join("payload.txt");
    create_test_bmp(&carrier_path, 16, 16);
    fs::write(&payload_path, "DE AD GG")?;

    let original = fs::read(&carrier_path)?;
    let err = handle_implant(implant_args(&payload_path, &carrier_path), &QuietReporter)
        .unwrap_err();
    assert!(err.to_string().contains("Unable to read bytecode file"));
    assert_eq!(fs::read(&carrier_path)?, original);

    Ok(())
}

/// 记录所有输出的 `Reporter`，用于检查命令打印了什么
#[derive(Default)]
struct RecordingReporter {
    lines: RefCell<Vec<String>>,
}

impl RecordingReporter {
    fn record(&self, message: &str) {
        self.lines.borrow_mut().push(message.to_string());
    }
}

impl Reporter for RecordingReporter {
    fn step(&self, message: &str) {
        self.record(message);
    }

    fn detail(&self, message: &str) {
        self.record(message);
    }

    fn success(&self, message: &str) {
        self.record(message);
    }

    fn warn(&self, message: &str) {
        self.record(message);
    }
}

#[test]
fn test_info_reports_capacity() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let carrier_path: PathBuf = dir.path().join("info.bmp");
    create_test_bmp(&carrier_path, 10, 10);

    let reporter = RecordingReporter::default();
    handle_info(
        InfoArgs {
            carrier: carrier_path.clone(),
        },
        &reporter,
    )?;

    let lines = reporter.lines.borrow();
    assert!(lines[0].starts_with("BMP 10x10, 24 bpp"));
    assert!(lines[0].contains("raw region 300 bytes"));
    assert!(lines.contains(&"packed capacity: 72 bytes".to_string()));
    assert!(lines.contains(&"delimited capacity: 288 bytes".to_string()));

    let carrier = CarrierFile::open(&carrier_path)?;
    assert_eq!(carrier.carrier().raw().len(), 300);
    assert_eq!(carrier.capacity(Scheme::Packed), 72);
    assert_eq!(carrier.capacity(Scheme::Delimited), 288);

    Ok(())
}
