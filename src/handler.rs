//! # 命令处理逻辑模块
//!
//! 包含处理 `implant`、`extract` 和 `info` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用编解码核心以及通过 `Reporter` 向用户报告结果。

use crate::bytecode::{read_hex_file, write_hex_file};
use crate::carrier::{Carrier, CarrierFile};
use crate::cli::{ExtractArgs, ImplantArgs, InfoArgs};
use crate::codec::{CodecOptions, Scheme};
use crate::report::Reporter;
use crate::storage;
use anyhow::{Context, Result};
use colored::Colorize;
use std::path::Path;

fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}\nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn describe(carrier: &Carrier) -> String {
    match carrier {
        Carrier::Bmp(image) => {
            let header = image.header();
            let layout = image.layout();
            format!(
                "BMP {}x{}, {} bpp, row stride {} bytes, padding {} bytes, raw region {} bytes",
                header.width,
                header.height,
                header.bits_per_pixel,
                layout.row_stride,
                layout.padding,
                layout.raw_len()
            )
        }
        Carrier::Wave(audio) => {
            let format = &audio.header().format;
            format!(
                "WAVE PCM, {} channel(s), {} Hz, {} bits per sample, raw region {} bytes",
                format.channels,
                format.sample_rate,
                format.bits_per_sample,
                audio.samples().len()
            )
        }
    }
}

/// 处理 'Implant' 命令的执行逻辑。
///
/// 读取字节码文件与载体，校验容量后植入负载，最后原子地写回载体
/// (或写入 `--dest` 指定的路径)。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取字节码文件，或其中不是合法的十六进制字节。
/// * 载体不是受支持的 BMP / WAVE 文件。
/// * 载体没有足够的空间容纳负载。
/// * 目标文件已存在且未指定 `--force`，或无法写入。
pub fn handle_implant(args: ImplantArgs, reporter: &dyn Reporter) -> Result<()> {
    if let Some(dest) = &args.dest {
        ensure_writable(dest, args.force)?;
    }

    reporter.step(&format!(
        "Reading payload from {}",
        args.bytecode.to_string_lossy()
    ));
    let payload = if args.raw {
        storage::read_file(&args.bytecode).map_err(anyhow::Error::from)
    } else {
        read_hex_file(&args.bytecode).map_err(anyhow::Error::from)
    }
    .with_context(|| {
        format!(
            "Unable to read bytecode file: {}",
            args.bytecode.to_string_lossy().red().bold()
        )
    })?;
    reporter.detail(&format!("payload: {} bytes", payload.len()));

    reporter.step(&format!(
        "Loading carrier {}",
        args.carrier.to_string_lossy()
    ));
    let mut carrier = CarrierFile::open(&args.carrier).with_context(|| {
        format!(
            "Unable to load carrier file: {}",
            args.carrier.to_string_lossy().red().bold()
        )
    })?;
    reporter.detail(&describe(carrier.carrier()));

    let options = CodecOptions::new(Scheme::from(args.scheme));
    let capacity = carrier.capacity(options.scheme);
    reporter.detail(&format!("{} capacity: {} bytes", options.scheme, capacity));

    anyhow::ensure!(
        payload.len() <= capacity,
        "Not enough space in the carrier to hide the payload. \nRequired: {}, Available: {}",
        payload.len().to_string().red().bold(),
        capacity.to_string().green().bold()
    );

    carrier
        .implant(&payload, &options)
        .context("Failed to implant the payload into the carrier.")?;

    let target = args
        .dest
        .clone()
        .unwrap_or_else(|| args.carrier.clone());
    carrier.save_as(&target).with_context(|| {
        format!(
            "Unable to write carrier file: {}",
            target.to_string_lossy().red().bold()
        )
    })?;

    reporter.success(&format!(
        "Implanted {} bytes ({} scheme) into {}",
        payload.len(),
        options.scheme,
        target.to_string_lossy()
    ));
    Ok(())
}

/// 处理 'Extract' 命令的执行逻辑。
///
/// 读取载体、提取负载，并以十六进制文本 (或 `--raw` 时以二进制) 写出。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 输出文件已存在且未指定 `--force`。
/// * 载体无法读取或格式不受支持。
/// * 载体中找不到负载。
/// * 无法写入输出文件。
pub fn handle_extract(args: ExtractArgs, reporter: &dyn Reporter) -> Result<()> {
    ensure_writable(&args.bytecode, args.force)?;

    reporter.step(&format!(
        "Loading carrier {}",
        args.carrier.to_string_lossy()
    ));
    let carrier = CarrierFile::open(&args.carrier).with_context(|| {
        format!(
            "Unable to load carrier file: {}",
            args.carrier.to_string_lossy().red().bold()
        )
    })?;
    reporter.detail(&describe(carrier.carrier()));

    let options =
        CodecOptions::new(Scheme::from(args.scheme)).with_parallel_search(args.parallel_search);
    let payload = carrier.extract(&options).with_context(|| {
        format!(
            "Failed to extract a payload from '{}'. \nThe carrier may not contain hidden data or was written with another scheme.",
            args.carrier.to_string_lossy().red().bold()
        )
    })?;
    reporter.detail(&format!("payload: {} bytes", payload.len()));

    if args.raw {
        storage::write_atomic(&args.bytecode, &payload).map_err(anyhow::Error::from)
    } else {
        write_hex_file(&args.bytecode, &payload).map_err(anyhow::Error::from)
    }
    .with_context(|| {
        format!(
            "Unable to write bytecode file: {}",
            args.bytecode.to_string_lossy().red().bold()
        )
    })?;

    reporter.success(&format!(
        "Extracted {} bytes into {}",
        payload.len(),
        args.bytecode.to_string_lossy()
    ));
    Ok(())
}

/// 处理 'Info' 命令: 打印载体布局以及两种方案下的容量。
pub fn handle_info(args: InfoArgs, reporter: &dyn Reporter) -> Result<()> {
    let carrier = CarrierFile::open(&args.carrier).with_context(|| {
        format!(
            "Unable to load carrier file: {}",
            args.carrier.to_string_lossy().red().bold()
        )
    })?;

    reporter.step(&describe(carrier.carrier()));
    for scheme in [Scheme::Packed, Scheme::Delimited] {
        reporter.success(&format!(
            "{} capacity: {} bytes",
            scheme,
            carrier.capacity(scheme)
        ));
    }
    Ok(())
}
