//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::codec::Scheme;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// 一款在未压缩 BMP 图像或 PCM WAVE 音频的采样数据中隐藏任意字节负载的命令行工具。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "一款在未压缩 BMP 图像或 PCM WAVE 音频的采样数据中隐藏任意字节负载的命令行工具。\n负载默认以十六进制文本 (字节码文件) 的形式读写。"
)]
pub struct Cli {
    /// 输出每一步的详细信息。
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令: implant (植入)、extract (提取) 和 info (查看载体信息)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 将字节码文件中的负载植入 BMP 或 WAVE 载体。
    Implant(ImplantArgs),

    /// 从 BMP 或 WAVE 载体中提取负载并写入字节码文件。
    Extract(ExtractArgs),

    /// 显示载体的格式、布局和可用容量。
    Info(InfoArgs),
}

/// 负载编码方案。
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SchemeArg {
    /// 长度前缀 + 每字节展开到 4 个载体字节的最低位。
    #[default]
    Packed,
    /// 原样复制负载，并以 12 字节结束签名收尾。
    Delimited,
}

impl From<SchemeArg> for Scheme {
    fn from(arg: SchemeArg) -> Self {
        match arg {
            SchemeArg::Packed => Scheme::Packed,
            SchemeArg::Delimited => Scheme::Delimited,
        }
    }
}

/// 'implant' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct ImplantArgs {
    /// 包含负载的字节码文件 (以空白分隔的十六进制字节)。
    pub bytecode: PathBuf,

    /// 要植入负载的 BMP 或 WAVE 文件。
    pub carrier: PathBuf,

    /// 将结果写入此路径，而不是原地修改载体。
    #[arg(short, long)]
    pub dest: Option<PathBuf>,

    /// 允许覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// 负载文件按原始二进制读取，而不是十六进制文本。
    #[arg(long)]
    pub raw: bool,

    /// 负载编码方案。
    #[arg(long, value_enum, default_value_t)]
    pub scheme: SchemeArg,
}

/// 'extract' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct ExtractArgs {
    /// 已植入负载的 BMP 或 WAVE 文件。
    pub carrier: PathBuf,

    /// 提取出的负载写入的字节码文件。
    pub bytecode: PathBuf,

    /// 允许覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// 负载按原始二进制写出，而不是十六进制文本。
    #[arg(long)]
    pub raw: bool,

    /// 负载编码方案，必须与植入时一致。
    #[arg(long, value_enum, default_value_t)]
    pub scheme: SchemeArg,

    /// 分隔式方案下并行搜索结束签名。
    #[arg(long)]
    pub parallel_search: bool,
}

/// 'info' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// 要检查的 BMP 或 WAVE 文件。
    pub carrier: PathBuf,
}
