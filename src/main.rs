use clap::Parser;

use carrier_hide::{
    cli::{Cli, Commands},
    handler::{handle_extract, handle_implant, handle_info},
    report::ConsoleReporter,
};

/// 程序的主入口点
///
/// 负责解析命令行参数，并根据指定的子命令（`implant`、`extract` 或 `info`）
/// 将执行分派到相应的处理函数。任何错误都会以非零退出码结束进程。
fn main() -> anyhow::Result<()> {
    // 解析命令行参数
    let cli = Cli::parse();
    let reporter = ConsoleReporter::new(cli.verbose);

    // 根据子命令调用相应的处理函数
    match cli.command {
        Commands::Implant(args) => handle_implant(args, &reporter),
        Commands::Extract(args) => handle_extract(args, &reporter),
        Commands::Info(args) => handle_info(args, &reporter),
    }
}
