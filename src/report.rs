//! # 输出报告模块
//!
//! 命令处理逻辑通过注入的 `Reporter` 向用户报告进度，
//! 编解码核心本身不产生任何输出。

use colored::Colorize;

/// 向用户报告操作进度的接口。
pub trait Reporter {
    /// 一个主要步骤开始。
    fn step(&self, message: &str);

    /// 仅在详细模式下有意义的附加信息。
    fn detail(&self, message: &str);

    fn success(&self, message: &str);

    fn warn(&self, message: &str);
}

/// 带颜色的终端输出。
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn step(&self, message: &str) {
        println!("{} {}", "::".cyan().bold(), message);
    }

    fn detail(&self, message: &str) {
        if self.verbose {
            println!("   {}", message.dimmed());
        }
    }

    fn success(&self, message: &str) {
        println!("{}", message.green().bold());
    }

    fn warn(&self, message: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }
}

/// 丢弃所有输出。
#[derive(Debug, Clone, Copy, Default)]
pub struct QuietReporter;

impl Reporter for QuietReporter {
    fn step(&self, _message: &str) {}

    fn detail(&self, _message: &str) {}

    fn success(&self, _message: &str) {}

    fn warn(&self, _message: &str) {}
}
