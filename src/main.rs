//! # vecpdf - 矢量文档批量转 PDF
//!
//! 递归查找 .eps/.ai 文档，通过外部转换器逐个另存为 PDF，并报告进度与失败。
//!
//! ## 子命令
//! - `convert` - 批量转换
//! - `scan`    - 只列出将要转换的文档和目标路径
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (发现、目标路径、批量执行)
//!   │     ├── converter/ (外部转换器适配)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出、进度、报告)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod converter;
mod error;
mod models;
mod utils;

use clap::Parser;
use cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match commands::run(cli.command) {
        Ok(status) => std::process::exit(status.exit_code()),
        Err(e) => {
            utils::output::print_error(&format!("{}", e));
            std::process::exit(1);
        }
    }
}

/// 初始化日志；`RUST_LOG` 优先于 `-v`
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vecpdf={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
