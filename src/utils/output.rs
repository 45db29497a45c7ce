//! # 美化输出工具
//!
//! 提供统一的终端输出样式，以及批次汇总的表格输出。
//!
//! ## 依赖关系
//! - 被所有 `commands/` 模块使用
//! - 使用 `colored` 着色，`tabled` 绘制表格

use crate::models::BatchSummary;

use colored::Colorize;
use tabled::{Table, Tabled};

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印跳过消息
pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印转换成功消息
pub fn print_conversion(from: &str, to: &str) {
    println!(
        "{} {} {} {}",
        "[OK]".green().bold(),
        from.dimmed(),
        "->".cyan(),
        to
    );
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 失败明细行
#[derive(Tabled)]
struct FailureRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Reason")]
    reason: String,
}

/// 打印失败明细表
pub fn print_failures(summary: &BatchSummary) {
    if summary.failures.is_empty() {
        return;
    }

    let rows: Vec<FailureRow> = summary
        .failures
        .iter()
        .enumerate()
        .map(|(i, (source, reason))| FailureRow {
            index: i + 1,
            source: source.to_string(),
            reason: reason.to_string(),
        })
        .collect();

    print_header(&format!("{} failed document(s)", rows.len()));
    println!("{}", Table::new(&rows));
}
