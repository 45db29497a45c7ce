//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令，取代交互式的文件夹选择对话框。
//!
//! ## 命令结构
//! - `convert`: 批量转换 .eps/.ai 为 PDF
//! - `scan`: 只发现文件并显示目标路径，不做转换
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: convert, scan

pub mod convert;
pub mod scan;

use clap::{ArgAction, Parser, Subcommand};

/// vecpdf - 矢量文档批量转 PDF
#[derive(Parser)]
#[command(name = "vecpdf")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Batch-convert vector documents (.eps/.ai) to PDF",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert every matching document under a folder to PDF
    Convert(convert::ConvertArgs),

    /// List the documents that would be converted and their target paths
    Scan(scan::ScanArgs),
}
