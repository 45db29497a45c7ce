//! # convert 子命令 CLI 定义
//!
//! 批量转换 .eps/.ai 文档为 PDF
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs`, `cli/scan.rs` 使用
//! - 参数传递给 `commands/convert.rs`

use crate::models::CollisionPolicy;

use clap::Args;
use std::path::PathBuf;

/// 发现与输出位置参数（convert 与 scan 共用）
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Folder with the documents to convert (or a single document)
    #[arg(env = "VECPDF_INPUT")]
    pub input: PathBuf,

    /// Folder for the PDF files; defaults to each document's own folder
    #[arg(short, long, env = "VECPDF_OUTPUT")]
    pub output: Option<PathBuf>,

    /// Only look at the top level of the input folder
    #[arg(long, default_value_t = false)]
    pub no_recursive: bool,

    /// Comma-separated list of extensions to convert
    #[arg(short, long, default_value = "eps,ai", env = "VECPDF_EXTENSIONS")]
    pub ext: String,

    /// File-name glob to exclude (repeatable)
    #[arg(short = 'x', long = "exclude")]
    pub excludes: Vec<String>,

    /// What to do when a PDF already exists at the target path
    #[arg(long, value_enum, default_value_t = CollisionPolicy::Skip, env = "VECPDF_ON_CONFLICT")]
    pub on_conflict: CollisionPolicy,
}

/// convert 子命令参数
#[derive(Args, Debug)]
pub struct ConvertArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Number of parallel jobs (1 = sequential, 0 = auto)
    #[arg(short, long, default_value_t = 1, env = "VECPDF_JOBS")]
    pub jobs: usize,

    /// Per-document timeout in seconds (0 = no timeout)
    #[arg(long, default_value_t = 300, env = "VECPDF_TIMEOUT")]
    pub timeout: u64,

    /// External converter program (defaults to Ghostscript)
    #[arg(long, env = "VECPDF_CONVERTER")]
    pub converter: Option<String>,

    /// Argument template for a custom converter; supports {input} and {output} (repeatable)
    #[arg(long = "converter-arg", allow_hyphen_values = true)]
    pub converter_args: Vec<String>,

    /// PDF compatibility level, e.g. 1.4 or 1.6
    #[arg(long)]
    pub compatibility: Option<String>,

    /// Downsample color images to this resolution (DPI)
    #[arg(long)]
    pub color_dpi: Option<u32>,

    /// Output preset, e.g. prepress, printer, ebook, screen
    #[arg(long)]
    pub preset: Option<String>,

    /// Extra converter option as KEY=VALUE (repeatable)
    #[arg(long = "option")]
    pub options: Vec<String>,

    /// Write a per-document CSV report
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Show what would be converted without converting
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
