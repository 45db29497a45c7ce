//! # 统一错误处理模块
//!
//! 定义 vecpdf 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分级
//! - `VecpdfError`: 致命错误，终止整个批次
//! - `ConvertError`: 单个文档的转换错误，记录后继续处理
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 依赖 `models/job.rs` (批次汇总)

use crate::models::BatchSummary;

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// vecpdf 统一错误类型（致命，终止运行）
#[derive(Error, Debug)]
pub enum VecpdfError {
    // ─────────────────────────────────────────────────────────────
    // 批次错误
    // ─────────────────────────────────────────────────────────────
    #[error("There are no documents to convert under {root} (extensions: {extensions})")]
    NoInput { root: String, extensions: String },

    #[error("Cannot read input directory: {path}")]
    Discovery {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Target already exists: {}", .target.display())]
    Collision {
        target: PathBuf,
        /// 中止时的部分汇总（剩余作业记为 cancelled）
        summary: Box<BatchSummary>,
    },

    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // ─────────────────────────────────────────────────────────────
    // 参数错误
    // ─────────────────────────────────────────────────────────────
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    // ─────────────────────────────────────────────────────────────
    // CSV 错误
    // ─────────────────────────────────────────────────────────────
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// 单文档转换错误（可恢复）
#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("cannot open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("external command '{command}' not found in PATH")]
    CommandNotFound { command: String },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("cancelled")]
    Cancelled,

    #[error("converter reported success but {path} was not written")]
    MissingOutput { path: String },

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, VecpdfError>;

/// 转换 Result 类型别名
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
