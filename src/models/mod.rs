//! # 数据模型模块
//!
//! 定义源文件、目标路径、转换作业、批次汇总和转换选项。
//!
//! ## 依赖关系
//! - 被 `batch/`, `converter/`, `commands/`, `utils/` 使用
//! - 子模块: job, options

pub mod job;
pub mod options;

pub use job::{
    BatchSummary, CollisionPolicy, ConversionJob, FailureReason, JobStatus, OutputPolicy,
    SourceFile, TargetSpec,
};
pub use options::ConversionOptions;
