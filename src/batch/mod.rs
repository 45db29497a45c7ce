//! # 批量处理模块
//!
//! 发现源文档、计算目标路径并批量执行转换。
//!
//! ## 功能
//! - 递归发现匹配扩展名的文件
//! - 按输出策略计算目标路径
//! - 顺序或并行执行，冲突策略可配置
//! - 进度回调与结果汇总
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `converter/` 执行单文档转换
//! - 使用 `walkdir` 遍历目录，`rayon` 进行并行处理

pub mod collector;
pub mod pipeline;
pub mod runner;
pub mod target;

pub use pipeline::BatchConfig;
pub use runner::{duplicate_targets, ProgressObserver};
