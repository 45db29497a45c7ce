//! # 目标路径计算
//!
//! 根据输出位置策略为源文件计算目标路径。只计算路径，不处理冲突。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs`, `commands/` 调用
//! - 使用 `models/job.rs`

use crate::models::{ConversionJob, OutputPolicy, SourceFile, TargetSpec};

/// 默认目标扩展名
pub const PDF_EXTENSION: &str = "pdf";

/// 计算目标文件路径
///
/// 基名为源文件名去掉最后一个扩展名，再加上 `new_ext`（规范化为单个前导点）。
pub fn compute_target(source: &SourceFile, policy: &OutputPolicy, new_ext: &str) -> TargetSpec {
    let ext = new_ext.trim_start_matches('.');
    let file_name = format!("{}.{}", source.base_name(), ext);

    let dir = match policy {
        OutputPolicy::SameDirectory => source.parent(),
        OutputPolicy::SingleDestination(dir) => dir.as_path(),
    };

    TargetSpec::new(dir.join(file_name))
}

/// 为发现的文件批量创建作业
pub fn plan_jobs(sources: Vec<SourceFile>, policy: &OutputPolicy) -> Vec<ConversionJob> {
    sources
        .into_iter()
        .map(|source| {
            let target = compute_target(&source, policy, PDF_EXTENSION);
            ConversionJob::new(source, target)
        })
        .collect()
}
