//! # 进度工具
//!
//! 百分比格式化、汇总文本，以及封装 `indicatif` 的终端进度观察者。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 实现 `batch/runner.rs` 中的 `ProgressObserver`
//! - 使用 `indicatif` crate

use crate::batch::ProgressObserver;
use crate::models::{BatchSummary, ConversionJob, FailureReason, JobStatus};
use crate::utils::output;

use indicatif::{ProgressBar, ProgressStyle};

/// 完成百分比，保留两位小数；`total == 0` 时为 `0.00`
pub fn format_percentage(completed: usize, total: usize) -> String {
    if total == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", completed as f64 / total as f64 * 100.0)
}

/// 单行进度文本
pub fn progress_line(completed: usize, total: usize) -> String {
    format!("Conversion progress: {}%", format_percentage(completed, total))
}

/// 批次汇总文本
pub fn summary_line(summary: &BatchSummary) -> String {
    format!(
        "{} of {} document(s) converted, {} failed",
        summary.succeeded, summary.total, summary.failed
    )
}

/// 创建标准进度条
pub fn create_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-"),
    );
    pb.set_message(message.to_string());
    pb
}

/// 终端进度观察者：进度条 + 每个作业一行百分比
pub struct TerminalObserver {
    pb: ProgressBar,
}

impl TerminalObserver {
    pub fn new(total: usize) -> Self {
        Self {
            pb: create_progress_bar(total as u64, "Converting"),
        }
    }

    pub fn finish(&self) {
        self.pb.finish_and_clear();
    }
}

impl ProgressObserver for TerminalObserver {
    fn on_job_finished(&self, completed: usize, total: usize, job: &ConversionJob) {
        self.pb.suspend(|| {
            match &job.status {
                JobStatus::Succeeded => {
                    output::print_conversion(&job.source.to_string(), &job.target.to_string())
                }
                JobStatus::Failed(
                    FailureReason::TargetExists
                    | FailureReason::SameAsSource
                    | FailureReason::Cancelled,
                ) => {
                    output::print_skip(&format!("{}: {}", job.source, job.status))
                }
                JobStatus::Failed(reason) => {
                    output::print_error(&format!("{}: {}", job.source, reason))
                }
                JobStatus::Pending => {}
            }
            println!("{}", progress_line(completed, total));
        });
        self.pb.set_position(completed as u64);
    }
}
