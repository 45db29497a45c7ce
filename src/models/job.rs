//! # 转换作业数据模型
//!
//! 描述一次批量转换中的源文件、目标路径、作业状态和批次汇总。
//!
//! ## 依赖关系
//! - 被 `batch/`, `converter/`, `commands/` 使用
//! - 被 `utils/report.rs` 序列化导出

use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// 待转换的源文档
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SourceFile {
    /// 绝对路径
    path: PathBuf,
    /// 文件名（含扩展名）
    name: String,
    /// 扩展名（保持原始大小写，不含点）
    extension: String,
}

impl SourceFile {
    /// 从路径创建源文件；文件名非 UTF-8 时返回 None
    pub fn new(path: PathBuf) -> Option<Self> {
        let name = path.file_name()?.to_str()?.to_string();
        let extension = match name.rfind('.') {
            Some(dot) => name[dot + 1..].to_string(),
            None => String::new(),
        };
        Some(Self {
            path,
            name,
            extension,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// 去掉最后一个扩展名后的文件名；没有 `.` 时返回完整文件名
    pub fn base_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(dot) => &self.name[..dot],
            None => &self.name,
        }
    }

    /// 所在目录
    pub fn parent(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new(""))
    }

    /// 源文件当前是否仍然存在
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

impl fmt::Display for SourceFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// 输出位置策略
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputPolicy {
    /// 与源文件相同的目录
    SameDirectory,
    /// 整个批次共用一个目标目录（子目录结构被压平）
    SingleDestination(PathBuf),
}

impl fmt::Display for OutputPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputPolicy::SameDirectory => write!(f, "next to each source"),
            OutputPolicy::SingleDestination(dir) => write!(f, "into {}", dir.display()),
        }
    }
}

/// 目标已存在时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CollisionPolicy {
    /// Remove the existing target and convert again
    Overwrite,
    /// Abort the whole batch on the first existing target
    Fail,
    /// Leave the existing target alone and record the job as failed
    #[default]
    Skip,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CollisionPolicy::Overwrite => write!(f, "overwrite"),
            CollisionPolicy::Fail => write!(f, "fail"),
            CollisionPolicy::Skip => write!(f, "skip"),
        }
    }
}

/// 计算得到的目标文件
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TargetSpec {
    path: PathBuf,
}

impl TargetSpec {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

/// 作业失败原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    /// 源文件在发现之后被删除
    NotFound,
    /// 目标已存在（SKIP / FAIL 策略）
    TargetExists,
    /// 目标路径指向源文件本身（白名单包含目标扩展名时）
    SameAsSource,
    /// OVERWRITE 策略下无法删除已有目标
    RemoveFailed(String),
    /// FAIL 策略中止批次后未执行的作业
    Cancelled,
    /// 外部转换器报错
    Convert(String),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::NotFound => write!(f, "not_found"),
            FailureReason::TargetExists => write!(f, "target_exists"),
            FailureReason::SameAsSource => write!(f, "same_as_source"),
            FailureReason::RemoveFailed(msg) => write!(f, "remove_failed: {}", msg),
            FailureReason::Cancelled => write!(f, "cancelled"),
            FailureReason::Convert(msg) => write!(f, "ConvertError: {}", msg),
        }
    }
}

/// 作业状态
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Succeeded,
    Failed(FailureReason),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, JobStatus::Pending)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Succeeded => write!(f, "succeeded"),
            JobStatus::Failed(reason) => write!(f, "failed:{}", reason),
        }
    }
}

/// 单个转换作业
#[derive(Debug, Clone)]
pub struct ConversionJob {
    pub source: SourceFile,
    pub target: TargetSpec,
    pub status: JobStatus,
}

impl ConversionJob {
    pub fn new(source: SourceFile, target: TargetSpec) -> Self {
        Self {
            source,
            target,
            status: JobStatus::Pending,
        }
    }
}

/// 批次汇总
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    /// 作业总数
    pub total: usize,
    /// 成功数量
    pub succeeded: usize,
    /// 失败数量（含 cancelled）
    pub failed: usize,
    /// 失败详情，按批次顺序
    pub failures: Vec<(SourceFile, FailureReason)>,
    /// 全部作业（按批次顺序），用于导出报告
    pub jobs: Vec<ConversionJob>,
}

impl BatchSummary {
    /// 按批次顺序汇总作业；仍为 pending 的作业记为 cancelled
    pub fn from_jobs(jobs: Vec<ConversionJob>) -> Self {
        let mut summary = BatchSummary::default();
        for mut job in jobs {
            if !job.status.is_terminal() {
                job.status = JobStatus::Failed(FailureReason::Cancelled);
            }
            summary.merge(&job);
            summary.jobs.push(job);
        }
        summary
    }

    /// 合并单个作业结果
    fn merge(&mut self, job: &ConversionJob) {
        self.total += 1;
        match &job.status {
            JobStatus::Succeeded => self.succeeded += 1,
            JobStatus::Failed(reason) => {
                self.failed += 1;
                self.failures.push((job.source.clone(), reason.clone()));
            }
            JobStatus::Pending => unreachable!("pending jobs are cancelled before merging"),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(path: &str) -> SourceFile {
        SourceFile::new(PathBuf::from(path)).unwrap()
    }

    #[test]
    fn test_source_file_names() {
        let s = source("/docs/sub/Logo.Final.AI");
        assert_eq!(s.name(), "Logo.Final.AI");
        assert_eq!(s.base_name(), "Logo.Final");
        assert_eq!(s.extension(), "AI");
        assert_eq!(s.parent(), Path::new("/docs/sub"));

        let bare = source("/docs/README");
        assert_eq!(bare.base_name(), "README");
        assert_eq!(bare.extension(), "");
    }

    #[test]
    fn test_status_display() {
        assert_eq!(JobStatus::Succeeded.to_string(), "succeeded");
        assert_eq!(
            JobStatus::Failed(FailureReason::NotFound).to_string(),
            "failed:not_found"
        );
        assert_eq!(
            FailureReason::Convert("boom".into()).to_string(),
            "ConvertError: boom"
        );
    }

    #[test]
    fn test_summary_counts_add_up() {
        let mut ok = ConversionJob::new(source("/a.ai"), TargetSpec::new("/a.pdf".into()));
        ok.status = JobStatus::Succeeded;
        let mut bad = ConversionJob::new(source("/b.eps"), TargetSpec::new("/b.pdf".into()));
        bad.status = JobStatus::Failed(FailureReason::TargetExists);
        let pending = ConversionJob::new(source("/c.ai"), TargetSpec::new("/c.pdf".into()));

        let summary = BatchSummary::from_jobs(vec![ok, bad, pending]);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.succeeded + summary.failed, summary.total);
        assert_eq!(summary.failures[1].1, FailureReason::Cancelled);
        assert!(!summary.is_clean());
    }
}
