//! # 批次报告导出
//!
//! 将每个作业的结果写入 CSV，便于事后排查失败的文档。
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs` 调用
//! - 使用 `csv` + `serde` 写入文件

use crate::error::{Result, VecpdfError};
use crate::models::{BatchSummary, JobStatus};

use serde::Serialize;
use std::path::Path;

/// CSV 报告行
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    index: usize,
    source: String,
    target: String,
    status: &'a str,
    reason: String,
}

/// 写入批次报告
pub fn write_csv(summary: &BatchSummary, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for (i, job) in summary.jobs.iter().enumerate() {
        let (status, reason) = match &job.status {
            JobStatus::Succeeded => ("succeeded", String::new()),
            JobStatus::Failed(reason) => ("failed", reason.to_string()),
            JobStatus::Pending => ("pending", String::new()),
        };
        wtr.serialize(ReportRow {
            index: i + 1,
            source: job.source.to_string(),
            target: job.target.to_string(),
            status,
            reason,
        })?;
    }

    wtr.flush().map_err(|e| VecpdfError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConversionJob, FailureReason, SourceFile, TargetSpec};
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_write_csv() {
        let mut ok = ConversionJob::new(
            SourceFile::new(PathBuf::from("/in/a.ai")).unwrap(),
            TargetSpec::new(PathBuf::from("/out/a.pdf")),
        );
        ok.status = JobStatus::Succeeded;
        let mut bad = ConversionJob::new(
            SourceFile::new(PathBuf::from("/in/b.eps")).unwrap(),
            TargetSpec::new(PathBuf::from("/out/b.pdf")),
        );
        bad.status = JobStatus::Failed(FailureReason::Convert("gs exited".into()));
        let summary = BatchSummary::from_jobs(vec![ok, bad]);

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("report.csv");
        write_csv(&summary, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "index,source,target,status,reason");
        assert_eq!(lines[1], "1,/in/a.ai,/out/a.pdf,succeeded,");
        assert_eq!(lines[2], "2,/in/b.eps,/out/b.pdf,failed,ConvertError: gs exited");
    }
}
