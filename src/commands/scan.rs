//! # scan 命令实现
//!
//! 发现文档并列出目标路径，标记已存在或在批次内重复的目标。不做任何转换。
//!
//! ## 依赖关系
//! - 使用 `cli/scan.rs` 定义的参数
//! - 使用 `batch/`
//! - 使用 `utils/output.rs`

use super::{base_config, RunStatus};
use crate::batch::duplicate_targets;
use crate::cli::scan::ScanArgs;
use crate::error::Result;
use crate::models::ConversionJob;
use crate::utils::output;

use std::collections::HashSet;
use std::path::PathBuf;
use tabled::{Table, Tabled};

/// 扫描结果行
#[derive(Debug, Clone, Tabled)]
struct ScanRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Note")]
    note: String,
}

/// 执行 scan 命令
pub fn execute(args: ScanArgs) -> Result<RunStatus> {
    output::print_header("Scanning for documents");

    let config = base_config(&args.input);
    let jobs = config.plan()?;

    let rows = scan_rows(&jobs);
    println!("{}", Table::new(&rows));

    let conflicts = rows.iter().filter(|r| !r.note.is_empty()).count();
    output::print_info(&format!(
        "{} document(s), saving {} (on conflict: {})",
        jobs.len(),
        config.output,
        config.collision
    ));
    if conflicts > 0 {
        output::print_warning(&format!("{} target(s) need attention", conflicts));
    }

    Ok(RunStatus::Clean)
}

fn scan_rows(jobs: &[ConversionJob]) -> Vec<ScanRow> {
    let shared: HashSet<PathBuf> = duplicate_targets(jobs).into_iter().collect();

    jobs.iter()
        .enumerate()
        .map(|(i, job)| {
            let mut notes = Vec::new();
            if job.target.exists() {
                notes.push("exists");
            }
            if shared.contains(job.target.path()) {
                notes.push("shared");
            }
            ScanRow {
                index: i + 1,
                source: job.source.to_string(),
                target: job.target.to_string(),
                note: notes.join(", "),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::target::plan_jobs;
    use crate::models::{OutputPolicy, SourceFile};
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_scan_rows_flags_conflicts() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("out");
        fs::create_dir_all(&out).unwrap();
        fs::write(out.join("old.pdf"), "x").unwrap();

        let sources = ["x/logo.ai", "y/logo.eps", "old.ai", "fresh.eps"]
            .iter()
            .map(|p| SourceFile::new(tmp.path().join(p)).unwrap())
            .collect();
        let jobs = plan_jobs(sources, &OutputPolicy::SingleDestination(out));

        let notes: Vec<String> = scan_rows(&jobs).into_iter().map(|r| r.note).collect();
        assert_eq!(notes, vec!["shared", "shared", "exists", ""]);
    }
}
