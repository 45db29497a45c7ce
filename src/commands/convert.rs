//! # convert 命令实现
//!
//! 批量转换 .eps/.ai 文档为 PDF。
//!
//! ## 功能
//! - 发现文档，计算目标路径
//! - 通过外部转换器（默认 Ghostscript）逐个转换
//! - 进度显示、失败汇总、可选 CSV 报告
//!
//! ## 依赖关系
//! - 使用 `cli/convert.rs` 定义的参数
//! - 使用 `batch/`, `converter/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`, `utils/report.rs`

use super::{base_config, RunStatus};
use crate::batch::{duplicate_targets, BatchConfig};
use crate::cli::convert::ConvertArgs;
use crate::converter::command::{default_program, CommandConverter};
use crate::error::{Result, VecpdfError};
use crate::models::options::parse_key_value;
use crate::models::{BatchSummary, CollisionPolicy, ConversionJob, ConversionOptions};
use crate::utils::progress::{summary_line, TerminalObserver};
use crate::utils::{output, report};

use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// 执行 convert 命令
pub fn execute(args: ConvertArgs) -> Result<RunStatus> {
    output::print_header("Converting documents to PDF");

    let config = build_config(&args)?;
    let converter = build_converter(&args);

    let jobs = config.plan()?;
    output::print_info(&format!(
        "Found {} document(s) to convert, saving {}",
        jobs.len(),
        config.output
    ));
    warn_duplicates(&jobs, config.collision);

    if args.dry_run {
        for job in &jobs {
            output::print_conversion(&job.source.to_string(), &job.target.to_string());
        }
        output::print_done("Dry run, nothing converted");
        return Ok(RunStatus::Clean);
    }

    debug!("Using converter '{}'", converter.program());

    let observer = TerminalObserver::new(jobs.len());
    let result = config.execute(jobs, &converter, &observer);
    observer.finish();

    match result {
        Ok(summary) => {
            finish_report(&summary, args.report.as_deref())?;
            print_summary(&summary);
            Ok(RunStatus::from_summary(&summary))
        }
        Err(e) => {
            if let VecpdfError::Collision { summary, .. } = &e {
                finish_report(summary, args.report.as_deref())?;
                output::print_failures(summary);
            }
            Err(e)
        }
    }
}

/// 由命令行参数构造批次配置
fn build_config(args: &ConvertArgs) -> Result<BatchConfig> {
    let mut config = base_config(&args.input);
    config.jobs = args.jobs;
    config.timeout = match args.timeout {
        0 => None,
        secs => Some(Duration::from_secs(secs)),
    };
    config.options = build_options(args)?;
    Ok(config)
}

/// 收集转发给转换器的选项
fn build_options(args: &ConvertArgs) -> Result<ConversionOptions> {
    let mut options = ConversionOptions::new();
    if let Some(level) = &args.compatibility {
        options = options.with_compatibility_level(level.as_str());
    }
    if let Some(dpi) = args.color_dpi {
        options = options.with_color_downsampling_dpi(dpi);
    }
    if let Some(preset) = &args.preset {
        options = options.with_preset(preset.as_str());
    }
    for raw in &args.options {
        let (key, value) = parse_key_value(raw).ok_or_else(|| {
            VecpdfError::InvalidArgument(format!("Expected KEY=VALUE, got '{}'", raw))
        })?;
        options = options.with(key, value);
    }
    Ok(options)
}

/// 选择外部转换器
fn build_converter(args: &ConvertArgs) -> CommandConverter {
    let program = args
        .converter
        .clone()
        .unwrap_or_else(|| default_program().to_string());

    if args.converter_args.is_empty() {
        CommandConverter::ghostscript(program)
    } else {
        CommandConverter::custom(program, args.converter_args.clone())
    }
}

/// 单一目标目录会压平子目录，同名文件落到同一个目标
fn warn_duplicates(jobs: &[ConversionJob], policy: CollisionPolicy) {
    let duplicates = duplicate_targets(jobs);
    if duplicates.is_empty() {
        return;
    }
    output::print_warning(&format!(
        "{} target(s) are shared by several documents (on conflict: {})",
        duplicates.len(),
        policy
    ));
    for target in &duplicates {
        debug!("Shared target: {}", target.display());
    }
}

fn finish_report(summary: &BatchSummary, path: Option<&Path>) -> Result<()> {
    if let Some(path) = path {
        report::write_csv(summary, path)?;
        output::print_success(&format!("Report written to '{}'", path.display()));
    }
    Ok(())
}

fn print_summary(summary: &BatchSummary) {
    output::print_failures(summary);
    if summary.is_clean() {
        output::print_done(&format!("We're done. {}", summary_line(summary)));
    } else {
        output::print_warning(&summary_line(summary));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::models::options::{COLOR_DOWNSAMPLING_DPI, PRESET};
    use crate::models::OutputPolicy;
    use clap::Parser;
    use std::path::PathBuf;

    fn parse(argv: &[&str]) -> ConvertArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Convert(args) => args,
            _ => panic!("expected convert"),
        }
    }

    #[test]
    fn test_defaults() {
        let args = parse(&["vecpdf", "convert", "art"]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.root, PathBuf::from("art"));
        assert!(config.recursive);
        assert_eq!(config.output, OutputPolicy::SameDirectory);
        assert_eq!(config.collision, CollisionPolicy::Skip);
        assert_eq!(config.jobs, 1);
        assert_eq!(config.timeout, Some(Duration::from_secs(300)));
        assert!(config.options.is_empty());
        assert_eq!(build_converter(&args).program(), default_program());
    }

    #[test]
    fn test_full_flags() {
        let args = parse(&[
            "vecpdf",
            "convert",
            "art",
            "-o",
            "pdf",
            "--on-conflict",
            "fail",
            "--no-recursive",
            "--timeout",
            "0",
            "--color-dpi",
            "300",
            "--preset",
            "prepress",
            "--option",
            "AutoRotatePages=/None",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(
            config.output,
            OutputPolicy::SingleDestination(PathBuf::from("pdf"))
        );
        assert_eq!(config.collision, CollisionPolicy::Fail);
        assert!(!config.recursive);
        assert_eq!(config.timeout, None);
        assert_eq!(config.options.get(COLOR_DOWNSAMPLING_DPI), Some("300"));
        assert_eq!(config.options.get(PRESET), Some("prepress"));
        assert_eq!(config.options.get("AutoRotatePages"), Some("/None"));
    }

    #[test]
    fn test_bad_option_rejected() {
        let args = parse(&["vecpdf", "convert", "art", "--option", "oops"]);
        assert!(matches!(
            build_config(&args),
            Err(VecpdfError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_custom_converter_args() {
        let args = parse(&[
            "vecpdf",
            "convert",
            "art",
            "--converter",
            "inkscape",
            "--converter-arg",
            "{input}",
            "--converter-arg",
            "--export-filename={output}",
        ]);
        let conv = build_converter(&args);
        assert_eq!(conv.program(), "inkscape");
        let built = conv.build_args(
            Path::new("a.eps"),
            Path::new("a.pdf"),
            &ConversionOptions::new(),
        );
        assert_eq!(built.len(), 2);
    }
}
