//! # 批次配置与入口
//!
//! 把发现、目标计算和批量执行串成一次完整的运行。
//!
//! ## 流程
//! 1. 按配置发现源文件
//! 2. 计算目标路径，生成作业
//! 3. 无输入时立即返回 `NoInput`，不做任何转换
//! 4. 创建目标目录，交给 `BatchRunner` 执行
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs`, `commands/scan.rs` 调用
//! - 使用 `batch/collector.rs`, `batch/target.rs`, `batch/runner.rs`

use super::collector::{FileCollector, DEFAULT_EXTENSIONS};
use super::runner::{BatchRunner, ProgressObserver};
use super::target::plan_jobs;
use crate::converter::Converter;
use crate::error::{Result, VecpdfError};
use crate::models::{
    BatchSummary, CollisionPolicy, ConversionJob, ConversionOptions, OutputPolicy,
};

use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

/// 一次批量转换的完整配置
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// 输入目录（或单个文件）
    pub root: PathBuf,
    /// 是否递归子目录
    pub recursive: bool,
    /// 扩展名白名单（逗号分隔）
    pub extensions: String,
    /// 排除的文件名模式
    pub excludes: Vec<String>,
    pub output: OutputPolicy,
    pub collision: CollisionPolicy,
    /// 并行作业数（1 = 顺序执行，0 = 全部 CPU）
    pub jobs: usize,
    pub timeout: Option<Duration>,
    pub options: ConversionOptions,
}

impl BatchConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            recursive: true,
            extensions: DEFAULT_EXTENSIONS.join(","),
            excludes: Vec::new(),
            output: OutputPolicy::SameDirectory,
            collision: CollisionPolicy::default(),
            jobs: 1,
            timeout: None,
            options: ConversionOptions::default(),
        }
    }

    /// 按配置构造文件收集器
    pub fn collector(&self) -> Result<FileCollector> {
        FileCollector::new(self.root.clone())
            .with_extensions(&self.extensions)
            .recursive(self.recursive)
            .with_excludes(&self.excludes)
    }

    /// 发现源文件并生成作业；没有匹配文件时返回 `NoInput`
    pub fn plan(&self) -> Result<Vec<ConversionJob>> {
        let collector = self.collector()?;
        let sources = collector.collect()?;

        if sources.is_empty() {
            return Err(VecpdfError::NoInput {
                root: self.root.display().to_string(),
                extensions: collector.extensions().join(", "),
            });
        }

        info!("Discovered {} document(s)", sources.len());
        Ok(plan_jobs(sources, &self.output))
    }

    /// 执行已生成的作业
    pub fn execute(
        &self,
        jobs: Vec<ConversionJob>,
        converter: &dyn Converter,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchSummary> {
        prepare_destination(&self.output)?;

        BatchRunner::new(converter, self.jobs)
            .with_options(self.options.clone())
            .with_collision_policy(self.collision)
            .with_timeout(self.timeout)
            .run(jobs, observer)
    }
}

/// 单一目标目录策略下创建目标目录
fn prepare_destination(policy: &OutputPolicy) -> Result<()> {
    if let OutputPolicy::SingleDestination(dir) = policy {
        fs::create_dir_all(dir).map_err(|e| VecpdfError::FileWriteError {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::runner::SilentObserver;
    use crate::converter::{Document, SaveContext};
    use crate::error::{ConvertError, ConvertResult};
    use crate::models::SourceFile;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// 统计调用次数、写入占位 PDF 的转换器
    struct CountingConverter {
        opened: AtomicUsize,
    }

    struct StubDocument;

    impl Document for StubDocument {
        fn save_as(&mut self, target: &Path, _ctx: &SaveContext<'_>) -> ConvertResult<()> {
            fs::write(target, b"%PDF-1.6").map_err(ConvertError::Io)
        }

        fn close(&mut self) -> ConvertResult<()> {
            Ok(())
        }
    }

    impl Converter for CountingConverter {
        fn name(&self) -> &str {
            "counting"
        }

        fn open<'a>(&'a self, _source: &SourceFile) -> ConvertResult<Box<dyn Document + 'a>> {
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(StubDocument))
        }
    }

    fn run_batch(
        config: &BatchConfig,
        converter: &dyn Converter,
        observer: &dyn ProgressObserver,
    ) -> Result<BatchSummary> {
        let jobs = config.plan()?;
        config.execute(jobs, converter, observer)
    }

    fn counting() -> CountingConverter {
        CountingConverter {
            opened: AtomicUsize::new(0),
        }
    }

    #[test]
    fn test_no_input_fails_before_conversion() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("notes.txt"), "x").unwrap();

        let conv = counting();
        let config = BatchConfig::new(tmp.path().to_path_buf());
        let result = run_batch(&config, &conv, &SilentObserver);

        assert!(matches!(result, Err(VecpdfError::NoInput { .. })));
        assert_eq!(conv.opened.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_root_is_discovery_error() {
        let tmp = TempDir::new().unwrap();
        let conv = counting();
        let result = run_batch(
            &BatchConfig::new(tmp.path().join("missing")),
            &conv,
            &SilentObserver,
        );
        assert!(matches!(result, Err(VecpdfError::Discovery { .. })));
    }

    #[test]
    fn test_single_destination_created() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("in/deep")).unwrap();
        fs::write(tmp.path().join("in/deep/logo.eps"), "x").unwrap();

        let mut config = BatchConfig::new(tmp.path().join("in"));
        config.output = OutputPolicy::SingleDestination(tmp.path().join("out/pdf"));

        let conv = counting();
        let summary = run_batch(&config, &conv, &SilentObserver).unwrap();
        assert_eq!(summary.succeeded, 1);
        assert!(tmp.path().join("out/pdf/logo.pdf").exists());
    }

    #[test]
    fn test_custom_extensions() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.svg"), "x").unwrap();
        fs::write(tmp.path().join("b.ai"), "x").unwrap();

        let mut config = BatchConfig::new(tmp.path().to_path_buf());
        config.extensions = "svg".to_string();

        let jobs = config.plan().unwrap();
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].source.name(), "a.svg");
    }
}
