//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `converter/`, `utils/`
//! - 子模块: convert, scan

pub mod convert;
pub mod scan;

use crate::batch::BatchConfig;
use crate::cli::convert::InputArgs;
use crate::cli::Commands;
use crate::error::Result;
use crate::models::{BatchSummary, OutputPolicy};

/// 运行结束状态（决定进程退出码）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// 全部成功（或无需转换）
    Clean,
    /// 批次完成但部分文档失败
    Partial,
    /// 批次完成但所有文档都失败
    AllFailed,
}

impl RunStatus {
    pub fn from_summary(summary: &BatchSummary) -> Self {
        if summary.failed == 0 {
            RunStatus::Clean
        } else if summary.succeeded == 0 {
            RunStatus::AllFailed
        } else {
            RunStatus::Partial
        }
    }

    /// 进程退出码；致命错误统一为 1
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Clean => 0,
            RunStatus::Partial => 2,
            RunStatus::AllFailed => 3,
        }
    }
}

/// 执行命令
pub fn run(cmd: Commands) -> Result<RunStatus> {
    match cmd {
        Commands::Convert(args) => convert::execute(args),
        Commands::Scan(args) => scan::execute(args),
    }
}

/// 由发现参数构造批次配置
fn base_config(input: &InputArgs) -> BatchConfig {
    let mut config = BatchConfig::new(input.input.clone());
    config.recursive = !input.no_recursive;
    config.extensions = input.ext.clone();
    config.excludes = input.excludes.clone();
    config.collision = input.on_conflict;
    config.output = match &input.output {
        Some(dir) => OutputPolicy::SingleDestination(dir.clone()),
        None => OutputPolicy::SameDirectory,
    };
    config
}
