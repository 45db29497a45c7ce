//! # 转换器接口
//!
//! 把“打开文档 / 另存为 PDF / 关闭文档”抽象为窄接口，批处理核心不依赖任何具体宿主程序。
//!
//! ## 功能
//! - `Converter`: 打开源文档
//! - `Document`: 另存为目标文件、关闭
//! - `OpenDocument`: 作用域守卫，任何退出路径都会关闭文档
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 子模块: command (外部命令适配器)

pub mod command;

use crate::error::{ConvertError, ConvertResult};
use crate::models::{ConversionOptions, SourceFile};

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::warn;

/// 单次保存调用的上下文
///
/// 实现者必须遵守 `timeout` 与 `cancel`：超时返回 `ConvertError::Timeout`，
/// 取消返回 `ConvertError::Cancelled`。
pub struct SaveContext<'a> {
    /// 原样转发的转换选项
    pub options: &'a ConversionOptions,
    /// 单个作业的超时（None 表示不限时）
    pub timeout: Option<Duration>,
    /// 批次级取消标志
    pub cancel: &'a AtomicBool,
}

impl SaveContext<'_> {
    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }
}

/// 已打开的文档
pub trait Document {
    /// 另存为目标文件
    fn save_as(&mut self, target: &Path, ctx: &SaveContext<'_>) -> ConvertResult<()>;

    /// 关闭文档，释放宿主资源
    fn close(&mut self) -> ConvertResult<()>;
}

/// 文档转换器
pub trait Converter: Sync {
    /// 转换器名称（用于日志）
    fn name(&self) -> &str;

    /// 打开源文档
    fn open<'a>(&'a self, source: &SourceFile) -> ConvertResult<Box<dyn Document + 'a>>;
}

/// 打开文档的作用域守卫
pub struct OpenDocument<'a> {
    inner: Option<Box<dyn Document + 'a>>,
    label: String,
}

impl<'a> OpenDocument<'a> {
    pub fn open(converter: &'a dyn Converter, source: &SourceFile) -> ConvertResult<Self> {
        Ok(Self {
            inner: Some(converter.open(source)?),
            label: source.name().to_string(),
        })
    }

    pub fn save_as(&mut self, target: &Path, ctx: &SaveContext<'_>) -> ConvertResult<()> {
        match self.inner.as_mut() {
            Some(doc) => doc.save_as(target, ctx),
            None => Err(ConvertError::Other(format!("{} is already closed", self.label))),
        }
    }

    /// 显式关闭并返回关闭错误
    pub fn close(mut self) -> ConvertResult<()> {
        match self.inner.take() {
            Some(mut doc) => doc.close(),
            None => Ok(()),
        }
    }
}

impl Drop for OpenDocument<'_> {
    fn drop(&mut self) {
        if let Some(mut doc) = self.inner.take() {
            if let Err(e) = doc.close() {
                warn!("Failed to close {}: {}", self.label, e);
            }
        }
    }
}

/// 打开、保存、关闭一个文档
///
/// 保存成功后的关闭错误只记录警告，不影响作业结果。
pub fn convert_one(
    converter: &dyn Converter,
    source: &SourceFile,
    target: &Path,
    ctx: &SaveContext<'_>,
) -> ConvertResult<()> {
    let mut doc = OpenDocument::open(converter, source)?;
    doc.save_as(target, ctx)?;
    if let Err(e) = doc.close() {
        warn!("Failed to close {}: {}", source.name(), e);
    }
    Ok(())
}
