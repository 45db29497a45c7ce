//! # 文件收集器
//!
//! 在输入目录下发现待转换的源文档。
//!
//! ## 功能
//! - 扩展名白名单匹配（大小写不敏感，默认 `eps`, `ai`）
//! - glob 排除模式
//! - 递归目录搜索，按文件名排序的深度优先顺序
//! - 不可读的子目录跳过并记录警告
//!
//! ## 依赖关系
//! - 被 `commands/convert.rs`, `commands/scan.rs` 调用
//! - 使用 `walkdir` 遍历目录，`glob` 匹配排除模式

use crate::error::{Result, VecpdfError};
use crate::models::SourceFile;

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// 默认扩展名白名单
pub const DEFAULT_EXTENSIONS: &[&str] = &["eps", "ai"];

/// 文件收集器
pub struct FileCollector {
    /// 输入路径
    root: PathBuf,
    /// 扩展名白名单（小写，不含点）
    extensions: Vec<String>,
    /// 排除的文件名模式
    excludes: Vec<glob::Pattern>,
    /// 是否递归
    recursive: bool,
}

impl FileCollector {
    /// 创建新的文件收集器
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            extensions: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            excludes: Vec::new(),
            recursive: true,
        }
    }

    /// 设置扩展名白名单（逗号分隔，可带前导点）
    pub fn with_extensions(mut self, list: &str) -> Self {
        let extensions: Vec<String> = list
            .split(',')
            .map(|s| s.trim().trim_start_matches('.').to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        if !extensions.is_empty() {
            self.extensions = extensions;
        }
        self
    }

    /// 设置排除模式
    pub fn with_excludes(mut self, patterns: &[String]) -> Result<Self> {
        self.excludes = patterns
            .iter()
            .map(|p| {
                glob::Pattern::new(p).map_err(|e| VecpdfError::InvalidPattern {
                    pattern: p.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<_>>()?;
        Ok(self)
    }

    /// 设置是否递归搜索
    pub fn recursive(mut self, recursive: bool) -> Self {
        self.recursive = recursive;
        self
    }

    /// 扩展名白名单（用于提示信息）
    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// 收集所有匹配的文件
    ///
    /// 仅当输入路径不存在或不可读时返回错误；子目录读取失败只会跳过该子目录。
    pub fn collect(&self) -> Result<Vec<SourceFile>> {
        let discovery_error = |source| VecpdfError::Discovery {
            path: self.root.display().to_string(),
            source,
        };

        let root = std::path::absolute(&self.root).map_err(discovery_error)?;
        let metadata = fs::metadata(&root).map_err(discovery_error)?;

        if metadata.is_file() {
            return Ok(SourceFile::new(root)
                .filter(|s| self.accepts(s.name()))
                .into_iter()
                .collect());
        }

        // 先确认根目录本身可读
        fs::read_dir(&root).map_err(discovery_error)?;

        let max_depth = if self.recursive { usize::MAX } else { 1 };

        let mut files = Vec::new();
        for entry in WalkDir::new(&root)
            .max_depth(max_depth)
            .sort_by_file_name()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(
                        "Skipping unreadable path {}: {}",
                        e.path().unwrap_or(Path::new("?")).display(),
                        e
                    );
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let Some(name) = entry.file_name().to_str() else {
                warn!("Skipping non UTF-8 file name: {}", entry.path().display());
                continue;
            };

            if self.accepts(name) {
                if let Some(source) = SourceFile::new(entry.into_path()) {
                    files.push(source);
                }
            }
        }

        debug!("Discovered {} file(s) under {}", files.len(), root.display());
        Ok(files)
    }

    /// 文件名是否被白名单接受且未被排除
    fn accepts(&self, name: &str) -> bool {
        self.matches_extension(name) && !self.is_excluded(name)
    }

    /// 检查文件名后缀是否在白名单中
    fn matches_extension(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.extensions.iter().any(|ext| {
            lower.len() > ext.len()
                && lower.ends_with(ext.as_str())
                && lower.as_bytes()[lower.len() - ext.len() - 1] == b'.'
        })
    }

    fn is_excluded(&self, name: &str) -> bool {
        self.excludes.iter().any(|p| p.matches(name))
    }
}
