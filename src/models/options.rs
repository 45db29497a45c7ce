//! # 转换选项
//!
//! 转发给外部转换器的不透明键值配置。批处理核心只负责传递，从不解释其中的值。

use std::collections::BTreeMap;

/// 已知选项键
pub const COMPATIBILITY_LEVEL: &str = "compatibilityLevel";
pub const COLOR_DOWNSAMPLING_DPI: &str = "colorDownsamplingDPI";
pub const PRESET: &str = "preset";

/// 转换选项
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversionOptions {
    values: BTreeMap<String, String>,
}

impl ConversionOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compatibility_level(self, level: impl Into<String>) -> Self {
        self.with(COMPATIBILITY_LEVEL, level)
    }

    pub fn with_color_downsampling_dpi(self, dpi: u32) -> Self {
        self.with(COLOR_DOWNSAMPLING_DPI, dpi.to_string())
    }

    pub fn with_preset(self, preset: impl Into<String>) -> Self {
        self.with(PRESET, preset)
    }

    /// 设置任意选项（后设置的覆盖先设置的）
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 按键名排序遍历
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// 解析 `KEY=VALUE` 形式的命令行选项
pub fn parse_key_value(raw: &str) -> Option<(String, String)> {
    let (key, value) = raw.split_once('=')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}
