use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

use crate::excerpt::cache::DEFAULT_CAPACITY;
use crate::tags::{GlobalDefaults, RichExcerptPolicy};

pub const CONFIG_FILE: &str = "synopsis.toml";

#[derive(Debug, Default, Deserialize)]
pub struct SynopsisConfig {
    #[serde(default)]
    pub synopsis: ExcerptSettings,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub render: RenderConfig,
    #[serde(default)]
    pub log: LogConfig,
}

/// 摘要取自讨论的首帖还是最新回复
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExcerptType {
    #[default]
    First,
    Last,
}

impl ExcerptType {
    /// 讨论列表请求需要额外 include 的关联
    pub fn relation(self) -> &'static str {
        match self {
            Self::First => "firstPost",
            Self::Last => "lastPost",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExcerptSettings {
    #[serde(default)]
    pub excerpt_type: ExcerptType,
    #[serde(default = "default_excerpt_length")]
    pub excerpt_length: i64,
    #[serde(default = "default_true")]
    pub rich_excerpts: bool,
    #[serde(default = "default_image_limit")]
    pub image_limit: i64,
    #[serde(default = "default_true")]
    pub disable_when_searching: bool,
    #[serde(default)]
    pub rich_excerpt_policy: RichExcerptPolicy,
}

#[derive(Debug, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
}

#[derive(Debug, Deserialize)]
pub struct RenderConfig {
    #[serde(default = "default_true")]
    pub parallel: bool,
}

#[derive(Debug, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl SynopsisConfig {
    pub fn load(project_root: &Path) -> Result<Self> {
        let config_path = project_root.join(CONFIG_FILE);
        let content = std::fs::read_to_string(&config_path)
            .map_err(|e| anyhow::anyhow!("读取 {CONFIG_FILE} 失败：{}", e))?;
        let config: SynopsisConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("解析 {CONFIG_FILE} 失败：{}", e))?;
        Ok(config)
    }

    /// 语义检查，返回所有问题描述
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();
        if self.synopsis.excerpt_length < 0 {
            problems.push(format!(
                "synopsis.excerpt_length 不能为负数（当前为 {}）",
                self.synopsis.excerpt_length
            ));
        }
        if self.synopsis.image_limit < 0 {
            problems.push(format!(
                "synopsis.image_limit 不能为负数（当前为 {}）",
                self.synopsis.image_limit
            ));
        }
        problems
    }
}

impl ExcerptSettings {
    pub fn defaults(&self) -> GlobalDefaults {
        GlobalDefaults {
            excerpt_length: self.excerpt_length,
            rich_excerpts: self.rich_excerpts,
        }
    }
}

// 默认值函数
fn default_excerpt_length() -> i64 { 200 }
fn default_image_limit() -> i64 { 3 }
fn default_true() -> bool { true }
fn default_cache_capacity() -> usize { DEFAULT_CAPACITY }
fn default_log_level() -> String { "info".into() }

impl Default for ExcerptSettings {
    fn default() -> Self {
        Self {
            excerpt_type: ExcerptType::default(),
            excerpt_length: default_excerpt_length(),
            rich_excerpts: true,
            image_limit: default_image_limit(),
            disable_when_searching: true,
            rich_excerpt_policy: RichExcerptPolicy::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self { parallel: true }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config: SynopsisConfig = toml::from_str("").unwrap();
        assert_eq!(config.synopsis.excerpt_type, ExcerptType::First);
        assert_eq!(config.synopsis.excerpt_length, 200);
        assert_eq!(config.synopsis.image_limit, 3);
        assert!(config.synopsis.rich_excerpts);
        assert!(config.synopsis.disable_when_searching);
        assert_eq!(config.synopsis.rich_excerpt_policy, RichExcerptPolicy::FalseDominates);
        assert_eq!(config.cache.capacity, 100);
        assert!(config.render.parallel);
        assert_eq!(config.log.level, "info");
    }

    #[test]
    fn parses_all_sections() {
        let config: SynopsisConfig = toml::from_str(
            r#"
            [synopsis]
            excerpt_type = "last"
            excerpt_length = 80
            rich_excerpts = false
            image_limit = 1
            disable_when_searching = false
            rich_excerpt_policy = "true_dominates"

            [cache]
            capacity = 10

            [render]
            parallel = false

            [log]
            level = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(config.synopsis.excerpt_type, ExcerptType::Last);
        assert_eq!(config.synopsis.excerpt_type.relation(), "lastPost");
        assert_eq!(config.synopsis.defaults().excerpt_length, 80);
        assert!(!config.synopsis.defaults().rich_excerpts);
        assert_eq!(config.synopsis.rich_excerpt_policy, RichExcerptPolicy::TrueDominates);
        assert_eq!(config.cache.capacity, 10);
        assert!(!config.render.parallel);
        assert_eq!(config.log.level, "debug");
        assert!(config.validate().is_empty());
    }

    #[test]
    fn validate_reports_negative_budgets() {
        let config: SynopsisConfig =
            toml::from_str("[synopsis]\nexcerpt_length = -1\nimage_limit = -2\n").unwrap();
        assert_eq!(config.validate().len(), 2);
    }

    #[test]
    fn load_reads_project_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "[synopsis]\nimage_limit = 5\n").unwrap();
        let config = SynopsisConfig::load(dir.path()).unwrap();
        assert_eq!(config.synopsis.image_limit, 5);

        let missing = tempfile::tempdir().unwrap();
        assert!(SynopsisConfig::load(missing.path()).is_err());
    }
}
