use anyhow::Result;
use std::collections::HashSet;
use std::path::Path;

use crate::config::{CONFIG_FILE, SynopsisConfig};
use crate::tags::TagStore;
use crate::tags::store::TAGS_FILE;

pub struct CheckResult {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// 执行项目检查，依次验证配置文件与标签设置
pub fn run(project_root: &Path) -> Result<CheckResult> {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_config(project_root, &mut errors, &mut warnings);
    check_tags(project_root, &mut errors, &mut warnings);

    Ok(CheckResult { errors, warnings })
}

fn check_config(root: &Path, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        errors.push(format!("缺少 {CONFIG_FILE} 配置文件"));
        return;
    }
    let config = match SynopsisConfig::load(root) {
        Ok(cfg) => cfg,
        Err(e) => {
            errors.push(format!("{CONFIG_FILE} 解析失败: {e}"));
            return;
        }
    };
    errors.extend(config.validate());

    if config.cache.capacity == 0 {
        warnings.push("cache.capacity 为 0，摘要结果不会被缓存".to_string());
    }
}

fn check_tags(root: &Path, errors: &mut Vec<String>, warnings: &mut Vec<String>) {
    if !root.join(TAGS_FILE).exists() {
        warnings.push(format!("{TAGS_FILE} 不存在，所有讨论使用全局设置"));
        return;
    }
    let store = match TagStore::load(root) {
        Ok(store) => store,
        Err(e) => {
            errors.push(format!("{TAGS_FILE} 解析失败: {e:#}"));
            return;
        }
    };

    let mut seen = HashSet::new();
    for tag in store.tags() {
        if !seen.insert(tag.id.as_str()) {
            errors.push(format!("标签 id {} 重复", tag.id));
        }
        if let Some(length) = tag.excerpt_length
            && length < 0
        {
            errors.push(format!("标签 {} 的 excerptLength 不能为负数（当前为 {length}）", tag.name));
        }
    }
}
