use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::ExcerptError;
use crate::tags::{Tag, saving};

pub const TAGS_FILE: &str = "tags.json";

/// 标签设置存储：项目根目录下的 tags.json
pub struct TagStore {
    tags: Vec<Tag>,
    path: PathBuf,
}

impl TagStore {
    /// 从文件加载，不存在则返回空表
    pub fn load(project_root: &Path) -> Result<Self> {
        let path = project_root.join(TAGS_FILE);
        let tags = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("读取 {} 失败", path.display()))?;
            serde_json::from_str(&content)
                .with_context(|| format!("解析 {} 失败", path.display()))?
        } else {
            tracing::debug!("标签文件不存在：{}", path.display());
            Vec::new()
        };
        Ok(Self { tags, path })
    }

    /// 用现成的标签表构造，保存时写入 `project_root` 下的 tags.json
    pub fn from_tags(project_root: &Path, tags: Vec<Tag>) -> Self {
        Self {
            tags,
            path: project_root.join(TAGS_FILE),
        }
    }

    /// 持久化当前标签表
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.tags)?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("写入 {} 失败", self.path.display()))?;
        Ok(())
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    /// 按 id 建立索引，供渲染讨论列表时查询
    pub fn index(&self) -> HashMap<&str, &Tag> {
        self.tags.iter().map(|tag| (tag.id.as_str(), tag)).collect()
    }

    pub fn insert(&mut self, tag: Tag) {
        match self.tags.iter_mut().find(|existing| existing.id == tag.id) {
            Some(existing) => *existing = tag,
            None => self.tags.push(tag),
        }
    }

    /// 对指定标签应用变更集
    pub fn apply(&mut self, id: &str, data: &serde_json::Value) -> Result<&Tag, ExcerptError> {
        let tag = self
            .tags
            .iter_mut()
            .find(|tag| tag.id == id)
            .ok_or_else(|| ExcerptError::TagNotFound(id.to_string()))?;
        saving::apply_change_set(tag, data)?;
        Ok(tag)
    }
}
