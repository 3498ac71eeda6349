use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::{ExcerptSettings, ExcerptType};
use crate::excerpt::Truncator;
use crate::excerpt::render::{ExcerptRenderer, RenderedExcerpt};
use crate::tags::{Tag, policy};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub content_html: Option<String>,
    #[serde(default)]
    pub content_plain: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discussion {
    pub id: String,
    #[serde(default)]
    pub title: String,
    /// 关联标签的 id
    #[serde(default, rename = "tags")]
    pub tag_ids: Vec<String>,
    #[serde(default)]
    pub first_post: Option<Post>,
    #[serde(default)]
    pub last_post: Option<Post>,
}

impl Discussion {
    pub fn excerpt_post(&self, excerpt_type: ExcerptType) -> Option<&Post> {
        match excerpt_type {
            ExcerptType::First => self.first_post.as_ref(),
            ExcerptType::Last => self.last_post.as_ref(),
        }
    }
}

/// 列表请求原有的 include 参数，可能是单个字符串或列表
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IncludeParam {
    One(String),
    Many(Vec<String>),
}

/// 归一化 include 参数为列表，并追加摘要所需的帖子关联
pub fn include_relations(existing: Option<IncludeParam>, excerpt_type: ExcerptType) -> Vec<String> {
    let mut include = match existing {
        Some(IncludeParam::One(one)) => vec![one],
        Some(IncludeParam::Many(many)) => many,
        None => Vec::new(),
    };
    include.push(excerpt_type.relation().to_string());
    include
}

/// 讨论列表中的一项
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub title: String,
    pub excerpt: Option<RenderedExcerpt>,
}

/// 讨论列表摘要渲染：解析标签设置、选取帖子、渲染摘要
pub struct DiscussionListRenderer<'a> {
    settings: &'a ExcerptSettings,
    tags: HashMap<&'a str, &'a Tag>,
    truncator: &'a Truncator,
    parallel: bool,
}

impl<'a> DiscussionListRenderer<'a> {
    pub fn new(
        settings: &'a ExcerptSettings,
        tags: HashMap<&'a str, &'a Tag>,
        truncator: &'a Truncator,
    ) -> Self {
        Self {
            settings,
            tags,
            truncator,
            parallel: false,
        }
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// `query` 为当前搜索词；开启 `disable_when_searching` 时搜索结果不显示摘要，
    /// 以保留搜索结果中最相关帖子的内容与高亮
    pub fn render(&self, discussions: &[Discussion], query: Option<&str>) -> Vec<ListItem> {
        let searching = query.is_some_and(|q| !q.trim().is_empty());
        if searching && self.settings.disable_when_searching {
            tracing::debug!("搜索中，跳过 {} 个讨论的摘要", discussions.len());
            return discussions.iter().map(|d| list_item(d, None)).collect();
        }

        if self.parallel {
            discussions
                .par_iter()
                .map(|d| list_item(d, self.excerpt_for(d)))
                .collect()
        } else {
            discussions
                .iter()
                .map(|d| list_item(d, self.excerpt_for(d)))
                .collect()
        }
    }

    pub fn effective_settings(&self, discussion: &Discussion) -> policy::EffectiveSettings {
        let tags: Vec<&Tag> = discussion
            .tag_ids
            .iter()
            .filter_map(|id| {
                let tag = self.tags.get(id.as_str()).copied();
                if tag.is_none() {
                    tracing::debug!("讨论 {} 引用了未知标签 {}", discussion.id, id);
                }
                tag
            })
            .collect();
        policy::resolve(
            &tags,
            self.settings.defaults(),
            self.settings.rich_excerpt_policy,
        )
    }

    /// 单个讨论渲染失败只影响该项，回退为不显示摘要
    fn excerpt_for(&self, discussion: &Discussion) -> Option<RenderedExcerpt> {
        let settings = self.effective_settings(discussion);
        if settings.is_suppressed() {
            return None;
        }
        let post = discussion.excerpt_post(self.settings.excerpt_type)?;

        let renderer = ExcerptRenderer::new(self.truncator, self.settings.image_limit);
        match renderer.render(post, &settings) {
            Ok(excerpt) => excerpt,
            Err(e) => {
                tracing::warn!("讨论 {} 的摘要渲染失败：{e}", discussion.id);
                None
            }
        }
    }
}

fn list_item(discussion: &Discussion, excerpt: Option<RenderedExcerpt>) -> ListItem {
    ListItem {
        id: discussion.id.clone(),
        title: discussion.title.clone(),
        excerpt,
    }
}
