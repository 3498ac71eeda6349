pub mod policy;
pub mod saving;
pub mod store;

use serde::{Deserialize, Serialize};

pub use policy::{EffectiveSettings, GlobalDefaults, RichExcerptPolicy};
pub use store::TagStore;

/// 标签及其摘要覆盖设置；`None` 表示沿用全局设置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    /// 0 表示该标签下不显示摘要
    #[serde(default)]
    pub excerpt_length: Option<i64>,
    #[serde(default)]
    pub rich_excerpts: Option<bool>,
}

impl Tag {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            excerpt_length: None,
            rich_excerpts: None,
        }
    }
}
