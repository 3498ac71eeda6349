//! 多标签讨论的摘要设置聚合
//!
//! 长度取所有已设置标签的最小值；富文本开关按 [`RichExcerptPolicy`] 在全局默认值与标签显式设置之间取舍。

use serde::{Deserialize, Serialize};

use crate::tags::Tag;

/// 富文本摘要的合并策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RichExcerptPolicy {
    /// 任一标签显式关闭即关闭
    #[default]
    FalseDominates,
    /// 任一标签显式开启即开启
    TrueDominates,
}

pub const DEFAULT_RICH_POLICY: RichExcerptPolicy = RichExcerptPolicy::FalseDominates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GlobalDefaults {
    pub excerpt_length: i64,
    pub rich_excerpts: bool,
}

/// 单个讨论最终生效的摘要设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectiveSettings {
    pub excerpt_length: i64,
    pub rich_excerpt: bool,
}

impl EffectiveSettings {
    /// 长度为 0 表示不显示摘要
    pub fn is_suppressed(&self) -> bool {
        self.excerpt_length == 0
    }
}

/// 长度策略：取所有显式设置的最小值，全部未设置时返回 `None`
pub fn minimum_length<'a>(tags: impl IntoIterator<Item = &'a Tag>) -> Option<i64> {
    tags.into_iter().filter_map(|tag| tag.excerpt_length).min()
}

impl RichExcerptPolicy {
    pub fn apply<'a>(self, global: bool, tags: impl IntoIterator<Item = &'a Tag>) -> bool {
        let mut explicit = tags.into_iter().filter_map(|tag| tag.rich_excerpts);
        match self {
            Self::FalseDominates => {
                if explicit.any(|flag| !flag) {
                    false
                } else {
                    global
                }
            }
            Self::TrueDominates => {
                if explicit.any(|flag| flag) {
                    true
                } else {
                    global
                }
            }
        }
    }
}

/// 把一个讨论的全部标签归约为一份生效设置
pub fn resolve(tags: &[&Tag], defaults: GlobalDefaults, policy: RichExcerptPolicy) -> EffectiveSettings {
    EffectiveSettings {
        excerpt_length: minimum_length(tags.iter().copied()).unwrap_or(defaults.excerpt_length),
        rich_excerpt: policy.apply(defaults.rich_excerpts, tags.iter().copied()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(length: Option<i64>, rich: Option<bool>) -> Tag {
        Tag {
            excerpt_length: length,
            rich_excerpts: rich,
            ..Tag::new("t", "tag")
        }
    }

    const DEFAULTS: GlobalDefaults = GlobalDefaults {
        excerpt_length: 100,
        rich_excerpts: true,
    };

    #[test]
    fn length_is_minimum_of_set_values() {
        let tags = [tag(None, None), tag(Some(50), None), tag(Some(30), None)];
        let refs: Vec<&Tag> = tags.iter().collect();
        let settings = resolve(&refs, DEFAULTS, DEFAULT_RICH_POLICY);
        assert_eq!(settings.excerpt_length, 30);
    }

    #[test]
    fn length_falls_back_to_global() {
        let tags = [tag(None, None)];
        let refs: Vec<&Tag> = tags.iter().collect();
        assert_eq!(resolve(&refs, DEFAULTS, DEFAULT_RICH_POLICY).excerpt_length, 100);
        assert_eq!(resolve(&[], DEFAULTS, DEFAULT_RICH_POLICY).excerpt_length, 100);
    }

    #[test]
    fn zero_length_tag_suppresses() {
        let tags = [tag(Some(0), None), tag(Some(80), None)];
        let refs: Vec<&Tag> = tags.iter().collect();
        assert!(resolve(&refs, DEFAULTS, DEFAULT_RICH_POLICY).is_suppressed());
    }

    #[test]
    fn explicit_false_dominates() {
        let tags = [tag(None, Some(true)), tag(None, None), tag(None, Some(false))];
        let refs: Vec<&Tag> = tags.iter().collect();
        assert!(!resolve(&refs, DEFAULTS, RichExcerptPolicy::FalseDominates).rich_excerpt);
    }

    #[test]
    fn explicit_true_does_not_override_global_false() {
        let defaults = GlobalDefaults {
            rich_excerpts: false,
            ..DEFAULTS
        };
        let tags = [tag(None, Some(true))];
        let refs: Vec<&Tag> = tags.iter().collect();
        assert!(!resolve(&refs, defaults, RichExcerptPolicy::FalseDominates).rich_excerpt);
        assert!(resolve(&refs, defaults, RichExcerptPolicy::TrueDominates).rich_excerpt);
    }

    #[test]
    fn true_dominates_variant() {
        let tags = [tag(None, Some(false)), tag(None, Some(true))];
        let refs: Vec<&Tag> = tags.iter().collect();
        assert!(resolve(&refs, DEFAULTS, RichExcerptPolicy::TrueDominates).rich_excerpt);

        let defaults = GlobalDefaults {
            rich_excerpts: false,
            ..DEFAULTS
        };
        let unset = [tag(None, None)];
        let refs: Vec<&Tag> = unset.iter().collect();
        assert!(!resolve(&refs, defaults, RichExcerptPolicy::TrueDominates).rich_excerpt);
    }

    #[test]
    fn policy_parses_from_snake_case() {
        let policy: RichExcerptPolicy = serde_json::from_str("\"true_dominates\"").unwrap();
        assert_eq!(policy, RichExcerptPolicy::TrueDominates);
    }
}
