//! HTML 安全截断
//!
//! 先按文档顺序统计并限制图片数量，再按文本预算截断或删除文本节点，最后清理顶层的空包裹元素。
//! 所有修改都以完整节点为单位进行，因此输出的标签总是闭合的。

use crate::error::{ExcerptError, non_negative};
use crate::excerpt::TruncateResult;
use crate::excerpt::dom::{Element, Fragment, Node};

/// 截断文本末尾追加的省略标记
pub const ELLIPSIS: &str = "...";

/// 带有该 class 的 `<img>` 视为装饰性表情，不计入图片数量
pub const DECORATIVE_CLASS: &str = "emoji";

/// `src` 缺失时依次尝试的懒加载占位属性
const LAZY_SRC_ATTRS: &[&str] = &["data-src", "data-original", "data-lazy", "data-url"];

/// 截断 HTML 片段：文本预算按 UTF-16 码元计算，图片按 `image_limit` 限额
pub fn truncate_html(
    html: &str,
    max_text_length: i64,
    image_limit: i64,
) -> Result<TruncateResult, ExcerptError> {
    let max_text_length = non_negative("max_text_length", max_text_length)?;
    let image_limit = non_negative("image_limit", image_limit)?;
    Ok(truncate_checked(html, max_text_length, image_limit))
}

pub(crate) fn truncate_checked(html: &str, max_text_length: usize, image_limit: usize) -> TruncateResult {
    let mut fragment = Fragment::parse(html);

    let total_images = cap_images(&mut fragment, image_limit);
    enforce_text_budget(&mut fragment, max_text_length);
    remove_orphans(&mut fragment);

    TruncateResult {
        html: fragment.to_html(),
        total_images,
    }
}

/// 图片统计与限额：保留前 `limit` 张内容图片并设置懒加载，其余移除。
/// 返回原始的内容图片总数
pub fn cap_images(fragment: &mut Fragment, limit: usize) -> usize {
    let mut seen = 0;
    cap_images_in(&mut fragment.children, limit, &mut seen);
    seen
}

fn cap_images_in(children: &mut Vec<Node>, limit: usize, seen: &mut usize) {
    children.retain_mut(|node| {
        let Node::Element(el) = node else {
            return true;
        };

        if is_content_image(el) {
            *seen += 1;
            if *seen > limit {
                return false;
            }
            prepare_for_lazy_load(el);
            return true;
        }

        if el.is("picture") {
            let had_image = el.contains_image();
            cap_images_in(&mut el.children, limit, seen);
            if !el.contains_image() {
                // 内部图片全部被限额移除后，<picture> 已无可显示内容
                return !had_image;
            }
            promote_source_srcset(el);
            return true;
        }

        cap_images_in(&mut el.children, limit, seen);
        true
    });
}

fn is_content_image(el: &Element) -> bool {
    el.is("img") && !el.has_class(DECORATIVE_CLASS)
}

fn is_decorative_image(el: &Element) -> bool {
    el.is("img") && el.has_class(DECORATIVE_CLASS)
}

fn is_image_like(el: &Element) -> bool {
    el.is("img") || el.is("picture")
}

fn prepare_for_lazy_load(img: &mut Element) {
    let has_src = img.attr("src").is_some_and(|src| !src.is_empty());
    if !has_src {
        let fallback = LAZY_SRC_ATTRS
            .iter()
            .find_map(|name| img.attr(name).filter(|value| !value.is_empty()))
            .map(str::to_string);
        if let Some(src) = fallback {
            img.set_attr("src", src);
        }
    }
    img.set_attr("loading", "lazy");
    img.set_attr("decoding", "async");
}

fn promote_source_srcset(picture: &mut Element) {
    for child in &mut picture.children {
        let Node::Element(source) = child else {
            continue;
        };
        if !source.is("source") || source.attr("srcset").is_some_and(|s| !s.is_empty()) {
            continue;
        }
        if let Some(srcset) = source.attr("data-srcset").map(str::to_string) {
            source.set_attr("srcset", srcset);
        }
    }
}

/// 文本预算：按文档顺序消耗预算，用尽后删除后续文本与变空的元素
pub fn enforce_text_budget(fragment: &mut Fragment, max_text_length: usize) {
    let mut remaining = max_text_length;
    enforce_in(&mut fragment.children, &mut remaining);
}

fn enforce_in(children: &mut Vec<Node>, remaining: &mut usize) {
    children.retain_mut(|node| match node {
        Node::Text(text) => consume_text(text, remaining),
        Node::Element(el) => {
            let exhausted = *remaining == 0;
            if exhausted && is_image_like(el) {
                // 图片不受文本预算约束，只有表情图片在预算用尽后视同文字删除
                return !is_decorative_image(el);
            }

            enforce_in(&mut el.children, remaining);
            !exhausted || !el.children.is_empty()
        }
    });
}

/// 返回该文本节点是否保留
fn consume_text(text: &mut String, remaining: &mut usize) -> bool {
    if *remaining == 0 {
        return false;
    }

    let len = utf16_len(text);
    if len < *remaining {
        *remaining -= len;
    } else {
        let cut = utf16_prefix(text, *remaining).len();
        text.truncate(cut);
        text.push_str(ELLIPSIS);
        *remaining = 0;
    }
    true
}

/// 清理顶层中只剩空白或省略号、且不含图片的元素
pub fn remove_orphans(fragment: &mut Fragment) {
    fragment.children.retain(|node| match node {
        Node::Text(_) => true,
        Node::Element(el) => {
            if is_image_like(el) || el.contains_image() {
                return true;
            }
            let text = el.text_content();
            let trimmed = text.trim();
            !(trimmed.is_empty() || trimmed == ELLIPSIS)
        }
    });
}

pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}

/// 取不超过 `budget` 个 UTF-16 码元的最长前缀。代理对不会被拆开，
/// 因此在代理对边界处可能比预算少一个码元
pub fn utf16_prefix(text: &str, budget: usize) -> &str {
    let mut used = 0;
    for (idx, ch) in text.char_indices() {
        used += ch.len_utf16();
        if used > budget {
            return &text[..idx];
        }
    }
    text
}
