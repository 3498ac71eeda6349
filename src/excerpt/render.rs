use serde::Serialize;

use crate::discussion::Post;
use crate::error::{ExcerptError, non_negative};
use crate::excerpt::Truncator;
use crate::excerpt::plain::{escape_html, truncate_plain};
use crate::tags::EffectiveSettings;

/// 渲染完成的摘要片段
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedExcerpt {
    pub html: String,
    pub rich: bool,
    /// 超出图片限额、未显示的图片数量
    pub extra_images: usize,
}

pub struct ExcerptRenderer<'a> {
    truncator: &'a Truncator,
    image_limit: i64,
}

impl<'a> ExcerptRenderer<'a> {
    pub fn new(truncator: &'a Truncator, image_limit: i64) -> Self {
        Self {
            truncator,
            image_limit,
        }
    }

    /// 长度为 0 或截断后没有内容时返回 `None`
    pub fn render(
        &self,
        post: &Post,
        settings: &EffectiveSettings,
    ) -> Result<Option<RenderedExcerpt>, ExcerptError> {
        let length = non_negative("excerpt_length", settings.excerpt_length)?;
        let image_limit = non_negative("image_limit", self.image_limit)?;
        if length == 0 {
            return Ok(None);
        }

        if settings.rich_excerpt {
            let html = post.content_html.as_deref().unwrap_or("");
            let result = self
                .truncator
                .truncate(html, settings.excerpt_length, self.image_limit)?;
            if result.html.trim().is_empty() {
                return Ok(None);
            }

            let extra_images = result.total_images.saturating_sub(image_limit);
            let mut markup = String::from("<div class=\"Synopsis-excerpt\">");
            markup.push_str(&result.html);
            if extra_images > 0 {
                markup.push_str(&format!(
                    "<span class=\"synopsis-extra-badge\">+{extra_images}</span>"
                ));
            }
            markup.push_str("</div>");

            return Ok(Some(RenderedExcerpt {
                html: markup,
                rich: true,
                extra_images,
            }));
        }

        let text = truncate_plain(post.content_plain.as_deref().unwrap_or(""), length);
        if text.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(RenderedExcerpt {
            html: format!("<div class=\"Synopsis-excerpt\">{}</div>", escape_html(&text)),
            rich: false,
            extra_images: 0,
        }))
    }
}
