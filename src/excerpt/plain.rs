use crate::excerpt::truncate::{ELLIPSIS, utf16_len, utf16_prefix};

/// 纯文本截断：超出长度时截取前 `length` 个 UTF-16 码元并追加省略号
pub fn truncate_plain(text: &str, length: usize) -> String {
    if utf16_len(text) <= length {
        return text.to_string();
    }
    let mut excerpt = utf16_prefix(text, length).to_string();
    excerpt.push_str(ELLIPSIS);
    excerpt
}

/// 转义纯文本以便嵌入 HTML
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
