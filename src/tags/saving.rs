use serde_json::{Map, Value};

use crate::error::ExcerptError;
use crate::tags::Tag;

pub const EXCERPT_LENGTH_ATTR: &str = "excerptLength";
pub const RICH_EXCERPTS_ATTR: &str = "richExcerpts";

/// 应用标签保存请求中的变更集（`{"attributes": {...}}`），只修改请求中出现的属性
pub fn apply_change_set(tag: &mut Tag, data: &Value) -> Result<(), ExcerptError> {
    match data.get("attributes") {
        Some(Value::Object(attributes)) => apply_attributes(tag, attributes),
        Some(Value::Null) | None => Ok(()),
        Some(other) => Err(ExcerptError::invalid_attribute("attributes", other)),
    }
}

pub fn apply_attributes(tag: &mut Tag, attributes: &Map<String, Value>) -> Result<(), ExcerptError> {
    // 先全部解析再写入，任一属性无效时标签保持不变
    let excerpt_length = attributes
        .get(EXCERPT_LENGTH_ATTR)
        .map(parse_excerpt_length)
        .transpose()?;
    let rich_excerpts = attributes
        .get(RICH_EXCERPTS_ATTR)
        .map(parse_rich_excerpts)
        .transpose()?;

    if let Some(length) = excerpt_length {
        tracing::debug!("标签 {} 摘要长度更新为 {:?}", tag.id, length);
        tag.excerpt_length = length;
    }
    if let Some(rich) = rich_excerpts {
        tracing::debug!("标签 {} 富文本摘要更新为 {:?}", tag.id, rich);
        tag.rich_excerpts = rich;
    }
    Ok(())
}

/// 空字符串或 null 清除覆盖，否则存为整数
fn parse_excerpt_length(value: &Value) -> Result<Option<i64>, ExcerptError> {
    match value {
        Value::Null => Ok(None),
        Value::Number(n) => n
            .as_i64()
            .map(Some)
            .ok_or_else(|| ExcerptError::invalid_attribute(EXCERPT_LENGTH_ATTR, n)),
        Value::String(s) if s.trim().is_empty() => Ok(None),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map(Some)
            .map_err(|_| ExcerptError::invalid_attribute(EXCERPT_LENGTH_ATTR, s)),
        other => Err(ExcerptError::invalid_attribute(EXCERPT_LENGTH_ATTR, other)),
    }
}

/// null 清除覆盖，否则按布尔语义存储
fn parse_rich_excerpts(value: &Value) -> Result<Option<bool>, ExcerptError> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(*b)),
        Value::Number(n) => Ok(Some(n.as_f64().is_some_and(|f| f != 0.0))),
        Value::String(s) => Ok(Some(!(s.is_empty() || s == "0"))),
        other => Err(ExcerptError::invalid_attribute(RICH_EXCERPTS_ATTR, other)),
    }
}
