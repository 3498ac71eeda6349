use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExcerptError {
    /// 长度或图片预算为负数
    #[error("参数无效：{name} 不能为负数（当前为 {value}）")]
    InvalidArgument { name: &'static str, value: i64 },

    /// 标签变更集中的属性值无法解析
    #[error("标签属性 {attribute} 的值无效：{value}")]
    InvalidAttribute { attribute: &'static str, value: String },

    #[error("标签不存在：{0}")]
    TagNotFound(String),
}

impl ExcerptError {
    pub fn invalid_argument(name: &'static str, value: i64) -> Self {
        Self::InvalidArgument { name, value }
    }

    pub fn invalid_attribute(attribute: &'static str, value: impl ToString) -> Self {
        Self::InvalidAttribute {
            attribute,
            value: value.to_string(),
        }
    }
}

/// 将有符号预算转换为 usize，负数返回 `InvalidArgument`
pub fn non_negative(name: &'static str, value: i64) -> Result<usize, ExcerptError> {
    usize::try_from(value).map_err(|_| ExcerptError::invalid_argument(name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_budget_is_rejected() {
        assert_eq!(non_negative("max_text_length", 12), Ok(12));
        assert_eq!(non_negative("image_limit", 0), Ok(0));
        assert_eq!(
            non_negative("image_limit", -1),
            Err(ExcerptError::InvalidArgument {
                name: "image_limit",
                value: -1
            })
        );
    }

    #[test]
    fn messages_name_the_argument() {
        let err = ExcerptError::invalid_argument("max_text_length", -3);
        let msg = err.to_string();
        assert!(msg.contains("max_text_length"));
        assert!(msg.contains("-3"));
    }
}
