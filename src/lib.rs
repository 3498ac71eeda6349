//! 论坛讨论列表摘要
//!
//! 核心是 HTML 安全截断：只统计文本节点字符、限制图片数量、清理空包裹元素，
//! 并按讨论所属标签聚合摘要长度与富文本开关。

pub mod check;
pub mod config;
pub mod discussion;
pub mod error;
pub mod excerpt;
pub mod tags;

pub use error::ExcerptError;
pub use excerpt::{TruncateResult, Truncator};
