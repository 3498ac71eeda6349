pub mod cache;
pub mod dom;
pub mod plain;
pub mod render;
pub mod truncate;

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::{ExcerptError, non_negative};
use cache::{CacheKey, ResultCache};

/// 截断结果；`total_images` 为截断前的内容图片总数，用于计算 "+N" 角标
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TruncateResult {
    pub html: String,
    pub total_images: usize,
}

/// 带 LRU 缓存的截断器
///
/// 缓存只在查询与写入时加锁，解析与遍历在锁外进行，可在多个渲染线程间共享
pub struct Truncator {
    cache: Mutex<ResultCache>,
}

impl Truncator {
    pub fn new(capacity: usize) -> Self {
        Self {
            cache: Mutex::new(ResultCache::new(capacity)),
        }
    }

    pub fn truncate(
        &self,
        html: &str,
        max_text_length: i64,
        image_limit: i64,
    ) -> Result<TruncateResult, ExcerptError> {
        let max_text_length = non_negative("max_text_length", max_text_length)?;
        let image_limit = non_negative("image_limit", image_limit)?;

        let key = CacheKey::new(max_text_length, image_limit, html);
        let cached = self.lock().get(&key);
        if let Some(result) = cached {
            tracing::debug!("摘要缓存命中（长度 {max_text_length}，图片 {image_limit}）");
            return Ok(result);
        }

        let result = truncate::truncate_checked(html, max_text_length, image_limit);
        self.lock().put(key, result.clone());
        Ok(result)
    }

    pub fn cached_entries(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> MutexGuard<'_, ResultCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Truncator {
    fn default() -> Self {
        Self::new(cache::DEFAULT_CAPACITY)
    }
}
