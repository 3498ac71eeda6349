use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::excerpt::TruncateResult;

pub const DEFAULT_CAPACITY: usize = 100;

/// 缓存键：相同的预算与 HTML 总是得到相同的截断结果
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub max_text_length: usize,
    pub image_limit: usize,
    pub html: String,
}

impl CacheKey {
    pub fn new(max_text_length: usize, image_limit: usize, html: impl Into<String>) -> Self {
        Self {
            max_text_length,
            image_limit,
            html: html.into(),
        }
    }
}

struct Entry {
    value: TruncateResult,
    stamp: u64,
}

/// 固定容量的 LRU 截断结果缓存
///
/// `recency` 以访问序号排序，最小序号即最久未使用的条目；命中时刷新序号
pub struct ResultCache {
    capacity: usize,
    entries: HashMap<Arc<CacheKey>, Entry>,
    recency: BTreeMap<u64, Arc<CacheKey>>,
    clock: u64,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            entries: HashMap::with_capacity(capacity),
            recency: BTreeMap::new(),
            clock: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 命中时把条目提升为最近使用
    pub fn get(&mut self, key: &CacheKey) -> Option<TruncateResult> {
        let stamp = self.tick();
        let (shared_key, entry) = self.entries.get_key_value(key)?;
        let shared_key = Arc::clone(shared_key);
        let previous = entry.stamp;
        let value = entry.value.clone();

        self.recency.remove(&previous);
        self.recency.insert(stamp, shared_key);
        if let Some(entry) = self.entries.get_mut(key) {
            entry.stamp = stamp;
        }
        Some(value)
    }

    /// 插入或更新条目，超出容量时淘汰最久未使用的条目
    pub fn put(&mut self, key: CacheKey, value: TruncateResult) {
        if self.capacity == 0 {
            return;
        }

        let stamp = self.tick();
        if let Some(entry) = self.entries.get_mut(&key) {
            self.recency.remove(&entry.stamp);
            entry.stamp = stamp;
            entry.value = value;
            if let Some((shared_key, _)) = self.entries.get_key_value(&key) {
                self.recency.insert(stamp, Arc::clone(shared_key));
            }
            return;
        }

        while self.entries.len() >= self.capacity {
            let Some((_, oldest)) = self.recency.pop_first() else {
                break;
            };
            self.entries.remove(&oldest);
            tracing::debug!(
                "摘要缓存已满，淘汰条目（长度 {}，图片 {}）",
                oldest.max_text_length,
                oldest.image_limit
            );
        }

        let key = Arc::new(key);
        self.recency.insert(stamp, Arc::clone(&key));
        self.entries.insert(key, Entry { value, stamp });
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }
}

impl Default for ResultCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(html: &str, total_images: usize) -> TruncateResult {
        TruncateResult {
            html: html.to_string(),
            total_images,
        }
    }

    fn key(n: usize) -> CacheKey {
        CacheKey::new(10, 3, format!("<p>{n}</p>"))
    }

    #[test]
    fn get_returns_stored_value() {
        let mut cache = ResultCache::new(4);
        cache.put(key(1), result("<p>1</p>", 0));
        assert_eq!(cache.get(&key(1)), Some(result("<p>1</p>", 0)));
        assert_eq!(cache.get(&key(2)), None);
    }

    #[test]
    fn keys_differ_by_budget() {
        let mut cache = ResultCache::new(4);
        cache.put(CacheKey::new(5, 1, "<p>x</p>"), result("a", 0));
        assert_eq!(cache.get(&CacheKey::new(6, 1, "<p>x</p>")), None);
        assert_eq!(cache.get(&CacheKey::new(5, 2, "<p>x</p>")), None);
    }

    #[test]
    fn default_capacity_evicts_first_insert_after_101() {
        let mut cache = ResultCache::default();
        for n in 0..=DEFAULT_CAPACITY {
            cache.put(key(n), result(&n.to_string(), 0));
        }
        assert_eq!(cache.len(), DEFAULT_CAPACITY);
        assert_eq!(cache.get(&key(0)), None);
        assert!(cache.get(&key(1)).is_some());
        assert!(cache.get(&key(DEFAULT_CAPACITY)).is_some());
    }

    #[test]
    fn hit_promotes_entry() {
        let mut cache = ResultCache::new(2);
        cache.put(key(1), result("1", 0));
        cache.put(key(2), result("2", 0));
        assert!(cache.get(&key(1)).is_some());

        cache.put(key(3), result("3", 0));
        assert!(cache.get(&key(1)).is_some());
        assert_eq!(cache.get(&key(2)), None);
        assert!(cache.get(&key(3)).is_some());
    }

    #[test]
    fn update_replaces_value_without_growing() {
        let mut cache = ResultCache::new(2);
        cache.put(key(1), result("old", 0));
        cache.put(key(1), result("new", 1));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(1)), Some(result("new", 1)));

        // 更新同样算作访问
        cache.put(key(2), result("2", 0));
        cache.put(key(1), result("newer", 0));
        cache.put(key(3), result("3", 0));
        assert_eq!(cache.get(&key(2)), None);
        assert!(cache.get(&key(1)).is_some());
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut cache = ResultCache::new(0);
        cache.put(key(1), result("1", 0));
        assert!(cache.is_empty());
    }
}
