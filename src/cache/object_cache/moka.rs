use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::declare_object_cache_plugin;

declare_object_cache_plugin!("moka", MokaCacheWrapper);

/// 缓存条目：值与其 TTL（秒）
#[derive(Clone)]
struct Entry {
    value: String,
    ttl: u64,
}

/// 按条目 TTL 过期
struct EntryExpiry;

impl Expiry<String, Entry> for EntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        entry: &Entry,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(Duration::from_secs(entry.ttl))
    }

    fn expire_after_update(
        &self,
        _key: &String,
        entry: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(Duration::from_secs(entry.ttl))
    }
}

pub struct MokaCacheWrapper {
    inner: Cache<String, Entry>,
    default_ttl: u64,
}

impl MokaCacheWrapper {
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::get();
        Ok(Self::with_settings(
            config.cache.memory.max_capacity,
            config.cache.default_ttl,
        ))
    }

    pub fn with_settings(max_capacity: u64, default_ttl: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(EntryExpiry)
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}, default TTL: {}s",
            max_capacity, default_ttl
        );
        Self { inner, default_ttl }
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        if let Some(entry) = self.inner.get(key).await {
            debug!("Successfully retrieved key: {}", key);
            CacheResult::Found(entry.value)
        } else {
            debug!("Key not found in cache: {}", key);
            CacheResult::NotFound
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        // ttl 为 0 时使用默认 TTL
        let ttl = if ttl == 0 { self.default_ttl } else { ttl };
        self.inner.insert(key, Entry { value, ttl }).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }

    async fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = MokaCacheWrapper::with_settings(100, 60);
        cache
            .insert_raw("leaderboard:1".into(), "[]".into(), 0)
            .await;
        assert_eq!(
            cache.get_raw("leaderboard:1").await,
            CacheResult::Found("[]".to_string())
        );

        cache.remove("leaderboard:1").await;
        assert_eq!(cache.get_raw("leaderboard:1").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_json_helpers() {
        let cache: Box<dyn ObjectCache> = Box::new(MokaCacheWrapper::with_settings(100, 60));
        cache
            .insert_json("scores".to_string(), &vec![90, 85], 30)
            .await;
        let scores: Option<Vec<i32>> = cache.get_json("scores").await;
        assert_eq!(scores, Some(vec![90, 85]));

        // 类型不匹配时返回 None 并移除
        let wrong: Option<String> = cache.get_json("scores").await;
        assert!(wrong.is_none());
        assert_eq!(cache.get_raw("scores").await, CacheResult::NotFound);
    }
}
