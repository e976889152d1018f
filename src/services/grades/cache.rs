//! 排行榜缓存
//!
//! 缓存键带有代数（`leaderboard:generation`），每次评分变更写入新的代数，
//! 旧键随 TTL 自然过期，无需逐个删除。

use actix_web::HttpRequest;
use std::sync::Arc;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::models::grades::responses::LeaderboardResponse;
use crate::services::cache_from_request;

const GENERATION_KEY: &str = "leaderboard:generation";
/// 代数本身保留 7 天
const GENERATION_TTL: u64 = 7 * 24 * 3600;

async fn current_generation(cache: &dyn ObjectCache) -> String {
    match cache.get_raw(GENERATION_KEY).await {
        CacheResult::Found(generation) => generation,
        _ => "0".to_string(),
    }
}

/// 评分、退回、自动判分后调用
pub async fn bump_leaderboard_generation(request: &HttpRequest) {
    if let Some(cache) = cache_from_request(request) {
        let generation = chrono::Utc::now().timestamp_micros().to_string();
        debug!("Leaderboard generation bumped to {}", generation);
        cache
            .insert_raw(GENERATION_KEY.to_string(), generation, GENERATION_TTL)
            .await;
    }
}

pub struct LeaderboardCache {
    cache: Arc<dyn ObjectCache>,
    key: String,
}

impl LeaderboardCache {
    /// `variant` 描述榜单范围与参数，与当前代数拼成完整的键
    pub async fn open(request: &HttpRequest, variant: &str) -> Option<Self> {
        let cache = cache_from_request(request)?;
        let generation = current_generation(cache.as_ref()).await;
        Some(Self {
            key: format!("leaderboard:{generation}:{variant}"),
            cache,
        })
    }

    pub async fn get(&self) -> Option<LeaderboardResponse> {
        self.cache.get_json::<LeaderboardResponse>(&self.key).await
    }

    pub async fn put(&self, response: &LeaderboardResponse) {
        let ttl = AppConfig::get().grading.leaderboard_cache_ttl;
        if ttl > 0 {
            self.cache.insert_json(self.key.clone(), response, ttl).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;

    #[tokio::test]
    async fn test_generation_defaults_to_zero() {
        let cache = MokaCacheWrapper::with_settings(100, 60);
        assert_eq!(current_generation(&cache).await, "0");

        cache
            .insert_raw(GENERATION_KEY.to_string(), "42".to_string(), 60)
            .await;
        assert_eq!(current_generation(&cache).await, "42");
    }
}
