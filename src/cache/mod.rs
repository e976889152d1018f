//! 缓存层
//!
//! 通过插件注册表在运行时选择缓存后端（Moka 内存缓存 / Redis）。
//! 各后端在 `object_cache` 子模块中通过 `declare_object_cache_plugin!` 自注册。

pub mod object_cache;
pub mod register;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

/// 缓存查询结果
#[derive(Debug, Clone, PartialEq)]
pub enum CacheResult<T> {
    Found(T),
    NotFound,
    /// 后端出错或值不可用
    ExistsButNoValue,
}

#[async_trait]
pub trait ObjectCache: Send + Sync {
    async fn get_raw(&self, key: &str) -> CacheResult<String>;
    async fn insert_raw(&self, key: String, value: String, ttl: u64);
    async fn remove(&self, key: &str);
    async fn invalidate_all(&self);
}

impl dyn ObjectCache {
    /// 读取并反序列化 JSON 值，反序列化失败时移除脏数据
    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.get_raw(key).await {
            CacheResult::Found(json) => match serde_json::from_str::<T>(&json) {
                Ok(value) => Some(value),
                Err(e) => {
                    tracing::debug!("Failed to deserialize cached value for {}: {}", key, e);
                    self.remove(key).await;
                    None
                }
            },
            _ => None,
        }
    }

    /// 序列化为 JSON 后写入
    pub async fn insert_json<T: Serialize>(&self, key: String, value: &T, ttl: u64) {
        match serde_json::to_string(value) {
            Ok(json) => self.insert_raw(key, json, ttl).await,
            Err(e) => tracing::warn!("Failed to serialize value for cache key {}: {}", key, e),
        }
    }
}

/// 声明缓存插件，在程序启动前自动注册到插件表
#[macro_export]
macro_rules! declare_object_cache_plugin {
    ($name:literal, $ty:ty) => {
        #[ctor::ctor]
        unsafe fn __register_object_cache_plugin() {
            $crate::cache::register::register_object_cache_plugin(
                $name,
                std::sync::Arc::new(|| {
                    Box::pin(async {
                        let cache = <$ty>::new().map_err(|e| {
                            $crate::errors::EHubError::cache_connection(format!(
                                "{} cache init failed: {e}",
                                $name
                            ))
                        })?;
                        Ok(Box::new(cache) as Box<dyn $crate::cache::ObjectCache>)
                    })
                }),
            );
        }
    };
}
