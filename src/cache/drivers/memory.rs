//! # 内存缓存后端
//!
//! 基于 moka 的进程内缓存，每条记录按自身 TTL 过期，容量达到上限时
//! 按 moka 的淘汰策略移除旧条目。

use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use tracing::info;

use crate::cache::adapter::CacheAdapter;
use crate::cache::record::CacheRecord;
use crate::config::CacheSettings;
use crate::error::BackendResult;

/// 默认最大条目数
pub const DEFAULT_MAX_ENTRIES: u64 = 10_000;

/// 按记录 TTL 计算过期时间，`ttl == 0` 永不过期
struct RecordExpiry;

impl RecordExpiry {
    fn lifetime(record: &CacheRecord) -> Option<Duration> {
        (record.ttl > 0).then(|| Duration::from_secs(record.ttl))
    }
}

impl Expiry<String, CacheRecord> for RecordExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CacheRecord,
        _created_at: Instant,
    ) -> Option<Duration> {
        Self::lifetime(value)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CacheRecord,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Self::lifetime(value)
    }
}

/// 内存缓存后端
pub struct MemoryAdapter {
    cache: Cache<String, CacheRecord>,
}

impl MemoryAdapter {
    /// 创建指定容量的内存缓存
    #[must_use]
    pub fn new(max_entries: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_entries)
            .expire_after(RecordExpiry)
            .build();

        Self { cache }
    }

    /// 从构造参数创建
    #[must_use]
    pub fn from_settings(settings: &CacheSettings) -> Self {
        let max_entries = settings.max_entries.unwrap_or(DEFAULT_MAX_ENTRIES);
        info!(backend = "memory", max_entries, "初始化内存缓存");
        Self::new(max_entries)
    }
}

impl Default for MemoryAdapter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

#[async_trait]
impl CacheAdapter for MemoryAdapter {
    fn backend_type(&self) -> &'static str {
        "memory"
    }

    async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>> {
        Ok(self.cache.get(key).await)
    }

    async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()> {
        self.cache.insert(key.to_string(), record.clone()).await;
        Ok(())
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        self.cache.invalidate(key).await;
        Ok(())
    }

    async fn remove_all(&self) -> BackendResult<()> {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
        Ok(())
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        Ok(self.cache.contains_key(key))
    }
}
