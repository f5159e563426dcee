//! # 缓存门面
//!
//! 按后端名称或直接注入的适配器构造缓存引擎，并暴露完整的缓存契约。

use indexmap::IndexMap;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info};

use super::adapter::CacheAdapter;
use super::provider::CacheProvider;
use super::registry::BackendKind;
use super::ttl::Ttl;
use crate::config::{CacheConfig, CacheSettings};
use crate::error::Result;

/// 统一缓存
pub struct Cache {
    provider: CacheProvider,
}

impl Cache {
    /// 按后端名称创建缓存（名称大小写不敏感）
    pub async fn new(backend: &str, settings: CacheSettings) -> Result<Self> {
        let kind: BackendKind = backend.parse()?;
        Self::with_backend(kind, settings).await
    }

    /// 按后端类型创建缓存
    ///
    /// `gc_enable` 为真时，构造完成后按配置的概率执行一次 GC。
    pub async fn with_backend(kind: BackendKind, settings: CacheSettings) -> Result<Self> {
        let adapter = kind.build(&settings).await?;
        let cache = Self {
            provider: CacheProvider::from_boxed(adapter),
        };
        info!(backend = kind.as_str(), gc_enable = settings.gc_enable, "缓存初始化完成");

        if settings.gc_enable {
            let removed = cache
                .provider
                .gc(settings.gc_probability, settings.gc_divisor)
                .await;
            debug!(backend = kind.as_str(), removed = removed.len(), "初始化 GC 完成");
        }

        Ok(cache)
    }

    /// 使用外部构造好的适配器（不执行初始化 GC）
    pub fn with_adapter<A: CacheAdapter + 'static>(adapter: A) -> Self {
        Self {
            provider: CacheProvider::new(adapter),
        }
    }

    /// 从完整配置创建
    pub async fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::with_backend(config.backend_kind()?, config.settings.clone()).await
    }

    /// 底层缓存引擎
    #[must_use]
    pub fn provider(&self) -> &CacheProvider {
        &self.provider
    }

    /// 后端类型标识
    #[must_use]
    pub fn backend_type(&self) -> &'static str {
        self.provider.backend_type()
    }

    /// 读取值，不存在或已过期时返回 `default`
    pub async fn get<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: DeserializeOwned,
    {
        self.provider.get(key, default).await
    }

    /// 写入值，`ttl` 为零表示永不过期
    pub async fn set<T>(&self, key: &str, value: &T, ttl: impl Into<Ttl>) -> Result<bool>
    where
        T: Serialize + ?Sized,
    {
        self.provider.set(key, value, ttl).await
    }

    /// 删除单个键
    pub async fn delete(&self, key: &str) -> Result<bool> {
        self.provider.delete(key).await
    }

    /// 清空全部记录
    pub async fn clear(&self) -> bool {
        self.provider.clear().await
    }

    /// 键是否存在（不做过期淘汰）
    pub async fn has(&self, key: &str) -> Result<bool> {
        self.provider.has(key).await
    }

    /// 批量读取，结果按传入顺序排列
    pub async fn get_multiple<I, K, T>(&self, keys: I, default: T) -> Result<IndexMap<String, T>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
        T: DeserializeOwned + Clone,
    {
        self.provider.get_multiple(keys, default).await
    }

    /// 批量写入，写入前校验全部键和值
    pub async fn set_multiple<I, K, V>(&self, values: I, ttl: impl Into<Ttl>) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        self.provider.set_multiple(values, ttl).await
    }

    /// 批量删除，全部成功时返回 `true`
    pub async fn delete_multiple<I, K>(&self, keys: I) -> Result<bool>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        self.provider.delete_multiple(keys).await
    }

    /// 概率 GC，返回被删除的键
    pub async fn gc(&self, probability: u32, divisor: u32) -> Vec<String> {
        self.provider.gc(probability, divisor).await
    }

    /// 立即清理全部过期记录
    pub async fn clear_expired_items(&self) -> Vec<String> {
        self.provider.gc(1, 1).await
    }

    /// 重建表结构；没有表结构的后端返回 `false`
    pub async fn rebuild(&self) -> bool {
        self.provider.rebuild().await
    }
}
