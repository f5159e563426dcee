//! # 缓存引擎
//!
//! 基于适配器原语实现完整的缓存契约：参数校验、TTL 归一化、过期判定、
//! 读时淘汰以及概率 GC。

use indexmap::IndexMap;
use rand::Rng;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use super::adapter::CacheAdapter;
use super::record::{CacheRecord, unix_now};
use super::ttl::Ttl;
use super::validate::{assert_key, assert_keys};
use crate::error::{CacheError, Result};

/// 缓存引擎，独占一个后端适配器
pub struct CacheProvider {
    adapter: Box<dyn CacheAdapter>,
}

impl CacheProvider {
    /// 用适配器创建引擎
    pub fn new<A: CacheAdapter + 'static>(adapter: A) -> Self {
        Self {
            adapter: Box::new(adapter),
        }
    }

    /// 用已装箱的适配器创建引擎
    #[must_use]
    pub fn from_boxed(adapter: Box<dyn CacheAdapter>) -> Self {
        Self { adapter }
    }

    /// 获取适配器的引用
    #[must_use]
    pub fn adapter(&self) -> &dyn CacheAdapter {
        self.adapter.as_ref()
    }

    /// 后端类型标识
    #[must_use]
    pub fn backend_type(&self) -> &'static str {
        self.adapter.backend_type()
    }

    /// 获取缓存值，不存在或已过期时返回 `default`
    ///
    /// 读到已过期的记录时会顺带把它从后端删除。
    pub async fn get<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: DeserializeOwned,
    {
        assert_key(key)?;

        match self.lookup(key).await {
            Some(value) => serde_json::from_value(value).map_err(|e| {
                CacheError::serialization(format!("缓存值无法转换为目标类型: {key}"), e)
            }),
            None => Ok(default),
        }
    }

    /// 设置缓存值
    ///
    /// 参数非法时返回错误；后端写入失败时返回 `Ok(false)`。
    pub async fn set<T>(&self, key: &str, value: &T, ttl: impl Into<Ttl>) -> Result<bool>
    where
        T: Serialize + ?Sized,
    {
        assert_key(key)?;
        let ttl = ttl.into().resolve()?;
        let value = encode_value(key, value)?;

        Ok(self.write(key, value, ttl).await)
    }

    /// 删除缓存值；键不存在同样视为成功
    pub async fn delete(&self, key: &str) -> Result<bool> {
        assert_key(key)?;
        Ok(self.erase(key).await)
    }

    /// 清空本命名空间下的全部缓存
    pub async fn clear(&self) -> bool {
        match self.adapter.remove_all().await {
            Ok(()) => {
                debug!(backend = self.backend_type(), "缓存已清空");
                true
            }
            Err(e) => {
                warn!(backend = self.backend_type(), error = %e, "清空缓存失败");
                false
            }
        }
    }

    /// 检查键是否存在
    ///
    /// 只检查物理存在，不判断过期也不淘汰：已过期但尚未被淘汰的键会
    /// 返回 `true`，而随后的 [`get`](Self::get) 会返回默认值并删除它。
    pub async fn has(&self, key: &str) -> Result<bool> {
        assert_key(key)?;

        match self.adapter.exists(key).await {
            Ok(exists) => Ok(exists),
            Err(e) => {
                warn!(backend = self.backend_type(), key, error = %e, "检查缓存存在性失败");
                Ok(false)
            }
        }
    }

    /// 批量获取，结果按请求顺序排列，重复键只保留一项
    pub async fn get_multiple<I, K, T>(&self, keys: I, default: T) -> Result<IndexMap<String, T>>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
        T: DeserializeOwned + Clone,
    {
        let keys: Vec<K> = keys.into_iter().collect();
        assert_keys(keys.iter().map(|key| key.as_ref()))?;

        let mut result = IndexMap::with_capacity(keys.len());

        for key in &keys {
            let key = key.as_ref();
            let value = self.get(key, default.clone()).await?;
            result.insert(key.to_string(), value);
        }

        Ok(result)
    }

    /// 批量设置
    ///
    /// 所有键和 TTL 先统一校验，校验失败时不会写入任何条目。写入过程中
    /// 遇到第一个失败即返回 `Ok(false)`，已写入的条目不会回滚。
    pub async fn set_multiple<I, K, V>(&self, values: I, ttl: impl Into<Ttl>) -> Result<bool>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let ttl = ttl.into().resolve()?;

        let entries = values
            .into_iter()
            .map(|(key, value)| {
                let key = key.as_ref();
                assert_key(key)?;
                Ok((key.to_string(), encode_value(key, &value)?))
            })
            .collect::<Result<Vec<_>>>()?;

        for (key, value) in entries {
            if !self.write(&key, value, ttl).await {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// 批量删除
    ///
    /// 不对单个键做格式校验，直接交给后端；遇到第一个失败即返回
    /// `Ok(false)`。
    pub async fn delete_multiple<I, K>(&self, keys: I) -> Result<bool>
    where
        I: IntoIterator<Item = K>,
        K: AsRef<str>,
    {
        for key in keys {
            if !self.erase(key.as_ref()).await {
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// 概率 GC：以 `probability / divisor` 的概率执行一次全量清扫
    ///
    /// 返回被删除的键；未触发或没有过期记录时返回空列表。
    pub async fn gc(&self, probability: u32, divisor: u32) -> Vec<String> {
        let triggered = Self::should_sweep(probability, divisor, &mut rand::thread_rng());

        if !triggered {
            return Vec::new();
        }

        self.sweep().await
    }

    /// GC 触发判定（伯努利试验）
    ///
    /// `probability` 先被限制在 `divisor` 以内，随后在 `[1, divisor / probability]`
    /// 中均匀抽取一个整数，抽中 1 即触发。
    pub fn should_sweep<R: Rng + ?Sized>(probability: u32, divisor: u32, rng: &mut R) -> bool {
        let probability = probability.min(divisor);
        if probability == 0 {
            return false;
        }

        let chance = divisor / probability;
        let hit = rng.gen_range(1..=chance);
        debug!(probability, divisor, chance, hit, "GC 抽签");

        hit == 1
    }

    /// 全量清扫：删除所有已过期的记录并返回其键
    pub async fn sweep(&self) -> Vec<String> {
        let records = match self.adapter.records().await {
            Ok(records) => records,
            Err(e) => {
                warn!(backend = self.backend_type(), error = %e, "枚举缓存记录失败");
                return Vec::new();
            }
        };

        let now = unix_now();
        let mut removed = Vec::new();

        for (key, record) in records {
            if !record.is_expired_at(now) {
                continue;
            }
            match self.adapter.remove(&key).await {
                Ok(()) => removed.push(key),
                Err(e) => warn!(backend = self.backend_type(), key, error = %e, "GC 删除过期记录失败"),
            }
        }

        if !removed.is_empty() {
            info!(backend = self.backend_type(), removed = removed.len(), "GC 清理过期缓存");
        }

        removed
    }

    /// 重建表结构；没有表结构的后端返回 `false`
    pub async fn rebuild(&self) -> bool {
        match self.adapter.rebuild().await {
            Some(Ok(())) => {
                info!(backend = self.backend_type(), "缓存表结构已就绪");
                true
            }
            Some(Err(e)) => {
                warn!(backend = self.backend_type(), error = %e, "重建缓存表结构失败");
                false
            }
            None => false,
        }
    }

    /// 读取记录并处理过期淘汰
    async fn lookup(&self, key: &str) -> Option<serde_json::Value> {
        let record = match self.adapter.fetch(key).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(backend = self.backend_type(), key, "缓存未命中");
                return None;
            }
            Err(e) => {
                warn!(backend = self.backend_type(), key, error = %e, "读取缓存失败");
                return None;
            }
        };

        if record.is_expired() {
            debug!(backend = self.backend_type(), key, ttl = record.ttl, "缓存已过期，执行淘汰");
            if let Err(e) = self.adapter.remove(key).await {
                warn!(backend = self.backend_type(), key, error = %e, "淘汰过期缓存失败");
            }
            return None;
        }

        debug!(backend = self.backend_type(), key, "缓存命中");
        Some(record.value)
    }

    async fn write(&self, key: &str, value: serde_json::Value, ttl: u64) -> bool {
        let record = CacheRecord::new(value, ttl, unix_now());

        match self.adapter.store(key, &record).await {
            Ok(()) => {
                debug!(backend = self.backend_type(), key, ttl, "缓存写入成功");
                true
            }
            Err(e) => {
                warn!(backend = self.backend_type(), key, error = %e, "缓存写入失败");
                false
            }
        }
    }

    async fn erase(&self, key: &str) -> bool {
        match self.adapter.remove(key).await {
            Ok(()) => true,
            Err(e) => {
                warn!(backend = self.backend_type(), key, error = %e, "删除缓存失败");
                false
            }
        }
    }
}

fn encode_value<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<serde_json::Value> {
    serde_json::to_value(value)
        .map_err(|e| CacheError::serialization(format!("序列化缓存值失败: {key}"), e))
}
