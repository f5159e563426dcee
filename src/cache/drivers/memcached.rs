//! # Memcached 缓存后端
//!
//! memcache 客户端是阻塞式的，所有操作都放到 `spawn_blocking` 中执行。
//! Memcached 无法枚举键，`remove_all` 会清空整个服务器。

use std::sync::Arc;

use async_trait::async_trait;
use memcache::MemcacheError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::DEFAULT_HOST;
use crate::cache::adapter::CacheAdapter;
use crate::cache::keys::KV_NAMESPACE;
use crate::cache::record::{CacheRecord, unix_now};
use crate::config::CacheSettings;
use crate::error::{BackendError, BackendResult, CacheError, Result};

/// 超过该秒数的过期时间会被 memcached 解释为绝对 Unix 时间
const RELATIVE_EXPIRY_LIMIT: u64 = 60 * 60 * 24 * 30;

/// Memcached 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemcachedConfig {
    /// 服务器地址
    pub host: String,
    /// 服务器端口
    pub port: u16,
    /// Unix 套接字路径，设置后忽略 host/port
    pub unix_socket: Option<String>,
}

impl MemcachedConfig {
    /// 从构造参数创建，未提供的字段使用默认值
    #[must_use]
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            host: CacheSettings::non_empty(settings.host.as_ref())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: settings.port.unwrap_or(11211),
            unix_socket: CacheSettings::non_empty(settings.unix_socket.as_ref()),
        }
    }

    /// 构建连接 URL
    #[must_use]
    pub fn build_url(&self) -> String {
        match &self.unix_socket {
            Some(socket) => format!("memcache://{socket}"),
            None => format!("memcache://{}:{}", self.host, self.port),
        }
    }
}

/// 把记录 TTL 换算成 memcached 的过期参数
fn expiration(ttl: u64, now: i64) -> u32 {
    if ttl == 0 {
        return 0;
    }
    if ttl <= RELATIVE_EXPIRY_LIMIT {
        return u32::try_from(ttl).unwrap_or(u32::MAX);
    }

    let deadline = u64::try_from(now).unwrap_or(0).saturating_add(ttl);
    u32::try_from(deadline).unwrap_or(u32::MAX)
}

/// Memcached 缓存后端
pub struct MemcachedAdapter {
    client: Arc<memcache::Client>,
}

impl MemcachedAdapter {
    /// 连接 memcached 服务器
    pub async fn new(config: MemcachedConfig) -> Result<Self> {
        let url = config.build_url();
        info!(backend = "memcached", url = %url, "正在连接 Memcached 服务器");

        let client = tokio::task::spawn_blocking(move || memcache::Client::connect(url))
            .await
            .map_err(|e| CacheError::system_with_source("连接 Memcached 任务失败", e))?
            .map_err(|e| CacheError::system_with_source("建立 Memcached 连接失败", e))?;

        Ok(Self {
            client: Arc::new(client),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> BackendResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&memcache::Client) -> std::result::Result<T, MemcacheError> + Send + 'static,
    {
        let client = Arc::clone(&self.client);

        tokio::task::spawn_blocking(move || op(&client))
            .await
            .map_err(|e| BackendError::task(e.to_string()))?
            .map_err(Into::into)
    }
}

#[async_trait]
impl CacheAdapter for MemcachedAdapter {
    fn backend_type(&self) -> &'static str {
        "memcached"
    }

    async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>> {
        let physical = KV_NAMESPACE.build(key);
        let content: Option<String> = self.blocking(move |client| client.get(&physical)).await?;

        Ok(content
            .map(|content| CacheRecord::decode(&content))
            .transpose()?)
    }

    async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()> {
        let physical = KV_NAMESPACE.build(key);
        let content = record.encode()?;
        let expires = expiration(record.ttl, unix_now());

        self.blocking(move |client| client.set(&physical, content.as_str(), expires))
            .await
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        let physical = KV_NAMESPACE.build(key);
        self.blocking(move |client| client.delete(&physical)).await?;
        Ok(())
    }

    async fn remove_all(&self) -> BackendResult<()> {
        warn!(backend = "memcached", "Memcached 不支持按前缀清理，将清空整个服务器");
        self.blocking(memcache::Client::flush).await
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        let physical = KV_NAMESPACE.build(key);
        let content: Option<String> = self.blocking(move |client| client.get(&physical)).await?;
        Ok(content.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiration() {
        assert_eq!(expiration(0, 1_700_000_000), 0);
        assert_eq!(expiration(300, 1_700_000_000), 300);
        assert_eq!(expiration(RELATIVE_EXPIRY_LIMIT, 1_700_000_000), 2_592_000);
        assert_eq!(
            expiration(RELATIVE_EXPIRY_LIMIT + 1, 1_700_000_000),
            1_700_000_000 + 2_592_001
        );
    }

    #[test]
    fn test_build_url() {
        let config = MemcachedConfig::from_settings(&CacheSettings::default());
        assert_eq!(config.build_url(), "memcache://127.0.0.1:11211");

        let settings = CacheSettings {
            unix_socket: Some("/tmp/memcached.sock".to_string()),
            ..CacheSettings::default()
        };
        let config = MemcachedConfig::from_settings(&settings);
        assert_eq!(config.build_url(), "memcache:///tmp/memcached.sock");
    }
}
