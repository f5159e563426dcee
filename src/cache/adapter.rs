//! # 后端适配器接口
//!
//! 每种存储技术实现一次该接口；缓存引擎只通过这些原语访问物理存储。

use async_trait::async_trait;

use super::record::CacheRecord;
use crate::error::BackendResult;

/// 存储后端适配器
#[async_trait]
pub trait CacheAdapter: Send + Sync {
    /// 后端类型标识（每个适配器固定）
    fn backend_type(&self) -> &'static str;

    /// 读取记录，不存在时返回 `None`
    async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>>;

    /// 写入（覆盖）记录
    async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()>;

    /// 删除记录；键不存在视为成功
    async fn remove(&self, key: &str) -> BackendResult<()>;

    /// 删除本命名空间下的全部记录
    async fn remove_all(&self) -> BackendResult<()>;

    /// 记录是否物理存在（不判断过期，也不淘汰）
    async fn exists(&self, key: &str) -> BackendResult<bool>;

    /// 枚举本命名空间下的全部记录，供 GC 使用
    ///
    /// 自带过期能力的后端保持默认的空实现。
    async fn records(&self) -> BackendResult<Vec<(String, CacheRecord)>> {
        Ok(Vec::new())
    }

    /// 幂等地创建表结构；没有表结构的后端返回 `None`
    async fn rebuild(&self) -> Option<BackendResult<()>> {
        None
    }
}

#[async_trait]
impl<A: CacheAdapter + ?Sized> CacheAdapter for Box<A> {
    fn backend_type(&self) -> &'static str {
        (**self).backend_type()
    }

    async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>> {
        (**self).fetch(key).await
    }

    async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()> {
        (**self).store(key, record).await
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        (**self).remove(key).await
    }

    async fn remove_all(&self) -> BackendResult<()> {
        (**self).remove_all().await
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        (**self).exists(key).await
    }

    async fn records(&self) -> BackendResult<Vec<(String, CacheRecord)>> {
        (**self).records().await
    }

    async fn rebuild(&self) -> Option<BackendResult<()>> {
        (**self).rebuild().await
    }
}
