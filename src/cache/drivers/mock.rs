//! # 进程内模拟后端
//!
//! 记录保存在 [`RecordPool`] 中，不具备原生过期能力，完全依赖引擎的
//! 读时淘汰和 GC，适合测试。

use async_trait::async_trait;

use crate::cache::adapter::CacheAdapter;
use crate::cache::pool::RecordPool;
use crate::cache::record::CacheRecord;
use crate::error::BackendResult;

/// 模拟后端
#[derive(Debug, Default)]
pub struct MockAdapter {
    pool: RecordPool,
}

impl MockAdapter {
    /// 创建空的模拟后端
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前记录数量（包括已过期但尚未淘汰的）
    #[must_use]
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// 是否没有任何记录
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

#[async_trait]
impl CacheAdapter for MockAdapter {
    fn backend_type(&self) -> &'static str {
        "mock"
    }

    async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>> {
        Ok(self.pool.get(key))
    }

    async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()> {
        self.pool.insert(key, record.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        self.pool.remove(key);
        Ok(())
    }

    async fn remove_all(&self) -> BackendResult<()> {
        self.pool.clear();
        Ok(())
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        Ok(self.pool.contains(key))
    }

    async fn records(&self) -> BackendResult<Vec<(String, CacheRecord)>> {
        Ok(self.pool.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_primitives() {
        let adapter = MockAdapter::new();
        let record = CacheRecord::new(json!("v"), 0, 1);

        adapter.store("k", &record).await.unwrap();
        assert_eq!(adapter.fetch("k").await.unwrap(), Some(record));
        assert!(adapter.exists("k").await.unwrap());
        assert_eq!(adapter.records().await.unwrap().len(), 1);

        adapter.remove("k").await.unwrap();
        adapter.remove("k").await.unwrap();
        assert!(adapter.is_empty());
        assert!(adapter.rebuild().await.is_none());
    }
}
