//! # 进程内记录池
//!
//! 需要在本地缓冲记录的适配器共用的存储结构

use dashmap::DashMap;

use super::record::CacheRecord;

/// 以键索引的记录池
#[derive(Debug, Default)]
pub struct RecordPool {
    records: DashMap<String, CacheRecord>,
}

impl RecordPool {
    /// 创建空记录池
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取记录副本
    #[must_use]
    pub fn get(&self, key: &str) -> Option<CacheRecord> {
        self.records.get(key).map(|entry| entry.value().clone())
    }

    /// 写入（覆盖）记录
    pub fn insert(&self, key: &str, record: CacheRecord) {
        self.records.insert(key.to_string(), record);
    }

    /// 删除记录，返回被删除的记录
    pub fn remove(&self, key: &str) -> Option<CacheRecord> {
        self.records.remove(key).map(|(_, record)| record)
    }

    /// 清空
    pub fn clear(&self) {
        self.records.clear();
    }

    /// 是否包含键
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    /// 记录数量
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否为空
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 全部记录的快照
    #[must_use]
    pub fn snapshot(&self) -> Vec<(String, CacheRecord)> {
        self.records
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }
}
