//! # 缓存记录
//!
//! 存储单元 `{value, ttl, timestamp}` 及其过期判定

use serde::{Deserialize, Serialize};

/// 当前 Unix 时间（秒）
#[must_use]
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// 缓存记录
///
/// `ttl == 0` 表示永不过期；否则记录在写入 `ttl` 秒后过期。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheRecord {
    /// 写入时的 Unix 时间戳
    pub timestamp: i64,
    /// 存活秒数，0 表示永不过期
    pub ttl: u64,
    /// 调用方的值
    pub value: serde_json::Value,
}

impl CacheRecord {
    /// 创建记录
    #[must_use]
    pub const fn new(value: serde_json::Value, ttl: u64, timestamp: i64) -> Self {
        Self {
            timestamp,
            ttl,
            value,
        }
    }

    /// 在给定时刻是否已过期
    #[must_use]
    pub fn is_expired_at(&self, now: i64) -> bool {
        if self.ttl == 0 {
            return false;
        }
        let ttl = i64::try_from(self.ttl).unwrap_or(i64::MAX);
        now.saturating_sub(self.timestamp) >= ttl
    }

    /// 当前是否已过期
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(unix_now())
    }

    /// 编码为持久化格式
    pub fn encode(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// 从持久化格式解码
    pub fn decode(content: &str) -> serde_json::Result<Self> {
        serde_json::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_zero_ttl_never_expires() {
        let record = CacheRecord::new(json!("bar"), 0, 0);
        assert!(!record.is_expired_at(i64::MAX));
    }

    #[test]
    fn test_expiry_boundary() {
        let record = CacheRecord::new(json!(1), 10, 1_000);
        assert!(!record.is_expired_at(1_009));
        assert!(record.is_expired_at(1_010));
        assert!(record.is_expired_at(1_011));
    }

    #[test]
    fn test_huge_ttl_does_not_overflow() {
        let record = CacheRecord::new(json!(null), u64::MAX, 0);
        assert!(!record.is_expired_at(i64::MAX - 1));
    }

    #[test]
    fn test_persisted_layout() {
        let record = CacheRecord::new(json!({"a": [1, 2]}), 300, 1_700_000_000);
        let encoded = record.encode().unwrap();
        let raw: serde_json::Value = serde_json::from_str(&encoded).unwrap();
        assert_eq!(raw["timestamp"], 1_700_000_000);
        assert_eq!(raw["ttl"], 300);
        assert_eq!(raw["value"]["a"][1], 2);
        assert_eq!(CacheRecord::decode(&encoded).unwrap(), record);
    }
}
