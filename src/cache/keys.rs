//! # 缓存键命名空间
//!
//! 共享存储中的物理键统一加上固定前缀，避免与无关数据冲突

use std::fmt;

/// 物理键前缀
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Namespace {
    prefix: &'static str,
}

/// 键值服务器使用的前缀 - `sc:{key}`
pub const KV_NAMESPACE: Namespace = Namespace::new("sc:");

/// 文档数据库使用的前缀 - `sc_{key}`
pub const DOCUMENT_NAMESPACE: Namespace = Namespace::new("sc_");

impl Namespace {
    /// 创建命名空间
    #[must_use]
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix }
    }

    /// 前缀本身
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// 生成物理键
    #[must_use]
    pub fn build(&self, key: &str) -> String {
        format!("{}{key}", self.prefix())
    }

    /// 获取匹配整个命名空间的模式（用于批量操作）
    #[must_use]
    pub fn pattern(&self) -> String {
        format!("{}*", self.prefix())
    }

    /// 从物理键还原逻辑键；不属于本命名空间时返回 `None`
    #[must_use]
    pub fn strip<'a>(&self, physical: &'a str) -> Option<&'a str> {
        physical.strip_prefix(self.prefix())
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
