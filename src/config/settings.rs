//! # 缓存构造配置

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 默认 GC 命中概率分子
pub const DEFAULT_GC_PROBABILITY: u32 = 1;
/// 默认 GC 命中概率分母
pub const DEFAULT_GC_DIVISOR: u32 = 100;

/// 后端构造参数
///
/// 各后端只读取自己认识的字段，缺省字段由后端自己的默认值补齐。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// 服务器地址
    pub host: Option<String>,
    /// 服务器端口
    pub port: Option<u16>,
    /// Unix 套接字路径（优先于 host/port）
    pub unix_socket: Option<String>,
    /// 用户名
    pub user: Option<String>,
    /// 密码
    pub pass: Option<String>,
    /// 文件/嵌入式数据库的存储目录
    pub storage: Option<PathBuf>,
    /// 数据库名
    pub dbname: Option<String>,
    /// 数据表名
    pub table: Option<String>,
    /// 文档集合名
    pub collection: Option<String>,
    /// 连接字符集
    pub charset: Option<String>,
    /// 内存缓存最大条目数
    pub max_entries: Option<u64>,
    /// 构造完成后是否执行一次机会性 GC
    pub gc_enable: bool,
    /// GC 命中概率分子
    pub gc_probability: u32,
    /// GC 命中概率分母
    pub gc_divisor: u32,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            unix_socket: None,
            user: None,
            pass: None,
            storage: None,
            dbname: None,
            table: None,
            collection: None,
            charset: None,
            max_entries: None,
            gc_enable: false,
            gc_probability: DEFAULT_GC_PROBABILITY,
            gc_divisor: DEFAULT_GC_DIVISOR,
        }
    }
}

impl CacheSettings {
    /// 指定存储目录
    #[must_use]
    pub fn with_storage(mut self, storage: impl Into<PathBuf>) -> Self {
        self.storage = Some(storage.into());
        self
    }

    /// 启用构造后的机会性 GC
    #[must_use]
    pub const fn with_gc(mut self, probability: u32, divisor: u32) -> Self {
        self.gc_enable = true;
        self.gc_probability = probability;
        self.gc_divisor = divisor;
        self
    }

    /// 读取非空字符串字段，空白字符串视为未设置
    pub(crate) fn non_empty(value: Option<&String>) -> Option<String> {
        value
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }
}

/// 完整的缓存配置：后端名称加构造参数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// 后端名称（大小写不敏感）
    pub backend: String,
    /// 构造参数
    #[serde(flatten)]
    pub settings: CacheSettings,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            settings: CacheSettings::default(),
        }
    }
}
