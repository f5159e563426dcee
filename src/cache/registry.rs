//! # 后端注册表
//!
//! 后端名称到适配器构造过程的封闭映射

use std::fmt;
use std::str::FromStr;

use super::adapter::CacheAdapter;
use super::drivers::{
    FileAdapter, FileConfig, MemoryAdapter, MockAdapter, MysqlAdapter, MysqlConfig, RedisAdapter,
    RedisConfig, SqliteAdapter,
};
#[cfg(feature = "memcached")]
use super::drivers::{MemcachedAdapter, MemcachedConfig};
#[cfg(feature = "mongo")]
use super::drivers::{MongoAdapter, MongoConfig};
use crate::config::CacheSettings;
use crate::error::{CacheError, Result};

/// 已知的后端类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendKind {
    /// 进程内可枚举的模拟后端
    Mock,
    /// moka 内存缓存
    Memory,
    /// 每个键一个文件
    File,
    /// Redis 服务器
    Redis,
    /// SQLite 数据库文件
    Sqlite,
    /// MySQL 数据库
    Mysql,
    /// MongoDB 集合
    #[cfg(feature = "mongo")]
    Mongo,
    /// Memcached 服务器
    #[cfg(feature = "memcached")]
    Memcached,
}

impl BackendKind {
    /// 当前编译配置下可用的全部后端
    pub const ALL: &'static [Self] = &[
        Self::Mock,
        Self::Memory,
        Self::File,
        Self::Redis,
        Self::Sqlite,
        Self::Mysql,
        #[cfg(feature = "mongo")]
        Self::Mongo,
        #[cfg(feature = "memcached")]
        Self::Memcached,
    ];

    /// 后端名称，与适配器的类型标识一致
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Memory => "memory",
            Self::File => "file",
            Self::Redis => "redis",
            Self::Sqlite => "sqlite",
            Self::Mysql => "mysql",
            #[cfg(feature = "mongo")]
            Self::Mongo => "mongo",
            #[cfg(feature = "memcached")]
            Self::Memcached => "memcached",
        }
    }

    /// 按构造参数创建适配器
    pub async fn build(&self, settings: &CacheSettings) -> Result<Box<dyn CacheAdapter>> {
        let adapter: Box<dyn CacheAdapter> = match self {
            Self::Mock => Box::new(MockAdapter::new()),
            Self::Memory => Box::new(MemoryAdapter::from_settings(settings)),
            Self::File => Box::new(FileAdapter::new(FileConfig::from_settings(settings)).await?),
            Self::Redis => Box::new(RedisAdapter::new(RedisConfig::from_settings(settings)).await?),
            Self::Sqlite => Box::new(SqliteAdapter::from_settings(settings).await?),
            Self::Mysql => Box::new(MysqlAdapter::new(MysqlConfig::from_settings(settings)?).await?),
            #[cfg(feature = "mongo")]
            Self::Mongo => Box::new(MongoAdapter::new(MongoConfig::from_settings(settings)?).await?),
            #[cfg(feature = "memcached")]
            Self::Memcached => Box::new(
                MemcachedAdapter::new(MemcachedConfig::from_settings(settings)).await?,
            ),
        };

        Ok(adapter)
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = CacheError;

    /// 大小写不敏感地解析后端名称
    fn from_str(name: &str) -> Result<Self> {
        let normalized = name.trim().to_ascii_lowercase();

        Self::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == normalized)
            .ok_or_else(|| {
                let known: Vec<&str> = Self::ALL.iter().map(Self::as_str).collect();
                crate::argument_error!(
                    "不支持的缓存后端 \"{}\"，可用后端: {}",
                    name,
                    known.join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("mock", BackendKind::Mock)]
    #[case("Memory", BackendKind::Memory)]
    #[case("FILE", BackendKind::File)]
    #[case("Redis", BackendKind::Redis)]
    #[case(" sqlite ", BackendKind::Sqlite)]
    #[case("MySQL", BackendKind::Mysql)]
    fn test_parse_backend(#[case] name: &str, #[case] expected: BackendKind) {
        assert_eq!(name.parse::<BackendKind>().unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("postgres")]
    #[case("apc")]
    fn test_unknown_backend(#[case] name: &str) {
        let err = name.parse::<BackendKind>().unwrap_err();
        assert!(err.is_argument());
    }

    #[test]
    fn test_names_match_adapter_tags() {
        for kind in BackendKind::ALL {
            assert_eq!(kind.to_string(), kind.as_str());
            assert_eq!(kind.as_str().parse::<BackendKind>().unwrap(), *kind);
        }
    }

    #[tokio::test]
    async fn test_build_in_process_backends() {
        let settings = CacheSettings::default();
        for kind in [BackendKind::Mock, BackendKind::Memory] {
            let adapter = kind.build(&settings).await.unwrap();
            assert_eq!(adapter.backend_type(), kind.as_str());
        }

        let dir = tempfile::tempdir().unwrap();
        let settings = CacheSettings::default().with_storage(dir.path());
        for kind in [BackendKind::File, BackendKind::Sqlite] {
            let adapter = kind.build(&settings).await.unwrap();
            assert_eq!(adapter.backend_type(), kind.as_str());
        }
    }
}
