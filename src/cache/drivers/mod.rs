//! # 存储后端适配器
//!
//! 每种存储技术一个文件，全部实现 [`CacheAdapter`](super::adapter::CacheAdapter)

mod file;
mod memory;
mod mock;
mod mysql;
mod redis;
mod sql;
mod sqlite;

#[cfg(feature = "memcached")]
mod memcached;
#[cfg(feature = "mongo")]
mod mongo;

pub use file::{FileAdapter, FileConfig};
pub use memory::{DEFAULT_MAX_ENTRIES, MemoryAdapter};
pub use mock::MockAdapter;
pub use mysql::{MysqlAdapter, MysqlConfig};
pub use self::redis::{RedisAdapter, RedisConfig};
pub use sql::DEFAULT_TABLE;
pub use sqlite::SqliteAdapter;

#[cfg(feature = "memcached")]
pub use memcached::{MemcachedAdapter, MemcachedConfig};
#[cfg(feature = "mongo")]
pub use mongo::{MongoAdapter, MongoConfig};

use std::path::{Path, PathBuf};

use crate::config::CacheSettings;
use crate::error::{CacheError, Result};

/// 默认服务器地址
pub(crate) const DEFAULT_HOST: &str = "127.0.0.1";

/// 文件类后端的默认存储目录
#[must_use]
pub fn default_storage() -> PathBuf {
    std::env::temp_dir().join("simple-cache")
}

/// 从配置中解析存储目录
pub(crate) fn storage_from(settings: &CacheSettings) -> PathBuf {
    settings
        .storage
        .clone()
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(default_storage)
}

/// 确认存储目录存在且可写
///
/// 通过创建并删除一个探测文件来判断可写性。
pub(crate) async fn ensure_writable_dir(dir: &Path) -> Result<()> {
    let is_dir = tokio::fs::metadata(dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);

    if !is_dir {
        return Err(crate::system_error!(
            "存储目录不存在: {}",
            dir.display()
        ));
    }

    let probe = dir.join(format!(".simple-cache-probe-{}", std::process::id()));

    tokio::fs::write(&probe, b"")
        .await
        .map_err(|e| {
            CacheError::system_with_source(format!("存储目录不可写: {}", dir.display()), e)
        })?;

    tokio::fs::remove_file(&probe).await.map_err(|e| {
        CacheError::system_with_source(format!("存储目录不可写: {}", dir.display()), e)
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ensure_writable_dir() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ensure_writable_dir(dir.path()).await.is_ok());

        let missing = dir.path().join("missing");
        assert!(ensure_writable_dir(&missing).await.unwrap_err().is_system());

        let file = dir.path().join("plain.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(ensure_writable_dir(&file).await.unwrap_err().is_system());
    }

    #[test]
    fn test_storage_from_settings() {
        let settings = CacheSettings::default();
        assert_eq!(storage_from(&settings), default_storage());

        let settings = CacheSettings::default().with_storage("/var/cache/app");
        assert_eq!(storage_from(&settings), PathBuf::from("/var/cache/app"));
    }
}
