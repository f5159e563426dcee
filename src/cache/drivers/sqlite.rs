//! # SQLite 缓存后端
//!
//! 数据库文件固定为 `<storage>/cache.sqlite3`，构造时自动建表

use std::path::Path;

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database};
use tracing::info;

use super::sql::{DEFAULT_TABLE, SqlStore, TableFlavor};
use super::{ensure_writable_dir, storage_from};
use crate::cache::adapter::CacheAdapter;
use crate::cache::record::CacheRecord;
use crate::config::CacheSettings;
use crate::error::{BackendResult, CacheError, Result};

/// 数据库文件名
const DATABASE_FILE: &str = "cache.sqlite3";

/// SQLite 缓存后端
pub struct SqliteAdapter {
    store: SqlStore,
}

impl SqliteAdapter {
    /// 在存储目录中打开（或创建）数据库并确保表存在
    pub async fn new(storage: &Path, table: Option<String>) -> Result<Self> {
        ensure_writable_dir(storage).await?;

        let db_path = storage.join(DATABASE_FILE);
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        info!(backend = "sqlite", path = %db_path.display(), "正在打开 SQLite 缓存数据库");

        let mut options = ConnectOptions::new(url);
        options.sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .map_err(|e| CacheError::system_with_source("打开 SQLite 数据库失败", e))?;

        let store = SqlStore::new(
            db,
            table.unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            TableFlavor::Plain,
            None,
        )?;

        store
            .create_table()
            .await
            .map_err(|e| CacheError::system_with_source("创建缓存表失败", e))?;

        Ok(Self { store })
    }

    /// 从构造参数创建
    pub async fn from_settings(settings: &CacheSettings) -> Result<Self> {
        let storage = storage_from(settings);
        Self::new(&storage, CacheSettings::non_empty(settings.table.as_ref())).await
    }
}

#[async_trait]
impl CacheAdapter for SqliteAdapter {
    fn backend_type(&self) -> &'static str {
        "sqlite"
    }

    async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>> {
        self.store.fetch(key).await
    }

    async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()> {
        self.store.store(key, record).await
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        self.store.remove(key).await
    }

    async fn remove_all(&self) -> BackendResult<()> {
        self.store.remove_all().await
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        self.store.exists(key).await
    }

    async fn records(&self) -> BackendResult<Vec<(String, CacheRecord)>> {
        self.store.records().await
    }

    async fn rebuild(&self) -> Option<BackendResult<()>> {
        Some(self.store.create_table().await)
    }
}
