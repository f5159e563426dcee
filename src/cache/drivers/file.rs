//! # 文件缓存后端
//!
//! 每个键对应存储目录下的一个 `<key>.cache` 文件，内容为编码后的记录。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{info, warn};

use super::{ensure_writable_dir, storage_from};
use crate::cache::adapter::CacheAdapter;
use crate::cache::record::CacheRecord;
use crate::config::CacheSettings;
use crate::error::{BackendError, BackendResult, Result};

/// 缓存文件扩展名
const CACHE_EXTENSION: &str = "cache";

/// 文件后端配置
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    /// 存储目录
    pub storage: PathBuf,
}

impl FileConfig {
    #[must_use]
    pub fn from_settings(settings: &CacheSettings) -> Self {
        Self {
            storage: storage_from(settings),
        }
    }
}

/// 文件缓存后端
#[derive(Debug)]
pub struct FileAdapter {
    storage: PathBuf,
}

impl FileAdapter {
    /// 创建文件后端，存储目录必须已存在且可写
    pub async fn new(config: FileConfig) -> Result<Self> {
        ensure_writable_dir(&config.storage).await?;
        info!(backend = "file", storage = %config.storage.display(), "初始化文件缓存");

        Ok(Self {
            storage: config.storage,
        })
    }

    /// 存储目录
    #[must_use]
    pub fn storage(&self) -> &Path {
        &self.storage
    }

    fn path_for(&self, key: &str) -> BackendResult<PathBuf> {
        if key.is_empty() || key.contains(['/', '\\']) {
            return Err(BackendError::invalid_key(key));
        }
        Ok(self.storage.join(format!("{key}.{CACHE_EXTENSION}")))
    }

    /// 列出目录中的全部缓存文件及其逻辑键
    async fn cache_files(&self) -> BackendResult<Vec<(String, PathBuf)>> {
        let mut entries = tokio::fs::read_dir(&self.storage).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some(CACHE_EXTENSION) {
                continue;
            }
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Some(key) = path.file_stem().and_then(|stem| stem.to_str()) {
                files.push((key.to_string(), path.clone()));
            }
        }

        Ok(files)
    }
}

#[async_trait]
impl CacheAdapter for FileAdapter {
    fn backend_type(&self) -> &'static str {
        "file"
    }

    async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>> {
        let path = self.path_for(key)?;

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(CacheRecord::decode(&content)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()> {
        let path = self.path_for(key)?;
        tokio::fs::write(&path, record.encode()?).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tokio::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).await?;
        }

        Ok(())
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        let path = self.path_for(key)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove_all(&self) -> BackendResult<()> {
        for (_, path) in self.cache_files().await? {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        let path = self.path_for(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    async fn records(&self) -> BackendResult<Vec<(String, CacheRecord)>> {
        let mut records = Vec::new();

        for (key, path) in self.cache_files().await? {
            let content = match tokio::fs::read_to_string(&path).await {
                Ok(content) => content,
                Err(e) if e.kind() == ErrorKind::NotFound => continue,
                Err(e) => return Err(e.into()),
            };

            match CacheRecord::decode(&content) {
                Ok(record) => records.push((key, record)),
                Err(e) => warn!(backend = "file", key, error = %e, "跳过无法解析的缓存文件"),
            }
        }

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn adapter() -> (FileAdapter, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig {
            storage: dir.path().to_path_buf(),
        };
        (FileAdapter::new(config).await.unwrap(), dir)
    }

    #[tokio::test]
    async fn test_file_layout() {
        let (adapter, dir) = adapter().await;
        let record = CacheRecord::new(json!("bar"), 0, 100);
        adapter.store("foo", &record).await.unwrap();

        let path = dir.path().join("foo.cache");
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(CacheRecord::decode(&content).unwrap(), record);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o640);
        }
    }

    #[tokio::test]
    async fn test_file_primitives() {
        let (adapter, dir) = adapter().await;
        std::fs::write(dir.path().join("unrelated.txt"), "keep").unwrap();

        assert_eq!(adapter.fetch("missing").await.unwrap(), None);
        adapter.remove("missing").await.unwrap();

        adapter.store("a", &CacheRecord::new(json!(1), 0, 1)).await.unwrap();
        adapter.store("b", &CacheRecord::new(json!(2), 5, 1)).await.unwrap();
        assert!(adapter.exists("a").await.unwrap());

        let mut keys: Vec<_> = adapter.records().await.unwrap().into_iter().map(|(k, _)| k).collect();
        keys.sort();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        adapter.remove_all().await.unwrap();
        assert!(adapter.records().await.unwrap().is_empty());
        assert!(dir.path().join("unrelated.txt").exists());
    }

    #[tokio::test]
    async fn test_path_separator_rejected() {
        let (adapter, _dir) = adapter().await;
        assert!(matches!(
            adapter.remove("../escape").await,
            Err(BackendError::InvalidKey(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let config = FileConfig {
            storage: dir.path().join("does-not-exist"),
        };
        let err = FileAdapter::new(config).await.unwrap_err();
        assert!(err.is_system());
    }
}
