//! # 集成测试公共工具

#![allow(dead_code)]

use std::sync::Once;

use simple_cache::{Cache, CacheSettings};
use tempfile::TempDir;
use tracing::Level;

static INIT: Once = Once::new();

/// 初始化测试环境（只执行一次）
pub fn init_test_env() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// 创建指定后端的缓存，文件类后端使用独立的临时目录
pub async fn open_cache(backend: &str) -> (Cache, TempDir) {
    open_cache_with(backend, CacheSettings::default()).await
}

/// 在给定配置基础上创建缓存，存储目录替换为新的临时目录
pub async fn open_cache_with(backend: &str, settings: CacheSettings) -> (Cache, TempDir) {
    init_test_env();

    let dir = tempfile::tempdir().expect("创建临时目录失败");
    let cache = Cache::new(backend, settings.with_storage(dir.path()))
        .await
        .expect("创建缓存失败");

    (cache, dir)
}
