//! # 缓存契约集成测试
//!
//! 对进程内、文件和 SQLite 后端执行同一组契约检查

mod common;

use std::time::Duration;

use common::{init_test_env, open_cache, open_cache_with};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde::{Deserialize, Serialize};
use serde_json::json;
use simple_cache::cache::record::unix_now;
use simple_cache::{Cache, CacheRecord, CacheSettings, Interval, Ttl};
use tokio::time::sleep;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Profile {
    id: u64,
    name: String,
    tags: Vec<String>,
    score: Option<f64>,
}

/// 直接通过适配器写入一条过期记录
async fn plant_expired(cache: &Cache, key: &str) {
    let record = CacheRecord::new(json!("stale"), 10, unix_now() - 60);
    cache
        .provider()
        .adapter()
        .store(key, &record)
        .await
        .expect("写入过期记录失败");
}

#[rstest]
#[case("mock")]
#[case("memory")]
#[case("file")]
#[case("sqlite")]
#[tokio::test]
async fn test_roundtrip(#[case] backend: &str) {
    let (cache, _dir) = open_cache(backend).await;
    assert_eq!(cache.backend_type(), backend);

    let profile = Profile {
        id: 7,
        name: "测试用户".to_string(),
        tags: vec!["a".to_string(), "b".to_string()],
        score: Some(9.5),
    };

    assert!(cache.set("profile:7", &profile, 300).await.unwrap());
    assert!(cache.has("profile:7").await.unwrap());

    let read: Option<Profile> = cache.get("profile:7", None).await.unwrap();
    assert_eq!(read, Some(profile));

    let scalar: String = cache.get("missing", "default".to_string()).await.unwrap();
    assert_eq!(scalar, "default");
}

#[rstest]
#[case("mock")]
#[case("memory")]
#[case("file")]
#[case("sqlite")]
#[tokio::test]
async fn test_overwrite_and_delete(#[case] backend: &str) {
    let (cache, _dir) = open_cache(backend).await;

    cache.set("k", "first", Ttl::Forever).await.unwrap();
    cache.set("k", "second", Ttl::Forever).await.unwrap();
    assert_eq!(cache.get("k", String::new()).await.unwrap(), "second");

    assert!(cache.delete("k").await.unwrap());
    assert!(cache.delete("k").await.unwrap());
    assert!(!cache.has("k").await.unwrap());
    assert_eq!(cache.get("k", "gone".to_string()).await.unwrap(), "gone");
}

#[rstest]
#[case("mock")]
#[case("memory")]
#[case("file")]
#[case("sqlite")]
#[tokio::test]
async fn test_ttl_expiry(#[case] backend: &str) {
    let (cache, _dir) = open_cache(backend).await;

    cache.set("short", "v", 1).await.unwrap();
    cache.set("forever", "v", 0).await.unwrap();
    assert_eq!(cache.get("short", String::new()).await.unwrap(), "v");

    sleep(Duration::from_secs(2)).await;

    assert_eq!(cache.get("short", "expired".to_string()).await.unwrap(), "expired");
    assert!(!cache.has("short").await.unwrap());
    assert_eq!(cache.get("forever", String::new()).await.unwrap(), "v");
}

#[rstest]
#[case("mock")]
#[case("file")]
#[case("sqlite")]
#[tokio::test]
async fn test_has_does_not_evict(#[case] backend: &str) {
    let (cache, _dir) = open_cache(backend).await;
    plant_expired(&cache, "stale").await;

    assert!(cache.has("stale").await.unwrap());
    assert!(cache.has("stale").await.unwrap());

    let read = cache.get("stale", "default".to_string()).await.unwrap();
    assert_eq!(read, "default");
    assert!(!cache.has("stale").await.unwrap());
}

#[rstest]
#[case("mock")]
#[case("file")]
#[case("sqlite")]
#[tokio::test]
async fn test_full_gc(#[case] backend: &str) {
    let (cache, _dir) = open_cache(backend).await;
    plant_expired(&cache, "old1").await;
    plant_expired(&cache, "old2").await;
    cache.set("fresh", &1, 300).await.unwrap();
    cache.set("forever", &2, Ttl::Forever).await.unwrap();

    let mut removed = cache.clear_expired_items().await;
    removed.sort();
    assert_eq!(removed, vec!["old1".to_string(), "old2".to_string()]);

    assert!(!cache.has("old1").await.unwrap());
    assert!(cache.has("fresh").await.unwrap());
    assert!(cache.has("forever").await.unwrap());
    assert!(cache.gc(1, 1).await.is_empty());
}

#[tokio::test]
async fn test_gc_never_triggers_with_zero_probability() {
    let (cache, _dir) = open_cache("mock").await;
    plant_expired(&cache, "old").await;

    for _ in 0..50 {
        assert!(cache.gc(0, 100).await.is_empty());
    }
    assert!(cache.has("old").await.unwrap());
}

#[tokio::test]
async fn test_gc_on_construction() {
    init_test_env();
    let dir = tempfile::tempdir().unwrap();

    let cache = Cache::new("file", CacheSettings::default().with_storage(dir.path()))
        .await
        .unwrap();
    plant_expired(&cache, "old").await;
    cache.set("fresh", "v", 300).await.unwrap();
    drop(cache);

    let settings = CacheSettings::default()
        .with_storage(dir.path())
        .with_gc(1, 1);
    let cache = Cache::new("file", settings).await.unwrap();

    assert!(!cache.has("old").await.unwrap());
    assert!(cache.has("fresh").await.unwrap());
}

#[rstest]
#[case("mock")]
#[case("memory")]
#[case("file")]
#[case("sqlite")]
#[tokio::test]
async fn test_bulk_operations(#[case] backend: &str) {
    let (cache, _dir) = open_cache(backend).await;

    assert!(cache.set_multiple([("a", "valA"), ("b", "valB")], 300).await.unwrap());

    let values = cache
        .get_multiple(["a", "b", "c"], "x".to_string())
        .await
        .unwrap();
    let pairs: Vec<_> = values.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
    assert_eq!(
        pairs,
        vec![
            ("a".to_string(), "valA".to_string()),
            ("b".to_string(), "valB".to_string()),
            ("c".to_string(), "x".to_string()),
        ]
    );

    assert!(cache.delete_multiple(["a", "c"]).await.unwrap());
    assert!(!cache.has("a").await.unwrap());
    assert!(cache.has("b").await.unwrap());

    assert!(cache.clear().await);
    assert!(!cache.has("b").await.unwrap());
}

#[rstest]
#[case("mock")]
#[case("file")]
#[case("sqlite")]
#[tokio::test]
async fn test_invalid_arguments(#[case] backend: &str) {
    let (cache, _dir) = open_cache(backend).await;
    cache.set("kept", &1, 0).await.unwrap();

    assert!(cache.get("", 0).await.unwrap_err().is_argument());
    assert!(cache.set("a/b", &1, 0).await.unwrap_err().is_argument());
    assert!(cache.has("@x").await.unwrap_err().is_argument());
    assert!(cache.delete("(x)").await.unwrap_err().is_argument());
    assert!(
        cache
            .get_multiple(["kept", ""], 0)
            .await
            .unwrap_err()
            .is_argument()
    );

    let err = cache
        .set_multiple([("fine", 1), ("bad{", 2)], 0)
        .await
        .unwrap_err();
    assert!(err.is_argument());
    assert!(!cache.has("fine").await.unwrap());

    assert!("-5".parse::<Ttl>().unwrap_err().is_argument());
    assert!(Ttl::try_from(-1_i64).unwrap_err().is_argument());
}

#[tokio::test]
async fn test_interval_ttl() {
    let (cache, _dir) = open_cache("mock").await;

    cache
        .set("daily", "v", Interval::default().days(1))
        .await
        .unwrap();

    let record = cache
        .provider()
        .adapter()
        .fetch("daily")
        .await
        .unwrap()
        .unwrap();
    // 夏令时切换日会有一小时偏差
    assert!((82_800..=90_000).contains(&record.ttl), "ttl = {}", record.ttl);

    let parsed: Ttl = "PT90S".parse().unwrap();
    cache.set("short", "v", parsed).await.unwrap();
    let record = cache.provider().adapter().fetch("short").await.unwrap().unwrap();
    assert_eq!(record.ttl, 90);
}

#[tokio::test]
async fn test_unknown_backend() {
    init_test_env();
    let err = Cache::new("apcu", CacheSettings::default()).await.err().unwrap();
    assert!(err.is_argument());
}

#[rstest]
#[case("file")]
#[case("sqlite")]
#[tokio::test]
async fn test_missing_storage_directory(#[case] backend: &str) {
    init_test_env();
    let dir = tempfile::tempdir().unwrap();
    let settings = CacheSettings::default().with_storage(dir.path().join("nope"));

    let err = Cache::new(backend, settings).await.err().unwrap();
    assert!(err.is_system());
}

#[tokio::test]
async fn test_rebuild_support() {
    let (sqlite, _dir) = open_cache("sqlite").await;
    assert!(sqlite.rebuild().await);

    let (file, _dir) = open_cache_with("file", CacheSettings::default()).await;
    assert!(!file.rebuild().await);
}
