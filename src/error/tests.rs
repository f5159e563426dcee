//! # 错误处理测试

use crate::error::{BackendError, CacheError, Result};
use std::error::Error;

#[test]
fn test_argument_error_creation() {
    let err = CacheError::argument("键不能为空");
    assert!(err.is_argument());
    assert!(!err.is_system());
    assert_eq!(err.to_string(), "参数错误: 键不能为空");
}

#[test]
fn test_system_error_with_source() {
    let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "权限不足");
    let err = CacheError::system_with_source("缓存目录不可写", io_err);

    assert!(err.is_system());
    assert!(err.to_string().contains("缓存系统错误: 缓存目录不可写"));
    assert!(err.source().is_some());
}

#[test]
fn test_auto_conversion_from_toml_error() {
    let toml_err = toml::from_str::<toml::Value>("invalid = toml = syntax").unwrap_err();
    let err: CacheError = toml_err.into();

    assert!(matches!(err, CacheError::Config { .. }));
    assert!(err.to_string().contains("配置错误: TOML解析失败"));
}

#[test]
fn test_serialization_error() {
    let json_err = serde_json::from_str::<u32>("\"text\"").unwrap_err();
    let err = CacheError::serialization("缓存值类型不匹配", json_err);
    assert!(matches!(err, CacheError::Serialization { .. }));
    assert!(err.source().is_some());
}

#[test]
fn test_argument_macros() {
    fn check(len: usize) -> Result<()> {
        crate::ensure_argument!(len > 0, "长度必须大于 {}", 0);
        Ok(())
    }

    assert!(check(1).is_ok());
    let err = check(0).unwrap_err();
    assert_eq!(err.to_string(), "参数错误: 长度必须大于 0");

    let err = crate::system_error!("无法连接 {}", "redis");
    assert!(err.is_system());
}

#[test]
fn test_backend_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "不存在");
    let err: BackendError = io_err.into();
    assert!(matches!(err, BackendError::Io(_)));

    let err = BackendError::invalid_key("a/b");
    assert_eq!(err.to_string(), "后端无法接受该键: a/b");
}
