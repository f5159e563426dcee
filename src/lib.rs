//! # Simple Cache
//!
//! 统一的键值缓存接口，可切换内存、文件、Redis、SQLite、MySQL 等存储后端

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use cache::{BackendKind, Cache, CacheAdapter, CacheProvider, CacheRecord, Interval, Ttl};
pub use config::{CacheConfig, CacheSettings};
pub use error::{CacheError, Result};
