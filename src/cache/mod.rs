//! # 缓存模块
//!
//! 统一缓存契约、缓存引擎以及各存储后端适配器

pub mod adapter;
pub mod drivers;
pub mod facade;
pub mod keys;
pub mod pool;
pub mod provider;
pub mod record;
pub mod registry;
pub mod ttl;
pub mod validate;

pub use adapter::CacheAdapter;
pub use facade::Cache;
pub use keys::Namespace;
pub use pool::RecordPool;
pub use provider::CacheProvider;
pub use record::CacheRecord;
pub use registry::BackendKind;
pub use ttl::{Interval, Ttl};
