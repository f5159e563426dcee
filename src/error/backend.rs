use thiserror::Error;

/// 描述存储后端单次操作的失败。
///
/// 这些错误只在适配器与缓存引擎之间传递，引擎会把它们记录为 warn
/// 日志并转换成 `false` 返回值。
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("文件操作失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("缓存记录编解码失败: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("Redis 客户端错误: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("数据库错误: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("SQL 语句构建失败: {0}")]
    Query(#[from] sea_orm::sea_query::error::Error),

    #[cfg(feature = "mongo")]
    #[error("MongoDB 客户端错误: {0}")]
    Mongo(#[from] mongodb::error::Error),

    #[cfg(feature = "memcached")]
    #[error("Memcached 客户端错误: {0}")]
    Memcache(#[from] memcache::MemcacheError),

    #[error("后端无法接受该键: {0}")]
    InvalidKey(String),

    #[error("后端任务执行失败: {0}")]
    Task(String),
}

impl BackendError {
    /// 便捷构造函数，统一字符串转换。
    pub fn invalid_key(key: impl Into<String>) -> Self {
        Self::InvalidKey(key.into())
    }

    pub fn task(message: impl Into<String>) -> Self {
        Self::Task(message.into())
    }
}

/// 适配器原语的返回类型。
pub type BackendResult<T> = std::result::Result<T, BackendError>;
