//! # 错误类型定义

use thiserror::Error;

/// 缓存主要错误类型
///
/// 只有参数校验和构造阶段会产生错误；运行期的后端失败通过 `false`
/// 或默认值返回，不会以错误形式出现。
#[derive(Debug, Error)]
pub enum CacheError {
    /// 参数错误（非法键、非法 TTL、未知后端、必填配置为空）
    #[error("参数错误: {message}")]
    Argument { message: String },

    /// 缓存系统错误（后端不可用、目录不可写、连接失败）
    #[error("缓存系统错误: {message}")]
    System {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// 序列化/反序列化错误
    #[error("序列化错误: {message}")]
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// 配置文件相关错误
    #[error("配置错误: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

impl CacheError {
    /// 创建参数错误
    pub fn argument<T: Into<String>>(message: T) -> Self {
        Self::Argument {
            message: message.into(),
        }
    }

    /// 创建缓存系统错误
    pub fn system<T: Into<String>>(message: T) -> Self {
        Self::System {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的缓存系统错误
    pub fn system_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::System {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 创建序列化错误
    pub fn serialization<T: Into<String>>(message: T, source: serde_json::Error) -> Self {
        Self::Serialization {
            message: message.into(),
            source,
        }
    }

    /// 创建配置错误
    pub fn config<T: Into<String>>(message: T) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
        }
    }

    /// 创建带来源的配置错误
    pub fn config_with_source<T: Into<String>, E: Into<anyhow::Error>>(
        message: T,
        source: E,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// 是否为参数错误
    #[must_use]
    pub const fn is_argument(&self) -> bool {
        matches!(self, Self::Argument { .. })
    }

    /// 是否为缓存系统错误
    #[must_use]
    pub const fn is_system(&self) -> bool {
        matches!(self, Self::System { .. })
    }
}

impl From<toml::de::Error> for CacheError {
    fn from(err: toml::de::Error) -> Self {
        Self::config_with_source("TOML解析失败", err)
    }
}
