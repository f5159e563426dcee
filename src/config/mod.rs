//! # 配置管理模块
//!
//! 处理缓存配置加载和验证

mod settings;

pub use settings::{CacheConfig, CacheSettings, DEFAULT_GC_DIVISOR, DEFAULT_GC_PROBABILITY};

use crate::cache::BackendKind;
use crate::error::{CacheError, Result};
use std::path::Path;

impl CacheConfig {
    /// 从 TOML 文本解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 从 TOML 文件加载配置
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CacheError::config(format!(
                "配置文件不存在: {}",
                path.display()
            )));
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            CacheError::config_with_source(format!("读取配置文件失败: {}", path.display()), e)
        })?;

        Self::from_toml_str(&content)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<()> {
        self.backend_kind()?;

        if self.settings.gc_enable && self.settings.gc_divisor == 0 {
            return Err(CacheError::config("启用 GC 时 gc_divisor 必须大于0"));
        }

        Ok(())
    }

    /// 解析后端类型
    pub fn backend_kind(&self) -> Result<BackendKind> {
        self.backend.parse()
    }
}
