//! # 日志配置模块
//!
//! 提供统一的 tracing 订阅器初始化，默认压低数据库驱动的查询日志

use std::env;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// 构建默认过滤规则
#[must_use]
pub fn default_filter(level: Option<&str>) -> String {
    let level = level.unwrap_or("info");
    format!("{level},simple_cache=debug,sqlx::query=off,sea_orm::query=warn,sqlx=warn")
}

/// 初始化日志系统
///
/// `RUST_LOG` 存在时优先使用，否则使用 [`default_filter`]。重复调用时
/// 保留第一次安装的订阅器。
pub fn init_logging(level: Option<&str>) {
    let log_filter = env::var("RUST_LOG").unwrap_or_else(|_| default_filter(level));

    let installed = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| log_filter.into()))
        .with(
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(filter = %env::var("RUST_LOG").unwrap_or_else(|_| default_filter(level)), "日志系统已初始化");
    }
}

/// 环境变量设置指南
pub fn print_logging_help() {
    println!("📋 日志配置指南:");
    println!("  RUST_LOG=info                      # 标准日志级别");
    println!("  RUST_LOG=simple_cache=debug        # 缓存命中/淘汰/GC 细节");
    println!("  RUST_LOG=info,sqlx::query=off      # 禁止 SQL 后端的查询日志");
    println!("  RUST_LOG=info,sqlx::query=info     # 启用 SQL 后端的查询日志");
    println!();
    println!("💡 组合示例:");
    println!("  RUST_LOG=warn,simple_cache=warn    # 只看被吞掉的后端失败");
    println!("  RUST_LOG=debug,sqlx::query=info    # 调试模式：完整日志");
}
