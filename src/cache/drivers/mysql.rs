//! # MySQL 缓存后端
//!
//! 与 SQLite 共用表结构，值列使用 `LONGTEXT`；建表需要显式调用 `rebuild`。

use async_trait::async_trait;
use sea_orm::{ConnectOptions, Database};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::DEFAULT_HOST;
use super::sql::{DEFAULT_TABLE, SqlStore, TableFlavor};
use crate::cache::adapter::CacheAdapter;
use crate::cache::record::CacheRecord;
use crate::cache::validate::assert_identifier;
use crate::config::CacheSettings;
use crate::error::{BackendResult, CacheError, Result};

/// MySQL 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MysqlConfig {
    /// 服务器地址
    pub host: String,
    /// 服务器端口
    pub port: u16,
    /// Unix 套接字路径（可选）
    pub unix_socket: Option<String>,
    /// 用户名
    pub user: Option<String>,
    /// 密码
    pub pass: Option<String>,
    /// 数据库名，必填
    pub dbname: String,
    /// 缓存表名
    pub table: String,
    /// 连接及建表字符集
    pub charset: String,
}

impl MysqlConfig {
    /// 从构造参数创建
    ///
    /// 缺少 `dbname` 时返回参数错误。
    pub fn from_settings(settings: &CacheSettings) -> Result<Self> {
        let dbname = CacheSettings::non_empty(settings.dbname.as_ref())
            .ok_or_else(|| crate::argument_error!("MySQL 后端必须提供 dbname"))?;
        let table = CacheSettings::non_empty(settings.table.as_ref())
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let charset = CacheSettings::non_empty(settings.charset.as_ref())
            .unwrap_or_else(|| "utf8mb4".to_string());

        assert_identifier("table", &table)?;
        assert_identifier("charset", &charset)?;

        Ok(Self {
            host: CacheSettings::non_empty(settings.host.as_ref())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: settings.port.unwrap_or(3306),
            unix_socket: CacheSettings::non_empty(settings.unix_socket.as_ref()),
            user: CacheSettings::non_empty(settings.user.as_ref()),
            pass: CacheSettings::non_empty(settings.pass.as_ref()),
            dbname,
            table,
            charset,
        })
    }

    /// 构建数据库连接 URL
    #[must_use]
    pub fn build_url(&self) -> String {
        let auth = match (&self.user, &self.pass) {
            (Some(user), Some(pass)) => format!(
                "{}:{}@",
                urlencoding::encode(user),
                urlencoding::encode(pass)
            ),
            (Some(user), None) => format!("{}@", urlencoding::encode(user)),
            _ => String::new(),
        };

        let mut url = format!(
            "mysql://{auth}{}:{}/{}?charset={}",
            self.host,
            self.port,
            urlencoding::encode(&self.dbname),
            self.charset
        );

        if let Some(socket) = &self.unix_socket {
            url.push_str("&socket=");
            url.push_str(&urlencoding::encode(socket));
        }

        url
    }
}

/// MySQL 缓存后端
pub struct MysqlAdapter {
    store: SqlStore,
}

impl MysqlAdapter {
    /// 连接 MySQL 服务器
    pub async fn new(config: MysqlConfig) -> Result<Self> {
        info!(
            backend = "mysql",
            host = %config.host,
            port = config.port,
            dbname = %config.dbname,
            "正在连接 MySQL 服务器"
        );

        let mut options = ConnectOptions::new(config.build_url());
        options.sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .map_err(|e| CacheError::system_with_source("建立 MySQL 连接失败", e))?;

        let store = SqlStore::new(
            db,
            config.table,
            TableFlavor::InnoDb,
            Some(config.charset),
        )?;

        Ok(Self { store })
    }
}

#[async_trait]
impl CacheAdapter for MysqlAdapter {
    fn backend_type(&self) -> &'static str {
        "mysql"
    }

    async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>> {
        self.store.fetch(key).await
    }

    async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()> {
        self.store.store(key, record).await
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        self.store.remove(key).await
    }

    async fn remove_all(&self) -> BackendResult<()> {
        self.store.remove_all().await
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        self.store.exists(key).await
    }

    async fn records(&self) -> BackendResult<Vec<(String, CacheRecord)>> {
        self.store.records().await
    }

    async fn rebuild(&self) -> Option<BackendResult<()>> {
        Some(self.store.create_table().await)
    }
}
