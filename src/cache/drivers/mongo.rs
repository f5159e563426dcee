//! # MongoDB 缓存后端
//!
//! 每条记录一个文档：`{_id: "sc_<key>", content, sc_cache: 1}`，
//! `sc_cache` 标记用于批量清理时限定范围。

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::options::{Acknowledgment, CollectionOptions, WriteConcern};
use mongodb::{Client, Collection};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::DEFAULT_HOST;
use crate::cache::adapter::CacheAdapter;
use crate::cache::keys::DOCUMENT_NAMESPACE;
use crate::cache::record::CacheRecord;
use crate::config::CacheSettings;
use crate::error::{BackendResult, CacheError, Result};

/// 写确认超时
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// MongoDB 配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MongoConfig {
    /// 服务器地址
    pub host: String,
    /// 服务器端口
    pub port: u16,
    /// Unix 套接字路径，设置后忽略 host/port
    pub unix_socket: Option<String>,
    /// 用户名
    pub user: Option<String>,
    /// 密码
    pub pass: Option<String>,
    /// 数据库名
    pub dbname: String,
    /// 集合名
    pub collection: String,
}

impl MongoConfig {
    /// 从构造参数创建
    ///
    /// 显式提供空的 `dbname` 或 `collection` 时返回参数错误。
    pub fn from_settings(settings: &CacheSettings) -> Result<Self> {
        let dbname = Self::required("dbname", settings.dbname.as_ref(), "test")?;
        let collection = Self::required("collection", settings.collection.as_ref(), "cache_data")?;

        Ok(Self {
            host: CacheSettings::non_empty(settings.host.as_ref())
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: settings.port.unwrap_or(27017),
            unix_socket: CacheSettings::non_empty(settings.unix_socket.as_ref()),
            user: CacheSettings::non_empty(settings.user.as_ref()),
            pass: CacheSettings::non_empty(settings.pass.as_ref()),
            dbname,
            collection,
        })
    }

    fn required(field: &str, value: Option<&String>, default: &str) -> Result<String> {
        match value {
            None => Ok(default.to_string()),
            Some(value) => CacheSettings::non_empty(Some(value))
                .ok_or_else(|| crate::argument_error!("MongoDB 后端的 {} 不能为空", field)),
        }
    }

    /// 构建连接 URI
    #[must_use]
    pub fn build_uri(&self) -> String {
        let auth = match (&self.user, &self.pass) {
            (Some(user), Some(pass)) => format!(
                "{}:{}@",
                urlencoding::encode(user),
                urlencoding::encode(pass)
            ),
            _ => String::new(),
        };

        match &self.unix_socket {
            Some(socket) => format!("mongodb://{auth}{}", urlencoding::encode(socket)),
            None => format!("mongodb://{auth}{}:{}", self.host, self.port),
        }
    }
}

/// 缓存文档
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheDocument {
    #[serde(rename = "_id")]
    id: String,
    content: String,
    sc_cache: i32,
}

/// MongoDB 缓存后端
pub struct MongoAdapter {
    collection: Collection<CacheDocument>,
}

impl MongoAdapter {
    /// 连接 MongoDB 并确认服务器可达
    pub async fn new(config: MongoConfig) -> Result<Self> {
        info!(
            backend = "mongo",
            dbname = %config.dbname,
            collection = %config.collection,
            "正在连接 MongoDB"
        );

        let client = Client::with_uri_str(config.build_uri())
            .await
            .map_err(|e| CacheError::system_with_source("创建 MongoDB 客户端失败", e))?;

        let database = client.database(&config.dbname);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| CacheError::system_with_source("连接 MongoDB 失败", e))?;

        let write_concern = WriteConcern::builder()
            .w(Acknowledgment::Majority)
            .w_timeout(WRITE_TIMEOUT)
            .build();
        let options = CollectionOptions::builder()
            .write_concern(write_concern)
            .build();

        Ok(Self {
            collection: database.collection_with_options(&config.collection, options),
        })
    }
}

#[async_trait]
impl CacheAdapter for MongoAdapter {
    fn backend_type(&self) -> &'static str {
        "mongo"
    }

    async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>> {
        let found = self
            .collection
            .find_one(doc! { "_id": DOCUMENT_NAMESPACE.build(key) })
            .await?;

        Ok(found
            .map(|document| CacheRecord::decode(&document.content))
            .transpose()?)
    }

    async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()> {
        let document = CacheDocument {
            id: DOCUMENT_NAMESPACE.build(key),
            content: record.encode()?,
            sc_cache: 1,
        };

        self.collection
            .replace_one(doc! { "_id": document.id.as_str() }, &document)
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> BackendResult<()> {
        self.collection
            .delete_one(doc! { "_id": DOCUMENT_NAMESPACE.build(key) })
            .await?;
        Ok(())
    }

    async fn remove_all(&self) -> BackendResult<()> {
        self.collection.delete_many(doc! { "sc_cache": 1 }).await?;
        Ok(())
    }

    async fn exists(&self, key: &str) -> BackendResult<bool> {
        let count = self
            .collection
            .count_documents(doc! { "_id": DOCUMENT_NAMESPACE.build(key) })
            .await?;
        Ok(count > 0)
    }

    async fn records(&self) -> BackendResult<Vec<(String, CacheRecord)>> {
        let documents: Vec<CacheDocument> = self
            .collection
            .find(doc! { "sc_cache": 1 })
            .await?
            .try_collect()
            .await?;

        Ok(decode_documents(documents))
    }
}

/// 解码缓存文档，无法解析的文档记录警告后跳过
fn decode_documents(documents: Vec<CacheDocument>) -> Vec<(String, CacheRecord)> {
    let mut records = Vec::with_capacity(documents.len());
    for document in documents {
        let Some(key) = DOCUMENT_NAMESPACE.strip(&document.id) else {
            continue;
        };
        match CacheRecord::decode(&document.content) {
            Ok(record) => records.push((key.to_string(), record)),
            Err(e) => warn!(backend = "mongo", key, error = %e, "跳过无法解析的缓存文档"),
        }
    }
    records
}
