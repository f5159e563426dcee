//! # SQL 存储公共实现
//!
//! SQLite 和 MySQL 共用同一张 `(cache_key, cache_value)` 表，语句由
//! sea-query 按连接的方言生成。

use sea_orm::sea_query::{Alias, ColumnDef, Expr, OnConflict, Query, Table};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, DeriveIden};
use tracing::warn;

use crate::cache::record::CacheRecord;
use crate::cache::validate::assert_identifier;
use crate::error::{BackendResult, Result};

/// 默认缓存表名
pub const DEFAULT_TABLE: &str = "cache_data";

/// 缓存键最大长度
const KEY_LENGTH: u32 = 40;

#[derive(DeriveIden)]
enum CacheData {
    CacheKey,
    CacheValue,
}

/// 表引擎相关的建表差异
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TableFlavor {
    /// 普通 `TEXT` 列
    Plain,
    /// `LONGTEXT` 列，InnoDB 引擎，指定字符集
    InnoDb,
}

/// 基于数据库连接的记录存储
pub(crate) struct SqlStore {
    db: DatabaseConnection,
    table: String,
    flavor: TableFlavor,
    charset: Option<String>,
}

impl SqlStore {
    /// 创建存储，表名必须是普通标识符
    pub(crate) fn new(
        db: DatabaseConnection,
        table: impl Into<String>,
        flavor: TableFlavor,
        charset: Option<String>,
    ) -> Result<Self> {
        let table = table.into();
        assert_identifier("table", &table)?;

        Ok(Self {
            db,
            table,
            flavor,
            charset,
        })
    }

    fn table(&self) -> Alias {
        Alias::new(self.table.as_str())
    }

    fn backend(&self) -> DbBackend {
        self.db.get_database_backend()
    }

    pub(crate) async fn fetch(&self, key: &str) -> BackendResult<Option<CacheRecord>> {
        let select = Query::select()
            .column(CacheData::CacheValue)
            .from(self.table())
            .and_where(Expr::col(CacheData::CacheKey).eq(key))
            .to_owned();

        let Some(row) = self.db.query_one(self.backend().build(&select)).await? else {
            return Ok(None);
        };

        let content: String = row.try_get("", "cache_value")?;
        Ok(Some(CacheRecord::decode(&content)?))
    }

    pub(crate) async fn store(&self, key: &str, record: &CacheRecord) -> BackendResult<()> {
        let insert = Query::insert()
            .into_table(self.table())
            .columns([CacheData::CacheKey, CacheData::CacheValue])
            .values([key.into(), record.encode()?.into()])?
            .on_conflict(
                OnConflict::column(CacheData::CacheKey)
                    .update_column(CacheData::CacheValue)
                    .to_owned(),
            )
            .to_owned();

        self.db.execute(self.backend().build(&insert)).await?;
        Ok(())
    }

    pub(crate) async fn remove(&self, key: &str) -> BackendResult<()> {
        let delete = Query::delete()
            .from_table(self.table())
            .and_where(Expr::col(CacheData::CacheKey).eq(key))
            .to_owned();

        self.db.execute(self.backend().build(&delete)).await?;
        Ok(())
    }

    pub(crate) async fn remove_all(&self) -> BackendResult<()> {
        let delete = Query::delete().from_table(self.table()).to_owned();

        self.db.execute(self.backend().build(&delete)).await?;
        Ok(())
    }

    pub(crate) async fn exists(&self, key: &str) -> BackendResult<bool> {
        let select = Query::select()
            .column(CacheData::CacheKey)
            .from(self.table())
            .and_where(Expr::col(CacheData::CacheKey).eq(key))
            .limit(1)
            .to_owned();

        Ok(self
            .db
            .query_one(self.backend().build(&select))
            .await?
            .is_some())
    }

    pub(crate) async fn records(&self) -> BackendResult<Vec<(String, CacheRecord)>> {
        let select = Query::select()
            .columns([CacheData::CacheKey, CacheData::CacheValue])
            .from(self.table())
            .to_owned();

        let rows = self.db.query_all(self.backend().build(&select)).await?;
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let key: String = row.try_get("", "cache_key")?;
            let content: String = row.try_get("", "cache_value")?;

            match CacheRecord::decode(&content) {
                Ok(record) => records.push((key, record)),
                Err(e) => warn!(table = %self.table, key, error = %e, "跳过无法解析的缓存行"),
            }
        }

        Ok(records)
    }

    /// 幂等建表
    pub(crate) async fn create_table(&self) -> BackendResult<()> {
        let mut value_column = ColumnDef::new(CacheData::CacheValue);
        match self.flavor {
            TableFlavor::Plain => value_column.text(),
            TableFlavor::InnoDb => value_column.custom(Alias::new("LONGTEXT")),
        };

        let mut create = Table::create();
        create
            .table(self.table())
            .if_not_exists()
            .col(
                ColumnDef::new(CacheData::CacheKey)
                    .string_len(KEY_LENGTH)
                    .not_null()
                    .primary_key(),
            )
            .col(value_column.not_null());

        if self.flavor == TableFlavor::InnoDb {
            create.engine("InnoDB");
            if let Some(charset) = &self.charset {
                create.character_set(charset.as_str());
            }
        }

        self.db.execute(self.backend().build(&create)).await?;
        Ok(())
    }
}
