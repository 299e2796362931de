//! database layer for meshscale.
//!
//! meshscale persists everything as serialized records in named
//! collections of a schemaless key-value table. the store offers
//! per-key get/put/delete, an unordered full scan of a collection and a
//! compare-and-swap primitive; there are no secondary indexes.

#![warn(missing_docs)]

mod entity;
mod error;
mod migration;

pub use error::Error;

use std::fmt;
use std::future::Future;

use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, Database as SeaOrmDatabase, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use sea_orm_migration::MigratorTrait;

use meshscale_types::DatabaseConfig;

/// result type for database operations.
pub type Result<T> = std::result::Result<T, Error>;

/// a named logical collection inside the key-value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Collection(&'static str);

impl Collection {
    /// access-control policies, for every network.
    pub const ACLS: Collection = Collection("acls");

    /// create a collection handle.
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    /// the collection name as stored.
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// key-value storage operations used by meshscale.
///
/// every method is a single round-trip to the backend: there is no caching,
/// no snapshot isolation and no locking across calls. a scan may observe a
/// record mid-creation or miss one deleted concurrently.
pub trait KvStore: Send + Sync {
    /// ping the backend to verify connectivity.
    fn ping(&self) -> impl Future<Output = Result<()>> + Send;

    /// insert or overwrite the value under `key`.
    fn put(
        &self,
        collection: Collection,
        key: &str,
        value: &str,
    ) -> impl Future<Output = Result<()>> + Send;

    /// fetch the value under `key`. fails with [`Error::NotFound`] if absent.
    fn get(&self, collection: Collection, key: &str) -> impl Future<Output = Result<String>> + Send;

    /// remove the value under `key`. fails with [`Error::NotFound`] if absent.
    fn delete(&self, collection: Collection, key: &str) -> impl Future<Output = Result<()>> + Send;

    /// every value in the collection, in no particular order.
    ///
    /// an empty collection yields an empty vec, not an error.
    fn scan_all(&self, collection: Collection) -> impl Future<Output = Result<Vec<String>>> + Send;

    /// replace the value under `key` only if it still equals `expected`.
    ///
    /// fails with [`Error::Conflict`] if the stored value differs and
    /// [`Error::NotFound`] if the key is absent.
    fn compare_and_swap(
        &self,
        collection: Collection,
        key: &str,
        expected: &str,
        value: &str,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// the main database implementation using sea-orm.
#[derive(Clone)]
pub struct MeshscaleDb {
    conn: DatabaseConnection,
}

impl MeshscaleDb {
    /// create a new database connection from config and run migrations.
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let url = Self::build_connection_url(config)?;
        let conn: DatabaseConnection = SeaOrmDatabase::connect(&url)
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };

        if config.db_type == "sqlite" && config.sqlite.write_ahead_log {
            db.enable_wal_mode().await?;
        }

        db.migrate().await?;
        Ok(db)
    }

    /// create an in-memory sqlite database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let conn: DatabaseConnection = SeaOrmDatabase::connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;

        let db = Self { conn };
        db.migrate().await?;
        Ok(db)
    }

    /// run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        migration::Migrator::up(&self.conn, None)
            .await
            .map_err(|e| Error::Migration(e.to_string()))?;
        Ok(())
    }

    /// enable write-ahead logging mode for sqlite.
    async fn enable_wal_mode(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("PRAGMA journal_mode=WAL")
            .await
            .map_err(|e| Error::Connection(format!("failed to enable WAL mode: {}", e)))?;
        tracing::info!("sqlite WAL mode enabled");
        Ok(())
    }

    /// build a sea-orm compatible connection url from config.
    fn build_connection_url(config: &DatabaseConfig) -> Result<String> {
        match config.db_type.as_str() {
            "sqlite" => {
                let path = if config.connection_string.starts_with("sqlite:") {
                    config.connection_string.clone()
                } else {
                    format!("sqlite:{}", config.connection_string)
                };
                // ?mode=rwc creates the file if it doesn't exist
                if path.contains('?') {
                    Ok(path)
                } else {
                    Ok(format!("{}?mode=rwc", path))
                }
            }
            "postgres" | "postgresql" => Ok(config.connection_string.clone()),
            other => Err(Error::InvalidData(format!(
                "unsupported database type: {}",
                other
            ))),
        }
    }
}

use entity::kv_record;

impl KvStore for MeshscaleDb {
    async fn ping(&self) -> Result<()> {
        use sea_orm::ConnectionTrait;
        self.conn
            .execute_unprepared("SELECT 1")
            .await
            .map_err(|e| Error::Connection(e.to_string()))?;
        Ok(())
    }

    async fn put(&self, collection: Collection, key: &str, value: &str) -> Result<()> {
        let model = kv_record::ActiveModel {
            collection: Set(collection.as_str().to_string()),
            key: Set(key.to_string()),
            payload: Set(value.to_string()),
            updated_at: Set(Utc::now()),
        };
        kv_record::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([kv_record::Column::Collection, kv_record::Column::Key])
                    .update_columns([kv_record::Column::Payload, kv_record::Column::UpdatedAt])
                    .to_owned(),
            )
            .exec(&self.conn)
            .await?;
        Ok(())
    }

    async fn get(&self, collection: Collection, key: &str) -> Result<String> {
        kv_record::Entity::find_by_id((collection.as_str().to_string(), key.to_string()))
            .one(&self.conn)
            .await?
            .map(|record| record.payload)
            .ok_or_else(|| Error::NotFound(format!("{}/{}", collection, key)))
    }

    async fn delete(&self, collection: Collection, key: &str) -> Result<()> {
        let result = kv_record::Entity::delete_many()
            .filter(kv_record::Column::Collection.eq(collection.as_str()))
            .filter(kv_record::Column::Key.eq(key))
            .exec(&self.conn)
            .await?;
        if result.rows_affected == 0 {
            return Err(Error::NotFound(format!("{}/{}", collection, key)));
        }
        Ok(())
    }

    async fn scan_all(&self, collection: Collection) -> Result<Vec<String>> {
        let records = kv_record::Entity::find()
            .filter(kv_record::Column::Collection.eq(collection.as_str()))
            .all(&self.conn)
            .await?;
        Ok(records.into_iter().map(|record| record.payload).collect())
    }

    async fn compare_and_swap(
        &self,
        collection: Collection,
        key: &str,
        expected: &str,
        value: &str,
    ) -> Result<()> {
        let result = kv_record::Entity::update_many()
            .col_expr(kv_record::Column::Payload, Expr::value(value))
            .col_expr(kv_record::Column::UpdatedAt, Expr::value(Utc::now()))
            .filter(kv_record::Column::Collection.eq(collection.as_str()))
            .filter(kv_record::Column::Key.eq(key))
            .filter(kv_record::Column::Payload.eq(expected))
            .exec(&self.conn)
            .await?;
        if result.rows_affected == 1 {
            return Ok(());
        }

        // distinguish a lost race from a vanished record
        self.get(collection, key).await?;
        Err(Error::Conflict(format!("{}/{}", collection, key)))
    }
}
