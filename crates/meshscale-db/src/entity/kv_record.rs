//! kv record entity: one serialized value per (collection, key).

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// kv record database model.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "kv_records")]
pub struct Model {
    /// logical collection the record belongs to (e.g. "acls").
    #[sea_orm(primary_key, auto_increment = false)]
    pub collection: String,
    /// record key, unique within its collection.
    #[sea_orm(primary_key, auto_increment = false)]
    pub key: String,
    /// serialized record.
    #[sea_orm(column_type = "Text")]
    pub payload: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
