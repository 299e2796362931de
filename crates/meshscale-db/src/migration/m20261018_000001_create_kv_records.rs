//! create kv_records table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(KvRecords::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(KvRecords::Collection).string().not_null())
                    .col(ColumnDef::new(KvRecords::Key).string().not_null())
                    .col(ColumnDef::new(KvRecords::Payload).text().not_null())
                    .col(
                        ColumnDef::new(KvRecords::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .primary_key(
                        Index::create()
                            .name("pk_kv_records")
                            .col(KvRecords::Collection)
                            .col(KvRecords::Key),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(KvRecords::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
pub enum KvRecords {
    #[sea_orm(iden = "kv_records")]
    Table,
    Collection,
    Key,
    Payload,
    UpdatedAt,
}
