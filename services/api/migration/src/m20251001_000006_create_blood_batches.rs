use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BloodBatches::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BloodBatches::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BloodBatches::BloodBankId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BloodBatches::BloodType)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BloodBatches::Units)
                            .integer()
                            .not_null()
                            .check(Expr::col(BloodBatches::Units).gt(0)),
                    )
                    .col(ColumnDef::new(BloodBatches::ExpiryDate).date().not_null())
                    .col(
                        ColumnDef::new(BloodBatches::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BloodBatches::Table, BloodBatches::BloodBankId)
                            .to(BloodBanks::Table, BloodBanks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(BloodBatches::Table)
                    .col(BloodBatches::BloodBankId)
                    .name("idx_blood_batches_blood_bank_id")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BloodBatches::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BloodBatches {
    Table,
    Id,
    BloodBankId,
    BloodType,
    Units,
    ExpiryDate,
    CreatedAt,
}

#[derive(Iden)]
enum BloodBanks {
    Table,
    Id,
}
