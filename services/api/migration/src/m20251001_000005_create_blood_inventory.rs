use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BloodInventory::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BloodInventory::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BloodInventory::BloodBankId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BloodInventory::BloodType)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BloodInventory::Units)
                            .integer()
                            .not_null()
                            .default(0)
                            .check(Expr::col(BloodInventory::Units).gte(0)),
                    )
                    .col(
                        ColumnDef::new(BloodInventory::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BloodInventory::Table, BloodInventory::BloodBankId)
                            .to(BloodBanks::Table, BloodBanks::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Conflict target for the inventory upserts.
        manager
            .create_index(
                Index::create()
                    .table(BloodInventory::Table)
                    .col(BloodInventory::BloodBankId)
                    .col(BloodInventory::BloodType)
                    .unique()
                    .name("uq_blood_inventory_bank_type")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BloodInventory::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BloodInventory {
    Table,
    Id,
    BloodBankId,
    BloodType,
    Units,
    UpdatedAt,
}

#[derive(Iden)]
enum BloodBanks {
    Table,
    Id,
}
