use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Donors::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Donors::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Donors::UserId).uuid().not_null().unique_key())
                    .col(ColumnDef::new(Donors::Name).string().not_null())
                    .col(ColumnDef::new(Donors::BloodType).string_len(3).not_null())
                    .col(ColumnDef::new(Donors::Phone).string().not_null())
                    .col(ColumnDef::new(Donors::Email).string().null())
                    .col(ColumnDef::new(Donors::City).string().not_null())
                    .col(ColumnDef::new(Donors::Address).string().null())
                    .col(
                        ColumnDef::new(Donors::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(ColumnDef::new(Donors::Latitude).double().null())
                    .col(ColumnDef::new(Donors::Longitude).double().null())
                    .col(ColumnDef::new(Donors::LastDonation).date().null())
                    .col(
                        ColumnDef::new(Donors::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Donors::Table, Donors::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Donors::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Donors {
    Table,
    Id,
    UserId,
    Name,
    BloodType,
    Phone,
    Email,
    City,
    Address,
    Available,
    Latitude,
    Longitude,
    LastDonation,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    UserId,
}
