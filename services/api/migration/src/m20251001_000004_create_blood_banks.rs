use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BloodBanks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BloodBanks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BloodBanks::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BloodBanks::Name).string().not_null())
                    .col(ColumnDef::new(BloodBanks::Address).string().not_null())
                    .col(ColumnDef::new(BloodBanks::City).string().not_null())
                    .col(ColumnDef::new(BloodBanks::Phone).string().not_null())
                    .col(ColumnDef::new(BloodBanks::Email).string().null())
                    .col(ColumnDef::new(BloodBanks::Latitude).double().null())
                    .col(ColumnDef::new(BloodBanks::Longitude).double().null())
                    .col(ColumnDef::new(BloodBanks::OperatingHours).string().null())
                    .col(
                        ColumnDef::new(BloodBanks::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BloodBanks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BloodBanks::Table, BloodBanks::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BloodBanks::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BloodBanks {
    Table,
    Id,
    UserId,
    Name,
    Address,
    City,
    Phone,
    Email,
    Latitude,
    Longitude,
    OperatingHours,
    Verified,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    UserId,
}
