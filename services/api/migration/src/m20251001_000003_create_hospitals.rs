use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Hospitals::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Hospitals::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Hospitals::UserId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Hospitals::Name).string().not_null())
                    .col(ColumnDef::new(Hospitals::Address).string().not_null())
                    .col(ColumnDef::new(Hospitals::City).string().not_null())
                    .col(ColumnDef::new(Hospitals::Phone).string().not_null())
                    .col(ColumnDef::new(Hospitals::Email).string().null())
                    .col(ColumnDef::new(Hospitals::Latitude).double().null())
                    .col(ColumnDef::new(Hospitals::Longitude).double().null())
                    .col(ColumnDef::new(Hospitals::EmergencyContact).string().null())
                    .col(
                        ColumnDef::new(Hospitals::Verified)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Hospitals::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(Hospitals::Table, Hospitals::UserId)
                            .to(Users::Table, Users::UserId)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Hospitals::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Hospitals {
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
    EmergencyContact,
    Verified,
    CreatedAt,
}

#[derive(Iden)]
enum Users {
    Table,
    UserId,
}
