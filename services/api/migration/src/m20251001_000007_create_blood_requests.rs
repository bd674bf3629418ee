use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BloodRequests::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BloodRequests::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BloodRequests::HospitalId).big_integer().null())
                    .col(ColumnDef::new(BloodRequests::HospitalName).string().null())
                    .col(ColumnDef::new(BloodRequests::PatientName).string().null())
                    .col(ColumnDef::new(BloodRequests::Age).integer().null())
                    .col(ColumnDef::new(BloodRequests::Gender).string().null())
                    .col(
                        ColumnDef::new(BloodRequests::BloodType)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(ColumnDef::new(BloodRequests::Units).integer().not_null())
                    .col(
                        ColumnDef::new(BloodRequests::ComponentType)
                            .string()
                            .not_null()
                            .default("Whole Blood"),
                    )
                    .col(
                        ColumnDef::new(BloodRequests::Urgency)
                            .string()
                            .not_null()
                            .default("normal"),
                    )
                    .col(
                        ColumnDef::new(BloodRequests::IsCritical)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(BloodRequests::Diagnosis).text().null())
                    .col(ColumnDef::new(BloodRequests::Allergies).text().null())
                    .col(ColumnDef::new(BloodRequests::DoctorName).string().null())
                    .col(
                        ColumnDef::new(BloodRequests::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(BloodRequests::ContactPhone).string().null())
                    .col(ColumnDef::new(BloodRequests::Notes).text().null())
                    .col(ColumnDef::new(BloodRequests::DonorId).big_integer().null())
                    .col(
                        ColumnDef::new(BloodRequests::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(BloodRequests::FulfilledAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BloodRequests::Table, BloodRequests::HospitalId)
                            .to(Hospitals::Table, Hospitals::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(BloodRequests::Table, BloodRequests::DonorId)
                            .to(Donors::Table, Donors::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BloodRequests::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum BloodRequests {
    Table,
    Id,
    HospitalId,
    HospitalName,
    PatientName,
    Age,
    Gender,
    BloodType,
    Units,
    ComponentType,
    Urgency,
    IsCritical,
    Diagnosis,
    Allergies,
    DoctorName,
    Status,
    ContactPhone,
    Notes,
    DonorId,
    CreatedAt,
    FulfilledAt,
}

#[derive(Iden)]
enum Hospitals {
    Table,
    Id,
}

#[derive(Iden)]
enum Donors {
    Table,
    Id,
}
