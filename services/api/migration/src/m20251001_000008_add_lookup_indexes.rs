use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .table(BloodRequests::Table)
                    .col(BloodRequests::HospitalId)
                    .name("idx_blood_requests_hospital_id")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(BloodRequests::Table)
                    .col(BloodRequests::Status)
                    .col(BloodRequests::CreatedAt)
                    .name("idx_blood_requests_status_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .create_index(
                Index::create()
                    .table(Donors::Table)
                    .col(Donors::BloodType)
                    .name("idx_donors_blood_type")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_donors_blood_type").to_owned())
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_blood_requests_status_created_at")
                    .to_owned(),
            )
            .await?;
        manager
            .drop_index(
                Index::drop()
                    .name("idx_blood_requests_hospital_id")
                    .to_owned(),
            )
            .await
    }
}

#[derive(Iden)]
enum BloodRequests {
    Table,
    HospitalId,
    Status,
    CreatedAt,
}

#[derive(Iden)]
enum Donors {
    Table,
    BloodType,
}
