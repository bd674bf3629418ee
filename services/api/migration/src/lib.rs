use sea_orm_migration::prelude::*;

mod m20251001_000001_create_users;
mod m20251001_000002_create_donors;
mod m20251001_000003_create_hospitals;
mod m20251001_000004_create_blood_banks;
mod m20251001_000005_create_blood_inventory;
mod m20251001_000006_create_blood_batches;
mod m20251001_000007_create_blood_requests;
mod m20251001_000008_add_lookup_indexes;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251001_000001_create_users::Migration),
            Box::new(m20251001_000002_create_donors::Migration),
            Box::new(m20251001_000003_create_hospitals::Migration),
            Box::new(m20251001_000004_create_blood_banks::Migration),
            Box::new(m20251001_000005_create_blood_inventory::Migration),
            Box::new(m20251001_000006_create_blood_batches::Migration),
            Box::new(m20251001_000007_create_blood_requests::Migration),
            Box::new(m20251001_000008_add_lookup_indexes::Migration),
        ]
    }
}
