use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blood_batches")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub blood_bank_id: i64,
    pub blood_type: String,
    pub units: i32,
    pub expiry_date: chrono::NaiveDate,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::blood_banks::Entity",
        from = "Column::BloodBankId",
        to = "super::blood_banks::Column::Id",
        on_delete = "Cascade"
    )]
    BloodBank,
}

impl Related<super::blood_banks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BloodBank.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
