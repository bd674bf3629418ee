use sea_orm::entity::prelude::*;

/// Running unit total per (blood bank, blood type). Unique on that pair.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blood_inventory")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub blood_bank_id: i64,
    pub blood_type: String,
    pub units: i32,
    pub updated_at: chrono::DateTime<chrono::Utc>,
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
