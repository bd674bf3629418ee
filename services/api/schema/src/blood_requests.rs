use sea_orm::entity::prelude::*;

/// Emergency blood request raised by a hospital.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "blood_requests")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub hospital_id: Option<i64>,
    pub hospital_name: Option<String>,
    pub patient_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_type: String,
    pub units: i32,
    pub component_type: String,
    pub urgency: String,
    pub is_critical: bool,
    pub diagnosis: Option<String>,
    pub allergies: Option<String>,
    pub doctor_name: Option<String>,
    pub status: String,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub donor_id: Option<i64>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub fulfilled_at: Option<chrono::DateTime<chrono::Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::hospitals::Entity",
        from = "Column::HospitalId",
        to = "super::hospitals::Column::Id",
        on_delete = "SetNull"
    )]
    Hospital,
}

impl Related<super::hospitals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hospital.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
