use sea_orm::entity::prelude::*;

/// Local mirror of an identity-provider account.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Identity-provider user id (`sub` claim).
    #[sea_orm(unique)]
    pub user_id: Uuid,
    pub email: String,
    pub role: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::donors::Entity")]
    Donor,
    #[sea_orm(has_one = "super::hospitals::Entity")]
    Hospital,
    #[sea_orm(has_one = "super::blood_banks::Entity")]
    BloodBank,
}

impl Related<super::donors::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Donor.def()
    }
}

impl Related<super::hospitals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Hospital.def()
    }
}

impl Related<super::blood_banks::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BloodBank.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
