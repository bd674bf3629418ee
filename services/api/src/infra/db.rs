use std::sync::Arc;

use anyhow::Context as _;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ActiveValue::Unchanged, ColumnTrait, DatabaseConnection,
    DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, SqlErr,
    TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use uuid::Uuid;

use beos_api_schema::{
    blood_banks, blood_batches, blood_inventory, blood_requests, donors, hospitals, users,
};
use beos_core::sea_ext::contains_ignore_case;
use beos_domain::blood::BloodType;
use beos_domain::request::{RequestStatus, UrgencyLevel};
use beos_domain::user::UserRole;

use crate::domain::repository::{
    BloodBankRepository, BloodRequestRepository, DonorRepository, HospitalRepository,
    InventoryRepository, StatsRepository, UserRepository,
};
use crate::domain::types::{
    BloodBank, BloodBankFilter, BloodBankPatch, BloodBankProfile, BloodBatch, BloodRequest,
    DEFAULT_COMPONENT_TYPE, Donor, DonorFilter, DonorPatch, DonorProfile, Hospital,
    HospitalFilter, HospitalPatch, HospitalProfile, InventoryItem, NewBloodBatch,
    NewBloodRequest, NewUser, PlatformStats, RequestDetails, RequestFilter, StockQuery, User,
};
use crate::error::ApiError;

/// Map an insert failure: unique violations become `on_duplicate`, anything
/// unclassified is internal.
fn insert_error(err: DbErr, on_duplicate: ApiError, what: &'static str) -> ApiError {
    classify_insert(err.sql_err(), on_duplicate)
        .unwrap_or_else(|| ApiError::Internal(anyhow::Error::new(err).context(what)))
}

fn classify_insert(sql_err: Option<SqlErr>, on_duplicate: ApiError) -> Option<ApiError> {
    match sql_err? {
        SqlErr::UniqueConstraintViolation(_) => Some(on_duplicate),
        // Profile rows reference `users.user_id`; the row is gone after an admin delete.
        SqlErr::ForeignKeyConstraintViolation(_) => Some(ApiError::UserNotFound),
        _ => None,
    }
}

/// Map an update failure: a vanished row becomes `not_found`.
fn update_error(err: DbErr, not_found: ApiError, what: &'static str) -> ApiError {
    match err {
        DbErr::RecordNotUpdated => not_found,
        other => ApiError::Internal(anyhow::Error::new(other).context(what)),
    }
}

// ── User repository ──────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: Arc<DatabaseConnection>,
}

impl UserRepository for DbUserRepository {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<User>, ApiError> {
        let model = users::Entity::find()
            .filter(users::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await
            .context("find user by auth id")?;
        model.map(user_from_model).transpose()
    }

    async fn create(&self, user: &NewUser) -> Result<User, ApiError> {
        let am = users::ActiveModel {
            user_id: Set(user.user_id),
            email: Set(user.email.clone()),
            role: Set(user.role.as_str().to_owned()),
            created_at: Set(Utc::now()),
            ..Default::default()
        };
        users::Entity::insert(am)
            .on_conflict(
                OnConflict::column(users::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&*self.db)
            .await
            .context("insert user")?;
        self.find_by_user_id(user.user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user row missing after insert").into())
    }

    async fn list(&self) -> Result<Vec<User>, ApiError> {
        users::Entity::find()
            .order_by_desc(users::Column::CreatedAt)
            .all(&*self.db)
            .await
            .context("list users")?
            .into_iter()
            .map(user_from_model)
            .collect()
    }

    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<bool, ApiError> {
        let result = users::Entity::delete_many()
            .filter(users::Column::UserId.eq(user_id))
            .exec(&*self.db)
            .await
            .context("delete user")?;
        Ok(result.rows_affected > 0)
    }
}

fn user_from_model(model: users::Model) -> Result<User, ApiError> {
    Ok(User {
        id: model.id,
        user_id: model.user_id,
        email: model.email,
        role: model
            .role
            .parse::<UserRole>()
            .context("stored user role")?,
        created_at: model.created_at,
    })
}

// ── Donor repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbDonorRepository {
    pub db: Arc<DatabaseConnection>,
}

impl DonorRepository for DbDonorRepository {
    async fn list(&self, filter: &DonorFilter) -> Result<Vec<Donor>, ApiError> {
        let query = donors::Entity::find()
            .apply_if(filter.city.as_deref(), |q, city| {
                q.filter(contains_ignore_case(donors::Column::City, city))
            })
            .apply_if(filter.blood_type, |q, blood_type| {
                q.filter(donors::Column::BloodType.eq(blood_type.as_str()))
            })
            .apply_if(filter.available, |q, available| {
                q.filter(donors::Column::Available.eq(available))
            })
            .order_by_desc(donors::Column::CreatedAt);
        query
            .all(&*self.db)
            .await
            .context("list donors")?
            .into_iter()
            .map(donor_from_model)
            .collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Donor>, ApiError> {
        let model = donors::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .context("find donor by id")?;
        model.map(donor_from_model).transpose()
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Donor>, ApiError> {
        let model = donors::Entity::find()
            .filter(donors::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await
            .context("find donor by user id")?;
        model.map(donor_from_model).transpose()
    }

    async fn create(&self, user_id: Uuid, profile: &DonorProfile) -> Result<Donor, ApiError> {
        let model = donors::ActiveModel {
            user_id: Set(user_id),
            name: Set(profile.name.clone()),
            blood_type: Set(profile.blood_type.as_str().to_owned()),
            phone: Set(profile.phone.clone()),
            email: Set(profile.email.clone()),
            city: Set(profile.city.clone()),
            address: Set(profile.address.clone()),
            available: Set(profile.available),
            latitude: Set(profile.latitude),
            longitude: Set(profile.longitude),
            last_donation: Set(profile.last_donation),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| insert_error(e, ApiError::DonorProfileExists, "create donor"))?;
        donor_from_model(model)
    }

    async fn update(&self, id: i64, patch: &DonorPatch) -> Result<Donor, ApiError> {
        let mut am = donors::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        if let Some(ref name) = patch.name {
            am.name = Set(name.clone());
        }
        if let Some(blood_type) = patch.blood_type {
            am.blood_type = Set(blood_type.as_str().to_owned());
        }
        if let Some(ref phone) = patch.phone {
            am.phone = Set(phone.clone());
        }
        if let Some(ref email) = patch.email {
            am.email = Set(Some(email.clone()));
        }
        if let Some(ref city) = patch.city {
            am.city = Set(city.clone());
        }
        if let Some(ref address) = patch.address {
            am.address = Set(Some(address.clone()));
        }
        if let Some(available) = patch.available {
            am.available = Set(available);
        }
        if let Some(latitude) = patch.latitude {
            am.latitude = Set(Some(latitude));
        }
        if let Some(longitude) = patch.longitude {
            am.longitude = Set(Some(longitude));
        }
        if let Some(last_donation) = patch.last_donation {
            am.last_donation = Set(Some(last_donation));
        }
        if !am.is_changed() {
            return self.find_by_id(id).await?.ok_or(ApiError::DonorNotFound);
        }
        let model = am
            .update(&*self.db)
            .await
            .map_err(|e| update_error(e, ApiError::DonorNotFound, "update donor"))?;
        donor_from_model(model)
    }
}

fn donor_from_model(model: donors::Model) -> Result<Donor, ApiError> {
    Ok(Donor {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        blood_type: model
            .blood_type
            .parse::<BloodType>()
            .context("stored donor blood type")?,
        phone: model.phone,
        email: model.email,
        city: model.city,
        address: model.address,
        available: model.available,
        latitude: model.latitude,
        longitude: model.longitude,
        last_donation: model.last_donation,
        created_at: model.created_at,
    })
}

// ── Hospital repository ──────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbHospitalRepository {
    pub db: Arc<DatabaseConnection>,
}

impl HospitalRepository for DbHospitalRepository {
    async fn list(&self, filter: &HospitalFilter) -> Result<Vec<Hospital>, ApiError> {
        let models = hospitals::Entity::find()
            .apply_if(filter.city.as_deref(), |q, city| {
                q.filter(contains_ignore_case(hospitals::Column::City, city))
            })
            .apply_if(filter.verified, |q, verified| {
                q.filter(hospitals::Column::Verified.eq(verified))
            })
            .order_by_asc(hospitals::Column::Name)
            .all(&*self.db)
            .await
            .context("list hospitals")?;
        Ok(models.into_iter().map(hospital_from_model).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Hospital>, ApiError> {
        let model = hospitals::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .context("find hospital by id")?;
        Ok(model.map(hospital_from_model))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Hospital>, ApiError> {
        let model = hospitals::Entity::find()
            .filter(hospitals::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await
            .context("find hospital by user id")?;
        Ok(model.map(hospital_from_model))
    }

    async fn create(
        &self,
        user_id: Uuid,
        profile: &HospitalProfile,
    ) -> Result<Hospital, ApiError> {
        let model = hospitals::ActiveModel {
            user_id: Set(user_id),
            name: Set(profile.name.clone()),
            address: Set(profile.address.clone()),
            city: Set(profile.city.clone()),
            phone: Set(profile.phone.clone()),
            email: Set(profile.email.clone()),
            latitude: Set(profile.latitude),
            longitude: Set(profile.longitude),
            emergency_contact: Set(profile.emergency_contact.clone()),
            verified: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| insert_error(e, ApiError::HospitalProfileExists, "create hospital"))?;
        Ok(hospital_from_model(model))
    }

    async fn update(&self, id: i64, patch: &HospitalPatch) -> Result<Hospital, ApiError> {
        let mut am = hospitals::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        if let Some(ref name) = patch.name {
            am.name = Set(name.clone());
        }
        if let Some(ref address) = patch.address {
            am.address = Set(address.clone());
        }
        if let Some(ref city) = patch.city {
            am.city = Set(city.clone());
        }
        if let Some(ref phone) = patch.phone {
            am.phone = Set(phone.clone());
        }
        if let Some(ref email) = patch.email {
            am.email = Set(Some(email.clone()));
        }
        if let Some(latitude) = patch.latitude {
            am.latitude = Set(Some(latitude));
        }
        if let Some(longitude) = patch.longitude {
            am.longitude = Set(Some(longitude));
        }
        if let Some(ref contact) = patch.emergency_contact {
            am.emergency_contact = Set(Some(contact.clone()));
        }
        if !am.is_changed() {
            return self.find_by_id(id).await?.ok_or(ApiError::HospitalNotFound);
        }
        let model = am
            .update(&*self.db)
            .await
            .map_err(|e| update_error(e, ApiError::HospitalNotFound, "update hospital"))?;
        Ok(hospital_from_model(model))
    }

    async fn set_verified(&self, id: i64, verified: bool) -> Result<Option<Hospital>, ApiError> {
        let am = hospitals::ActiveModel {
            id: Unchanged(id),
            verified: Set(verified),
            ..Default::default()
        };
        match am.update(&*self.db).await {
            Ok(model) => Ok(Some(hospital_from_model(model))),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("set hospital verified").into()),
        }
    }
}

fn hospital_from_model(model: hospitals::Model) -> Hospital {
    Hospital {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        address: model.address,
        city: model.city,
        phone: model.phone,
        email: model.email,
        latitude: model.latitude,
        longitude: model.longitude,
        emergency_contact: model.emergency_contact,
        verified: model.verified,
        created_at: model.created_at,
    }
}

// ── Blood bank repository ────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbBloodBankRepository {
    pub db: Arc<DatabaseConnection>,
}

impl BloodBankRepository for DbBloodBankRepository {
    async fn list(&self, filter: &BloodBankFilter) -> Result<Vec<BloodBank>, ApiError> {
        let models = blood_banks::Entity::find()
            .apply_if(filter.city.as_deref(), |q, city| {
                q.filter(contains_ignore_case(blood_banks::Column::City, city))
            })
            .apply_if(filter.verified, |q, verified| {
                q.filter(blood_banks::Column::Verified.eq(verified))
            })
            .order_by_asc(blood_banks::Column::Name)
            .all(&*self.db)
            .await
            .context("list blood banks")?;
        Ok(models.into_iter().map(blood_bank_from_model).collect())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BloodBank>, ApiError> {
        let model = blood_banks::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .context("find blood bank by id")?;
        Ok(model.map(blood_bank_from_model))
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<BloodBank>, ApiError> {
        let model = blood_banks::Entity::find()
            .filter(blood_banks::Column::UserId.eq(user_id))
            .one(&*self.db)
            .await
            .context("find blood bank by user id")?;
        Ok(model.map(blood_bank_from_model))
    }

    async fn find_with_stock(&self, query: &StockQuery) -> Result<Vec<BloodBank>, ApiError> {
        let stocked = blood_inventory::Entity::find()
            .select_only()
            .column(blood_inventory::Column::BloodBankId)
            .filter(blood_inventory::Column::BloodType.eq(query.blood_type.as_str()))
            .filter(blood_inventory::Column::Units.gte(query.min_units))
            .into_query();
        let models = blood_banks::Entity::find()
            .filter(blood_banks::Column::Id.in_subquery(stocked))
            .apply_if(query.city.as_deref(), |q, city| {
                q.filter(contains_ignore_case(blood_banks::Column::City, city))
            })
            .order_by_asc(blood_banks::Column::Name)
            .all(&*self.db)
            .await
            .context("search blood banks by stock")?;
        Ok(models.into_iter().map(blood_bank_from_model).collect())
    }

    async fn create(
        &self,
        user_id: Uuid,
        profile: &BloodBankProfile,
    ) -> Result<BloodBank, ApiError> {
        let model = blood_banks::ActiveModel {
            user_id: Set(user_id),
            name: Set(profile.name.clone()),
            address: Set(profile.address.clone()),
            city: Set(profile.city.clone()),
            phone: Set(profile.phone.clone()),
            email: Set(profile.email.clone()),
            latitude: Set(profile.latitude),
            longitude: Set(profile.longitude),
            operating_hours: Set(profile.operating_hours.clone()),
            verified: Set(false),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .map_err(|e| insert_error(e, ApiError::BloodBankProfileExists, "create blood bank"))?;
        Ok(blood_bank_from_model(model))
    }

    async fn update(&self, id: i64, patch: &BloodBankPatch) -> Result<BloodBank, ApiError> {
        let mut am = blood_banks::ActiveModel {
            id: Unchanged(id),
            ..Default::default()
        };
        if let Some(ref name) = patch.name {
            am.name = Set(name.clone());
        }
        if let Some(ref address) = patch.address {
            am.address = Set(address.clone());
        }
        if let Some(ref city) = patch.city {
            am.city = Set(city.clone());
        }
        if let Some(ref phone) = patch.phone {
            am.phone = Set(phone.clone());
        }
        if let Some(ref email) = patch.email {
            am.email = Set(Some(email.clone()));
        }
        if let Some(latitude) = patch.latitude {
            am.latitude = Set(Some(latitude));
        }
        if let Some(longitude) = patch.longitude {
            am.longitude = Set(Some(longitude));
        }
        if let Some(ref hours) = patch.operating_hours {
            am.operating_hours = Set(Some(hours.clone()));
        }
        if !am.is_changed() {
            return self.find_by_id(id).await?.ok_or(ApiError::BloodBankNotFound);
        }
        let model = am
            .update(&*self.db)
            .await
            .map_err(|e| update_error(e, ApiError::BloodBankNotFound, "update blood bank"))?;
        Ok(blood_bank_from_model(model))
    }

    async fn set_verified(
        &self,
        id: i64,
        verified: bool,
    ) -> Result<Option<BloodBank>, ApiError> {
        let am = blood_banks::ActiveModel {
            id: Unchanged(id),
            verified: Set(verified),
            ..Default::default()
        };
        match am.update(&*self.db).await {
            Ok(model) => Ok(Some(blood_bank_from_model(model))),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e).context("set blood bank verified").into()),
        }
    }
}

fn blood_bank_from_model(model: blood_banks::Model) -> BloodBank {
    BloodBank {
        id: model.id,
        user_id: model.user_id,
        name: model.name,
        address: model.address,
        city: model.city,
        phone: model.phone,
        email: model.email,
        latitude: model.latitude,
        longitude: model.longitude,
        operating_hours: model.operating_hours,
        verified: model.verified,
        created_at: model.created_at,
    }
}

// ── Inventory repository ─────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbInventoryRepository {
    pub db: Arc<DatabaseConnection>,
}

/// `ON CONFLICT` target shared by both inventory upserts.
fn inventory_conflict() -> OnConflict {
    OnConflict::columns([
        blood_inventory::Column::BloodBankId,
        blood_inventory::Column::BloodType,
    ])
}

impl InventoryRepository for DbInventoryRepository {
    async fn list_for_bank(&self, blood_bank_id: i64) -> Result<Vec<InventoryItem>, ApiError> {
        blood_inventory::Entity::find()
            .filter(blood_inventory::Column::BloodBankId.eq(blood_bank_id))
            .order_by_asc(blood_inventory::Column::BloodType)
            .all(&*self.db)
            .await
            .context("list inventory for bank")?
            .into_iter()
            .map(inventory_from_model)
            .collect()
    }

    async fn totals_by_type(&self) -> Result<Vec<(BloodType, i64)>, ApiError> {
        let rows: Vec<(String, Option<i64>)> = blood_inventory::Entity::find()
            .select_only()
            .column(blood_inventory::Column::BloodType)
            .column_as(
                Expr::col(blood_inventory::Column::Units).sum(),
                "units",
            )
            .group_by(blood_inventory::Column::BloodType)
            .into_tuple()
            .all(&*self.db)
            .await
            .context("sum inventory by blood type")?;
        rows.into_iter()
            .map(|(blood_type, units)| -> Result<(BloodType, i64), ApiError> {
                let blood_type = blood_type
                    .parse::<BloodType>()
                    .context("stored inventory blood type")?;
                Ok((blood_type, units.unwrap_or(0)))
            })
            .collect()
    }

    async fn set_units(
        &self,
        blood_bank_id: i64,
        blood_type: BloodType,
        units: i32,
    ) -> Result<InventoryItem, ApiError> {
        let am = blood_inventory::ActiveModel {
            blood_bank_id: Set(blood_bank_id),
            blood_type: Set(blood_type.as_str().to_owned()),
            units: Set(units),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        let model = blood_inventory::Entity::insert(am)
            .on_conflict(
                inventory_conflict()
                    .update_columns([
                        blood_inventory::Column::Units,
                        blood_inventory::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_with_returning(&*self.db)
            .await
            .context("upsert inventory units")?;
        inventory_from_model(model)
    }

    async fn add_batch(
        &self,
        batch: &NewBloodBatch,
    ) -> Result<(BloodBatch, InventoryItem), ApiError> {
        let (batch_model, inventory_model) = self
            .db
            .transaction::<_, (blood_batches::Model, blood_inventory::Model), DbErr>(|txn| {
                let batch = batch.clone();
                Box::pin(async move {
                    let now = Utc::now();
                    let inserted = blood_batches::ActiveModel {
                        blood_bank_id: Set(batch.blood_bank_id),
                        blood_type: Set(batch.blood_type.as_str().to_owned()),
                        units: Set(batch.units),
                        expiry_date: Set(batch.expiry_date),
                        created_at: Set(now),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    // Single-statement increment: the row lock taken by the
                    // upsert serializes concurrent batches for the same pair.
                    let inventory = blood_inventory::Entity::insert(
                        blood_inventory::ActiveModel {
                            blood_bank_id: Set(batch.blood_bank_id),
                            blood_type: Set(batch.blood_type.as_str().to_owned()),
                            units: Set(batch.units),
                            updated_at: Set(now),
                            ..Default::default()
                        },
                    )
                    .on_conflict(
                        inventory_conflict()
                            .value(
                                blood_inventory::Column::Units,
                                Expr::cust("blood_inventory.units + EXCLUDED.units"),
                            )
                            .update_column(blood_inventory::Column::UpdatedAt)
                            .to_owned(),
                    )
                    .exec_with_returning(txn)
                    .await?;

                    Ok((inserted, inventory))
                })
            })
            .await
            .context("insert batch and accrue inventory")?;
        Ok((
            batch_from_model(batch_model)?,
            inventory_from_model(inventory_model)?,
        ))
    }

    async fn list_batches(&self, blood_bank_id: i64) -> Result<Vec<BloodBatch>, ApiError> {
        blood_batches::Entity::find()
            .filter(blood_batches::Column::BloodBankId.eq(blood_bank_id))
            .order_by_asc(blood_batches::Column::ExpiryDate)
            .all(&*self.db)
            .await
            .context("list batches for bank")?
            .into_iter()
            .map(batch_from_model)
            .collect()
    }
}

fn inventory_from_model(model: blood_inventory::Model) -> Result<InventoryItem, ApiError> {
    Ok(InventoryItem {
        id: model.id,
        blood_bank_id: model.blood_bank_id,
        blood_type: model
            .blood_type
            .parse::<BloodType>()
            .context("stored inventory blood type")?,
        units: model.units,
        updated_at: model.updated_at,
    })
}

fn batch_from_model(model: blood_batches::Model) -> Result<BloodBatch, ApiError> {
    Ok(BloodBatch {
        id: model.id,
        blood_bank_id: model.blood_bank_id,
        blood_type: model
            .blood_type
            .parse::<BloodType>()
            .context("stored batch blood type")?,
        units: model.units,
        expiry_date: model.expiry_date,
        created_at: model.created_at,
    })
}

// ── Blood request repository ─────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbBloodRequestRepository {
    pub db: Arc<DatabaseConnection>,
}

impl BloodRequestRepository for DbBloodRequestRepository {
    async fn list(&self, filter: &RequestFilter) -> Result<Vec<BloodRequest>, ApiError> {
        blood_requests::Entity::find()
            .apply_if(filter.hospital_id, |q, hospital_id| {
                q.filter(blood_requests::Column::HospitalId.eq(hospital_id))
            })
            .apply_if(filter.status, |q, status| {
                q.filter(blood_requests::Column::Status.eq(status.as_str()))
            })
            .apply_if(filter.urgency, |q, urgency| {
                q.filter(blood_requests::Column::Urgency.eq(urgency.as_str()))
            })
            .apply_if(filter.blood_type, |q, blood_type| {
                q.filter(blood_requests::Column::BloodType.eq(blood_type.as_str()))
            })
            .order_by_desc(blood_requests::Column::CreatedAt)
            .all(&*self.db)
            .await
            .context("list blood requests")?
            .into_iter()
            .map(request_from_model)
            .collect()
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BloodRequest>, ApiError> {
        let model = blood_requests::Entity::find_by_id(id)
            .one(&*self.db)
            .await
            .context("find blood request by id")?;
        model.map(request_from_model).transpose()
    }

    async fn create(&self, request: &NewBloodRequest) -> Result<BloodRequest, ApiError> {
        let RequestDetails {
            patient_name,
            age,
            gender,
            blood_type,
            units,
            component_type,
            urgency,
            is_critical,
            diagnosis,
            allergies,
            doctor_name,
            contact_phone,
            notes,
            donor_id,
        } = request.details.clone();
        let model = blood_requests::ActiveModel {
            hospital_id: Set(request.hospital_id),
            hospital_name: Set(request.hospital_name.clone()),
            patient_name: Set(patient_name),
            age: Set(age),
            gender: Set(gender),
            blood_type: Set(blood_type.as_str().to_owned()),
            units: Set(units),
            component_type: Set(
                component_type.unwrap_or_else(|| DEFAULT_COMPONENT_TYPE.to_owned())
            ),
            urgency: Set(urgency.as_str().to_owned()),
            is_critical: Set(is_critical),
            diagnosis: Set(diagnosis),
            allergies: Set(allergies),
            doctor_name: Set(doctor_name),
            status: Set(request.status.as_str().to_owned()),
            contact_phone: Set(contact_phone),
            notes: Set(notes),
            donor_id: Set(donor_id),
            created_at: Set(request.created_at),
            fulfilled_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db)
        .await
        .context("create blood request")?;
        request_from_model(model)
    }

    async fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
        fulfilled_at: Option<DateTime<Utc>>,
    ) -> Result<Option<BloodRequest>, ApiError> {
        let mut am = blood_requests::ActiveModel {
            id: Unchanged(id),
            status: Set(status.as_str().to_owned()),
            ..Default::default()
        };
        if let Some(at) = fulfilled_at {
            am.fulfilled_at = Set(Some(at));
        }
        match am.update(&*self.db).await {
            Ok(model) => request_from_model(model).map(Some),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(e) => Err(anyhow::Error::new(e)
                .context("update blood request status")
                .into()),
        }
    }
}

fn request_from_model(model: blood_requests::Model) -> Result<BloodRequest, ApiError> {
    Ok(BloodRequest {
        id: model.id,
        hospital_id: model.hospital_id,
        hospital_name: model.hospital_name,
        patient_name: model.patient_name,
        age: model.age,
        gender: model.gender,
        blood_type: model
            .blood_type
            .parse::<BloodType>()
            .context("stored request blood type")?,
        units: model.units,
        component_type: model.component_type,
        urgency: model
            .urgency
            .parse::<UrgencyLevel>()
            .context("stored request urgency")?,
        is_critical: model.is_critical,
        diagnosis: model.diagnosis,
        allergies: model.allergies,
        doctor_name: model.doctor_name,
        status: model
            .status
            .parse::<RequestStatus>()
            .context("stored request status")?,
        contact_phone: model.contact_phone,
        notes: model.notes,
        donor_id: model.donor_id,
        created_at: model.created_at,
        fulfilled_at: model.fulfilled_at,
    })
}

// ── Stats repository ─────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbStatsRepository {
    pub db: Arc<DatabaseConnection>,
}

impl StatsRepository for DbStatsRepository {
    async fn platform_stats(&self) -> Result<PlatformStats, ApiError> {
        let donors = donors::Entity::find()
            .count(&*self.db)
            .await
            .context("count donors")?;
        let hospitals = hospitals::Entity::find()
            .count(&*self.db)
            .await
            .context("count hospitals")?;
        let blood_banks = blood_banks::Entity::find()
            .count(&*self.db)
            .await
            .context("count blood banks")?;
        let requests = blood_requests::Entity::find()
            .count(&*self.db)
            .await
            .context("count requests")?;
        let pending_requests = blood_requests::Entity::find()
            .filter(blood_requests::Column::Status.eq(RequestStatus::Pending.as_str()))
            .count(&*self.db)
            .await
            .context("count pending requests")?;
        let fulfilled_requests = blood_requests::Entity::find()
            .filter(blood_requests::Column::Status.eq(RequestStatus::Fulfilled.as_str()))
            .count(&*self.db)
            .await
            .context("count fulfilled requests")?;
        let total_units: Option<Option<i64>> = blood_inventory::Entity::find()
            .select_only()
            .column_as(
                Expr::col(blood_inventory::Column::Units).sum(),
                "total_units",
            )
            .into_tuple()
            .one(&*self.db)
            .await
            .context("sum inventory units")?;
        Ok(PlatformStats {
            donors,
            hospitals,
            blood_banks,
            requests,
            pending_requests,
            fulfilled_requests,
            total_units: total_units.flatten().unwrap_or(0),
        })
    }
}
