#![allow(async_fn_in_trait)]

use chrono::{DateTime, Utc};
use uuid::Uuid;

use beos_domain::blood::BloodType;
use beos_domain::request::RequestStatus;

use crate::domain::types::{
    BloodBank, BloodBankFilter, BloodBankPatch, BloodBankProfile, BloodBatch, BloodRequest,
    Donor, DonorFilter, DonorPatch, DonorProfile, Hospital, HospitalFilter, HospitalPatch,
    HospitalProfile, InventoryItem, NewBloodBatch, NewBloodRequest, NewUser, PlatformStats,
    RequestFilter, Room, StockQuery, User,
};
use crate::error::ApiError;

/// Repository for local user rows.
pub trait UserRepository: Send + Sync {
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<User>, ApiError>;
    /// Insert, or return the existing row when `user_id` is already present.
    async fn create(&self, user: &NewUser) -> Result<User, ApiError>;
    async fn list(&self) -> Result<Vec<User>, ApiError>;
    /// Returns `true` if a row was deleted.
    async fn delete_by_user_id(&self, user_id: Uuid) -> Result<bool, ApiError>;
}

/// Repository for donor profiles.
pub trait DonorRepository: Send + Sync {
    async fn list(&self, filter: &DonorFilter) -> Result<Vec<Donor>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Donor>, ApiError>;
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Donor>, ApiError>;
    /// Fails with `DonorProfileExists` when `user_id` already owns a profile.
    async fn create(&self, user_id: Uuid, profile: &DonorProfile) -> Result<Donor, ApiError>;
    async fn update(&self, id: i64, patch: &DonorPatch) -> Result<Donor, ApiError>;
}

/// Repository for hospital profiles.
pub trait HospitalRepository: Send + Sync {
    async fn list(&self, filter: &HospitalFilter) -> Result<Vec<Hospital>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Hospital>, ApiError>;
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Hospital>, ApiError>;
    /// Fails with `HospitalProfileExists` when `user_id` already owns a profile.
    async fn create(
        &self,
        user_id: Uuid,
        profile: &HospitalProfile,
    ) -> Result<Hospital, ApiError>;
    async fn update(&self, id: i64, patch: &HospitalPatch) -> Result<Hospital, ApiError>;
    /// Returns `None` when no hospital has this id.
    async fn set_verified(&self, id: i64, verified: bool) -> Result<Option<Hospital>, ApiError>;
}

/// Repository for blood bank profiles.
pub trait BloodBankRepository: Send + Sync {
    async fn list(&self, filter: &BloodBankFilter) -> Result<Vec<BloodBank>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<BloodBank>, ApiError>;
    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<BloodBank>, ApiError>;
    /// Banks whose inventory row for the type holds at least `min_units`.
    async fn find_with_stock(&self, query: &StockQuery) -> Result<Vec<BloodBank>, ApiError>;
    /// Fails with `BloodBankProfileExists` when `user_id` already owns a profile.
    async fn create(
        &self,
        user_id: Uuid,
        profile: &BloodBankProfile,
    ) -> Result<BloodBank, ApiError>;
    async fn update(&self, id: i64, patch: &BloodBankPatch) -> Result<BloodBank, ApiError>;
    async fn set_verified(&self, id: i64, verified: bool)
    -> Result<Option<BloodBank>, ApiError>;
}

/// Repository for per-bank inventory and the batches feeding it.
pub trait InventoryRepository: Send + Sync {
    async fn list_for_bank(&self, blood_bank_id: i64) -> Result<Vec<InventoryItem>, ApiError>;
    /// Sum of units per blood type across every bank. Types with no rows are omitted.
    async fn totals_by_type(&self) -> Result<Vec<(BloodType, i64)>, ApiError>;
    /// Overwrite the unit count for (bank, type), creating the row if absent.
    async fn set_units(
        &self,
        blood_bank_id: i64,
        blood_type: BloodType,
        units: i32,
    ) -> Result<InventoryItem, ApiError>;
    /// Insert the batch and add its units to the (bank, type) inventory row
    /// in one transaction. Concurrent calls for the same pair must not lose
    /// increments.
    async fn add_batch(
        &self,
        batch: &NewBloodBatch,
    ) -> Result<(BloodBatch, InventoryItem), ApiError>;
    async fn list_batches(&self, blood_bank_id: i64) -> Result<Vec<BloodBatch>, ApiError>;
}

/// Repository for emergency blood requests.
pub trait BloodRequestRepository: Send + Sync {
    /// Newest first.
    async fn list(&self, filter: &RequestFilter) -> Result<Vec<BloodRequest>, ApiError>;
    async fn find_by_id(&self, id: i64) -> Result<Option<BloodRequest>, ApiError>;
    async fn create(&self, request: &NewBloodRequest) -> Result<BloodRequest, ApiError>;
    /// Set the status. `fulfilled_at` is written only when `Some`.
    async fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
        fulfilled_at: Option<DateTime<Utc>>,
    ) -> Result<Option<BloodRequest>, ApiError>;
}

/// Aggregate counts for the admin dashboard.
pub trait StatsRepository: Send + Sync {
    async fn platform_stats(&self) -> Result<PlatformStats, ApiError>;
}

/// Outcome of a successful password sign-in.
#[derive(Debug, Clone)]
pub struct IdentitySession {
    pub access_token: String,
    pub user: IdentityUser,
}

#[derive(Debug, Clone)]
pub struct IdentityUser {
    pub id: Uuid,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Sign-up request forwarded to the identity provider.
#[derive(Debug, Clone)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: String,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub blood_type: Option<String>,
}

/// Outcome of sign-up. `access_token` is `None` while email confirmation is pending.
#[derive(Debug, Clone)]
pub struct SignUpOutcome {
    pub access_token: Option<String>,
    pub user: IdentityUser,
}

/// Port for the external identity provider.
pub trait IdentityPort: Send + Sync {
    /// Fails with `InvalidCredentials` when the provider rejects the pair.
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, ApiError>;
    /// Fails with `RegistrationFailed` when the provider rejects the request.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, ApiError>;
}

/// Port for fire-and-forget realtime fan-out. Publishing never fails; an
/// event with no listeners is dropped.
pub trait Notifier: Send + Sync {
    fn publish(&self, room: &Room, event: &str, data: serde_json::Value);
}
