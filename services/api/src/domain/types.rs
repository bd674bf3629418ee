//! Domain records and inputs for the API service.
//!
//! Records derive `Serialize` because their row shape is the HTTP and
//! realtime payload contract; inputs are built by handlers from request DTOs.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use beos_domain::blood::BloodType;
use beos_domain::request::{RequestStatus, UrgencyLevel};
use beos_domain::user::UserRole;

use crate::error::ApiError;

pub const DEFAULT_COMPONENT_TYPE: &str = "Whole Blood";

// ── Users ────────────────────────────────────────────────────────────────────

/// Local mirror of an identity-provider account.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: i64,
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
    #[serde(serialize_with = "beos_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

// ── Donors ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Donor {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub blood_type: BloodType,
    pub phone: String,
    pub email: Option<String>,
    pub city: String,
    pub address: Option<String>,
    pub available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_donation: Option<NaiveDate>,
    #[serde(serialize_with = "beos_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when a donor registers their profile.
#[derive(Debug, Clone)]
pub struct DonorProfile {
    pub name: String,
    pub blood_type: BloodType,
    pub phone: String,
    pub email: Option<String>,
    pub city: String,
    pub address: Option<String>,
    pub available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_donation: Option<NaiveDate>,
}

impl DonorProfile {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_text("name", &self.name)?;
        require_text("phone", &self.phone)?;
        require_text("city", &self.city)?;
        validate_email(self.email.as_deref())?;
        validate_coordinates(self.latitude, self.longitude)
    }
}

/// Partial donor update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct DonorPatch {
    pub name: Option<String>,
    pub blood_type: Option<BloodType>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub city: Option<String>,
    pub address: Option<String>,
    pub available: Option<bool>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_donation: Option<NaiveDate>,
}

impl DonorPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        optional_text("name", self.name.as_deref())?;
        optional_text("phone", self.phone.as_deref())?;
        optional_text("city", self.city.as_deref())?;
        validate_email(self.email.as_deref())?;
        validate_coordinates(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Default)]
pub struct DonorFilter {
    pub city: Option<String>,
    pub blood_type: Option<BloodType>,
    pub available: Option<bool>,
}

// ── Hospitals ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct Hospital {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub emergency_contact: Option<String>,
    pub verified: bool,
    #[serde(serialize_with = "beos_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct HospitalProfile {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub emergency_contact: Option<String>,
}

impl HospitalProfile {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_text("name", &self.name)?;
        require_text("address", &self.address)?;
        require_text("city", &self.city)?;
        require_text("phone", &self.phone)?;
        validate_email(self.email.as_deref())?;
        validate_coordinates(self.latitude, self.longitude)
    }
}

/// Partial hospital update. `verified` is deliberately absent: only admins
/// flip it, through the verification use case.
#[derive(Debug, Clone, Default)]
pub struct HospitalPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub emergency_contact: Option<String>,
}

impl HospitalPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        optional_text("name", self.name.as_deref())?;
        optional_text("address", self.address.as_deref())?;
        optional_text("city", self.city.as_deref())?;
        optional_text("phone", self.phone.as_deref())?;
        validate_email(self.email.as_deref())?;
        validate_coordinates(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Default)]
pub struct HospitalFilter {
    pub city: Option<String>,
    pub verified: Option<bool>,
}

// ── Blood banks ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BloodBank {
    pub id: i64,
    pub user_id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub operating_hours: Option<String>,
    pub verified: bool,
    #[serde(serialize_with = "beos_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct BloodBankProfile {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub operating_hours: Option<String>,
}

impl BloodBankProfile {
    pub fn validate(&self) -> Result<(), ApiError> {
        require_text("name", &self.name)?;
        require_text("address", &self.address)?;
        require_text("city", &self.city)?;
        require_text("phone", &self.phone)?;
        validate_email(self.email.as_deref())?;
        validate_coordinates(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BloodBankPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub operating_hours: Option<String>,
}

impl BloodBankPatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        optional_text("name", self.name.as_deref())?;
        optional_text("address", self.address.as_deref())?;
        optional_text("city", self.city.as_deref())?;
        optional_text("phone", self.phone.as_deref())?;
        validate_email(self.email.as_deref())?;
        validate_coordinates(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Default)]
pub struct BloodBankFilter {
    pub city: Option<String>,
    pub verified: Option<bool>,
}

/// Stock search: banks holding at least `min_units` of `blood_type`.
#[derive(Debug, Clone)]
pub struct StockQuery {
    pub blood_type: BloodType,
    pub min_units: i32,
    pub city: Option<String>,
}

// ── Inventory & batches ──────────────────────────────────────────────────────

/// Running unit total for one (bank, blood type) pair.
#[derive(Debug, Clone, Serialize)]
pub struct InventoryItem {
    pub id: i64,
    pub blood_bank_id: i64,
    pub blood_type: BloodType,
    pub units: i32,
    #[serde(serialize_with = "beos_core::serde::to_rfc3339_ms")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BloodBatch {
    pub id: i64,
    pub blood_bank_id: i64,
    pub blood_type: BloodType,
    pub units: i32,
    pub expiry_date: NaiveDate,
    #[serde(serialize_with = "beos_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewBloodBatch {
    pub blood_bank_id: i64,
    pub blood_type: BloodType,
    pub units: i32,
    pub expiry_date: NaiveDate,
}

/// Largest single batch.
pub const MAX_BATCH_UNITS: i32 = 1_000;

/// Largest stock of one blood type at one bank. Keeps accrual far below `INTEGER` range.
pub const MAX_INVENTORY_UNITS: i32 = 1_000_000;

impl NewBloodBatch {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.units < 1 {
            return Err(ApiError::validation("units must be at least 1"));
        }
        if self.units > MAX_BATCH_UNITS {
            return Err(ApiError::validation(format!(
                "units must be at most {MAX_BATCH_UNITS}"
            )));
        }
        Ok(())
    }
}

pub fn validate_inventory_units(units: i32) -> Result<(), ApiError> {
    if units < 0 {
        return Err(ApiError::validation("units must not be negative"));
    }
    if units > MAX_INVENTORY_UNITS {
        return Err(ApiError::validation(format!(
            "units must be at most {MAX_INVENTORY_UNITS}"
        )));
    }
    Ok(())
}

// ── Blood requests ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct BloodRequest {
    pub id: i64,
    pub hospital_id: Option<i64>,
    pub hospital_name: Option<String>,
    pub patient_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_type: BloodType,
    pub units: i32,
    pub component_type: String,
    pub urgency: UrgencyLevel,
    pub is_critical: bool,
    pub diagnosis: Option<String>,
    pub allergies: Option<String>,
    pub doctor_name: Option<String>,
    pub status: RequestStatus,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub donor_id: Option<i64>,
    #[serde(serialize_with = "beos_core::serde::to_rfc3339_ms")]
    pub created_at: DateTime<Utc>,
    #[serde(serialize_with = "beos_core::serde::to_rfc3339_ms_opt")]
    pub fulfilled_at: Option<DateTime<Utc>>,
}

/// Clinical details of a request as submitted by a hospital.
#[derive(Debug, Clone)]
pub struct RequestDetails {
    pub patient_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_type: BloodType,
    pub units: i32,
    pub component_type: Option<String>,
    pub urgency: UrgencyLevel,
    pub is_critical: bool,
    pub diagnosis: Option<String>,
    pub allergies: Option<String>,
    pub doctor_name: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub donor_id: Option<i64>,
}

impl RequestDetails {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.units < 1 {
            return Err(ApiError::validation("units must be at least 1"));
        }
        if let Some(age) = self.age {
            if !(0..=150).contains(&age) {
                return Err(ApiError::validation("age must be between 0 and 150"));
            }
        }
        optional_text("component_type", self.component_type.as_deref())
    }
}

/// Row to insert: request details plus the issuing hospital and timestamps.
#[derive(Debug, Clone)]
pub struct NewBloodRequest {
    pub hospital_id: Option<i64>,
    pub hospital_name: Option<String>,
    pub details: RequestDetails,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub hospital_id: Option<i64>,
    pub status: Option<RequestStatus>,
    pub urgency: Option<UrgencyLevel>,
    pub blood_type: Option<BloodType>,
}

// ── Admin ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PlatformStats {
    pub donors: u64,
    pub hospitals: u64,
    pub blood_banks: u64,
    pub requests: u64,
    pub pending_requests: u64,
    pub fulfilled_requests: u64,
    pub total_units: i64,
}

// ── Realtime rooms ───────────────────────────────────────────────────────────

/// Realtime subscription group.
///
/// City names are trimmed and lower-cased so `"Lagos"` and `" lagos"` share
/// a room.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Room {
    City(String),
    BloodType(BloodType),
}

impl Room {
    /// Returns `None` for a blank city name.
    pub fn city(name: &str) -> Option<Self> {
        let normalized = name.trim().to_lowercase();
        (!normalized.is_empty()).then_some(Self::City(normalized))
    }
}

impl fmt::Display for Room {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::City(city) => write!(f, "city_{city}"),
            Self::BloodType(blood_type) => write!(f, "type_{blood_type}"),
        }
    }
}

pub const EVENT_NEW_EMERGENCY: &str = "new-emergency";
pub const EVENT_REQUEST_UPDATE: &str = "request-update";
pub const EVENT_REQUEST_FULFILLED: &str = "request-fulfilled";

// ── Field validation ─────────────────────────────────────────────────────────

fn require_text(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::validation(format!("{field} must not be empty")));
    }
    Ok(())
}

fn optional_text(field: &str, value: Option<&str>) -> Result<(), ApiError> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}

/// Shallow shape check; the identity provider is the real authority on emails.
pub fn validate_email(email: Option<&str>) -> Result<(), ApiError> {
    let Some(email) = email else {
        return Ok(());
    };
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    };
    if valid {
        Ok(())
    } else {
        Err(ApiError::validation("email is not a valid address"))
    }
}

pub fn validate_coordinates(latitude: Option<f64>, longitude: Option<f64>) -> Result<(), ApiError> {
    if let Some(lat) = latitude {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(ApiError::validation("latitude must be between -90 and 90"));
        }
    }
    if let Some(lon) = longitude {
        if !(-180.0..=180.0).contains(&lon) {
            return Err(ApiError::validation(
                "longitude must be between -180 and 180",
            ));
        }
    }
    Ok(())
}
