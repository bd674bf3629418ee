use std::sync::{Arc, Mutex};

use axum_test::TestServer;
use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use beos_api::domain::repository::{BloodRequestRepository, HospitalRepository};
use beos_api::domain::types::{
    BloodRequest, DEFAULT_COMPONENT_TYPE, Hospital, HospitalFilter, HospitalPatch,
    HospitalProfile, NewBloodRequest, RequestFilter,
};
use beos_api::error::ApiError;
use beos_api::infra::identity::GoTrueClient;
use beos_api::infra::realtime::RealtimeHub;
use beos_api::router::build_router;
use beos_api::state::AppState;
use beos_api_schema::hospitals;
use beos_auth_types::bearer::{AuthUser, JwtSecret};
use beos_domain::request::RequestStatus;
use beos_domain::user::UserRole;
use beos_testing::auth::TEST_JWT_SECRET;

// ── Router ───────────────────────────────────────────────────────────────────

/// Server over the real router. Identity calls go to a closed local port.
pub fn test_server(db: DatabaseConnection) -> TestServer {
    let state = AppState {
        db: Arc::new(db),
        identity: GoTrueClient::new("http://127.0.0.1:9", "test-key").unwrap(),
        realtime: RealtimeHub::new(),
        jwt_secret: JwtSecret::new(TEST_JWT_SECRET),
    };
    TestServer::new(build_router(state, &["http://localhost:5173".to_owned()])).unwrap()
}

pub fn hospital_model(id: i64, user_id: Uuid, verified: bool) -> hospitals::Model {
    hospitals::Model {
        id,
        user_id,
        name: "Lagos General".to_owned(),
        address: "1 Marina Road".to_owned(),
        city: "Lagos".to_owned(),
        phone: "+2348000000000".to_owned(),
        email: None,
        latitude: None,
        longitude: None,
        emergency_contact: None,
        verified,
        created_at: fixed_time(),
    }
}

pub fn fixed_time() -> DateTime<Utc> {
    DateTime::from_timestamp(1_767_225_600, 0).unwrap()
}

pub fn caller(user_id: Uuid, role: UserRole) -> AuthUser {
    AuthUser { user_id, role }
}

pub fn test_hospital(id: i64, user_id: Uuid, city: &str) -> Hospital {
    Hospital {
        id,
        user_id,
        name: format!("Hospital {id}"),
        address: "1 Marina Road".to_owned(),
        city: city.to_owned(),
        phone: "+2348000000000".to_owned(),
        email: None,
        latitude: None,
        longitude: None,
        emergency_contact: None,
        verified: true,
        created_at: fixed_time(),
    }
}

// ── MockHospitalRepo ─────────────────────────────────────────────────────────

pub struct MockHospitalRepo {
    pub hospitals: Vec<Hospital>,
}

impl MockHospitalRepo {
    pub fn new(hospitals: Vec<Hospital>) -> Self {
        Self { hospitals }
    }
}

impl HospitalRepository for MockHospitalRepo {
    async fn list(&self, _filter: &HospitalFilter) -> Result<Vec<Hospital>, ApiError> {
        Ok(self.hospitals.clone())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Hospital>, ApiError> {
        Ok(self.hospitals.iter().find(|h| h.id == id).cloned())
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Hospital>, ApiError> {
        Ok(self.hospitals.iter().find(|h| h.user_id == user_id).cloned())
    }

    async fn create(
        &self,
        _user_id: Uuid,
        _profile: &HospitalProfile,
    ) -> Result<Hospital, ApiError> {
        unimplemented!("not used by emergency flows")
    }

    async fn update(&self, _id: i64, _patch: &HospitalPatch) -> Result<Hospital, ApiError> {
        unimplemented!("not used by emergency flows")
    }

    async fn set_verified(&self, _id: i64, _verified: bool) -> Result<Option<Hospital>, ApiError> {
        unimplemented!("not used by emergency flows")
    }
}

// ── MockRequestRepo ──────────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockRequestRepo {
    pub requests: Arc<Mutex<Vec<BloodRequest>>>,
}

impl MockRequestRepo {
    /// Returns a shared handle to the stored requests for post-execution inspection.
    pub fn requests_handle(&self) -> Arc<Mutex<Vec<BloodRequest>>> {
        Arc::clone(&self.requests)
    }

    /// A second repo over the same storage.
    pub fn share(&self) -> Self {
        Self {
            requests: self.requests_handle(),
        }
    }
}

impl BloodRequestRepository for MockRequestRepo {
    async fn list(&self, _filter: &RequestFilter) -> Result<Vec<BloodRequest>, ApiError> {
        let mut requests = self.requests.lock().unwrap().clone();
        requests.reverse();
        Ok(requests)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<BloodRequest>, ApiError> {
        Ok(self
            .requests
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn create(&self, new: &NewBloodRequest) -> Result<BloodRequest, ApiError> {
        let mut requests = self.requests.lock().unwrap();
        let details = new.details.clone();
        let request = BloodRequest {
            id: requests.len() as i64 + 1,
            hospital_id: new.hospital_id,
            hospital_name: new.hospital_name.clone(),
            patient_name: details.patient_name,
            age: details.age,
            gender: details.gender,
            blood_type: details.blood_type,
            units: details.units,
            component_type: details
                .component_type
                .unwrap_or_else(|| DEFAULT_COMPONENT_TYPE.to_owned()),
            urgency: details.urgency,
            is_critical: details.is_critical,
            diagnosis: details.diagnosis,
            allergies: details.allergies,
            doctor_name: details.doctor_name,
            status: new.status,
            contact_phone: details.contact_phone,
            notes: details.notes,
            donor_id: details.donor_id,
            created_at: new.created_at,
            fulfilled_at: None,
        };
        requests.push(request.clone());
        Ok(request)
    }

    async fn update_status(
        &self,
        id: i64,
        status: RequestStatus,
        fulfilled_at: Option<DateTime<Utc>>,
    ) -> Result<Option<BloodRequest>, ApiError> {
        let mut requests = self.requests.lock().unwrap();
        Ok(requests.iter_mut().find(|r| r.id == id).map(|r| {
            r.status = status;
            if fulfilled_at.is_some() {
                r.fulfilled_at = fulfilled_at;
            }
            r.clone()
        }))
    }
}
