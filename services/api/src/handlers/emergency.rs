use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use beos_auth_types::bearer::AuthUser;
use beos_domain::blood::BloodType;
use beos_domain::request::{RequestStatus, UrgencyLevel};

use crate::domain::types::{BloodRequest, RequestDetails, RequestFilter};
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use crate::usecase::emergency::{
    CreateRequestUseCase, GetRequestUseCase, ListRequestsUseCase, UpdateRequestStatusUseCase,
};

// ── POST /emergency ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateRequestRequest {
    /// Admin-only override; ignored for hospital callers.
    pub hospital_id: Option<i64>,
    pub patient_name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub blood_type: BloodType,
    pub units: i32,
    pub component_type: Option<String>,
    #[serde(default)]
    pub urgency: UrgencyLevel,
    #[serde(default)]
    pub is_critical: bool,
    pub diagnosis: Option<String>,
    pub allergies: Option<String>,
    pub doctor_name: Option<String>,
    pub contact_phone: Option<String>,
    pub notes: Option<String>,
    pub donor_id: Option<i64>,
}

pub async fn create_request(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateRequestRequest>,
) -> Result<(StatusCode, Json<BloodRequest>), ApiError> {
    let usecase = CreateRequestUseCase {
        hospitals: state.hospital_repo(),
        requests: state.request_repo(),
        notifier: state.realtime.clone(),
    };
    let details = RequestDetails {
        patient_name: body.patient_name,
        age: body.age,
        gender: body.gender,
        blood_type: body.blood_type,
        units: body.units,
        component_type: body.component_type,
        urgency: body.urgency,
        is_critical: body.is_critical,
        diagnosis: body.diagnosis,
        allergies: body.allergies,
        doctor_name: body.doctor_name,
        contact_phone: body.contact_phone,
        notes: body.notes,
        donor_id: body.donor_id,
    };
    let request = usecase.execute(&caller, body.hospital_id, details).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

// ── GET /emergency ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RequestQuery {
    pub hospital_id: Option<i64>,
    pub status: Option<RequestStatus>,
    pub urgency: Option<UrgencyLevel>,
    pub blood_type: Option<BloodType>,
}

pub async fn list_requests(
    _caller: AuthUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<RequestQuery>,
) -> Result<Json<Vec<BloodRequest>>, ApiError> {
    let usecase = ListRequestsUseCase {
        repo: state.request_repo(),
    };
    let requests = usecase
        .execute(&RequestFilter {
            hospital_id: query.hospital_id,
            status: query.status,
            urgency: query.urgency,
            blood_type: query.blood_type,
        })
        .await?;
    Ok(Json(requests))
}

// ── GET /emergency/{id} ──────────────────────────────────────────────────────

pub async fn get_request(
    _caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<BloodRequest>, ApiError> {
    let usecase = GetRequestUseCase {
        repo: state.request_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── PATCH /emergency/{id}/status ─────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: RequestStatus,
}

pub async fn update_request_status(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<UpdateStatusRequest>, ApiError>,
) -> Result<Json<BloodRequest>, ApiError> {
    let usecase = UpdateRequestStatusUseCase {
        hospitals: state.hospital_repo(),
        requests: state.request_repo(),
        notifier: state.realtime.clone(),
    };
    let status = body.map(|ApiJson(body)| body.status);
    Ok(Json(usecase.execute(&caller, id, status).await?))
}
