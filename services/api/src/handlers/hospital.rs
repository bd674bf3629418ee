use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;

use beos_auth_types::bearer::AuthUser;

use crate::domain::types::{Hospital, HospitalFilter, HospitalPatch, HospitalProfile};
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use crate::usecase::hospital::{
    CreateHospitalUseCase, GetHospitalUseCase, ListHospitalsUseCase, UpdateHospitalUseCase,
};

// ── GET /hospitals ───────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct HospitalQuery {
    pub city: Option<String>,
    pub verified: Option<bool>,
}

pub async fn list_hospitals(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<HospitalQuery>,
) -> Result<Json<Vec<Hospital>>, ApiError> {
    let usecase = ListHospitalsUseCase {
        repo: state.hospital_repo(),
    };
    let hospitals = usecase
        .execute(&HospitalFilter {
            city: query.city,
            verified: query.verified,
        })
        .await?;
    Ok(Json(hospitals))
}

// ── GET /hospitals/me ────────────────────────────────────────────────────────

pub async fn get_my_hospital(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Hospital>, ApiError> {
    let usecase = GetHospitalUseCase {
        repo: state.hospital_repo(),
    };
    Ok(Json(usecase.execute_for_user(caller.user_id).await?))
}

// ── GET /hospitals/{id} ──────────────────────────────────────────────────────

pub async fn get_hospital(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Hospital>, ApiError> {
    let usecase = GetHospitalUseCase {
        repo: state.hospital_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /hospitals ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateHospitalRequest {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub emergency_contact: Option<String>,
}

pub async fn create_hospital(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateHospitalRequest>,
) -> Result<(StatusCode, Json<Hospital>), ApiError> {
    let usecase = CreateHospitalUseCase {
        repo: state.hospital_repo(),
    };
    let hospital = usecase
        .execute(
            caller.user_id,
            HospitalProfile {
                name: body.name,
                address: body.address,
                city: body.city,
                phone: body.phone,
                email: body.email,
                latitude: body.latitude,
                longitude: body.longitude,
                emergency_contact: body.emergency_contact,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(hospital)))
}

// ── PUT /hospitals/{id} ──────────────────────────────────────────────────────

/// Unknown fields (including `verified`) are ignored.
#[derive(Deserialize)]
pub struct UpdateHospitalRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub emergency_contact: Option<String>,
}

pub async fn update_hospital(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<UpdateHospitalRequest>, ApiError>,
) -> Result<Json<Hospital>, ApiError> {
    let usecase = UpdateHospitalUseCase {
        repo: state.hospital_repo(),
    };
    let patch = body.map(|ApiJson(body)| HospitalPatch {
        name: body.name,
        address: body.address,
        city: body.city,
        phone: body.phone,
        email: body.email,
        latitude: body.latitude,
        longitude: body.longitude,
        emergency_contact: body.emergency_contact,
    });
    Ok(Json(usecase.execute(caller.user_id, id, patch).await?))
}
