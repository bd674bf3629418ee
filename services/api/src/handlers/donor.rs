use axum::{Json, extract::State, http::StatusCode};
use chrono::NaiveDate;
use serde::Deserialize;

use beos_auth_types::bearer::AuthUser;
use beos_domain::blood::BloodType;

use crate::domain::types::{Donor, DonorFilter, DonorPatch, DonorProfile};
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use crate::usecase::donor::{
    CreateDonorUseCase, GetDonorUseCase, ListDonorsUseCase, UpdateDonorUseCase,
};

// ── GET /donors ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DonorQuery {
    pub city: Option<String>,
    pub blood_type: Option<BloodType>,
    pub available: Option<bool>,
}

pub async fn list_donors(
    _caller: AuthUser,
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<DonorQuery>,
) -> Result<Json<Vec<Donor>>, ApiError> {
    let usecase = ListDonorsUseCase {
        repo: state.donor_repo(),
    };
    let donors = usecase
        .execute(&DonorFilter {
            city: query.city,
            blood_type: query.blood_type,
            available: query.available,
        })
        .await?;
    Ok(Json(donors))
}

// ── POST /donors ─────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateDonorRequest {
    pub name: String,
    pub blood_type: BloodType,
    pub phone: String,
    pub email: Option<String>,
    pub city: String,
    pub address: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub last_donation: Option<NaiveDate>,
}

fn default_available() -> bool {
    true
}

pub async fn create_donor(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateDonorRequest>,
) -> Result<(StatusCode, Json<Donor>), ApiError> {
    let usecase = CreateDonorUseCase {
        repo: state.donor_repo(),
    };
    let donor = usecase
        .execute(
            caller.user_id,
            DonorProfile {
                name: body.name,
                blood_type: body.blood_type,
                phone: body.phone,
                email: body.email,
                city: body.city,
                address: body.address,
                available: body.available,
                latitude: body.latitude,
                longitude: body.longitude,
                last_donation: body.last_donation,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(donor)))
}

// ── GET /donors/me ───────────────────────────────────────────────────────────

pub async fn get_my_donor(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Donor>, ApiError> {
    let usecase = GetDonorUseCase {
        repo: state.donor_repo(),
    };
    Ok(Json(usecase.execute_for_user(caller.user_id).await?))
}

// ── GET /donors/{id} ─────────────────────────────────────────────────────────

pub async fn get_donor(
    _caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Donor>, ApiError> {
    let usecase = GetDonorUseCase {
        repo: state.donor_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── PUT /donors/{id} ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateDonorRequest {
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

impl From<UpdateDonorRequest> for DonorPatch {
    fn from(body: UpdateDonorRequest) -> Self {
        Self {
            name: body.name,
            blood_type: body.blood_type,
            phone: body.phone,
            email: body.email,
            city: body.city,
            address: body.address,
            available: body.available,
            latitude: body.latitude,
            longitude: body.longitude,
            last_donation: body.last_donation,
        }
    }
}

pub async fn update_donor(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<UpdateDonorRequest>, ApiError>,
) -> Result<Json<Donor>, ApiError> {
    let usecase = UpdateDonorUseCase {
        repo: state.donor_repo(),
    };
    let patch = body.map(|ApiJson(body)| DonorPatch::from(body));
    Ok(Json(usecase.execute(caller.user_id, id, patch).await?))
}

// ── PATCH /donors/{id}/status ────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct DonorStatusRequest {
    pub available: bool,
}

pub async fn update_donor_status(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<DonorStatusRequest>, ApiError>,
) -> Result<Json<Donor>, ApiError> {
    let usecase = UpdateDonorUseCase {
        repo: state.donor_repo(),
    };
    let patch = body.map(|ApiJson(body)| DonorPatch {
        available: Some(body.available),
        ..Default::default()
    });
    Ok(Json(usecase.execute(caller.user_id, id, patch).await?))
}
