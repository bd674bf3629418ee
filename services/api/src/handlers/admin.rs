use axum::{Json, extract::State, http::StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use beos_auth_types::bearer::AuthUser;

use crate::domain::types::{BloodBank, Hospital, PlatformStats, User};
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath};
use crate::state::AppState;
use crate::usecase::admin::{
    DeleteUserUseCase, ListUsersUseCase, PlatformStatsUseCase, VerifyBloodBankUseCase,
    VerifyHospitalUseCase,
};

// ── GET /admin/stats ─────────────────────────────────────────────────────────

pub async fn get_stats(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<PlatformStats>, ApiError> {
    let usecase = PlatformStatsUseCase {
        repo: state.stats_repo(),
    };
    Ok(Json(usecase.execute(&caller).await?))
}

// ── GET /admin/users ─────────────────────────────────────────────────────────

pub async fn list_users(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<User>>, ApiError> {
    let usecase = ListUsersUseCase {
        repo: state.user_repo(),
    };
    Ok(Json(usecase.execute(&caller).await?))
}

// ── DELETE /admin/users/{user_id} ────────────────────────────────────────────

pub async fn delete_user(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(user_id): ApiPath<Uuid>,
) -> Result<StatusCode, ApiError> {
    let usecase = DeleteUserUseCase {
        repo: state.user_repo(),
    };
    usecase.execute(&caller, user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ── PATCH /admin/{hospitals,blood-banks}/{id}/verification ───────────────────

#[derive(Deserialize)]
pub struct VerificationRequest {
    pub verified: bool,
}

pub async fn verify_hospital(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<VerificationRequest>, ApiError>,
) -> Result<Json<Hospital>, ApiError> {
    let usecase = VerifyHospitalUseCase {
        repo: state.hospital_repo(),
    };
    let verified = body.map(|ApiJson(body)| body.verified);
    Ok(Json(usecase.execute(&caller, id, verified).await?))
}

pub async fn verify_blood_bank(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<VerificationRequest>, ApiError>,
) -> Result<Json<BloodBank>, ApiError> {
    let usecase = VerifyBloodBankUseCase {
        repo: state.blood_bank_repo(),
    };
    let verified = body.map(|ApiJson(body)| body.verified);
    Ok(Json(usecase.execute(&caller, id, verified).await?))
}
