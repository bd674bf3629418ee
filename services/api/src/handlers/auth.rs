use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use beos_auth_types::bearer::AuthUser;
use beos_domain::blood::BloodType;
use beos_domain::user::UserRole;

use crate::domain::types::User;
use crate::error::ApiError;
use crate::handlers::ApiJson;
use crate::state::AppState;
use crate::usecase::auth::{AuthOutput, LoginUseCase, MeUseCase, RegisterInput, RegisterUseCase};

#[derive(Serialize)]
pub struct AuthResponse {
    pub success: bool,
    pub token: String,
    pub user: User,
}

impl From<AuthOutput> for AuthResponse {
    fn from(output: AuthOutput) -> Self {
        Self {
            success: true,
            token: output.token,
            user: output.user,
        }
    }
}

// ── POST /auth/register ──────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    #[serde(default)]
    pub role: UserRole,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub blood_type: Option<BloodType>,
}

pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let usecase = RegisterUseCase {
        identity: state.identity.clone(),
        users: state.user_repo(),
    };
    let output = usecase
        .execute(RegisterInput {
            email: body.email,
            password: body.password,
            name: body.name,
            role: body.role,
            phone: body.phone,
            city: body.city,
            blood_type: body.blood_type,
        })
        .await?;
    Ok(Json(output.into()))
}

// ── POST /auth/login ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let usecase = LoginUseCase {
        identity: state.identity.clone(),
        users: state.user_repo(),
    };
    let output = usecase.execute(&body.email, &body.password).await?;
    Ok(Json(output.into()))
}

// ── GET /auth/me ─────────────────────────────────────────────────────────────

#[derive(Serialize)]
pub struct MeResponse {
    pub success: bool,
    pub user: User,
}

pub async fn me(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<MeResponse>, ApiError> {
    let usecase = MeUseCase {
        repo: state.user_repo(),
    };
    let user = usecase.execute(caller.user_id).await?;
    Ok(Json(MeResponse {
        success: true,
        user,
    }))
}
