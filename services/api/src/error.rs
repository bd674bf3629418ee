use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// API service error variants.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("user not found")]
    UserNotFound,
    #[error("donor not found")]
    DonorNotFound,
    #[error("hospital not found")]
    HospitalNotFound,
    #[error("blood bank not found")]
    BloodBankNotFound,
    #[error("blood request not found")]
    RequestNotFound,
    #[error("donor profile already exists")]
    DonorProfileExists,
    #[error("hospital profile already exists")]
    HospitalProfileExists,
    #[error("blood bank profile already exists")]
    BloodBankProfileExists,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("{0}")]
    Validation(String),
    #[error("invalid login credentials")]
    InvalidCredentials,
    #[error("registration failed: {0}")]
    RegistrationFailed(String),
    #[error("only the profile owner may do this")]
    NotOwner,
    #[error("admin role required")]
    AdminRequired,
    #[error("a hospital profile is required")]
    HospitalProfileRequired,
    #[error("forbidden")]
    Forbidden,
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::DonorNotFound => "DONOR_NOT_FOUND",
            Self::HospitalNotFound => "HOSPITAL_NOT_FOUND",
            Self::BloodBankNotFound => "BLOOD_BANK_NOT_FOUND",
            Self::RequestNotFound => "REQUEST_NOT_FOUND",
            Self::DonorProfileExists => "DONOR_PROFILE_EXISTS",
            Self::HospitalProfileExists => "HOSPITAL_PROFILE_EXISTS",
            Self::BloodBankProfileExists => "BLOOD_BANK_PROFILE_EXISTS",
            Self::InvalidRequest(_) => "INVALID_REQUEST",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::InvalidCredentials => "INVALID_CREDENTIALS",
            Self::RegistrationFailed(_) => "REGISTRATION_FAILED",
            Self::NotOwner => "NOT_OWNER",
            Self::AdminRequired => "ADMIN_REQUIRED",
            Self::HospitalProfileRequired => "HOSPITAL_PROFILE_REQUIRED",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::UserNotFound
            | Self::DonorNotFound
            | Self::HospitalNotFound
            | Self::BloodBankNotFound
            | Self::RequestNotFound => StatusCode::NOT_FOUND,
            Self::DonorProfileExists
            | Self::HospitalProfileExists
            | Self::BloodBankProfileExists => StatusCode::CONFLICT,
            Self::InvalidRequest(_) | Self::Validation(_) | Self::RegistrationFailed(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::NotOwner
            | Self::AdminRequired
            | Self::HospitalProfileRequired
            | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // 4xx are expected client errors; TraceLayer already records them.
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %format!("{e:#}"), kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    async fn assert_error(
        error: ApiError,
        expected_status: StatusCode,
        expected_kind: &str,
        expected_message: &str,
    ) {
        let resp = error.into_response();
        assert_eq!(resp.status(), expected_status);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["kind"], expected_kind);
        assert_eq!(json["message"], expected_message);
    }

    #[tokio::test]
    async fn should_return_donor_not_found() {
        assert_error(
            ApiError::DonorNotFound,
            StatusCode::NOT_FOUND,
            "DONOR_NOT_FOUND",
            "donor not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_request_not_found() {
        assert_error(
            ApiError::RequestNotFound,
            StatusCode::NOT_FOUND,
            "REQUEST_NOT_FOUND",
            "blood request not found",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_conflict_for_duplicate_profile() {
        assert_error(
            ApiError::BloodBankProfileExists,
            StatusCode::CONFLICT,
            "BLOOD_BANK_PROFILE_EXISTS",
            "blood bank profile already exists",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_bad_request_for_validation() {
        assert_error(
            ApiError::validation("units must be positive"),
            StatusCode::BAD_REQUEST,
            "VALIDATION_FAILED",
            "units must be positive",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_unauthorized_for_bad_credentials() {
        assert_error(
            ApiError::InvalidCredentials,
            StatusCode::UNAUTHORIZED,
            "INVALID_CREDENTIALS",
            "invalid login credentials",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_bad_request_when_registration_rejected() {
        assert_error(
            ApiError::RegistrationFailed("User already registered".into()),
            StatusCode::BAD_REQUEST,
            "REGISTRATION_FAILED",
            "registration failed: User already registered",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_forbidden_for_non_owner() {
        assert_error(
            ApiError::NotOwner,
            StatusCode::FORBIDDEN,
            "NOT_OWNER",
            "only the profile owner may do this",
        )
        .await;
    }

    #[tokio::test]
    async fn should_return_forbidden_for_non_admin() {
        assert_error(
            ApiError::AdminRequired,
            StatusCode::FORBIDDEN,
            "ADMIN_REQUIRED",
            "admin role required",
        )
        .await;
    }

    #[tokio::test]
    async fn should_hide_internal_details() {
        assert_error(
            ApiError::Internal(anyhow::anyhow!("connection refused")),
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL",
            "internal error",
        )
        .await;
    }
}
