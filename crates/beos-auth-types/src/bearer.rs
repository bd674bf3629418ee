//! `Authorization: Bearer` extractor.

use std::sync::Arc;

use axum::extract::{FromRef, FromRequestParts};
use axum::response::{IntoResponse, Response};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use http::request::Parts;
use http::{HeaderValue, StatusCode, header::WWW_AUTHENTICATE};
use uuid::Uuid;

use beos_domain::user::UserRole;

use crate::token::{AuthError, validate_access_token};

/// HS256 secret used to verify access tokens. Provide it to the extractor by
/// implementing `FromRef<YourState>` (or deriving `FromRef` on the state).
#[derive(Clone)]
pub struct JwtSecret(pub Arc<str>);

impl JwtSecret {
    pub fn new(secret: impl Into<Arc<str>>) -> Self {
        Self(secret.into())
    }
}

impl std::fmt::Debug for JwtSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("JwtSecret(..)")
    }
}

/// Authenticated caller, verified from the bearer token.
///
/// Rejects with 401 when the header is absent or the token does not verify.
/// Ownership and admin checks (403) are done by use cases after extraction.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub role: UserRole,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// Rejection returned by the [`AuthUser`] extractor.
#[derive(Debug, thiserror::Error)]
pub enum AuthRejection {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid bearer token: {0}")]
    InvalidToken(#[from] AuthError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        tracing::debug!(reason = %self, "rejected unauthenticated request");
        let body = serde_json::json!({
            "kind": "UNAUTHORIZED",
            "message": self.to_string(),
        });
        let mut resp = (StatusCode::UNAUTHORIZED, axum::Json(body)).into_response();
        resp.headers_mut()
            .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        resp
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtSecret: FromRef<S>,
{
    type Rejection = AuthRejection;

    // axum-core 0.5 defines this as `fn -> impl Future + Send`; extract
    // synchronously and return a 'static async block.
    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl std::future::Future<Output = Result<Self, Self::Rejection>> + Send {
        let secret = JwtSecret::from_ref(state);
        let bearer = parts.headers.typed_get::<Authorization<Bearer>>();

        async move {
            let bearer = bearer.ok_or(AuthRejection::MissingToken)?;
            let info = validate_access_token(bearer.token(), &secret.0)?;
            Ok(Self {
                user_id: info.user_id,
                role: info.role,
            })
        }
    }
}
