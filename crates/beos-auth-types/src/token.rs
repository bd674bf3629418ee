//! JWT access-token validation.
//!
//! Access tokens are issued by the identity provider (GoTrue-compatible) and
//! signed with its HS256 JWT secret. Services verify them locally instead of
//! calling back into the provider on every request.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_TESTS", test))]
use serde::Serialize;
use uuid::Uuid;

use beos_domain::user::UserRole;

/// Audience the identity provider stamps on tokens for signed-in users.
pub const AUTHENTICATED_AUDIENCE: &str = "authenticated";

/// User identity extracted from a validated access token.
#[derive(Debug, Clone)]
pub struct TokenInfo {
    pub user_id: Uuid,
    pub role: UserRole,
}

/// Errors returned by [`validate_access_token`].
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

/// Free-form metadata the provider attaches at sign-up.
#[derive(Debug, Default, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_TESTS", test), derive(Serialize))]
pub struct UserMetadata {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// JWT claims payload.
///
/// | Field | JWT claim | Meaning |
/// |-------|-----------|---------|
/// | `sub` | `sub` | provider user id (UUID string) |
/// | `email` | custom | sign-in email |
/// | `aud` | `aud` | always `"authenticated"` |
/// | `exp` | `exp` | seconds since epoch |
/// | `user_metadata` | custom | carries `role` |
///
/// [`Serialize`] requires the **`USE_ONLY_IN_TESTS`** cargo feature; production
/// code never mints tokens.
#[derive(Debug, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_TESTS", test), derive(Serialize))]
pub struct JwtClaims {
    pub sub: String,
    #[serde(default)]
    pub email: Option<String>,
    pub aud: String,
    pub exp: u64,
    #[serde(default)]
    pub user_metadata: UserMetadata,
}

// ── Core decode (private) ────────────────────────────────────────────────

/// Validation: HS256, exp checked, audience must be `authenticated`.
/// Default leeway is 60s.
fn decode_jwt(token: &str, secret: &str) -> Result<JwtClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.set_audience(&[AUTHENTICATED_AUDIENCE]);
    validation.set_required_spec_claims(&["exp", "sub", "aud"]);

    let data = decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidSignature => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    })?;

    Ok(data.claims)
}

// ── Public ───────────────────────────────────────────────────────────────

/// Validate a bearer token, returning the caller's identity.
///
/// A missing or unrecognised `user_metadata.role` maps to [`UserRole::User`].
pub fn validate_access_token(token: &str, secret: &str) -> Result<TokenInfo, AuthError> {
    let claims = decode_jwt(token, secret)?;
    let user_id = claims
        .sub
        .parse::<Uuid>()
        .map_err(|_| AuthError::Malformed)?;
    let role = claims
        .user_metadata
        .role
        .as_deref()
        .and_then(|r| r.parse().ok())
        .unwrap_or_default();
    Ok(TokenInfo { user_id, role })
}

// ── Feature-gated: tests only ────────────────────────────────────────────

/// Sign claims with the given secret, the way the identity provider does.
#[cfg(any(feature = "USE_ONLY_IN_TESTS", test))]
pub fn issue_token(claims: &JwtClaims, secret: &str) -> Result<String, jsonwebtoken::errors::Error> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
}
