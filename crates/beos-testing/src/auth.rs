//! Mock identity helpers for integration tests.
//!
//! Mints bearer tokens the way the identity provider would, signed with
//! [`TEST_JWT_SECRET`]. Build the service state with the same secret so the
//! `AuthUser` extractor accepts them.

use std::time::{SystemTime, UNIX_EPOCH};

use axum::http::{HeaderName, HeaderValue, header::AUTHORIZATION};
use uuid::Uuid;

use beos_auth_types::token::{AUTHENTICATED_AUDIENCE, JwtClaims, UserMetadata, issue_token};
use beos_domain::user::UserRole;

pub const TEST_JWT_SECRET: &str = "test-jwt-secret-do-not-use-in-production";

/// Configurable identity for test requests.
pub struct MockAuth {
    pub user_id: Uuid,
    pub email: String,
    pub role: UserRole,
}

impl MockAuth {
    pub fn new(user_id: Uuid, role: UserRole) -> Self {
        Self {
            user_id,
            email: format!("{user_id}@example.com"),
            role,
        }
    }

    /// Fresh identity with a random id.
    pub fn random(role: UserRole) -> Self {
        Self::new(Uuid::new_v4(), role)
    }

    /// Signed access token valid for one hour.
    pub fn token(&self) -> String {
        self.token_expiring_at(now_secs() + 3600)
    }

    /// Signed access token that expired an hour ago (beyond validation leeway).
    pub fn expired_token(&self) -> String {
        self.token_expiring_at(now_secs().saturating_sub(3600))
    }

    /// `Authorization` header carrying [`MockAuth::token`].
    pub fn header(&self) -> (HeaderName, HeaderValue) {
        let value = HeaderValue::from_str(&format!("Bearer {}", self.token()))
            .expect("JWT is always a valid header value");
        (AUTHORIZATION, value)
    }

    fn token_expiring_at(&self, exp: u64) -> String {
        let claims = JwtClaims {
            sub: self.user_id.to_string(),
            email: Some(self.email.clone()),
            aud: AUTHENTICATED_AUDIENCE.to_owned(),
            exp,
            user_metadata: UserMetadata {
                role: Some(self.role.as_str().to_owned()),
                name: None,
            },
        };
        issue_token(&claims, TEST_JWT_SECRET).expect("HS256 signing cannot fail")
    }
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
