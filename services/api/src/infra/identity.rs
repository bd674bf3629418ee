use std::time::Duration;

use anyhow::Context as _;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::repository::{
    IdentityPort, IdentitySession, IdentityUser, SignUpOutcome, SignUpRequest,
};
use crate::error::ApiError;

/// Upper bound on a whole provider round trip.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for a GoTrue-compatible identity provider (Supabase Auth).
#[derive(Clone)]
pub struct GoTrueClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl GoTrueClient {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, api_key, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: &str,
        api_key: &str,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
            api_key: api_key.to_owned(),
        })
    }

    fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .post(format!("{}{path}", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[derive(Deserialize)]
struct ProviderUser {
    id: Uuid,
    email: Option<String>,
    #[serde(default)]
    user_metadata: ProviderMetadata,
}

#[derive(Default, Deserialize)]
struct ProviderMetadata {
    role: Option<String>,
}

impl From<ProviderUser> for IdentityUser {
    fn from(user: ProviderUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
            role: user.user_metadata.role,
        }
    }
}

#[derive(Deserialize)]
struct SessionResponse {
    access_token: String,
    user: ProviderUser,
}

/// Sign-up answers with a session when auto-confirm is on, or with the bare
/// user while email confirmation is pending.
#[derive(Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(SessionResponse),
    User(ProviderUser),
}

/// Pull a human-readable message out of a provider error body.
fn provider_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            ["msg", "error_description", "message", "error"]
                .iter()
                .find_map(|key| v.get(*key).and_then(|m| m.as_str()))
        })
        .map(str::to_owned)
        .unwrap_or_else(|| body.trim().to_owned())
}

impl IdentityPort for GoTrueClient {
    async fn sign_in(&self, email: &str, password: &str) -> Result<IdentitySession, ApiError> {
        let resp = self
            .post("/auth/v1/token?grant_type=password")
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .context("identity sign-in request")?;

        let status = resp.status();
        if matches!(
            status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::UNPROCESSABLE_ENTITY
        ) {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(%status, message = %provider_message(&body), "sign-in rejected");
            return Err(ApiError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "identity sign-in failed with {status}: {}",
                provider_message(&body)
            )
            .into());
        }

        let session: SessionResponse = resp.json().await.context("decode sign-in session")?;
        Ok(IdentitySession {
            access_token: session.access_token,
            user: session.user.into(),
        })
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, ApiError> {
        let body = serde_json::json!({
            "email": request.email,
            "password": request.password,
            "data": {
                "name": request.name,
                "role": request.role,
                "phone": request.phone,
                "city": request.city,
                "blood_type": request.blood_type,
            },
        });
        let resp = self
            .post("/auth/v1/signup")
            .json(&body)
            .send()
            .await
            .context("identity sign-up request")?;

        let status = resp.status();
        if status.is_client_error() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ApiError::RegistrationFailed(provider_message(&body)));
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "identity sign-up failed with {status}: {}",
                provider_message(&body)
            )
            .into());
        }

        let outcome = match resp
            .json::<SignUpResponse>()
            .await
            .context("decode sign-up response")?
        {
            SignUpResponse::Session(session) => SignUpOutcome {
                access_token: Some(session.access_token),
                user: session.user.into(),
            },
            SignUpResponse::User(user) => SignUpOutcome {
                access_token: None,
                user: user.into(),
            },
        };
        Ok(outcome)
    }
}
