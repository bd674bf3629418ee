use uuid::Uuid;

use beos_domain::blood::BloodType;
use beos_domain::user::UserRole;

use crate::domain::repository::{IdentityPort, SignUpRequest, UserRepository};
use crate::domain::types::{NewUser, User, validate_email};
use crate::error::ApiError;

/// Token placeholder returned while the provider waits for email confirmation.
pub const PENDING_CONFIRMATION: &str = "pending_confirmation";

pub struct AuthOutput {
    pub token: String,
    pub user: User,
}

fn require_credentials(email: &str, password: &str) -> Result<(), ApiError> {
    validate_email(Some(email))?;
    if password.is_empty() {
        return Err(ApiError::validation("password must not be empty"));
    }
    Ok(())
}

// ── Register ─────────────────────────────────────────────────────────────────

pub struct RegisterInput {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub blood_type: Option<BloodType>,
}

pub struct RegisterUseCase<I: IdentityPort, R: UserRepository> {
    pub identity: I,
    pub users: R,
}

impl<I: IdentityPort, R: UserRepository> RegisterUseCase<I, R> {
    pub async fn execute(&self, input: RegisterInput) -> Result<AuthOutput, ApiError> {
        if input.role.is_admin() {
            return Err(ApiError::Forbidden);
        }
        require_credentials(&input.email, &input.password)?;
        if input.name.trim().is_empty() {
            return Err(ApiError::validation("name must not be empty"));
        }

        let outcome = self
            .identity
            .sign_up(&SignUpRequest {
                email: input.email.clone(),
                password: input.password,
                name: input.name,
                role: input.role.as_str().to_owned(),
                phone: input.phone,
                city: input.city,
                blood_type: input.blood_type.map(|b| b.as_str().to_owned()),
            })
            .await?;

        let user = self
            .users
            .create(&NewUser {
                user_id: outcome.user.id,
                email: outcome.user.email.unwrap_or(input.email),
                role: input.role,
            })
            .await?;
        tracing::info!(user_id = %user.user_id, role = %user.role, "user registered");

        Ok(AuthOutput {
            token: outcome
                .access_token
                .unwrap_or_else(|| PENDING_CONFIRMATION.to_owned()),
            user,
        })
    }
}

// ── Login ────────────────────────────────────────────────────────────────────

/// Password login through the provider.
///
/// A provider account with no local row gets one carrying the provider's
/// metadata role, `admin` included. Registration refuses `admin` because there
/// the role is client input; here it is whatever the provider already holds,
/// and access tokens carry that same role.
pub struct LoginUseCase<I: IdentityPort, R: UserRepository> {
    pub identity: I,
    pub users: R,
}

impl<I: IdentityPort, R: UserRepository> LoginUseCase<I, R> {
    pub async fn execute(&self, email: &str, password: &str) -> Result<AuthOutput, ApiError> {
        require_credentials(email, password)?;
        let session = self.identity.sign_in(email, password).await?;

        let user = match self.users.find_by_user_id(session.user.id).await? {
            Some(user) => user,
            None => {
                // Accounts created directly at the provider have no local row yet.
                let role = session
                    .user
                    .role
                    .as_deref()
                    .and_then(|r| r.parse::<UserRole>().ok())
                    .unwrap_or_default();
                self.users
                    .create(&NewUser {
                        user_id: session.user.id,
                        email: session.user.email.unwrap_or_else(|| email.to_owned()),
                        role,
                    })
                    .await?
            }
        };

        Ok(AuthOutput {
            token: session.access_token,
            user,
        })
    }
}

// ── Me ───────────────────────────────────────────────────────────────────────

pub struct MeUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> MeUseCase<R> {
    pub async fn execute(&self, user_id: Uuid) -> Result<User, ApiError> {
        self.repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(ApiError::UserNotFound)
    }
}
