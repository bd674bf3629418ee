use uuid::Uuid;

use beos_auth_types::bearer::AuthUser;

use crate::domain::repository::{
    BloodBankRepository, HospitalRepository, StatsRepository, UserRepository,
};
use crate::domain::types::{BloodBank, Hospital, PlatformStats, User};
use crate::error::ApiError;

fn require_admin(caller: &AuthUser) -> Result<(), ApiError> {
    if caller.is_admin() {
        Ok(())
    } else {
        Err(ApiError::AdminRequired)
    }
}

// ── Stats ────────────────────────────────────────────────────────────────────

pub struct PlatformStatsUseCase<R: StatsRepository> {
    pub repo: R,
}

impl<R: StatsRepository> PlatformStatsUseCase<R> {
    pub async fn execute(&self, caller: &AuthUser) -> Result<PlatformStats, ApiError> {
        require_admin(caller)?;
        self.repo.platform_stats().await
    }
}

// ── Users ────────────────────────────────────────────────────────────────────

pub struct ListUsersUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> ListUsersUseCase<R> {
    pub async fn execute(&self, caller: &AuthUser) -> Result<Vec<User>, ApiError> {
        require_admin(caller)?;
        self.repo.list().await
    }
}

pub struct DeleteUserUseCase<R: UserRepository> {
    pub repo: R,
}

impl<R: UserRepository> DeleteUserUseCase<R> {
    /// Removes the local row only; the provider account is left alone.
    pub async fn execute(&self, caller: &AuthUser, user_id: Uuid) -> Result<(), ApiError> {
        require_admin(caller)?;
        if !self.repo.delete_by_user_id(user_id).await? {
            return Err(ApiError::UserNotFound);
        }
        tracing::info!(admin = %caller.user_id, %user_id, "user deleted");
        Ok(())
    }
}

// ── Verification ─────────────────────────────────────────────────────────────

pub struct VerifyHospitalUseCase<R: HospitalRepository> {
    pub repo: R,
}

impl<R: HospitalRepository> VerifyHospitalUseCase<R> {
    pub async fn execute(
        &self,
        caller: &AuthUser,
        id: i64,
        verified: Result<bool, ApiError>,
    ) -> Result<Hospital, ApiError> {
        require_admin(caller)?;
        let verified = verified?;
        let hospital = self
            .repo
            .set_verified(id, verified)
            .await?
            .ok_or(ApiError::HospitalNotFound)?;
        tracing::info!(admin = %caller.user_id, hospital_id = id, verified, "hospital verification set");
        Ok(hospital)
    }
}

pub struct VerifyBloodBankUseCase<R: BloodBankRepository> {
    pub repo: R,
}

impl<R: BloodBankRepository> VerifyBloodBankUseCase<R> {
    pub async fn execute(
        &self,
        caller: &AuthUser,
        id: i64,
        verified: Result<bool, ApiError>,
    ) -> Result<BloodBank, ApiError> {
        require_admin(caller)?;
        let verified = verified?;
        let bank = self
            .repo
            .set_verified(id, verified)
            .await?
            .ok_or(ApiError::BloodBankNotFound)?;
        tracing::info!(admin = %caller.user_id, blood_bank_id = id, verified, "blood bank verification set");
        Ok(bank)
    }
}
