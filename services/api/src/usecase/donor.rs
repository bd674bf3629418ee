use uuid::Uuid;

use crate::domain::repository::DonorRepository;
use crate::domain::types::{Donor, DonorFilter, DonorPatch, DonorProfile};
use crate::error::ApiError;

// ── ListDonors ───────────────────────────────────────────────────────────────

pub struct ListDonorsUseCase<R: DonorRepository> {
    pub repo: R,
}

impl<R: DonorRepository> ListDonorsUseCase<R> {
    pub async fn execute(&self, filter: &DonorFilter) -> Result<Vec<Donor>, ApiError> {
        self.repo.list(filter).await
    }
}

// ── GetDonor ─────────────────────────────────────────────────────────────────

pub struct GetDonorUseCase<R: DonorRepository> {
    pub repo: R,
}

impl<R: DonorRepository> GetDonorUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<Donor, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::DonorNotFound)
    }

    pub async fn execute_for_user(&self, user_id: Uuid) -> Result<Donor, ApiError> {
        self.repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(ApiError::DonorNotFound)
    }
}

// ── CreateDonor ──────────────────────────────────────────────────────────────

pub struct CreateDonorUseCase<R: DonorRepository> {
    pub repo: R,
}

impl<R: DonorRepository> CreateDonorUseCase<R> {
    pub async fn execute(&self, user_id: Uuid, profile: DonorProfile) -> Result<Donor, ApiError> {
        profile.validate()?;
        if self.repo.find_by_user_id(user_id).await?.is_some() {
            return Err(ApiError::DonorProfileExists);
        }
        let donor = self.repo.create(user_id, &profile).await?;
        tracing::info!(donor_id = donor.id, %user_id, "donor profile created");
        Ok(donor)
    }
}

// ── UpdateDonor ──────────────────────────────────────────────────────────────

pub struct UpdateDonorUseCase<R: DonorRepository> {
    pub repo: R,
}

impl<R: DonorRepository> UpdateDonorUseCase<R> {
    /// `patch` arrives unvalidated (possibly already a decode error) so that a
    /// non-owner is refused before the payload is looked at.
    pub async fn execute(
        &self,
        caller: Uuid,
        id: i64,
        patch: Result<DonorPatch, ApiError>,
    ) -> Result<Donor, ApiError> {
        let donor = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::DonorNotFound)?;
        if donor.user_id != caller {
            return Err(ApiError::NotOwner);
        }
        let patch = patch?;
        patch.validate()?;
        self.repo.update(id, &patch).await
    }
}
