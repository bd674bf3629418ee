use uuid::Uuid;

use crate::domain::repository::HospitalRepository;
use crate::domain::types::{Hospital, HospitalFilter, HospitalPatch, HospitalProfile};
use crate::error::ApiError;

// ── ListHospitals ────────────────────────────────────────────────────────────

pub struct ListHospitalsUseCase<R: HospitalRepository> {
    pub repo: R,
}

impl<R: HospitalRepository> ListHospitalsUseCase<R> {
    pub async fn execute(&self, filter: &HospitalFilter) -> Result<Vec<Hospital>, ApiError> {
        self.repo.list(filter).await
    }
}

// ── GetHospital ──────────────────────────────────────────────────────────────

pub struct GetHospitalUseCase<R: HospitalRepository> {
    pub repo: R,
}

impl<R: HospitalRepository> GetHospitalUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<Hospital, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::HospitalNotFound)
    }

    pub async fn execute_for_user(&self, user_id: Uuid) -> Result<Hospital, ApiError> {
        self.repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(ApiError::HospitalNotFound)
    }
}

// ── CreateHospital ───────────────────────────────────────────────────────────

pub struct CreateHospitalUseCase<R: HospitalRepository> {
    pub repo: R,
}

impl<R: HospitalRepository> CreateHospitalUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        profile: HospitalProfile,
    ) -> Result<Hospital, ApiError> {
        profile.validate()?;
        if self.repo.find_by_user_id(user_id).await?.is_some() {
            return Err(ApiError::HospitalProfileExists);
        }
        let hospital = self.repo.create(user_id, &profile).await?;
        tracing::info!(hospital_id = hospital.id, %user_id, "hospital profile created");
        Ok(hospital)
    }
}

// ── UpdateHospital ───────────────────────────────────────────────────────────

pub struct UpdateHospitalUseCase<R: HospitalRepository> {
    pub repo: R,
}

impl<R: HospitalRepository> UpdateHospitalUseCase<R> {
    pub async fn execute(
        &self,
        caller: Uuid,
        id: i64,
        patch: Result<HospitalPatch, ApiError>,
    ) -> Result<Hospital, ApiError> {
        let hospital = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::HospitalNotFound)?;
        if hospital.user_id != caller {
            return Err(ApiError::NotOwner);
        }
        let patch = patch?;
        patch.validate()?;
        self.repo.update(id, &patch).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use chrono::Utc;

    #[derive(Default)]
    struct MockHospitalRepo {
        hospitals: Mutex<Vec<Hospital>>,
    }

    impl HospitalRepository for MockHospitalRepo {
        async fn list(&self, _filter: &HospitalFilter) -> Result<Vec<Hospital>, ApiError> {
            Ok(self.hospitals.lock().unwrap().clone())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Hospital>, ApiError> {
            Ok(self
                .hospitals
                .lock()
                .unwrap()
                .iter()
                .find(|h| h.id == id)
                .cloned())
        }

        async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Hospital>, ApiError> {
            Ok(self
                .hospitals
                .lock()
                .unwrap()
                .iter()
                .find(|h| h.user_id == user_id)
                .cloned())
        }

        async fn create(
            &self,
            user_id: Uuid,
            profile: &HospitalProfile,
        ) -> Result<Hospital, ApiError> {
            let hospital = hospital(1, user_id, &profile.name);
            self.hospitals.lock().unwrap().push(hospital.clone());
            Ok(hospital)
        }

        async fn update(&self, id: i64, patch: &HospitalPatch) -> Result<Hospital, ApiError> {
            let mut hospitals = self.hospitals.lock().unwrap();
            let hospital = hospitals
                .iter_mut()
                .find(|h| h.id == id)
                .ok_or(ApiError::HospitalNotFound)?;
            if let Some(ref name) = patch.name {
                hospital.name = name.clone();
            }
            Ok(hospital.clone())
        }

        async fn set_verified(
            &self,
            _id: i64,
            _verified: bool,
        ) -> Result<Option<Hospital>, ApiError> {
            Ok(None)
        }
    }

    fn hospital(id: i64, user_id: Uuid, name: &str) -> Hospital {
        Hospital {
            id,
            user_id,
            name: name.into(),
            address: "1 Marina".into(),
            city: "Lagos".into(),
            phone: "+234".into(),
            email: None,
            latitude: None,
            longitude: None,
            emergency_contact: None,
            verified: false,
            created_at: Utc::now(),
        }
    }

    fn profile() -> HospitalProfile {
        HospitalProfile {
            name: "General".into(),
            address: "1 Marina".into(),
            city: "Lagos".into(),
            phone: "+234".into(),
            email: Some("desk@general.ng".into()),
            latitude: None,
            longitude: None,
            emergency_contact: None,
        }
    }

    #[tokio::test]
    async fn should_reject_duplicate_hospital_profile() {
        let user_id = Uuid::new_v4();
        let usecase = CreateHospitalUseCase {
            repo: MockHospitalRepo::default(),
        };
        usecase.execute(user_id, profile()).await.unwrap();
        let result = usecase.execute(user_id, profile()).await;
        assert!(matches!(result, Err(ApiError::HospitalProfileExists)));
    }

    #[tokio::test]
    async fn should_create_unverified_hospital() {
        let usecase = CreateHospitalUseCase {
            repo: MockHospitalRepo::default(),
        };
        let created = usecase.execute(Uuid::new_v4(), profile()).await.unwrap();
        assert!(!created.verified);
    }

    #[tokio::test]
    async fn should_refuse_update_from_non_owner() {
        let repo = MockHospitalRepo::default();
        repo.hospitals
            .lock()
            .unwrap()
            .push(hospital(3, Uuid::new_v4(), "General"));
        let usecase = UpdateHospitalUseCase { repo };

        let result = usecase
            .execute(
                Uuid::new_v4(),
                3,
                Ok(HospitalPatch {
                    name: Some("Renamed".into()),
                    ..Default::default()
                }),
            )
            .await;
        assert!(matches!(result, Err(ApiError::NotOwner)));
    }

    #[tokio::test]
    async fn should_update_for_owner() {
        let owner = Uuid::new_v4();
        let repo = MockHospitalRepo::default();
        repo.hospitals
            .lock()
            .unwrap()
            .push(hospital(3, owner, "General"));
        let usecase = UpdateHospitalUseCase { repo };

        let updated = usecase
            .execute(
                owner,
                3,
                Ok(HospitalPatch {
                    name: Some("Renamed".into()),
                    ..Default::default()
                }),
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Renamed");
    }

    #[tokio::test]
    async fn should_return_hospital_not_found() {
        let usecase = GetHospitalUseCase {
            repo: MockHospitalRepo::default(),
        };
        let result = usecase.execute(42).await;
        assert!(matches!(result, Err(ApiError::HospitalNotFound)));
    }
}
