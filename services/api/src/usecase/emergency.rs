use anyhow::Context as _;
use chrono::Utc;

use beos_auth_types::bearer::AuthUser;
use beos_domain::request::RequestStatus;

use crate::domain::repository::{BloodRequestRepository, HospitalRepository, Notifier};
use crate::domain::types::{
    BloodRequest, EVENT_NEW_EMERGENCY, EVENT_REQUEST_FULFILLED, EVENT_REQUEST_UPDATE, Hospital,
    NewBloodRequest, RequestDetails, RequestFilter, Room,
};
use crate::error::ApiError;

/// Rooms interested in a request: the issuing hospital's city and the
/// requested blood type.
fn request_rooms(request: &BloodRequest, hospital: Option<&Hospital>) -> Vec<Room> {
    hospital
        .and_then(|h| Room::city(&h.city))
        .into_iter()
        .chain(std::iter::once(Room::BloodType(request.blood_type)))
        .collect()
}

fn broadcast<N: Notifier>(
    notifier: &N,
    rooms: &[Room],
    events: &[&str],
    request: &BloodRequest,
) -> Result<(), ApiError> {
    let payload = serde_json::to_value(request).context("serialize blood request event")?;
    for event in events {
        for room in rooms {
            notifier.publish(room, event, payload.clone());
        }
    }
    Ok(())
}

// ── ListRequests ─────────────────────────────────────────────────────────────

pub struct ListRequestsUseCase<Q: BloodRequestRepository> {
    pub repo: Q,
}

impl<Q: BloodRequestRepository> ListRequestsUseCase<Q> {
    pub async fn execute(&self, filter: &RequestFilter) -> Result<Vec<BloodRequest>, ApiError> {
        self.repo.list(filter).await
    }
}

// ── GetRequest ───────────────────────────────────────────────────────────────

pub struct GetRequestUseCase<Q: BloodRequestRepository> {
    pub repo: Q,
}

impl<Q: BloodRequestRepository> GetRequestUseCase<Q> {
    pub async fn execute(&self, id: i64) -> Result<BloodRequest, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::RequestNotFound)
    }
}

// ── CreateRequest ────────────────────────────────────────────────────────────

pub struct CreateRequestUseCase<H: HospitalRepository, Q: BloodRequestRepository, N: Notifier> {
    pub hospitals: H,
    pub requests: Q,
    pub notifier: N,
}

impl<H: HospitalRepository, Q: BloodRequestRepository, N: Notifier> CreateRequestUseCase<H, Q, N> {
    /// `hospital_id` is honoured only for admins; hospital callers always
    /// file against their own profile.
    pub async fn execute(
        &self,
        caller: &AuthUser,
        hospital_id: Option<i64>,
        details: RequestDetails,
    ) -> Result<BloodRequest, ApiError> {
        let hospital = match self.hospitals.find_by_user_id(caller.user_id).await? {
            Some(own) => Some(own),
            None if caller.is_admin() => match hospital_id {
                Some(id) => Some(
                    self.hospitals
                        .find_by_id(id)
                        .await?
                        .ok_or(ApiError::HospitalNotFound)?,
                ),
                None => None,
            },
            None => return Err(ApiError::HospitalProfileRequired),
        };
        details.validate()?;

        let request = self
            .requests
            .create(&NewBloodRequest {
                hospital_id: hospital.as_ref().map(|h| h.id),
                hospital_name: hospital.as_ref().map(|h| h.name.clone()),
                details,
                status: RequestStatus::Pending,
                created_at: Utc::now(),
            })
            .await?;
        tracing::info!(
            request_id = request.id,
            hospital_id = ?request.hospital_id,
            blood_type = %request.blood_type,
            urgency = %request.urgency,
            "emergency request created"
        );

        let rooms = request_rooms(&request, hospital.as_ref());
        broadcast(&self.notifier, &rooms, &[EVENT_NEW_EMERGENCY], &request)?;
        Ok(request)
    }
}

// ── UpdateRequestStatus ──────────────────────────────────────────────────────

pub struct UpdateRequestStatusUseCase<
    H: HospitalRepository,
    Q: BloodRequestRepository,
    N: Notifier,
> {
    pub hospitals: H,
    pub requests: Q,
    pub notifier: N,
}

impl<H: HospitalRepository, Q: BloodRequestRepository, N: Notifier>
    UpdateRequestStatusUseCase<H, Q, N>
{
    pub async fn execute(
        &self,
        caller: &AuthUser,
        id: i64,
        status: Result<RequestStatus, ApiError>,
    ) -> Result<BloodRequest, ApiError> {
        let request = self
            .requests
            .find_by_id(id)
            .await?
            .ok_or(ApiError::RequestNotFound)?;
        let hospital = match request.hospital_id {
            Some(hospital_id) => self.hospitals.find_by_id(hospital_id).await?,
            None => None,
        };
        let owns = hospital
            .as_ref()
            .is_some_and(|h| h.user_id == caller.user_id);
        if !owns && !caller.is_admin() {
            return Err(ApiError::NotOwner);
        }
        let status = status?;

        let fulfilled_at = (status == RequestStatus::Fulfilled).then(Utc::now);
        let updated = self
            .requests
            .update_status(id, status, fulfilled_at)
            .await?
            .ok_or(ApiError::RequestNotFound)?;
        tracing::info!(request_id = id, from = %request.status, to = %status, "request status changed");

        let rooms = request_rooms(&updated, hospital.as_ref());
        let events: &[&str] = if status == RequestStatus::Fulfilled {
            &[EVENT_REQUEST_UPDATE, EVENT_REQUEST_FULFILLED]
        } else {
            &[EVENT_REQUEST_UPDATE]
        };
        broadcast(&self.notifier, &rooms, events, &updated)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use beos_domain::blood::BloodType;
    use beos_domain::request::UrgencyLevel;
    use beos_domain::user::UserRole;
    use chrono::DateTime;
    use uuid::Uuid;

    use crate::domain::types::{DEFAULT_COMPONENT_TYPE, HospitalFilter, HospitalPatch, HospitalProfile};

    struct MockHospitalRepo {
        hospitals: Vec<Hospital>,
    }

    impl HospitalRepository for MockHospitalRepo {
        async fn list(&self, _filter: &HospitalFilter) -> Result<Vec<Hospital>, ApiError> {
            Ok(self.hospitals.clone())
        }
        async fn find_by_id(&self, id: i64) -> Result<Option<Hospital>, ApiError> {
            Ok(self.hospitals.iter().find(|h| h.id == id).cloned())
        }
        async fn find_by_user_id(&self, user_id: Uuid) -> Result<Option<Hospital>, ApiError> {
            Ok(self.hospitals.iter().find(|h| h.user_id == user_id).cloned())
        }
        async fn create(
            &self,
            _user_id: Uuid,
            _profile: &HospitalProfile,
        ) -> Result<Hospital, ApiError> {
            unimplemented!()
        }
        async fn update(&self, _id: i64, _patch: &HospitalPatch) -> Result<Hospital, ApiError> {
            unimplemented!()
        }
        async fn set_verified(
            &self,
            _id: i64,
            _verified: bool,
        ) -> Result<Option<Hospital>, ApiError> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct MockRequestRepo {
        requests: Mutex<Vec<BloodRequest>>,
    }

    impl BloodRequestRepository for MockRequestRepo {
        async fn list(&self, _filter: &RequestFilter) -> Result<Vec<BloodRequest>, ApiError> {
            Ok(self.requests.lock().unwrap().clone())
        }
        async fn find_by_id(&self, id: i64) -> Result<Option<BloodRequest>, ApiError> {
            Ok(self
                .requests
                .lock()
                .unwrap()
                .iter()
                .find(|r| r.id == id)
                .cloned())
        }
        async fn create(&self, new: &NewBloodRequest) -> Result<BloodRequest, ApiError> {
            let mut requests = self.requests.lock().unwrap();
            let mut request = blood_request(requests.len() as i64 + 1, new.hospital_id);
            request.hospital_name = new.hospital_name.clone();
            request.blood_type = new.details.blood_type;
            request.units = new.details.units;
            request.status = new.status;
            requests.push(request.clone());
            Ok(request)
        }
        async fn update_status(
            &self,
            id: i64,
            status: RequestStatus,
            fulfilled_at: Option<DateTime<Utc>>,
        ) -> Result<Option<BloodRequest>, ApiError> {
            let mut requests = self.requests.lock().unwrap();
            let Some(request) = requests.iter_mut().find(|r| r.id == id) else {
                return Ok(None);
            };
            request.status = status;
            if fulfilled_at.is_some() {
                request.fulfilled_at = fulfilled_at;
            }
            Ok(Some(request.clone()))
        }
    }

    #[derive(Default)]
    struct MockNotifier {
        published: Mutex<Vec<(String, String)>>,
    }

    impl Notifier for MockNotifier {
        fn publish(&self, room: &Room, event: &str, _data: serde_json::Value) {
            self.published
                .lock()
                .unwrap()
                .push((room.to_string(), event.to_owned()));
        }
    }

    fn hospital(id: i64, user_id: Uuid) -> Hospital {
        Hospital {
            id,
            user_id,
            name: "General".into(),
            address: "1 Marina".into(),
            city: "Lagos".into(),
            phone: "+234".into(),
            email: None,
            latitude: None,
            longitude: None,
            emergency_contact: None,
            verified: true,
            created_at: Utc::now(),
        }
    }

    fn blood_request(id: i64, hospital_id: Option<i64>) -> BloodRequest {
        BloodRequest {
            id,
            hospital_id,
            hospital_name: None,
            patient_name: None,
            age: None,
            gender: None,
            blood_type: BloodType::ONegative,
            units: 2,
            component_type: DEFAULT_COMPONENT_TYPE.into(),
            urgency: UrgencyLevel::Critical,
            is_critical: true,
            diagnosis: None,
            allergies: None,
            doctor_name: None,
            status: RequestStatus::Pending,
            contact_phone: None,
            notes: None,
            donor_id: None,
            created_at: Utc::now(),
            fulfilled_at: None,
        }
    }

    fn details(units: i32) -> RequestDetails {
        RequestDetails {
            patient_name: Some("J. Doe".into()),
            age: Some(40),
            gender: None,
            blood_type: BloodType::ONegative,
            units,
            component_type: None,
            urgency: UrgencyLevel::Critical,
            is_critical: true,
            diagnosis: None,
            allergies: None,
            doctor_name: None,
            contact_phone: None,
            notes: None,
            donor_id: None,
        }
    }

    fn caller(user_id: Uuid, role: UserRole) -> AuthUser {
        AuthUser {
            user_id,
            role,
        }
    }

    #[tokio::test]
    async fn should_file_request_against_callers_hospital_and_notify_rooms() {
        let owner = Uuid::new_v4();
        let usecase = CreateRequestUseCase {
            hospitals: MockHospitalRepo {
                hospitals: vec![hospital(3, owner)],
            },
            requests: MockRequestRepo::default(),
            notifier: MockNotifier::default(),
        };

        // A hospital cannot file on behalf of another hospital.
        let request = usecase
            .execute(&caller(owner, UserRole::Hospital), Some(99), details(2))
            .await
            .unwrap();

        assert_eq!(request.hospital_id, Some(3));
        assert_eq!(request.hospital_name.as_deref(), Some("General"));
        assert_eq!(request.status, RequestStatus::Pending);
        let published = usecase.notifier.published.lock().unwrap();
        assert_eq!(
            *published,
            vec![
                ("city_lagos".to_owned(), EVENT_NEW_EMERGENCY.to_owned()),
                ("type_O-".to_owned(), EVENT_NEW_EMERGENCY.to_owned()),
            ]
        );
    }

    #[tokio::test]
    async fn should_require_hospital_profile_for_non_admin() {
        let usecase = CreateRequestUseCase {
            hospitals: MockHospitalRepo { hospitals: vec![] },
            requests: MockRequestRepo::default(),
            notifier: MockNotifier::default(),
        };
        let result = usecase
            .execute(&caller(Uuid::new_v4(), UserRole::Donor), None, details(2))
            .await;
        assert!(matches!(result, Err(ApiError::HospitalProfileRequired)));
        assert!(usecase.notifier.published.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn should_let_admin_file_for_named_hospital() {
        let usecase = CreateRequestUseCase {
            hospitals: MockHospitalRepo {
                hospitals: vec![hospital(3, Uuid::new_v4())],
            },
            requests: MockRequestRepo::default(),
            notifier: MockNotifier::default(),
        };
        let request = usecase
            .execute(&caller(Uuid::new_v4(), UserRole::Admin), Some(3), details(1))
            .await
            .unwrap();
        assert_eq!(request.hospital_id, Some(3));

        let missing = usecase
            .execute(&caller(Uuid::new_v4(), UserRole::Admin), Some(8), details(1))
            .await;
        assert!(matches!(missing, Err(ApiError::HospitalNotFound)));
    }

    #[tokio::test]
    async fn should_reject_request_without_units() {
        let owner = Uuid::new_v4();
        let usecase = CreateRequestUseCase {
            hospitals: MockHospitalRepo {
                hospitals: vec![hospital(3, owner)],
            },
            requests: MockRequestRepo::default(),
            notifier: MockNotifier::default(),
        };
        let result = usecase
            .execute(&caller(owner, UserRole::Hospital), None, details(0))
            .await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    fn status_usecase(
        owner: Uuid,
    ) -> UpdateRequestStatusUseCase<MockHospitalRepo, MockRequestRepo, MockNotifier> {
        let requests = MockRequestRepo::default();
        requests
            .requests
            .lock()
            .unwrap()
            .push(blood_request(1, Some(3)));
        UpdateRequestStatusUseCase {
            hospitals: MockHospitalRepo {
                hospitals: vec![hospital(3, owner)],
            },
            requests,
            notifier: MockNotifier::default(),
        }
    }

    #[tokio::test]
    async fn should_stamp_fulfilled_at_and_publish_both_events() {
        let owner = Uuid::new_v4();
        let usecase = status_usecase(owner);

        let updated = usecase
            .execute(
                &caller(owner, UserRole::Hospital),
                1,
                Ok(RequestStatus::Fulfilled),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Fulfilled);
        assert!(updated.fulfilled_at.is_some());
        let events: Vec<String> = usecase
            .notifier
            .published
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e)| e.clone())
            .collect();
        assert_eq!(
            events,
            vec![
                EVENT_REQUEST_UPDATE,
                EVENT_REQUEST_UPDATE,
                EVENT_REQUEST_FULFILLED,
                EVENT_REQUEST_FULFILLED
            ]
        );
    }

    #[tokio::test]
    async fn should_not_stamp_fulfilled_at_on_cancel() {
        let owner = Uuid::new_v4();
        let usecase = status_usecase(owner);

        let updated = usecase
            .execute(
                &caller(owner, UserRole::Hospital),
                1,
                Ok(RequestStatus::Cancelled),
            )
            .await
            .unwrap();

        assert_eq!(updated.status, RequestStatus::Cancelled);
        assert!(updated.fulfilled_at.is_none());
        assert_eq!(usecase.notifier.published.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn should_refuse_status_change_from_other_hospital() {
        let usecase = status_usecase(Uuid::new_v4());
        let result = usecase
            .execute(
                &caller(Uuid::new_v4(), UserRole::Hospital),
                1,
                Err(ApiError::InvalidRequest("bad status".into())),
            )
            .await;
        assert!(matches!(result, Err(ApiError::NotOwner)));
    }

    #[tokio::test]
    async fn should_let_admin_change_any_status() {
        let usecase = status_usecase(Uuid::new_v4());
        let updated = usecase
            .execute(
                &caller(Uuid::new_v4(), UserRole::Admin),
                1,
                Ok(RequestStatus::Cancelled),
            )
            .await
            .unwrap();
        assert_eq!(updated.status, RequestStatus::Cancelled);
    }

    #[tokio::test]
    async fn should_return_request_not_found() {
        let usecase = status_usecase(Uuid::new_v4());
        let result = usecase
            .execute(
                &caller(Uuid::new_v4(), UserRole::Admin),
                404,
                Ok(RequestStatus::Fulfilled),
            )
            .await;
        assert!(matches!(result, Err(ApiError::RequestNotFound)));
    }
}
