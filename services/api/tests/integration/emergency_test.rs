use beos_api::domain::types::RequestDetails;
use beos_api::error::ApiError;
use beos_api::infra::realtime::RealtimeHub;
use beos_api::usecase::emergency::{CreateRequestUseCase, UpdateRequestStatusUseCase};
use beos_domain::blood::BloodType;
use beos_domain::request::{RequestStatus, UrgencyLevel};
use beos_domain::user::UserRole;
use uuid::Uuid;

use crate::helpers::{MockHospitalRepo, MockRequestRepo, caller, test_hospital};

fn details(blood_type: BloodType) -> RequestDetails {
    RequestDetails {
        patient_name: Some("A. Okafor".to_owned()),
        age: Some(34),
        gender: None,
        blood_type,
        units: 3,
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

#[tokio::test]
async fn should_broadcast_request_lifecycle_to_city_and_type_rooms() {
    let owner = Uuid::new_v4();
    let hub = RealtimeHub::new();
    let mut events = hub.subscribe();
    let requests = MockRequestRepo::default();

    let created = CreateRequestUseCase {
        hospitals: MockHospitalRepo::new(vec![test_hospital(2, owner, "Port Harcourt")]),
        requests: requests.share(),
        notifier: hub.clone(),
    }
    .execute(&caller(owner, UserRole::Hospital), None, details(BloodType::ONegative))
    .await
    .unwrap();
    assert_eq!(created.status, RequestStatus::Pending);
    assert_eq!(created.hospital_name.as_deref(), Some("Hospital 2"));

    let first = events.recv().await.unwrap();
    let second = events.recv().await.unwrap();
    assert_eq!(first.event, "new-emergency");
    assert_eq!(first.room, "city_port harcourt");
    assert_eq!(second.room, "type_O-");
    assert_eq!(second.data["units"], 3);

    let fulfilled = UpdateRequestStatusUseCase {
        hospitals: MockHospitalRepo::new(vec![test_hospital(2, owner, "Port Harcourt")]),
        requests: requests.share(),
        notifier: hub.clone(),
    }
    .execute(
        &caller(owner, UserRole::Hospital),
        created.id,
        Ok(RequestStatus::Fulfilled),
    )
    .await
    .unwrap();
    assert!(fulfilled.fulfilled_at.is_some());

    let mut published = Vec::new();
    for _ in 0..4 {
        let event = events.recv().await.unwrap();
        published.push((event.event, event.room));
    }
    assert_eq!(
        published,
        vec![
            ("request-update".to_owned(), "city_port harcourt".to_owned()),
            ("request-update".to_owned(), "type_O-".to_owned()),
            ("request-fulfilled".to_owned(), "city_port harcourt".to_owned()),
            ("request-fulfilled".to_owned(), "type_O-".to_owned()),
        ]
    );
    assert!(events.try_recv().is_err());

    let stored = requests.requests_handle();
    assert_eq!(stored.lock().unwrap()[0].status, RequestStatus::Fulfilled);
}

#[tokio::test]
async fn should_publish_only_type_room_for_admin_request_without_hospital() {
    let hub = RealtimeHub::new();
    let mut events = hub.subscribe();

    let created = CreateRequestUseCase {
        hospitals: MockHospitalRepo::new(vec![]),
        requests: MockRequestRepo::default(),
        notifier: hub.clone(),
    }
    .execute(
        &caller(Uuid::new_v4(), UserRole::Admin),
        None,
        details(BloodType::AbPositive),
    )
    .await
    .unwrap();
    assert_eq!(created.hospital_id, None);
    assert_eq!(created.component_type, "Whole Blood");

    let event = events.recv().await.unwrap();
    assert_eq!(event.room, "type_AB+");
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn should_leave_request_untouched_when_stranger_changes_status() {
    let owner = Uuid::new_v4();
    let hub = RealtimeHub::new();
    let mut events = hub.subscribe();
    let requests = MockRequestRepo::default();
    let hospitals = || MockHospitalRepo::new(vec![test_hospital(2, owner, "Lagos")]);

    let created = CreateRequestUseCase {
        hospitals: hospitals(),
        requests: requests.share(),
        notifier: hub.clone(),
    }
    .execute(&caller(owner, UserRole::Hospital), None, details(BloodType::BNegative))
    .await
    .unwrap();
    while events.try_recv().is_ok() {}

    let result = UpdateRequestStatusUseCase {
        hospitals: hospitals(),
        requests: requests.share(),
        notifier: hub.clone(),
    }
    .execute(
        &caller(Uuid::new_v4(), UserRole::Hospital),
        created.id,
        Ok(RequestStatus::Cancelled),
    )
    .await;

    assert!(
        matches!(result, Err(ApiError::NotOwner)),
        "expected NotOwner, got {result:?}"
    );
    assert_eq!(
        requests.requests_handle().lock().unwrap()[0].status,
        RequestStatus::Pending
    );
    assert!(events.try_recv().is_err());
}
