use std::time::Duration;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    routing::{delete, get, patch, post, put},
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use beos_core::health::{healthz, readyz};
use beos_core::middleware::{X_REQUEST_ID, propagate_request_id_layer, request_id_layer};

use crate::handlers::{
    admin::{delete_user, get_stats, list_users, verify_blood_bank, verify_hospital},
    auth::{login, me, register},
    blood_bank::{
        add_batch, create_blood_bank, get_blood_bank, get_inventory, get_inventory_totals,
        get_my_blood_bank, list_batches, list_blood_banks, search_blood_banks, set_inventory,
        update_blood_bank,
    },
    donor::{
        create_donor, get_donor, get_my_donor, list_donors, update_donor, update_donor_status,
    },
    emergency::{create_request, get_request, list_requests, update_request_status},
    hospital::{create_hospital, get_hospital, get_my_hospital, list_hospitals, update_hospital},
    realtime::ws_handler,
};
use crate::state::AppState;

pub fn build_router(state: AppState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        // Auth
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/me", get(me))
        // Donors
        .route("/donors", get(list_donors).post(create_donor))
        .route("/donors/me", get(get_my_donor))
        .route("/donors/{id}", get(get_donor).put(update_donor))
        .route("/donors/{id}/status", patch(update_donor_status))
        // Hospitals
        .route("/hospitals", get(list_hospitals).post(create_hospital))
        .route("/hospitals/me", get(get_my_hospital))
        .route("/hospitals/{id}", get(get_hospital).put(update_hospital))
        // Blood banks
        .route("/blood-banks", get(list_blood_banks).post(create_blood_bank))
        .route("/blood-banks/me", get(get_my_blood_bank))
        .route("/blood-banks/search/{blood_type}", get(search_blood_banks))
        .route("/blood-banks/inventory/total", get(get_inventory_totals))
        .route(
            "/blood-banks/inventory/batches",
            get(list_batches).post(add_batch),
        )
        .route(
            "/blood-banks/{id}",
            get(get_blood_bank).put(update_blood_bank),
        )
        .route(
            "/blood-banks/{id}/inventory",
            get(get_inventory).put(set_inventory),
        )
        // Emergency requests
        .route("/emergency", get(list_requests).post(create_request))
        .route("/emergency/{id}", get(get_request))
        .route("/emergency/{id}/status", patch(update_request_status))
        // Admin
        .route("/admin/stats", get(get_stats))
        .route("/admin/users", get(list_users))
        .route("/admin/users/{user_id}", delete(delete_user))
        .route("/admin/hospitals/{id}/verification", patch(verify_hospital))
        .route(
            "/admin/blood-banks/{id}/verification",
            patch(verify_blood_bank),
        );

    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Realtime
        .route("/ws", get(ws_handler))
        .nest("/api/v1", api)
        .layer(cors_layer(cors_origins))
        .layer(TraceLayer::new_for_http())
        .layer(propagate_request_id_layer())
        .layer(request_id_layer())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, X_REQUEST_ID])
        .expose_headers([X_REQUEST_ID])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}
