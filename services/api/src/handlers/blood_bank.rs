use std::collections::BTreeMap;

use axum::{Json, extract::State, http::StatusCode};
use chrono::NaiveDate;
use serde::Deserialize;

use beos_auth_types::bearer::AuthUser;
use beos_domain::blood::BloodType;

use crate::domain::types::{
    BloodBank, BloodBankFilter, BloodBankPatch, BloodBankProfile, BloodBatch, InventoryItem,
    StockQuery,
};
use crate::error::ApiError;
use crate::handlers::{ApiJson, ApiPath, ApiQuery};
use crate::state::AppState;
use crate::usecase::blood_bank::{
    AddBatchInput, AddBatchUseCase, CreateBloodBankUseCase, GetBloodBankUseCase,
    InventoryTotalsUseCase, ListBatchesUseCase, ListBloodBanksUseCase, ListInventoryUseCase,
    SearchBloodBanksUseCase, SetInventoryInput, SetInventoryUseCase, UpdateBloodBankUseCase,
};

// ── GET /blood-banks ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct BloodBankQuery {
    pub city: Option<String>,
    pub verified: Option<bool>,
}

pub async fn list_blood_banks(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<BloodBankQuery>,
) -> Result<Json<Vec<BloodBank>>, ApiError> {
    let usecase = ListBloodBanksUseCase {
        repo: state.blood_bank_repo(),
    };
    let banks = usecase
        .execute(&BloodBankFilter {
            city: query.city,
            verified: query.verified,
        })
        .await?;
    Ok(Json(banks))
}

// ── GET /blood-banks/search/{blood_type} ─────────────────────────────────────

#[derive(Deserialize)]
pub struct StockSearchQuery {
    #[serde(rename = "minUnits", default = "default_min_units")]
    pub min_units: i32,
    pub city: Option<String>,
}

fn default_min_units() -> i32 {
    1
}

pub async fn search_blood_banks(
    State(state): State<AppState>,
    ApiPath(blood_type): ApiPath<String>,
    ApiQuery(query): ApiQuery<StockSearchQuery>,
) -> Result<Json<Vec<BloodBank>>, ApiError> {
    // Path segments arrive percent-decoded, so "A%2B" reads as "A+".
    let blood_type = blood_type
        .parse::<BloodType>()
        .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
    let usecase = SearchBloodBanksUseCase {
        repo: state.blood_bank_repo(),
    };
    let banks = usecase
        .execute(&StockQuery {
            blood_type,
            min_units: query.min_units,
            city: query.city,
        })
        .await?;
    Ok(Json(banks))
}

// ── GET /blood-banks/inventory/total ─────────────────────────────────────────

pub async fn get_inventory_totals(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, i64>>, ApiError> {
    let usecase = InventoryTotalsUseCase {
        inventory: state.inventory_repo(),
    };
    Ok(Json(usecase.execute().await?))
}

// ── GET /blood-banks/me ──────────────────────────────────────────────────────

pub async fn get_my_blood_bank(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<BloodBank>, ApiError> {
    let usecase = GetBloodBankUseCase {
        repo: state.blood_bank_repo(),
    };
    Ok(Json(usecase.execute_for_user(caller.user_id).await?))
}

// ── GET /blood-banks/{id} ────────────────────────────────────────────────────

pub async fn get_blood_bank(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<BloodBank>, ApiError> {
    let usecase = GetBloodBankUseCase {
        repo: state.blood_bank_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── GET /blood-banks/{id}/inventory ──────────────────────────────────────────

pub async fn get_inventory(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
    let usecase = ListInventoryUseCase {
        banks: state.blood_bank_repo(),
        inventory: state.inventory_repo(),
    };
    Ok(Json(usecase.execute(id).await?))
}

// ── POST /blood-banks ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CreateBloodBankRequest {
    pub name: String,
    pub address: String,
    pub city: String,
    pub phone: String,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub operating_hours: Option<String>,
}

pub async fn create_blood_bank(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreateBloodBankRequest>,
) -> Result<(StatusCode, Json<BloodBank>), ApiError> {
    let usecase = CreateBloodBankUseCase {
        repo: state.blood_bank_repo(),
    };
    let bank = usecase
        .execute(
            caller.user_id,
            BloodBankProfile {
                name: body.name,
                address: body.address,
                city: body.city,
                phone: body.phone,
                email: body.email,
                latitude: body.latitude,
                longitude: body.longitude,
                operating_hours: body.operating_hours,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(bank)))
}

// ── PUT /blood-banks/{id} ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct UpdateBloodBankRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub operating_hours: Option<String>,
}

pub async fn update_blood_bank(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<UpdateBloodBankRequest>, ApiError>,
) -> Result<Json<BloodBank>, ApiError> {
    let usecase = UpdateBloodBankUseCase {
        repo: state.blood_bank_repo(),
    };
    let patch = body.map(|ApiJson(body)| BloodBankPatch {
        name: body.name,
        address: body.address,
        city: body.city,
        phone: body.phone,
        email: body.email,
        latitude: body.latitude,
        longitude: body.longitude,
        operating_hours: body.operating_hours,
    });
    Ok(Json(usecase.execute(caller.user_id, id, patch).await?))
}

// ── PUT /blood-banks/{id}/inventory ──────────────────────────────────────────

#[derive(Deserialize)]
pub struct SetInventoryRequest {
    pub blood_type: BloodType,
    pub units: i32,
}

pub async fn set_inventory(
    caller: AuthUser,
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    body: Result<ApiJson<SetInventoryRequest>, ApiError>,
) -> Result<Json<InventoryItem>, ApiError> {
    let usecase = SetInventoryUseCase {
        banks: state.blood_bank_repo(),
        inventory: state.inventory_repo(),
    };
    let input = body.map(|ApiJson(body)| SetInventoryInput {
        blood_type: body.blood_type,
        units: body.units,
    });
    Ok(Json(usecase.execute(caller.user_id, id, input).await?))
}

// ── POST /blood-banks/inventory/batches ──────────────────────────────────────

#[derive(Deserialize)]
pub struct AddBatchRequest {
    pub blood_type: BloodType,
    pub units: i32,
    pub expiry_date: NaiveDate,
}

pub async fn add_batch(
    caller: AuthUser,
    State(state): State<AppState>,
    body: Result<ApiJson<AddBatchRequest>, ApiError>,
) -> Result<(StatusCode, Json<BloodBatch>), ApiError> {
    let usecase = AddBatchUseCase {
        banks: state.blood_bank_repo(),
        inventory: state.inventory_repo(),
    };
    let input = body.map(|ApiJson(body)| AddBatchInput {
        blood_type: body.blood_type,
        units: body.units,
        expiry_date: body.expiry_date,
    });
    let batch = usecase.execute(caller.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(batch)))
}

// ── GET /blood-banks/inventory/batches ───────────────────────────────────────

pub async fn list_batches(
    caller: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<BloodBatch>>, ApiError> {
    let usecase = ListBatchesUseCase {
        banks: state.blood_bank_repo(),
        inventory: state.inventory_repo(),
    };
    Ok(Json(usecase.execute(caller.user_id).await?))
}
