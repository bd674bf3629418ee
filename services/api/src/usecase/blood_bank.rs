use std::collections::BTreeMap;

use chrono::NaiveDate;
use uuid::Uuid;

use beos_domain::blood::BloodType;

use crate::domain::repository::{BloodBankRepository, InventoryRepository};
use crate::domain::types::{
    BloodBank, BloodBankFilter, BloodBankPatch, BloodBankProfile, BloodBatch, InventoryItem,
    MAX_INVENTORY_UNITS, NewBloodBatch, StockQuery, validate_inventory_units,
};
use crate::error::ApiError;

// ── ListBloodBanks ───────────────────────────────────────────────────────────

pub struct ListBloodBanksUseCase<R: BloodBankRepository> {
    pub repo: R,
}

impl<R: BloodBankRepository> ListBloodBanksUseCase<R> {
    pub async fn execute(&self, filter: &BloodBankFilter) -> Result<Vec<BloodBank>, ApiError> {
        self.repo.list(filter).await
    }
}

// ── SearchBloodBanks ─────────────────────────────────────────────────────────

pub struct SearchBloodBanksUseCase<R: BloodBankRepository> {
    pub repo: R,
}

impl<R: BloodBankRepository> SearchBloodBanksUseCase<R> {
    pub async fn execute(&self, query: &StockQuery) -> Result<Vec<BloodBank>, ApiError> {
        if query.min_units < 0 {
            return Err(ApiError::validation("minUnits must not be negative"));
        }
        self.repo.find_with_stock(query).await
    }
}

// ── GetBloodBank ─────────────────────────────────────────────────────────────

pub struct GetBloodBankUseCase<R: BloodBankRepository> {
    pub repo: R,
}

impl<R: BloodBankRepository> GetBloodBankUseCase<R> {
    pub async fn execute(&self, id: i64) -> Result<BloodBank, ApiError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(ApiError::BloodBankNotFound)
    }

    pub async fn execute_for_user(&self, user_id: Uuid) -> Result<BloodBank, ApiError> {
        self.repo
            .find_by_user_id(user_id)
            .await?
            .ok_or(ApiError::BloodBankNotFound)
    }
}

// ── CreateBloodBank ──────────────────────────────────────────────────────────

pub struct CreateBloodBankUseCase<R: BloodBankRepository> {
    pub repo: R,
}

impl<R: BloodBankRepository> CreateBloodBankUseCase<R> {
    pub async fn execute(
        &self,
        user_id: Uuid,
        profile: BloodBankProfile,
    ) -> Result<BloodBank, ApiError> {
        profile.validate()?;
        if self.repo.find_by_user_id(user_id).await?.is_some() {
            return Err(ApiError::BloodBankProfileExists);
        }
        let bank = self.repo.create(user_id, &profile).await?;
        tracing::info!(blood_bank_id = bank.id, %user_id, "blood bank profile created");
        Ok(bank)
    }
}

// ── UpdateBloodBank ──────────────────────────────────────────────────────────

pub struct UpdateBloodBankUseCase<R: BloodBankRepository> {
    pub repo: R,
}

impl<R: BloodBankRepository> UpdateBloodBankUseCase<R> {
    pub async fn execute(
        &self,
        caller: Uuid,
        id: i64,
        patch: Result<BloodBankPatch, ApiError>,
    ) -> Result<BloodBank, ApiError> {
        owned_bank(&self.repo, caller, id).await?;
        let patch = patch?;
        patch.validate()?;
        self.repo.update(id, &patch).await
    }
}

async fn owned_bank<R: BloodBankRepository>(
    repo: &R,
    caller: Uuid,
    id: i64,
) -> Result<BloodBank, ApiError> {
    let bank = repo
        .find_by_id(id)
        .await?
        .ok_or(ApiError::BloodBankNotFound)?;
    if bank.user_id != caller {
        return Err(ApiError::NotOwner);
    }
    Ok(bank)
}

// ── Inventory ────────────────────────────────────────────────────────────────

pub struct ListInventoryUseCase<B: BloodBankRepository, I: InventoryRepository> {
    pub banks: B,
    pub inventory: I,
}

impl<B: BloodBankRepository, I: InventoryRepository> ListInventoryUseCase<B, I> {
    pub async fn execute(&self, blood_bank_id: i64) -> Result<Vec<InventoryItem>, ApiError> {
        if self.banks.find_by_id(blood_bank_id).await?.is_none() {
            return Err(ApiError::BloodBankNotFound);
        }
        self.inventory.list_for_bank(blood_bank_id).await
    }
}

pub struct InventoryTotalsUseCase<I: InventoryRepository> {
    pub inventory: I,
}

impl<I: InventoryRepository> InventoryTotalsUseCase<I> {
    /// Units per blood type across all banks, keyed by the type's wire name.
    pub async fn execute(&self) -> Result<BTreeMap<String, i64>, ApiError> {
        let totals = self.inventory.totals_by_type().await?;
        Ok(totals
            .into_iter()
            .map(|(blood_type, units)| (blood_type.as_str().to_owned(), units))
            .collect())
    }
}

pub struct SetInventoryInput {
    pub blood_type: BloodType,
    pub units: i32,
}

pub struct SetInventoryUseCase<B: BloodBankRepository, I: InventoryRepository> {
    pub banks: B,
    pub inventory: I,
}

impl<B: BloodBankRepository, I: InventoryRepository> SetInventoryUseCase<B, I> {
    pub async fn execute(
        &self,
        caller: Uuid,
        blood_bank_id: i64,
        input: Result<SetInventoryInput, ApiError>,
    ) -> Result<InventoryItem, ApiError> {
        owned_bank(&self.banks, caller, blood_bank_id).await?;
        let input = input?;
        validate_inventory_units(input.units)?;
        self.inventory
            .set_units(blood_bank_id, input.blood_type, input.units)
            .await
    }
}

// ── Batches ──────────────────────────────────────────────────────────────────

pub struct AddBatchInput {
    pub blood_type: BloodType,
    pub units: i32,
    pub expiry_date: NaiveDate,
}

pub struct AddBatchUseCase<B: BloodBankRepository, I: InventoryRepository> {
    pub banks: B,
    pub inventory: I,
}

impl<B: BloodBankRepository, I: InventoryRepository> AddBatchUseCase<B, I> {
    pub async fn execute(
        &self,
        caller: Uuid,
        input: Result<AddBatchInput, ApiError>,
    ) -> Result<BloodBatch, ApiError> {
        let bank = self
            .banks
            .find_by_user_id(caller)
            .await?
            .ok_or(ApiError::BloodBankNotFound)?;
        let input = input?;
        let batch = NewBloodBatch {
            blood_bank_id: bank.id,
            blood_type: input.blood_type,
            units: input.units,
            expiry_date: input.expiry_date,
        };
        batch.validate()?;

        let stocked = self
            .inventory
            .list_for_bank(bank.id)
            .await?
            .into_iter()
            .find(|item| item.blood_type == batch.blood_type)
            .map_or(0, |item| item.units);
        if stocked > MAX_INVENTORY_UNITS - batch.units {
            return Err(ApiError::validation(format!(
                "stock of {} would exceed {MAX_INVENTORY_UNITS} units",
                batch.blood_type
            )));
        }

        let (batch, inventory) = self.inventory.add_batch(&batch).await?;
        tracing::info!(
            blood_bank_id = bank.id,
            blood_type = %batch.blood_type,
            added = batch.units,
            total = inventory.units,
            "blood batch recorded"
        );
        Ok(batch)
    }
}

pub struct ListBatchesUseCase<B: BloodBankRepository, I: InventoryRepository> {
    pub banks: B,
    pub inventory: I,
}

impl<B: BloodBankRepository, I: InventoryRepository> ListBatchesUseCase<B, I> {
    pub async fn execute(&self, caller: Uuid) -> Result<Vec<BloodBatch>, ApiError> {
        let bank = self
            .banks
            .find_by_user_id(caller)
            .await?
            .ok_or(ApiError::BloodBankNotFound)?;
        self.inventory.list_batches(bank.id).await
    }
}
