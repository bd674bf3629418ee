use std::sync::Arc;

use axum::extract::FromRef;
use sea_orm::DatabaseConnection;

use beos_auth_types::bearer::JwtSecret;

use crate::infra::db::{
    DbBloodBankRepository, DbBloodRequestRepository, DbDonorRepository, DbHospitalRepository,
    DbInventoryRepository, DbStatsRepository, DbUserRepository,
};
use crate::infra::identity::GoTrueClient;
use crate::infra::realtime::RealtimeHub;

/// Shared application state passed to every handler via axum `State`.
///
/// `DatabaseConnection` is not `Clone` under sea-orm's `mock` feature, so it is
/// shared through an `Arc`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub identity: GoTrueClient,
    pub realtime: RealtimeHub,
    pub jwt_secret: JwtSecret,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn donor_repo(&self) -> DbDonorRepository {
        DbDonorRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn hospital_repo(&self) -> DbHospitalRepository {
        DbHospitalRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn blood_bank_repo(&self) -> DbBloodBankRepository {
        DbBloodBankRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn inventory_repo(&self) -> DbInventoryRepository {
        DbInventoryRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn request_repo(&self) -> DbBloodRequestRepository {
        DbBloodRequestRepository {
            db: Arc::clone(&self.db),
        }
    }

    pub fn stats_repo(&self) -> DbStatsRepository {
        DbStatsRepository {
            db: Arc::clone(&self.db),
        }
    }
}
