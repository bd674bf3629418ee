//! User domain types.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::UnknownVariant;

/// Platform role carried in the identity provider's user metadata.
///
/// Wire format: snake_case string. Unknown or missing roles are treated as
/// [`UserRole::User`] by token validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    Hospital,
    BloodBank,
    Donor,
}

impl UserRole {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::Hospital => "hospital",
            Self::BloodBank => "blood_bank",
            Self::Donor => "donor",
        }
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            "hospital" => Ok(Self::Hospital),
            "blood_bank" => Ok(Self::BloodBank),
            "donor" => Ok(Self::Donor),
            other => Err(UnknownVariant::new("user role", other)),
        }
    }
}
