//! User role enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Roles known to the repair-shop platform.
///
/// Only the admin role receives role-broadcast notifications; officers
/// and technicians are addressed directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// System administrator; sees every admin broadcast.
    Admin,
    /// Front-desk officer.
    Officer,
    /// Repair technician.
    Technician,
}

impl UserRole {
    /// Check if this role is an admin.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Officer => "officer",
            Self::Technician => "technician",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = repairhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "officer" => Ok(Self::Officer),
            "technician" => Ok(Self::Technician),
            _ => Err(repairhub_core::AppError::validation(format!(
                "Invalid user role: '{s}'. Expected one of: admin, officer, technician"
            ))),
        }
    }
}
