//! Repair task terminal statuses.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Terminal states a repair task can reach.
///
/// Status-change notifications are produced only for these; intermediate
/// workflow states stay inside the task CRUD and never notify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    /// The repair finished successfully.
    Completed,
    /// The device could not be repaired.
    Unrepairable,
}

impl TaskStatus {
    /// Return the status as its wire string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Unrepairable => "unrepairable",
        }
    }

    /// Human-readable label used in rendered messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Unrepairable => "cannot be repaired",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = repairhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "completed" => Ok(Self::Completed),
            "unrepairable" => Ok(Self::Unrepairable),
            _ => Err(repairhub_core::AppError::validation(format!(
                "Invalid terminal task status: '{s}'"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(TaskStatus::Completed.label(), "completed");
        assert_eq!(TaskStatus::Unrepairable.label(), "cannot be repaired");
    }

    #[test]
    fn test_from_str_rejects_workflow_states() {
        assert!("in_progress".parse::<TaskStatus>().is_err());
    }
}
