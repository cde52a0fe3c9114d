//! Convenience result type alias for RepairHub.

use crate::error::AppError;

/// A specialized `Result` type for RepairHub operations.
pub type AppResult<T> = Result<T, AppError>;
