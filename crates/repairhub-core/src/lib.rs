//! # repairhub-core
//!
//! Core crate for the RepairHub notification subsystem. Contains
//! configuration schemas, typed identifiers, pagination types, the
//! logging bootstrap, and the unified error system.
//!
//! This crate has **no** internal dependencies on other RepairHub crates.

pub mod config;
pub mod error;
pub mod logging;
pub mod result;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
