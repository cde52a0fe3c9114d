//! # repairhub-entity
//!
//! Domain entities for the RepairHub notification subsystem: the
//! persisted notification record and its draft form, the closed
//! event-kind enumeration, logical event identity, user roles, task
//! statuses, and the typed business events producers emit. Persisted
//! entities derive `sqlx::FromRow`.

pub mod event;
pub mod notification;
pub mod task;
pub mod user;
