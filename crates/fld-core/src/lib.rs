//! # fld-core
//!
//! Core types, validation rules, and error types for Fieldline.
//!
//! This crate provides the foundational types shared across all Fieldline crates:
//! - Entity structs for the installation workflow (records, selections, checklist
//!   answers, batches, OTP sessions)
//! - Status enums with state machine transitions
//! - Field validation rules (voltage readings, checklist remarks, tracking numbers)
//! - ID prefix constants and generation
//! - Cross-cutting error types
//! - The explicit session context handed to the workflow

pub mod entities;
pub mod enums;
pub mod errors;
pub mod identity;
pub mod ids;
pub mod validation;

pub use errors::{CoreError, ValidationError};
pub use identity::SessionContext;

/// Upper bound on the number of equipment items committed in one batch.
pub const MAX_BATCH_ITEMS: usize = 5;
