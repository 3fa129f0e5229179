//! Cross-cutting error types for Fieldline.
//!
//! This module defines errors that can originate from any crate in the system.
//! Transport errors live in `fld-client`; the workflow taxonomy that callers see
//! is `fld_workflow::WorkflowError`, where every crate error converges.

use thiserror::Error;

/// A missing or malformed field. Local and blocking: never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Name of the offending field (e.g. `tracking_number`, `readings.phase_earth`).
    pub field: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Shorthand for the common "field is required" case.
    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, "is required")
    }
}

/// Errors that can be raised by any Fieldline crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Data failed validation (format, mandatory fields, answer domain).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A state machine transition was attempted that is not allowed.
    #[error("Invalid state transition: {entity} from {from} to {to}")]
    InvalidTransition {
        entity: String,
        from: String,
        to: String,
    },

    /// The equipment selection already holds the maximum number of items.
    #[error("Batch is full: at most {max} items can be installed together")]
    Capacity { max: usize },

    /// The serial number is already part of the selection.
    #[error("Serial {serial} is already selected")]
    Duplicate { serial: String },

    /// Entity lookup returned no result.
    #[error("Entity not found: {entity} {id}")]
    NotFound { entity: String, id: String },

    /// The OS random source failed while generating an identifier.
    #[error("ID generation failed: {0}")]
    Entropy(String),
}

impl CoreError {
    pub(crate) fn transition(
        entity: &str,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        Self::InvalidTransition {
            entity: entity.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
