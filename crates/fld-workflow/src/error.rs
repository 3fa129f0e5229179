//! Workflow error taxonomy.
//!
//! Every external-call failure is caught at the component boundary and
//! translated into one of these kinds; no raw transport error reaches
//! workflow state. Compliance-check failures and cleanup (retirement)
//! failures have no variant: they are logged, never returned.

use fld_core::{CoreError, ValidationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Missing or malformed field. Local; the transition is refused.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The operation is not allowed in the current state.
    #[error("Invalid state transition: {entity} from {from} to {to}")]
    Transition {
        entity: String,
        from: String,
        to: String,
    },

    /// The selection already holds the maximum number of items.
    #[error("Batch is full: at most {max} items can be installed together")]
    Capacity { max: usize },

    /// The serial is already selected.
    #[error("Serial {serial} is already selected")]
    Duplicate { serial: String },

    #[error("Not found: {entity} {id}")]
    NotFound { entity: String, id: String },

    /// Candidate lookup failed; results were replaced by an empty set.
    #[error("Search failed: {0}")]
    Search(String),

    /// Fetching the pending record for a picked serial failed.
    #[error("Equipment lookup failed for {serial}: {message}")]
    Lookup { serial: String, message: String },

    /// Fetching the checklist schema failed.
    #[error("Checklist fetch failed for {material_code}: {message}")]
    ChecklistFetch {
        material_code: String,
        message: String,
    },

    /// The one-time code could not be dispatched. Retryable.
    #[error("Could not send one-time code: {0}")]
    OtpRequest(String),

    /// The one-time code was rejected or could not be checked. Retryable.
    #[error("One-time code not accepted: {0}")]
    OtpVerify(String),

    /// The one-time code session timed out; a new code must be requested.
    #[error("One-time code expired, request a new code")]
    OtpExpired,

    /// The bulk-create call failed. The batch is preserved; a retry needs a
    /// fresh one-time code.
    #[error("Batch commit failed: {0}")]
    Commit(String),

    /// Unexpected internal failure (e.g. the OS random source).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkflowError {
    /// Whether the user can retry the same step without losing batch state.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Search(_)
                | Self::Lookup { .. }
                | Self::ChecklistFetch { .. }
                | Self::OtpRequest(_)
                | Self::OtpVerify(_)
                | Self::OtpExpired
                | Self::Commit(_)
        )
    }

    pub(crate) fn transition(
        entity: &str,
        from: impl std::fmt::Display,
        to: impl std::fmt::Display,
    ) -> Self {
        Self::Transition {
            entity: entity.to_string(),
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}

impl From<CoreError> for WorkflowError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(v) => Self::Validation(v),
            CoreError::InvalidTransition { entity, from, to } => {
                Self::Transition { entity, from, to }
            }
            CoreError::Capacity { max } => Self::Capacity { max },
            CoreError::Duplicate { serial } => Self::Duplicate { serial },
            CoreError::NotFound { entity, id } => Self::NotFound { entity, id },
            CoreError::Entropy(message) => Self::Internal(message),
        }
    }
}
