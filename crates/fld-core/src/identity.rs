use serde::{Deserialize, Serialize};

/// The technician's session, passed explicitly into the workflow.
///
/// Produced by the (external) login flow. Contains only data fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionContext {
    /// Technician user ID, recorded on every committed equipment record.
    pub technician_id: String,
    /// Display name used in the customer notification.
    pub technician_name: String,
    /// Identity scope for candidate lookups and the default listing
    /// (e.g. the technician's service branch).
    pub scope: String,
}

impl SessionContext {
    pub fn new(
        technician_id: impl Into<String>,
        technician_name: impl Into<String>,
        scope: impl Into<String>,
    ) -> Self {
        Self {
            technician_id: technician_id.into(),
            technician_name: technician_name.into(),
            scope: scope.into(),
        }
    }
}
