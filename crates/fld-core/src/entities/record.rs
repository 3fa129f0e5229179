use serde::{Deserialize, Serialize};

/// An equipment unit awaiting installation. Owned by the remote system;
/// read-only here and retired once its batch commits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingInstallationRecord {
    pub serial_number: String,
    pub material_code: String,
    pub description: String,
    pub customer_id: String,
    pub customer_name: String,
    pub warranty_months: u32,
    /// Pre-assigned tracking number. An empty string means "not yet assigned".
    #[serde(default)]
    pub tracking_number: Option<String>,
}

impl PendingInstallationRecord {
    /// The pre-assigned tracking number, if one is present and non-blank.
    #[must_use]
    pub fn preassigned_tracking_number(&self) -> Option<&str> {
        self.tracking_number
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }
}
