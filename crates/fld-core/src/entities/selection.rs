use serde::{Deserialize, Serialize};

use crate::entities::{ChecklistAnswer, PendingInstallationRecord};
use crate::errors::ValidationError;
use crate::validation;

/// One serial chosen for an installation batch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EquipmentSelection {
    /// Snapshot of the source record at selection time.
    pub record: PendingInstallationRecord,
    /// Result of the compliance check for the record's material code.
    pub regulated: bool,
    /// Resolved tracking number: the pre-assigned one verbatim, or the value
    /// collected from the technician.
    pub tracking_number: Option<String>,
    /// Completed checklist, attached when the wizard finishes.
    pub checklist: Option<Vec<ChecklistAnswer>>,
}

impl EquipmentSelection {
    /// Bind a record to its compliance result. A pre-assigned tracking number
    /// is taken over verbatim.
    #[must_use]
    pub fn new(record: PendingInstallationRecord, regulated: bool) -> Self {
        let tracking_number = record.preassigned_tracking_number().map(str::to_string);
        Self {
            record,
            regulated,
            tracking_number,
            checklist: None,
        }
    }

    #[must_use]
    pub fn serial(&self) -> &str {
        &self.record.serial_number
    }

    /// A tracking number is collected only for regulated items whose source
    /// record carries none.
    #[must_use]
    pub fn must_collect_tracking_number(&self) -> bool {
        self.regulated && self.record.preassigned_tracking_number().is_none()
    }

    #[must_use]
    pub const fn has_checklist(&self) -> bool {
        self.checklist.is_some()
    }

    /// Check the selection-level invariants (tracking number when required).
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] naming `tracking_number` when the item must
    /// collect one and none was entered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.must_collect_tracking_number() {
            validation::require_text(
                "tracking_number",
                self.tracking_number.as_deref().unwrap_or_default(),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tracking: Option<&str>) -> PendingInstallationRecord {
        PendingInstallationRecord {
            serial_number: "SN00045".into(),
            material_code: "MAT-CH-200".into(),
            description: "Chiller 200kW".into(),
            customer_id: "C-1".into(),
            customer_name: "Depot".into(),
            warranty_months: 24,
            tracking_number: tracking.map(str::to_string),
        }
    }

    #[test]
    fn regulated_without_preassigned_must_collect() {
        let sel = EquipmentSelection::new(record(Some("")), true);
        assert!(sel.must_collect_tracking_number());
        let err = sel.validate().unwrap_err();
        assert_eq!(err.field, "tracking_number");
    }

    #[test]
    fn preassigned_number_is_used_verbatim() {
        let sel = EquipmentSelection::new(record(Some("TRK-0091")), true);
        assert!(!sel.must_collect_tracking_number());
        assert_eq!(sel.tracking_number.as_deref(), Some("TRK-0091"));
        assert!(sel.validate().is_ok());
    }

    #[test]
    fn unregulated_never_collects() {
        let sel = EquipmentSelection::new(record(None), false);
        assert!(!sel.must_collect_tracking_number());
        assert!(sel.validate().is_ok());
    }
}
