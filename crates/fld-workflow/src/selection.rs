//! The bounded, deduplicated set of items chosen for one batch.
//!
//! A picked item first lands in a single draft slot, where its tracking
//! number is collected if required, and is merged into the list atomically
//! by [`EquipmentSelectionSet::commit_draft`]. A serial held either in the
//! list or in the draft is hidden from the candidate pool.

use fld_client::types::SerialCandidate;
use fld_core::entities::{ChecklistAnswer, EquipmentSelection};
use fld_core::{MAX_BATCH_ITEMS, ValidationError};

use crate::error::WorkflowError;

#[derive(Debug, Clone)]
pub struct EquipmentSelectionSet {
    items: Vec<EquipmentSelection>,
    draft: Option<EquipmentSelection>,
    max_items: usize,
}

impl Default for EquipmentSelectionSet {
    fn default() -> Self {
        Self::new(MAX_BATCH_ITEMS)
    }
}

impl EquipmentSelectionSet {
    /// `max_items` is clamped to `1..=MAX_BATCH_ITEMS`.
    #[must_use]
    pub fn new(max_items: usize) -> Self {
        Self {
            items: Vec::new(),
            draft: None,
            max_items: max_items.clamp(1, MAX_BATCH_ITEMS),
        }
    }

    /// Whether `serial` could be picked right now.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Duplicate`] if the serial is listed or drafted,
    /// [`WorkflowError::Capacity`] if the list is full.
    pub fn check_admissible(&self, serial: &str) -> Result<(), WorkflowError> {
        if self.contains(serial) {
            return Err(WorkflowError::Duplicate {
                serial: serial.to_string(),
            });
        }
        if self.is_full() {
            return Err(WorkflowError::Capacity {
                max: self.max_items,
            });
        }
        Ok(())
    }

    /// Add a fully resolved selection directly. Rejected additions leave the
    /// set unchanged.
    ///
    /// # Errors
    ///
    /// Capacity, duplicate, or a missing required tracking number.
    pub fn add(&mut self, selection: EquipmentSelection) -> Result<(), WorkflowError> {
        self.check_admissible(selection.serial())?;
        selection.validate()?;
        tracing::debug!(serial = selection.serial(), "selection added");
        self.items.push(selection);
        Ok(())
    }

    /// Place a picked item in the draft slot, replacing any earlier draft.
    ///
    /// # Errors
    ///
    /// Capacity or duplicate, checked against the list and the current draft.
    pub fn begin_draft(&mut self, selection: EquipmentSelection) -> Result<(), WorkflowError> {
        self.check_admissible(selection.serial())?;
        if let Some(previous) = self.draft.replace(selection) {
            tracing::debug!(serial = previous.serial(), "draft replaced");
        }
        Ok(())
    }

    #[must_use]
    pub const fn draft(&self) -> Option<&EquipmentSelection> {
        self.draft.as_ref()
    }

    /// Whether the tracking-number prompt must be shown for the draft.
    #[must_use]
    pub fn needs_tracking_number(&self) -> bool {
        self.draft
            .as_ref()
            .is_some_and(EquipmentSelection::must_collect_tracking_number)
    }

    /// Record the tracking number entered for the draft. Blank input clears it.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] without a draft; a validation error if the
    /// draft does not collect a tracking number.
    pub fn set_tracking_number(&mut self, value: &str) -> Result<(), WorkflowError> {
        let draft = self.draft.as_mut().ok_or_else(no_draft)?;
        if !draft.must_collect_tracking_number() {
            return Err(ValidationError::new(
                "tracking_number",
                "is not collected for this item",
            )
            .into());
        }
        let value = value.trim();
        draft.tracking_number = (!value.is_empty()).then(|| value.to_string());
        Ok(())
    }

    /// Validate the draft and merge it into the list. On error the draft is
    /// kept for correction.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] without a draft, or a validation error
    /// naming `tracking_number` when a required one is blank.
    pub fn commit_draft(&mut self) -> Result<&EquipmentSelection, WorkflowError> {
        let draft = self.draft.as_ref().ok_or_else(no_draft)?;
        draft.validate()?;
        if self.items.len() >= self.max_items {
            return Err(WorkflowError::Capacity {
                max: self.max_items,
            });
        }
        let draft = self.draft.take().ok_or_else(no_draft)?;
        tracing::debug!(serial = draft.serial(), regulated = draft.regulated, "draft committed");
        self.items.push(draft);
        Ok(&self.items[self.items.len() - 1])
    }

    pub fn discard_draft(&mut self) -> Option<EquipmentSelection> {
        self.draft.take()
    }

    /// Remove a listed item; its serial returns to the candidate pool.
    pub fn remove(&mut self, serial: &str) -> Option<EquipmentSelection> {
        let index = self.items.iter().position(|s| s.serial() == serial)?;
        Some(self.items.remove(index))
    }

    /// Attach (or replace) the completed checklist of a listed item.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] if the serial is not listed.
    pub fn attach_checklist(
        &mut self,
        serial: &str,
        answers: Vec<ChecklistAnswer>,
    ) -> Result<(), WorkflowError> {
        let selection = self.get_mut(serial).ok_or_else(|| WorkflowError::NotFound {
            entity: "selection".into(),
            id: serial.to_string(),
        })?;
        selection.checklist = Some(answers);
        Ok(())
    }

    #[must_use]
    pub fn get(&self, serial: &str) -> Option<&EquipmentSelection> {
        self.items.iter().find(|s| s.serial() == serial)
    }

    pub fn get_mut(&mut self, serial: &str) -> Option<&mut EquipmentSelection> {
        self.items.iter_mut().find(|s| s.serial() == serial)
    }

    /// Listed or drafted.
    #[must_use]
    pub fn contains(&self, serial: &str) -> bool {
        self.items.iter().any(|s| s.serial() == serial)
            || self.draft.as_ref().is_some_and(|d| d.serial() == serial)
    }

    /// Drop candidates that are already listed or drafted.
    #[must_use]
    pub fn filter_candidates(&self, candidates: &[SerialCandidate]) -> Vec<SerialCandidate> {
        candidates
            .iter()
            .filter(|c| !self.contains(&c.serial_number))
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn selections(&self) -> &[EquipmentSelection] {
        &self.items
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.items.len() >= self.max_items
    }

    #[must_use]
    pub const fn max_items(&self) -> usize {
        self.max_items
    }
}

fn no_draft() -> WorkflowError {
    WorkflowError::NotFound {
        entity: "selection".into(),
        id: "draft".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeFieldService;
    use pretty_assertions::assert_eq;

    fn selection(fake: &FakeFieldService, serial: &str, regulated: bool) -> EquipmentSelection {
        EquipmentSelection::new(fake.records[serial].clone(), regulated)
    }

    fn full_set(fake: &FakeFieldService) -> EquipmentSelectionSet {
        let mut set = EquipmentSelectionSet::default();
        for serial in ["SN00041", "SN00042", "SN00043", "SN00044", "SN00047"] {
            set.add(selection(fake, serial, false)).unwrap();
        }
        set
    }

    #[test]
    fn sixth_add_is_rejected_and_set_unchanged() {
        let fake = FakeFieldService::seeded();
        let mut set = full_set(&fake);
        let before: Vec<String> = set.selections().iter().map(|s| s.serial().to_string()).collect();

        let err = set.add(selection(&fake, "SN00046", true)).unwrap_err();
        assert_eq!(err, WorkflowError::Capacity { max: 5 });
        let after: Vec<String> = set.selections().iter().map(|s| s.serial().to_string()).collect();
        assert_eq!(before, after);

        let err = set.begin_draft(selection(&fake, "SN00046", true)).unwrap_err();
        assert_eq!(err, WorkflowError::Capacity { max: 5 });
        assert!(set.draft().is_none());
    }

    #[test]
    fn duplicate_serial_is_rejected() {
        let fake = FakeFieldService::seeded();
        let mut set = EquipmentSelectionSet::default();
        set.add(selection(&fake, "SN00041", false)).unwrap();

        let err = set.add(selection(&fake, "SN00041", false)).unwrap_err();
        assert_eq!(err, WorkflowError::Duplicate { serial: "SN00041".into() });

        set.begin_draft(selection(&fake, "SN00042", false)).unwrap();
        let err = set.begin_draft(selection(&fake, "SN00042", false)).unwrap_err();
        assert!(matches!(err, WorkflowError::Duplicate { .. }));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn regulated_draft_requires_tracking_number() {
        let fake = FakeFieldService::seeded();
        let mut set = EquipmentSelectionSet::default();
        set.begin_draft(selection(&fake, "SN00045", true)).unwrap();
        assert!(set.needs_tracking_number());

        set.set_tracking_number("   ").unwrap();
        let err = set.commit_draft().unwrap_err();
        assert!(matches!(&err, WorkflowError::Validation(v) if v.field == "tracking_number"));
        assert!(set.draft().is_some());
        assert!(set.is_empty());

        set.set_tracking_number(" TRK-1001 ").unwrap();
        let committed = set.commit_draft().unwrap();
        assert_eq!(committed.tracking_number.as_deref(), Some("TRK-1001"));
        assert!(set.draft().is_none());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn preassigned_tracking_number_is_never_prompted() {
        let fake = FakeFieldService::seeded();
        let mut set = EquipmentSelectionSet::default();
        set.begin_draft(selection(&fake, "SN00046", true)).unwrap();

        assert!(!set.needs_tracking_number());
        assert!(set.set_tracking_number("OTHER").is_err());
        let committed = set.commit_draft().unwrap();
        assert_eq!(committed.tracking_number.as_deref(), Some("TRK-7781"));
    }

    #[test]
    fn selected_serials_leave_the_candidate_pool_until_removed() {
        let fake = FakeFieldService::seeded();
        let candidates: Vec<SerialCandidate> = ["SN00041", "SN00042", "SN00043"]
            .iter()
            .map(|s| SerialCandidate {
                serial_number: (*s).to_string(),
                material_code: "MAT-FAN-10".into(),
                description: String::new(),
            })
            .collect();

        let mut set = EquipmentSelectionSet::default();
        set.add(selection(&fake, "SN00041", false)).unwrap();
        set.begin_draft(selection(&fake, "SN00042", false)).unwrap();

        let visible = set.filter_candidates(&candidates);
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].serial_number, "SN00043");

        set.remove("SN00041").unwrap();
        set.discard_draft().unwrap();
        assert_eq!(set.filter_candidates(&candidates).len(), 3);
    }

    #[test]
    fn attach_checklist_requires_listed_serial() {
        let fake = FakeFieldService::seeded();
        let mut set = EquipmentSelectionSet::default();
        set.add(selection(&fake, "SN00041", false)).unwrap();

        set.attach_checklist("SN00041", Vec::new()).unwrap();
        assert!(set.get("SN00041").unwrap().has_checklist());
        assert!(matches!(
            set.attach_checklist("SN09999", Vec::new()),
            Err(WorkflowError::NotFound { .. })
        ));
    }

    #[test]
    fn max_items_is_clamped() {
        assert_eq!(EquipmentSelectionSet::new(0).max_items(), 1);
        assert_eq!(EquipmentSelectionSet::new(9).max_items(), MAX_BATCH_ITEMS);
    }
}
