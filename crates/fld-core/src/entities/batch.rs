use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{Customer, EquipmentSelection};
use crate::errors::{CoreError, ValidationError};
use crate::identity::SessionContext;
use crate::{MAX_BATCH_ITEMS, ids, validation};

/// Site-wide environmental readings recorded once per batch. All mandatory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SiteReadings {
    pub phase_neutral: String,
    pub phase_earth: String,
    pub neutral_earth: String,
    pub abnormal_condition: String,
}

impl SiteReadings {
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] among the three voltage fields
    /// and the abnormal-condition text.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validation::validate_voltage("readings.phase_neutral", &self.phase_neutral)?;
        validation::validate_voltage("readings.phase_earth", &self.phase_earth)?;
        validation::validate_voltage("readings.neutral_earth", &self.neutral_earth)?;
        validation::require_text("readings.abnormal_condition", &self.abnormal_condition)
    }
}

/// A complete, validated set of equipment ready for the commit protocol.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InstallationBatch {
    pub id: String,
    pub technician_id: String,
    pub selections: Vec<EquipmentSelection>,
    pub readings: SiteReadings,
    pub checklist_remark: Option<String>,
    pub customer: Customer,
    pub created_at: DateTime<Utc>,
}

impl InstallationBatch {
    /// Validate every batch invariant and build the batch.
    ///
    /// `max_items` is clamped to [`MAX_BATCH_ITEMS`].
    ///
    /// # Errors
    ///
    /// - [`CoreError::Validation`] for an empty batch, a missing tracking number,
    ///   a missing or invalid checklist, malformed readings, or a customer
    ///   without a contact address
    /// - [`CoreError::Capacity`] for more than `max_items` selections
    /// - [`CoreError::Duplicate`] for a repeated serial
    pub fn assemble(
        session: &SessionContext,
        selections: Vec<EquipmentSelection>,
        readings: SiteReadings,
        checklist_remark: Option<String>,
        customer: Customer,
        max_items: usize,
    ) -> Result<Self, CoreError> {
        let max = max_items.clamp(1, MAX_BATCH_ITEMS);
        if selections.is_empty() {
            return Err(ValidationError::new("selections", "at least one item is required").into());
        }
        if selections.len() > max {
            return Err(CoreError::Capacity { max });
        }

        let mut seen = HashSet::new();
        for selection in &selections {
            if !seen.insert(selection.serial()) {
                return Err(CoreError::Duplicate {
                    serial: selection.serial().to_string(),
                });
            }
            selection.validate()?;
            let Some(answers) = &selection.checklist else {
                return Err(ValidationError::new(
                    format!("checklist.{}", selection.serial()),
                    "checklist has not been completed",
                )
                .into());
            };
            for answer in answers {
                validation::validate_answer(answer)?;
            }
        }

        readings.validate()?;
        validation::require_text("customer.id", &customer.id)?;
        validation::require_text("customer.contact_address", &customer.contact_address)?;

        Ok(Self {
            id: ids::generate(ids::PREFIX_BATCH)?,
            technician_id: session.technician_id.clone(),
            selections,
            readings,
            checklist_remark: checklist_remark.filter(|r| !r.trim().is_empty()),
            customer,
            created_at: Utc::now(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.selections.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.selections.is_empty()
    }

    pub fn serials(&self) -> impl Iterator<Item = &str> {
        self.selections.iter().map(EquipmentSelection::serial)
    }
}
