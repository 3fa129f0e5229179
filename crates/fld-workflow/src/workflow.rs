//! The installation workflow facade.
//!
//! Wires the search boxes, compliance gate, selection set and checklist
//! wizard together around one technician session, and hands a validated
//! batch to a [`BatchCommitCoordinator`].

use std::sync::Arc;

use fld_client::types::SerialCandidate;
use fld_client::{ClientError, FieldService, HttpFieldService};
use fld_config::FieldlineConfig;
use fld_core::entities::{Customer, EquipmentSelection, InstallationBatch, SiteReadings};
use fld_core::{SessionContext, ValidationError, validation};

use crate::checklist::ChecklistWizard;
use crate::commit::BatchCommitCoordinator;
use crate::compliance::ComplianceGate;
use crate::error::WorkflowError;
use crate::progress::ProgressSink;
use crate::search::{CustomerLookup, SearchIndexClient, SearchSettings, SerialLookup};
use crate::selection::EquipmentSelectionSet;

pub struct InstallationWorkflow {
    session: SessionContext,
    config: FieldlineConfig,
    service: Arc<dyn FieldService>,
    gate: ComplianceGate,
    serials: SearchIndexClient<SerialLookup>,
    customers: SearchIndexClient<CustomerLookup>,
    selection: EquipmentSelectionSet,
    readings: SiteReadings,
    checklist_remark: Option<String>,
    customer: Option<Customer>,
}

impl InstallationWorkflow {
    pub fn new(
        session: SessionContext,
        config: &FieldlineConfig,
        service: Arc<dyn FieldService>,
    ) -> Self {
        let serials = SearchIndexClient::new(
            SerialLookup::new(Arc::clone(&service), session.scope.clone()),
            SearchSettings::serials(&config.search),
        );
        let customers = SearchIndexClient::new(
            CustomerLookup::new(Arc::clone(&service)),
            SearchSettings::customers(&config.search),
        );
        Self {
            gate: ComplianceGate::new(Arc::clone(&service)),
            selection: EquipmentSelectionSet::new(config.batch.max_items),
            session,
            config: config.clone(),
            service,
            serials,
            customers,
            readings: SiteReadings::default(),
            checklist_remark: None,
            customer: None,
        }
    }

    /// Build a workflow against the REST API named in `config.service`.
    ///
    /// # Errors
    ///
    /// [`ClientError::NotConfigured`] without a base URL.
    pub fn connect(session: SessionContext, config: &FieldlineConfig) -> Result<Self, ClientError> {
        let service: Arc<dyn FieldService> = Arc::new(HttpFieldService::new(&config.service)?);
        Ok(Self::new(session, config, service))
    }

    #[must_use]
    pub const fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Load the default serial and customer listings.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Search`] if either listing cannot be fetched.
    pub async fn prime(&mut self) -> Result<(), WorkflowError> {
        self.serials.prime().await?;
        self.customers.prime().await
    }

    pub fn serial_search(&mut self) -> &mut SearchIndexClient<SerialLookup> {
        &mut self.serials
    }

    pub fn customer_search(&mut self) -> &mut SearchIndexClient<CustomerLookup> {
        &mut self.customers
    }

    /// Latest serial results minus everything already picked.
    #[must_use]
    pub fn visible_candidates(&self) -> Vec<SerialCandidate> {
        self.selection.filter_candidates(&self.serials.latest().items)
    }

    // -- Equipment picking --------------------------------------------------

    /// Fetch the record for `serial`, resolve its compliance, and place it in
    /// the draft slot. Capacity and duplicates are checked before any call.
    ///
    /// # Errors
    ///
    /// Capacity or duplicate, or [`WorkflowError::Lookup`] if the record
    /// cannot be fetched.
    pub async fn pick_serial(&mut self, serial: &str) -> Result<&EquipmentSelection, WorkflowError> {
        self.selection.check_admissible(serial)?;

        let record = self
            .service
            .fetch_pending_record(serial)
            .await
            .map_err(|error| {
                tracing::warn!(serial, %error, "pending record lookup failed");
                WorkflowError::Lookup {
                    serial: serial.to_string(),
                    message: error.to_string(),
                }
            })?;

        let selection = self.gate.resolve(record).await;
        self.selection.begin_draft(selection)?;
        self.selection
            .draft()
            .ok_or_else(|| WorkflowError::NotFound {
                entity: "selection".into(),
                id: serial.to_string(),
            })
    }

    #[must_use]
    pub fn needs_tracking_number(&self) -> bool {
        self.selection.needs_tracking_number()
    }

    /// # Errors
    ///
    /// See [`EquipmentSelectionSet::set_tracking_number`].
    pub fn set_tracking_number(&mut self, value: &str) -> Result<(), WorkflowError> {
        self.selection.set_tracking_number(value)
    }

    /// Merge the draft into the batch. Returns the committed serial.
    ///
    /// # Errors
    ///
    /// See [`EquipmentSelectionSet::commit_draft`].
    pub fn commit_draft(&mut self) -> Result<String, WorkflowError> {
        self.selection.commit_draft().map(|s| s.serial().to_string())
    }

    pub fn discard_draft(&mut self) -> Option<EquipmentSelection> {
        self.selection.discard_draft()
    }

    pub fn remove(&mut self, serial: &str) -> Option<EquipmentSelection> {
        self.selection.remove(serial)
    }

    #[must_use]
    pub const fn selection(&self) -> &EquipmentSelectionSet {
        &self.selection
    }

    // -- Checklists ----------------------------------------------------------

    /// Open a loaded wizard for a listed serial.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] for an unlisted serial, or
    /// [`WorkflowError::ChecklistFetch`].
    pub async fn open_checklist(&self, serial: &str) -> Result<ChecklistWizard, WorkflowError> {
        let selection = self
            .selection
            .get(serial)
            .ok_or_else(|| WorkflowError::NotFound {
                entity: "selection".into(),
                id: serial.to_string(),
            })?;
        let mut wizard = ChecklistWizard::new(selection, self.checklist_remark.clone());
        wizard.load(self.service.as_ref()).await?;
        Ok(wizard)
    }

    /// Finish `wizard` and merge its answers and the batch remark.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::NotFound`] if the item was removed meanwhile, in
    /// which case the wizard is left untouched, or the wizard's finish error.
    pub fn finish_checklist(&mut self, wizard: &mut ChecklistWizard) -> Result<(), WorkflowError> {
        if !self.selection.contains(wizard.serial()) {
            return Err(WorkflowError::NotFound {
                entity: "selection".into(),
                id: wizard.serial().to_string(),
            });
        }
        let completed = wizard.finish()?;
        self.selection
            .attach_checklist(&completed.serial, completed.answers)?;
        self.checklist_remark = completed.global_remark;
        Ok(())
    }

    #[must_use]
    pub fn checklist_remark(&self) -> Option<&str> {
        self.checklist_remark.as_deref()
    }

    // -- Site readings and customer -----------------------------------------

    /// Store the site readings if they validate.
    ///
    /// # Errors
    ///
    /// The first invalid field; previous readings are kept.
    pub fn set_readings(&mut self, readings: SiteReadings) -> Result<(), ValidationError> {
        readings.validate()?;
        self.readings = readings;
        Ok(())
    }

    #[must_use]
    pub const fn readings(&self) -> &SiteReadings {
        &self.readings
    }

    /// # Errors
    ///
    /// A customer without a contact address cannot receive the one-time code.
    pub fn select_customer(&mut self, customer: Customer) -> Result<(), ValidationError> {
        validation::require_text("customer.contact_address", &customer.contact_address)?;
        tracing::debug!(customer_id = %customer.id, "customer selected");
        self.customer = Some(customer);
        Ok(())
    }

    #[must_use]
    pub const fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    // -- Commit --------------------------------------------------------------

    /// Validate everything and hand the batch to a fresh coordinator.
    ///
    /// # Errors
    ///
    /// A validation, capacity, or duplicate error describing the first
    /// unmet batch requirement.
    pub fn prepare_commit(
        &self,
        progress: Arc<dyn ProgressSink>,
    ) -> Result<BatchCommitCoordinator, WorkflowError> {
        let customer = self
            .customer
            .clone()
            .ok_or_else(|| ValidationError::required("customer"))?;
        let batch = InstallationBatch::assemble(
            &self.session,
            self.selection.selections().to_vec(),
            self.readings.clone(),
            self.checklist_remark.clone(),
            customer,
            self.config.batch.max_items,
        )?;
        tracing::info!(batch_id = %batch.id, items = batch.len(), "batch assembled");
        Ok(BatchCommitCoordinator::new(
            Arc::clone(&self.service),
            progress,
            self.session.clone(),
            &self.config.otp,
            batch,
        ))
    }

    /// Start over after a completed or aborted commit.
    pub fn reset(&mut self) {
        self.serials.cancel();
        self.customers.cancel();
        self.selection = EquipmentSelectionSet::new(self.config.batch.max_items);
        self.readings = SiteReadings::default();
        self.checklist_remark = None;
        self.customer = None;
    }
}
