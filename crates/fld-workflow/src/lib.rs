//! # fld-workflow
//!
//! The installation commit workflow for Fieldline.
//!
//! - [`SearchIndexClient`]: debounced, cancelable lookup for serials and customers
//! - [`ComplianceGate`]: fail-open regulatory-tracking resolution
//! - [`EquipmentSelectionSet`]: the bounded batch with its draft slot
//! - [`ChecklistWizard`]: the per-item inspection state machine
//! - [`BatchCommitCoordinator`]: OTP-gated bulk create and source retirement
//! - [`ProgressSink`]: observers of commit progress
//!
//! [`InstallationWorkflow`] ties them together for one technician session.

pub mod checklist;
pub mod commit;
pub mod compliance;
pub mod error;
pub mod progress;
pub mod search;
pub mod selection;
pub mod telemetry;
pub mod workflow;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use checklist::{ChecklistWizard, CompletedChecklist, WizardEvent, WizardState};
pub use commit::{BatchCommitCoordinator, CommitReceipt};
pub use compliance::ComplianceGate;
pub use error::WorkflowError;
pub use progress::{
    ChannelProgress, ProgressEvent, ProgressKind, ProgressSink, RecordingProgress,
    TracingProgress,
};
pub use search::{
    CandidateSource, CustomerLookup, Fetched, SearchIndexClient, SearchResults, SearchSettings,
    SerialLookup,
};
pub use selection::EquipmentSelectionSet;
pub use workflow::InstallationWorkflow;
