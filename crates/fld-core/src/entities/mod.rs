//! Entity structs for the installation workflow.
//!
//! Records and questions are read from the remote service; selections,
//! batches and OTP sessions are workflow-local and discarded on completion
//! or abort. All structs derive `Serialize` and `Deserialize` so they can be
//! carried over the service boundary unchanged.

mod batch;
mod checklist;
mod customer;
mod otp;
mod record;
mod selection;

pub use batch::{InstallationBatch, SiteReadings};
pub use checklist::{AnswerResult, ChecklistAnswer, ChecklistQuestion};
pub use customer::Customer;
pub use otp::OtpSession;
pub use record::PendingInstallationRecord;
pub use selection::EquipmentSelection;
