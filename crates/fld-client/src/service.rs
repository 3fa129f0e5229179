//! The request/response boundary to the remote field-service system.

use async_trait::async_trait;
use fld_core::entities::{ChecklistQuestion, PendingInstallationRecord};

use crate::error::ClientError;
use crate::types::{BulkInstallRequest, BulkInstallResponse, CustomerPage, SerialCandidate};

/// Every remote operation the installation workflow depends on.
///
/// Transport-agnostic: [`crate::HttpFieldService`] is the production
/// implementation; tests plug in scripted fakes.
#[async_trait]
pub trait FieldService: Send + Sync + 'static {
    /// Look up pending serials matching `query` within an identity `scope`.
    /// An empty query returns the scope's default listing.
    async fn lookup_serials(
        &self,
        query: &str,
        scope: &str,
        limit: usize,
    ) -> Result<Vec<SerialCandidate>, ClientError>;

    /// Fetch the full pending installation record for a serial.
    async fn fetch_pending_record(
        &self,
        serial: &str,
    ) -> Result<PendingInstallationRecord, ClientError>;

    /// Whether a material code is subject to regulatory tracking.
    async fn check_compliance(&self, material_code: &str) -> Result<bool, ClientError>;

    /// Fetch the checklist question schema for a material code.
    async fn fetch_checklist(
        &self,
        material_code: &str,
    ) -> Result<Vec<ChecklistQuestion>, ClientError>;

    /// Dispatch a one-time code to `address`.
    async fn request_otp(&self, address: &str) -> Result<(), ClientError>;

    /// Verify a one-time code. `Ok(false)` means the code was rejected.
    async fn verify_otp(&self, address: &str, code: &str) -> Result<bool, ClientError>;

    /// Create all equipment records, checklist results, and the notification
    /// for a batch in one call.
    async fn bulk_create(
        &self,
        request: &BulkInstallRequest,
    ) -> Result<BulkInstallResponse, ClientError>;

    /// Retire the pending installation record for a serial.
    async fn retire_pending(&self, serial: &str) -> Result<(), ClientError>;

    /// Paginated free-text customer search. Pages are 1-based.
    async fn search_customers(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> Result<CustomerPage, ClientError>;
}
