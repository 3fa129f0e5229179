//! Wire types exchanged with the field-service API.

use chrono::NaiveDate;
use fld_core::entities::{Customer, SiteReadings};
use fld_core::enums::AnswerType;
use serde::{Deserialize, Serialize};

/// One row of a serial lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SerialCandidate {
    pub serial_number: String,
    pub material_code: String,
    #[serde(default)]
    pub description: String,
}

/// One page of a customer search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPage {
    pub items: Vec<Customer>,
    pub page: usize,
    /// Total matches across all pages.
    #[serde(default)]
    pub total: usize,
}

/// Equipment record created by the bulk call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipmentPayload {
    pub serial_number: String,
    pub material_code: String,
    pub description: String,
    pub tracking_number: Option<String>,
    pub regulated: bool,
    pub customer_id: String,
    pub installed_on: NaiveDate,
    pub warranty_months: u32,
    pub warranty_until: NaiveDate,
}

/// One checklist result row created by the bulk call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistPayload {
    pub serial_number: String,
    pub question_id: String,
    pub prompt: String,
    pub product_group: String,
    pub answer_type: AnswerType,
    pub result: String,
    pub remark: Option<String>,
}

/// Customer notification sent by the service once the batch is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub recipient: String,
    pub subject: String,
    pub body_lines: Vec<String>,
}

/// Everything persisted for one batch, in a single call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkInstallRequest {
    pub batch_id: String,
    pub technician_id: String,
    pub customer_id: String,
    pub readings: SiteReadings,
    pub checklist_remark: Option<String>,
    pub equipment: Vec<EquipmentPayload>,
    pub checklist: Vec<ChecklistPayload>,
    pub notification: NotificationPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkInstallResponse {
    /// Number of equipment records created.
    pub created: usize,
}
