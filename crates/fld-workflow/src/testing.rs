//! Scripted in-memory [`FieldService`] for tests.
//!
//! Compiled for this crate's own tests and, behind the `test-support`
//! feature, for downstream integration tests.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use fld_client::types::{BulkInstallRequest, BulkInstallResponse, CustomerPage, SerialCandidate};
use fld_client::{ClientError, FieldService};
use fld_core::SessionContext;
use fld_core::entities::{
    AnswerResult, ChecklistAnswer, ChecklistQuestion, Customer, PendingInstallationRecord,
    SiteReadings,
};
use fld_core::enums::AnswerType;

pub const GOOD_CODE: &str = "482913";

/// One recorded remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Lookup(String),
    FetchRecord(String),
    Compliance(String),
    Checklist(String),
    RequestOtp(String),
    VerifyOtp(String),
    BulkCreate(usize),
    Retire(String),
    Customers(String, usize),
}

fn unavailable() -> ClientError {
    ClientError::Api {
        status: 503,
        message: "service unavailable".into(),
    }
}

/// Scripted in-memory field service that records every call.
#[derive(Default)]
pub struct FakeFieldService {
    calls: Mutex<Vec<Call>>,
    pub records: HashMap<String, PendingInstallationRecord>,
    pub regulated: HashSet<String>,
    pub compliance_down: bool,
    pub checklists: HashMap<String, Vec<ChecklistQuestion>>,
    pub checklist_down: bool,
    pub lookup_down: bool,
    pub lookup_delays: HashMap<String, Duration>,
    pub otp_request_down: bool,
    pub fail_bulk: bool,
    pub fail_retire: HashSet<String>,
    pub customers: Vec<Customer>,
    pub last_bulk: Mutex<Option<BulkInstallRequest>>,
}

impl FakeFieldService {
    /// Fake seeded with seven pending records `SN00041..=SN00047`.
    /// `SN00045` is regulated without a tracking number; `SN00046` is
    /// regulated with one pre-assigned.
    pub fn seeded() -> Self {
        let mut fake = Self::default();
        for n in 41..=47 {
            let serial = format!("SN000{n}");
            let material = match n {
                45 => "MAT-CH-200",
                46 => "MAT-CH-300",
                _ => "MAT-FAN-10",
            };
            fake.records.insert(
                serial.clone(),
                PendingInstallationRecord {
                    serial_number: serial,
                    material_code: material.into(),
                    description: format!("Unit {n}"),
                    customer_id: "C-9001".into(),
                    customer_name: "Harbor Cold Storage".into(),
                    warranty_months: 24,
                    tracking_number: (n == 46).then(|| "TRK-7781".to_string()),
                },
            );
        }
        fake.regulated.insert("MAT-CH-200".into());
        fake.regulated.insert("MAT-CH-300".into());
        let questions = vec![
            question("q1", "Supply voltage", AnswerType::Numeric),
            question("q2", "Earthing intact", AnswerType::OkNotOk),
            question("q3", "Customer briefed", AnswerType::YesNo),
        ];
        for material in ["MAT-CH-200", "MAT-CH-300", "MAT-FAN-10"] {
            fake.checklists.insert(material.into(), questions.clone());
        }
        fake.customers = vec![customer("C-9001", "Harbor Cold Storage")];
        fake
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }

    fn record(&self, call: Call) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

pub fn question(id: &str, prompt: &str, answer_type: AnswerType) -> ChecklistQuestion {
    ChecklistQuestion {
        id: id.into(),
        prompt: prompt.into(),
        answer_type,
        product_group: "HVAC".into(),
    }
}

/// A passing answer for `question`.
pub fn answered(question: &ChecklistQuestion) -> ChecklistAnswer {
    let mut answer = ChecklistAnswer::blank(question);
    answer.result = Some(match question.answer_type {
        AnswerType::Numeric => AnswerResult::Numeric("230".into()),
        AnswerType::OkNotOk => AnswerResult::Ok,
        AnswerType::YesNo => AnswerResult::Yes,
    });
    answer
}

pub fn readings() -> SiteReadings {
    SiteReadings {
        phase_neutral: "230".into(),
        phase_earth: "231".into(),
        neutral_earth: "2".into(),
        abnormal_condition: "none observed".into(),
    }
}

pub fn session() -> SessionContext {
    SessionContext::new("tech-7", "Ada Moreno", "branch-north")
}

pub fn customer(id: &str, name: &str) -> Customer {
    Customer {
        id: id.into(),
        name: name.into(),
        contact_address: "facilities@harbor.example".into(),
        city: Some("Portside".into()),
    }
}

#[async_trait]
impl FieldService for FakeFieldService {
    async fn lookup_serials(
        &self,
        query: &str,
        _scope: &str,
        limit: usize,
    ) -> Result<Vec<SerialCandidate>, ClientError> {
        self.record(Call::Lookup(query.to_string()));
        if let Some(delay) = self.lookup_delays.get(query) {
            tokio::time::sleep(*delay).await;
        }
        if self.lookup_down {
            return Err(unavailable());
        }
        let mut items: Vec<SerialCandidate> = self
            .records
            .values()
            .filter(|r| query.is_empty() || r.serial_number.starts_with(query))
            .map(|r| SerialCandidate {
                serial_number: r.serial_number.clone(),
                material_code: r.material_code.clone(),
                description: r.description.clone(),
            })
            .collect();
        items.sort_by(|a, b| a.serial_number.cmp(&b.serial_number));
        items.truncate(limit);
        Ok(items)
    }

    async fn fetch_pending_record(
        &self,
        serial: &str,
    ) -> Result<PendingInstallationRecord, ClientError> {
        self.record(Call::FetchRecord(serial.to_string()));
        self.records
            .get(serial)
            .cloned()
            .ok_or_else(|| ClientError::Api {
                status: 404,
                message: format!("no pending record for {serial}"),
            })
    }

    async fn check_compliance(&self, material_code: &str) -> Result<bool, ClientError> {
        self.record(Call::Compliance(material_code.to_string()));
        if self.compliance_down {
            return Err(unavailable());
        }
        Ok(self.regulated.contains(material_code))
    }

    async fn fetch_checklist(
        &self,
        material_code: &str,
    ) -> Result<Vec<ChecklistQuestion>, ClientError> {
        self.record(Call::Checklist(material_code.to_string()));
        if self.checklist_down {
            return Err(unavailable());
        }
        Ok(self.checklists.get(material_code).cloned().unwrap_or_default())
    }

    async fn request_otp(&self, address: &str) -> Result<(), ClientError> {
        self.record(Call::RequestOtp(address.to_string()));
        if self.otp_request_down {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn verify_otp(&self, _address: &str, code: &str) -> Result<bool, ClientError> {
        self.record(Call::VerifyOtp(code.to_string()));
        Ok(code == GOOD_CODE)
    }

    async fn bulk_create(
        &self,
        request: &BulkInstallRequest,
    ) -> Result<BulkInstallResponse, ClientError> {
        self.record(Call::BulkCreate(request.equipment.len()));
        if self.fail_bulk {
            return Err(unavailable());
        }
        *self.last_bulk.lock().unwrap_or_else(PoisonError::into_inner) = Some(request.clone());
        Ok(BulkInstallResponse {
            created: request.equipment.len(),
        })
    }

    async fn retire_pending(&self, serial: &str) -> Result<(), ClientError> {
        self.record(Call::Retire(serial.to_string()));
        if self.fail_retire.contains(serial) {
            return Err(unavailable());
        }
        Ok(())
    }

    async fn search_customers(
        &self,
        query: &str,
        page: usize,
        page_size: usize,
    ) -> Result<CustomerPage, ClientError> {
        self.record(Call::Customers(query.to_string(), page));
        let matches: Vec<Customer> = self
            .customers
            .iter()
            .filter(|c| query.is_empty() || c.name.contains(query))
            .cloned()
            .collect();
        let total = matches.len();
        let items = matches
            .into_iter()
            .skip(page.saturating_sub(1) * page_size)
            .take(page_size)
            .collect();
        Ok(CustomerPage { items, page, total })
    }
}
