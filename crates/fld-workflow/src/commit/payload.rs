//! Bulk-create request composition.

use chrono::{Months, NaiveDate};
use fld_client::types::{
    BulkInstallRequest, ChecklistPayload, EquipmentPayload, NotificationPayload,
};
use fld_core::SessionContext;
use fld_core::entities::{EquipmentSelection, InstallationBatch};

/// Build the single bulk-create request for `batch`: equipment records,
/// checklist rows, readings, and the customer notification.
#[must_use]
pub fn compose(
    batch: &InstallationBatch,
    session: &SessionContext,
    installed_on: NaiveDate,
) -> BulkInstallRequest {
    let equipment: Vec<EquipmentPayload> = batch
        .selections
        .iter()
        .map(|selection| equipment(selection, &batch.customer.id, installed_on))
        .collect();

    let checklist = batch.selections.iter().flat_map(checklist_rows).collect();

    BulkInstallRequest {
        batch_id: batch.id.clone(),
        technician_id: session.technician_id.clone(),
        customer_id: batch.customer.id.clone(),
        readings: batch.readings.clone(),
        checklist_remark: batch.checklist_remark.clone(),
        notification: notification(batch, session, &equipment, installed_on),
        equipment,
        checklist,
    }
}

/// `installed_on` plus `months` calendar months, clamped to the end of the
/// target month.
#[must_use]
pub fn warranty_until(installed_on: NaiveDate, months: u32) -> NaiveDate {
    installed_on
        .checked_add_months(Months::new(months))
        .unwrap_or(NaiveDate::MAX)
}

fn equipment(
    selection: &EquipmentSelection,
    customer_id: &str,
    installed_on: NaiveDate,
) -> EquipmentPayload {
    let record = &selection.record;
    EquipmentPayload {
        serial_number: record.serial_number.clone(),
        material_code: record.material_code.clone(),
        description: record.description.clone(),
        tracking_number: selection.tracking_number.clone(),
        regulated: selection.regulated,
        customer_id: customer_id.to_string(),
        installed_on,
        warranty_months: record.warranty_months,
        warranty_until: warranty_until(installed_on, record.warranty_months),
    }
}

fn checklist_rows(selection: &EquipmentSelection) -> Vec<ChecklistPayload> {
    selection
        .checklist
        .iter()
        .flatten()
        .map(|answer| ChecklistPayload {
            serial_number: selection.serial().to_string(),
            question_id: answer.question_id.clone(),
            prompt: answer.prompt.clone(),
            product_group: answer.product_group.clone(),
            answer_type: answer.answer_type,
            result: answer
                .result
                .as_ref()
                .map(|r| r.as_wire().to_string())
                .unwrap_or_default(),
            remark: answer.remark.clone(),
        })
        .collect()
}

fn notification(
    batch: &InstallationBatch,
    session: &SessionContext,
    equipment: &[EquipmentPayload],
    installed_on: NaiveDate,
) -> NotificationPayload {
    let subject = match equipment.len() {
        1 => format!("Installation completed: {}", equipment[0].serial_number),
        n => format!("Installation completed: {n} items"),
    };

    let mut body_lines = Vec::with_capacity(equipment.len() + 2);
    body_lines.push(format!(
        "Dear {}, the following equipment was installed on {installed_on}:",
        batch.customer.name
    ));
    body_lines.extend(equipment.iter().map(|e| {
        format!(
            "{} ({}), warranty until {}",
            e.serial_number, e.description, e.warranty_until
        )
    }));
    body_lines.push(format!("Technician: {}", session.technician_name));

    NotificationPayload {
        recipient: batch.customer.contact_address.clone(),
        subject,
        body_lines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use fld_core::entities::{AnswerResult, ChecklistAnswer, Customer, SiteReadings};
    use fld_core::enums::AnswerType;
    use pretty_assertions::assert_eq;

    use crate::testing::{FakeFieldService, customer};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn batch(fake: &FakeFieldService, customer: Customer) -> InstallationBatch {
        let mut selection = EquipmentSelection::new(fake.records["SN00045"].clone(), true);
        selection.tracking_number = Some("TRK-1001".into());
        selection.checklist = Some(vec![ChecklistAnswer {
            question_id: "q2".into(),
            prompt: "Earthing intact".into(),
            answer_type: AnswerType::OkNotOk,
            product_group: "HVAC".into(),
            result: Some(AnswerResult::NotOk),
            remark: Some("re-terminated".into()),
        }]);
        InstallationBatch {
            id: "bat-0000abcd".into(),
            technician_id: "tech-7".into(),
            selections: vec![selection],
            readings: SiteReadings::default(),
            checklist_remark: Some("site clean".into()),
            customer,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn warranty_runs_calendar_months() {
        assert_eq!(warranty_until(date(2026, 1, 31), 1), date(2026, 2, 28));
        assert_eq!(warranty_until(date(2026, 10, 17), 24), date(2028, 10, 17));
    }

    #[test]
    fn compose_carries_equipment_checklist_and_notification() {
        let fake = FakeFieldService::seeded();
        let session = SessionContext::new("tech-7", "Ada Moreno", "branch-north");
        let batch = batch(&fake, customer("C-9001", "Harbor Cold Storage"));

        let request = compose(&batch, &session, date(2026, 10, 17));

        assert_eq!(request.batch_id, "bat-0000abcd");
        assert_eq!(request.customer_id, "C-9001");
        assert_eq!(request.equipment.len(), 1);
        let eq = &request.equipment[0];
        assert_eq!(eq.tracking_number.as_deref(), Some("TRK-1001"));
        assert_eq!(eq.warranty_until, date(2028, 10, 17));

        assert_eq!(request.checklist.len(), 1);
        assert_eq!(request.checklist[0].result, "NOT OK");
        assert_eq!(request.checklist[0].serial_number, "SN00045");

        let note = &request.notification;
        assert_eq!(note.recipient, "facilities@harbor.example");
        assert_eq!(note.subject, "Installation completed: SN00045");
        assert_eq!(note.body_lines.len(), 3);
        assert_eq!(note.body_lines[2], "Technician: Ada Moreno");
    }
}
