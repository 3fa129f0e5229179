//! Regulatory-tracking resolution for a picked record.

use std::sync::Arc;

use fld_client::FieldService;
use fld_core::entities::{EquipmentSelection, PendingInstallationRecord};

/// Resolves whether a material code is regulated.
///
/// Memo-free: every selection triggers a fresh check. Any failure is logged
/// and treated as unregulated so a transient outage never blocks an
/// installation.
pub struct ComplianceGate {
    service: Arc<dyn FieldService>,
}

impl ComplianceGate {
    pub fn new(service: Arc<dyn FieldService>) -> Self {
        Self { service }
    }

    pub async fn check(&self, material_code: &str) -> bool {
        match self.service.check_compliance(material_code).await {
            Ok(regulated) => {
                tracing::debug!(material_code, regulated, "compliance resolved");
                regulated
            }
            Err(error) => {
                tracing::warn!(
                    material_code,
                    %error,
                    "compliance check failed, treating as unregulated"
                );
                false
            }
        }
    }

    /// Bind a freshly fetched record to its compliance result.
    pub async fn resolve(&self, record: PendingInstallationRecord) -> EquipmentSelection {
        let regulated = self.check(&record.material_code).await;
        EquipmentSelection::new(record, regulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Call, FakeFieldService};

    fn gate(fake: FakeFieldService) -> (Arc<FakeFieldService>, ComplianceGate) {
        let fake = Arc::new(fake);
        let service: Arc<dyn FieldService> = fake.clone();
        (fake, ComplianceGate::new(service))
    }

    #[tokio::test]
    async fn regulated_without_tracking_number_prompts() {
        let (fake, gate) = gate(FakeFieldService::seeded());
        let record = fake.records["SN00045"].clone();

        let selection = gate.resolve(record).await;
        assert!(selection.regulated);
        assert!(selection.must_collect_tracking_number());
    }

    #[tokio::test]
    async fn preassigned_tracking_number_suppresses_prompt() {
        let (fake, gate) = gate(FakeFieldService::seeded());
        let record = fake.records["SN00046"].clone();

        let selection = gate.resolve(record).await;
        assert!(selection.regulated);
        assert!(!selection.must_collect_tracking_number());
        assert_eq!(selection.tracking_number.as_deref(), Some("TRK-7781"));
    }

    #[tokio::test]
    async fn failure_fails_open() {
        let mut fake = FakeFieldService::seeded();
        fake.compliance_down = true;
        let (fake, gate) = gate(fake);

        assert!(!gate.check("MAT-CH-200").await);
        let selection = gate.resolve(fake.records["SN00045"].clone()).await;
        assert!(!selection.must_collect_tracking_number());
    }

    #[tokio::test]
    async fn every_check_reaches_the_service() {
        let (fake, gate) = gate(FakeFieldService::seeded());
        gate.check("MAT-FAN-10").await;
        gate.check("MAT-FAN-10").await;
        assert_eq!(
            fake.count(|c| matches!(c, Call::Compliance(m) if m == "MAT-FAN-10")),
            2
        );
    }
}
