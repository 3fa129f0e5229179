//! OTP-gated batch commit.
//!
//! ```text
//! Idle ─request_otp─▶ RequestingOtp ─ok─▶ AwaitingOtpEntry ─verify_otp─▶ VerifyingOtp ─ok─▶ Committing
//!   ▲                      │ err                ▲        │                   │ rejected          │
//!   └──────────────────────┘                    │        └─ request_otp      └──────────────────┘│
//!                                               │                                                 ▼
//!                                      (fresh OTP) ◀── Failed ◀─bulk create err─ commit ─ok─▶ Completed
//! ```
//!
//! `commit` makes exactly one bulk-create call. Only if it succeeds is each
//! source record retired, one call per item; a retirement failure is logged
//! and reported on the progress stream but the batch still completes.

pub mod payload;

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use fld_client::FieldService;
use fld_config::{MAX_OTP_TTL_SECS, OtpConfig};
use fld_core::entities::{InstallationBatch, OtpSession};
use fld_core::enums::{CommitPhase, OtpStatus};
use fld_core::{SessionContext, ValidationError, ids};

use crate::error::WorkflowError;
use crate::progress::{ProgressEvent, ProgressKind, ProgressSink};

/// OTP lifetime, capped at [`MAX_OTP_TTL_SECS`].
fn otp_ttl(secs: i64) -> TimeDelta {
    TimeDelta::try_seconds(secs.min(MAX_OTP_TTL_SECS)).unwrap_or_else(TimeDelta::zero)
}

/// Outcome of a completed commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitReceipt {
    pub batch_id: String,
    pub serials: Vec<String>,
    pub committed_at: DateTime<Utc>,
}

pub struct BatchCommitCoordinator {
    service: Arc<dyn FieldService>,
    progress: Arc<dyn ProgressSink>,
    session: SessionContext,
    otp_ttl: TimeDelta,
    otp_code_len: usize,
    phase: CommitPhase,
    batch: Option<InstallationBatch>,
    otp: Option<OtpSession>,
    receipt: Option<CommitReceipt>,
}

impl BatchCommitCoordinator {
    pub fn new(
        service: Arc<dyn FieldService>,
        progress: Arc<dyn ProgressSink>,
        session: SessionContext,
        otp: &OtpConfig,
        batch: InstallationBatch,
    ) -> Self {
        Self {
            service,
            progress,
            session,
            otp_ttl: otp_ttl(otp.ttl_secs),
            otp_code_len: otp.code_len,
            phase: CommitPhase::Idle,
            batch: Some(batch),
            otp: None,
            receipt: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> CommitPhase {
        self.phase
    }

    /// The batch under commit. `None` once completed or aborted.
    #[must_use]
    pub const fn batch(&self) -> Option<&InstallationBatch> {
        self.batch.as_ref()
    }

    #[must_use]
    pub const fn otp_session(&self) -> Option<&OtpSession> {
        self.otp.as_ref()
    }

    #[must_use]
    pub const fn receipt(&self) -> Option<&CommitReceipt> {
        self.receipt.as_ref()
    }

    /// Dispatch a fresh one-time code to the customer's contact address,
    /// invalidating any earlier unconsumed session.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::OtpRequest`] if dispatch fails (phase returns to
    /// `Idle`), or a transition error if not allowed in the current phase.
    pub async fn request_otp(&mut self) -> Result<(), WorkflowError> {
        self.ensure(CommitPhase::RequestingOtp)?;
        let address = self
            .batch()
            .map(|b| b.customer.contact_address.clone())
            .ok_or_else(missing_batch)?;
        let id = ids::generate(ids::PREFIX_OTP)?;

        self.invalidate_otp();
        self.advance(CommitPhase::RequestingOtp)?;

        match self.service.request_otp(&address).await {
            Ok(()) => {
                tracing::info!(otp_id = %id, "one-time code requested");
                self.otp = Some(OtpSession::issue(id, address, Utc::now()));
                self.advance(CommitPhase::AwaitingOtpEntry)
            }
            Err(error) => {
                tracing::warn!(%error, "one-time code request failed");
                self.advance(CommitPhase::Idle)?;
                Err(WorkflowError::OtpRequest(error.to_string()))
            }
        }
    }

    /// Verify the code the customer read out. On any failure the phase stays
    /// at `AwaitingOtpEntry` and the batch is untouched.
    ///
    /// # Errors
    ///
    /// - a validation error naming `otp_code` for a malformed code (no call made)
    /// - [`WorkflowError::OtpExpired`] once the session outlived its TTL
    /// - [`WorkflowError::OtpVerify`] when the code is rejected or cannot be checked
    pub async fn verify_otp(&mut self, code: &str) -> Result<(), WorkflowError> {
        self.ensure(CommitPhase::VerifyingOtp)?;

        let code = code.trim();
        if code.len() != self.otp_code_len || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::new(
                "otp_code",
                format!("must be {} digits", self.otp_code_len),
            )
            .into());
        }

        let ttl = self.otp_ttl;
        let otp = self.otp.as_mut().ok_or(WorkflowError::OtpExpired)?;
        if otp.status != OtpStatus::Requested {
            return Err(WorkflowError::OtpExpired);
        }
        if otp.is_expired(Utc::now(), ttl) {
            tracing::info!(otp_id = %otp.id, "one-time code expired");
            otp.transition(OtpStatus::Invalidated)?;
            return Err(WorkflowError::OtpExpired);
        }
        let address = otp.address.clone();

        self.advance(CommitPhase::VerifyingOtp)?;
        match self.service.verify_otp(&address, code).await {
            Ok(true) => {
                if let Some(otp) = self.otp.as_mut() {
                    otp.transition(OtpStatus::Verified)?;
                }
                self.advance(CommitPhase::Committing)
            }
            Ok(false) => {
                self.advance(CommitPhase::AwaitingOtpEntry)?;
                Err(WorkflowError::OtpVerify("code was not accepted".into()))
            }
            Err(error) => {
                tracing::warn!(%error, "one-time code verification failed");
                self.advance(CommitPhase::AwaitingOtpEntry)?;
                Err(WorkflowError::OtpVerify(error.to_string()))
            }
        }
    }

    /// Persist the batch and retire its source records.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Commit`] if the bulk-create call fails: the phase
    /// becomes `Failed`, the batch is kept, and no record is retired. A
    /// transition error outside `Committing`.
    pub async fn commit(&mut self) -> Result<CommitReceipt, WorkflowError> {
        if self.phase != CommitPhase::Committing {
            return Err(WorkflowError::transition("commit", self.phase, "commit"));
        }
        let otp = self
            .otp
            .as_mut()
            .filter(|otp| otp.status == OtpStatus::Verified)
            .ok_or_else(|| {
                WorkflowError::transition("otp_session", "unverified", OtpStatus::Consumed)
            })?;
        otp.transition(OtpStatus::Consumed)?;

        let batch = self.batch.as_ref().ok_or_else(missing_batch)?;
        let batch_id = batch.id.clone();
        let serials: Vec<String> = batch.serials().map(str::to_string).collect();
        let total = serials.len();
        let request = payload::compose(batch, &self.session, Utc::now().date_naive());

        tracing::info!(batch_id = %batch_id, items = total, "committing batch");
        self.emit(ProgressEvent::new(&batch_id, ProgressKind::BulkCreateStarted, 0, total));

        match self.service.bulk_create(&request).await {
            Ok(response) => {
                if response.created != total {
                    tracing::warn!(
                        batch_id = %batch_id,
                        expected = total,
                        created = response.created,
                        "bulk create reported a different item count"
                    );
                }
                self.emit(ProgressEvent::new(
                    &batch_id,
                    ProgressKind::BulkCreateSucceeded,
                    total,
                    total,
                ));
            }
            Err(error) => {
                tracing::warn!(batch_id = %batch_id, %error, "bulk create failed, batch kept");
                let message = error.to_string();
                self.emit(
                    ProgressEvent::new(&batch_id, ProgressKind::BulkCreateFailed, 0, total)
                        .with_message(&message),
                );
                self.emit(
                    ProgressEvent::new(&batch_id, ProgressKind::Failed, 0, total)
                        .with_message(&message),
                );
                self.advance(CommitPhase::Failed)?;
                return Err(WorkflowError::Commit(message));
            }
        }

        for (index, serial) in serials.iter().enumerate() {
            self.retire(&batch_id, serial, index + 1, total).await;
        }

        self.advance(CommitPhase::Completed)?;
        self.batch = None;
        self.emit(ProgressEvent::new(&batch_id, ProgressKind::Completed, total, total));

        let receipt = CommitReceipt {
            batch_id,
            serials,
            committed_at: Utc::now(),
        };
        self.receipt = Some(receipt.clone());
        Ok(receipt)
    }

    /// Discard the batch with no persisted side effects. Not available once
    /// committing has begun.
    ///
    /// # Errors
    ///
    /// A transition error from `Committing`, `Completed`, or `Aborted`.
    pub fn abort(&mut self) -> Result<(), WorkflowError> {
        self.advance(CommitPhase::Aborted)?;
        self.invalidate_otp();
        if let Some(batch) = self.batch.take() {
            tracing::info!(batch_id = %batch.id, "batch aborted");
        }
        Ok(())
    }

    async fn retire(&self, batch_id: &str, serial: &str, current: usize, total: usize) {
        self.emit(
            ProgressEvent::new(batch_id, ProgressKind::RetireStarted, current, total)
                .with_serial(serial),
        );
        match self.service.retire_pending(serial).await {
            Ok(()) => {
                self.emit(
                    ProgressEvent::new(batch_id, ProgressKind::Retired, current, total)
                        .with_serial(serial),
                );
            }
            Err(error) => {
                tracing::warn!(
                    batch_id,
                    serial,
                    %error,
                    "pending record retirement failed, record may still show as pending"
                );
                self.emit(
                    ProgressEvent::new(batch_id, ProgressKind::RetireFailed, current, total)
                        .with_serial(serial)
                        .with_message(error.to_string()),
                );
            }
        }
    }

    fn invalidate_otp(&mut self) {
        if let Some(otp) = self.otp.as_mut() {
            if otp.status.can_transition_to(OtpStatus::Invalidated) {
                tracing::debug!(otp_id = %otp.id, "one-time code invalidated");
                otp.status = OtpStatus::Invalidated;
            }
        }
    }

    fn ensure(&self, next: CommitPhase) -> Result<(), WorkflowError> {
        if self.phase.can_transition_to(next) {
            Ok(())
        } else {
            Err(WorkflowError::transition("commit", self.phase, next))
        }
    }

    fn advance(&mut self, next: CommitPhase) -> Result<(), WorkflowError> {
        self.ensure(next)?;
        tracing::debug!(from = %self.phase, to = %next, "commit phase");
        self.phase = next;
        Ok(())
    }

    fn emit(&self, event: ProgressEvent) {
        self.progress.emit(event);
    }
}

fn missing_batch() -> WorkflowError {
    WorkflowError::NotFound {
        entity: "batch".into(),
        id: "current".into(),
    }
}
