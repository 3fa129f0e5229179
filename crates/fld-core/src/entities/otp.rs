use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::enums::OtpStatus;
use crate::errors::CoreError;

/// A one-time-code challenge bound to the target customer's contact address.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OtpSession {
    pub id: String,
    pub address: String,
    pub issued_at: DateTime<Utc>,
    pub status: OtpStatus,
}

impl OtpSession {
    #[must_use]
    pub fn issue(id: String, address: impl Into<String>, issued_at: DateTime<Utc>) -> Self {
        Self {
            id,
            address: address.into(),
            issued_at,
            status: OtpStatus::Requested,
        }
    }

    /// Whether the challenge is older than `ttl` at `now`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.issued_at > ttl
    }

    /// Move to `next`, enforcing the lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidTransition`] for disallowed moves (e.g.
    /// verifying a consumed session).
    pub fn transition(&mut self, next: OtpStatus) -> Result<(), CoreError> {
        if !self.status.can_transition_to(next) {
            return Err(CoreError::transition("otp_session", self.status, next));
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_requested_verified_consumed() {
        let mut otp = OtpSession::issue("otp-00000001".into(), "ops@depot.example", Utc::now());
        otp.transition(OtpStatus::Verified).unwrap();
        otp.transition(OtpStatus::Consumed).unwrap();
        let err = otp.transition(OtpStatus::Verified).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn expiry_is_relative_to_issue_time() {
        let issued = Utc::now();
        let otp = OtpSession::issue("otp-00000002".into(), "ops@depot.example", issued);
        let ttl = Duration::seconds(300);
        assert!(!otp.is_expired(issued + Duration::seconds(299), ttl));
        assert!(otp.is_expired(issued + Duration::seconds(301), ttl));
    }
}
