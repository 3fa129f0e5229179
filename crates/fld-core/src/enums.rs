//! Answer types and lifecycle status enums for Fieldline.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! Status enums with state machines provide `allowed_next_states()` to enforce
//! valid transitions at the application layer.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// AnswerType
// ---------------------------------------------------------------------------

/// Answer domain of a checklist question.
///
/// The remote schema uses upper-case labels (`NUMERIC`, `OK/NOT OK`, `YES/NO`);
/// those are accepted as aliases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerType {
    #[serde(alias = "NUMERIC")]
    Numeric,
    #[serde(alias = "OK/NOT OK")]
    OkNotOk,
    #[serde(alias = "YES/NO")]
    YesNo,
}

impl AnswerType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::OkNotOk => "ok_not_ok",
            Self::YesNo => "yes_no",
        }
    }

    /// Whether this type has a failing value that demands a remark.
    #[must_use]
    pub const fn has_failing_value(self) -> bool {
        matches!(self, Self::OkNotOk | Self::YesNo)
    }
}

impl fmt::Display for AnswerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// OtpStatus
// ---------------------------------------------------------------------------

/// Status of a one-time-code session.
///
/// ```text
/// requested → verified → consumed
///           → invalidated (superseded by a fresh request)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtpStatus {
    Requested,
    Verified,
    Consumed,
    Invalidated,
}

impl OtpStatus {
    #[must_use]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Requested => &[Self::Verified, Self::Invalidated],
            Self::Verified => &[Self::Consumed, Self::Invalidated],
            Self::Consumed | Self::Invalidated => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Verified => "verified",
            Self::Consumed => "consumed",
            Self::Invalidated => "invalidated",
        }
    }
}

impl fmt::Display for OtpStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// CommitPhase
// ---------------------------------------------------------------------------

/// Phase of the batch commit protocol.
///
/// ```text
/// idle → requesting_otp → awaiting_otp_entry → verifying_otp → committing → completed
///                        → idle (request failed)
///                                              → awaiting_otp_entry (bad code)
///                                                                          → failed
/// awaiting_otp_entry → requesting_otp (re-request)
/// failed → requesting_otp (retry needs a fresh session)
/// idle | awaiting_otp_entry | failed → aborted
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommitPhase {
    Idle,
    RequestingOtp,
    AwaitingOtpEntry,
    VerifyingOtp,
    Committing,
    Completed,
    Failed,
    Aborted,
}

impl CommitPhase {
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Idle => &[Self::RequestingOtp, Self::Aborted],
            Self::RequestingOtp => &[Self::AwaitingOtpEntry, Self::Idle],
            Self::AwaitingOtpEntry => &[Self::VerifyingOtp, Self::RequestingOtp, Self::Aborted],
            Self::VerifyingOtp => &[Self::AwaitingOtpEntry, Self::Committing],
            Self::Committing => &[Self::Completed, Self::Failed],
            Self::Failed => &[Self::RequestingOtp, Self::Aborted],
            Self::Completed | Self::Aborted => &[],
        }
    }

    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::RequestingOtp => "requesting_otp",
            Self::AwaitingOtpEntry => "awaiting_otp_entry",
            Self::VerifyingOtp => "verifying_otp",
            Self::Committing => "committing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Aborted => "aborted",
        }
    }
}

impl fmt::Display for CommitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
