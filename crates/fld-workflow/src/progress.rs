//! Ordered status events emitted while a batch is committing.
//!
//! Sinks are observers only: nothing they do feeds back into the
//! coordinator's transitions.

use std::fmt;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressKind {
    BulkCreateStarted,
    BulkCreateSucceeded,
    BulkCreateFailed,
    RetireStarted,
    Retired,
    RetireFailed,
    Completed,
    Failed,
}

impl ProgressKind {
    /// Commit phase the event belongs to.
    #[must_use]
    pub const fn phase(self) -> &'static str {
        match self {
            Self::BulkCreateStarted | Self::BulkCreateSucceeded | Self::BulkCreateFailed => {
                "bulk_create"
            }
            Self::RetireStarted | Self::Retired | Self::RetireFailed => "retire",
            Self::Completed | Self::Failed => "commit",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BulkCreateStarted => "bulk_create_started",
            Self::BulkCreateSucceeded => "bulk_create_succeeded",
            Self::BulkCreateFailed => "bulk_create_failed",
            Self::RetireStarted => "retire_started",
            Self::Retired => "retired",
            Self::RetireFailed => "retire_failed",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ProgressKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub batch_id: String,
    pub kind: ProgressKind,
    /// Serial the event concerns, for per-item retirement events.
    pub serial: Option<String>,
    /// 1-based position within the phase.
    pub current: usize,
    pub total: usize,
    pub at: DateTime<Utc>,
    pub message: Option<String>,
}

impl ProgressEvent {
    pub fn new(batch_id: impl Into<String>, kind: ProgressKind, current: usize, total: usize) -> Self {
        Self {
            batch_id: batch_id.into(),
            kind,
            serial: None,
            current,
            total,
            at: Utc::now(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Writes every event to the `tracing` log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn emit(&self, event: ProgressEvent) {
        match event.kind {
            ProgressKind::BulkCreateFailed | ProgressKind::RetireFailed | ProgressKind::Failed => {
                tracing::warn!(
                    batch_id = %event.batch_id,
                    phase = event.kind.phase(),
                    kind = %event.kind,
                    serial = event.serial.as_deref(),
                    current = event.current,
                    total = event.total,
                    message = event.message.as_deref(),
                    "commit progress"
                );
            }
            _ => {
                tracing::info!(
                    batch_id = %event.batch_id,
                    phase = event.kind.phase(),
                    kind = %event.kind,
                    serial = event.serial.as_deref(),
                    current = event.current,
                    total = event.total,
                    "commit progress"
                );
            }
        }
    }
}

/// Forwards events to a UI task. A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelProgress {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgress {
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelProgress {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingProgress {
    events: Mutex<Vec<ProgressEvent>>,
}

impl RecordingProgress {
    #[must_use]
    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn kinds(&self) -> Vec<ProgressKind> {
        self.events().iter().map(|e| e.kind).collect()
    }
}

impl ProgressSink for RecordingProgress {
    fn emit(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn phases_group_kinds() {
        assert_eq!(ProgressKind::BulkCreateFailed.phase(), "bulk_create");
        assert_eq!(ProgressKind::RetireFailed.phase(), "retire");
        assert_eq!(ProgressKind::Completed.phase(), "commit");
    }

    #[tokio::test]
    async fn channel_sink_preserves_order_and_survives_closed_receiver() {
        let (sink, mut rx) = ChannelProgress::new();
        sink.emit(ProgressEvent::new("bat-00000001", ProgressKind::BulkCreateStarted, 1, 1));
        sink.emit(
            ProgressEvent::new("bat-00000001", ProgressKind::Retired, 1, 2).with_serial("SN00041"),
        );

        assert_eq!(rx.recv().await.unwrap().kind, ProgressKind::BulkCreateStarted);
        let retired = rx.recv().await.unwrap();
        assert_eq!(retired.serial.as_deref(), Some("SN00041"));

        drop(rx);
        sink.emit(ProgressEvent::new("bat-00000001", ProgressKind::Completed, 2, 2));
    }

    #[test]
    fn recording_sink_keeps_events() {
        let sink = RecordingProgress::default();
        sink.emit(ProgressEvent::new("bat-1", ProgressKind::Failed, 0, 1).with_message("503"));
        assert_eq!(sink.kinds(), vec![ProgressKind::Failed]);
        assert_eq!(sink.events()[0].message.as_deref(), Some("503"));
    }
}
