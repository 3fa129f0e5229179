//! One-question-at-a-time checklist wizard.
//!
//! ```text
//!   Loading ──Loaded──▶ Question(0) ──Next──▶ … ──Next──▶ Question(N-1) ──Next──▶ GlobalRemark ──Finish──▶ Done
//!      │                    ◀──Back── (i > 0)                                 ◀──Back──   │
//!      └──Loaded (N = 0)────────────────────────────────────────────────────▶ GlobalRemark
//!                         Question(i) / GlobalRemark ──Cancel──▶ Done (answers discarded)
//! ```
//!
//! [`next_state`] is the pure transition table. [`ChecklistWizard`] adds the
//! guard on `Next` (the current answer must validate) and owns the answers.

use std::fmt;

use fld_client::FieldService;
use fld_core::entities::{AnswerResult, ChecklistAnswer, EquipmentSelection};
use fld_core::{ValidationError, validation};

use crate::error::WorkflowError;

// ---------------------------------------------------------------------------
// States and events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardState {
    Loading,
    Question(usize),
    GlobalRemark,
    Done,
}

impl fmt::Display for WizardState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Loading => f.write_str("loading"),
            Self::Question(i) => write!(f, "question({i})"),
            Self::GlobalRemark => f.write_str("global_remark"),
            Self::Done => f.write_str("done"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WizardEvent {
    Loaded,
    Next,
    Back,
    Finish,
    Cancel,
}

impl WizardEvent {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Loaded => "loaded",
            Self::Next => "next",
            Self::Back => "back",
            Self::Finish => "finish",
            Self::Cancel => "cancel",
        }
    }
}

impl fmt::Display for WizardEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Transition table for a checklist of `question_count` questions.
/// `None` means the event is not accepted in `state`.
#[must_use]
pub const fn next_state(
    state: WizardState,
    event: WizardEvent,
    question_count: usize,
) -> Option<WizardState> {
    use WizardEvent as E;
    use WizardState as S;

    match (state, event) {
        (S::Loading, E::Loaded) if question_count == 0 => Some(S::GlobalRemark),
        (S::Loading, E::Loaded) => Some(S::Question(0)),
        (S::Question(i), E::Next) if i + 1 < question_count => Some(S::Question(i + 1)),
        (S::Question(_), E::Next) => Some(S::GlobalRemark),
        (S::Question(i), E::Back) if i > 0 => Some(S::Question(i - 1)),
        (S::GlobalRemark, E::Back) if question_count > 0 => Some(S::Question(question_count - 1)),
        (S::GlobalRemark, E::Finish) | (S::Question(_) | S::GlobalRemark, E::Cancel) => {
            Some(S::Done)
        }
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Wizard
// ---------------------------------------------------------------------------

/// A finished checklist, ready to attach to its selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedChecklist {
    pub serial: String,
    pub answers: Vec<ChecklistAnswer>,
    /// Batch-level remark entered on the final step.
    pub global_remark: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ChecklistWizard {
    serial: String,
    material_code: String,
    state: WizardState,
    prior: Option<Vec<ChecklistAnswer>>,
    answers: Vec<ChecklistAnswer>,
    global_remark: Option<String>,
}

impl ChecklistWizard {
    /// A wizard in `Loading` for `selection`. Answers already attached to the
    /// selection are replayed instead of fetching a fresh schema.
    #[must_use]
    pub fn new(selection: &EquipmentSelection, global_remark: Option<String>) -> Self {
        Self {
            serial: selection.serial().to_string(),
            material_code: selection.record.material_code.clone(),
            state: WizardState::Loading,
            prior: selection.checklist.clone(),
            answers: Vec::new(),
            global_remark,
        }
    }

    /// Populate the answers and leave `Loading`. On failure the wizard stays
    /// in `Loading` and can be retried.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::ChecklistFetch`] if the schema cannot be fetched,
    /// [`WorkflowError::Transition`] outside `Loading`.
    pub async fn load(&mut self, service: &dyn FieldService) -> Result<WizardState, WorkflowError> {
        self.guard(WizardEvent::Loaded)?;

        self.answers = if let Some(prior) = &self.prior {
            tracing::debug!(serial = %self.serial, answers = prior.len(), "replaying prior checklist");
            prior.clone()
        } else {
            let questions = service
                .fetch_checklist(&self.material_code)
                .await
                .map_err(|error| {
                    tracing::warn!(material_code = %self.material_code, %error, "checklist fetch failed");
                    WorkflowError::ChecklistFetch {
                        material_code: self.material_code.clone(),
                        message: error.to_string(),
                    }
                })?;
            questions.iter().map(ChecklistAnswer::blank).collect()
        };

        self.apply(WizardEvent::Loaded)
    }

    #[must_use]
    pub const fn state(&self) -> WizardState {
        self.state
    }

    #[must_use]
    pub fn serial(&self) -> &str {
        &self.serial
    }

    #[must_use]
    pub fn answers(&self) -> &[ChecklistAnswer] {
        &self.answers
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.answers.len()
    }

    /// `(current, total)`, 1-based, while on a question.
    #[must_use]
    pub fn progress(&self) -> Option<(usize, usize)> {
        match self.state {
            WizardState::Question(i) => Some((i + 1, self.answers.len())),
            _ => None,
        }
    }

    /// The answer slot for the question on screen.
    #[must_use]
    pub fn current(&self) -> Option<&ChecklistAnswer> {
        match self.state {
            WizardState::Question(i) => self.answers.get(i),
            _ => None,
        }
    }

    /// Set the result for the current question.
    ///
    /// # Errors
    ///
    /// A validation error if `result` is outside the question's answer domain,
    /// [`WorkflowError::Transition`] when no question is on screen.
    pub fn set_result(&mut self, result: AnswerResult) -> Result<(), WorkflowError> {
        let answer = self.current_mut("set_result")?;
        if !result.fits(answer.answer_type) {
            return Err(ValidationError::new(
                format!("checklist.{}.result", answer.question_id),
                format!("'{}' is not a valid {} answer", result.as_wire(), answer.answer_type),
            )
            .into());
        }
        answer.result = Some(result);
        Ok(())
    }

    /// Set the remark for the current question. Blank input clears it.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Transition`] when no question is on screen.
    pub fn set_remark(&mut self, remark: &str) -> Result<(), WorkflowError> {
        let answer = self.current_mut("set_remark")?;
        answer.remark = non_blank(remark);
        Ok(())
    }

    /// Whether `Next` would be accepted.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.current()
            .is_some_and(|answer| validation::validate_answer(answer).is_ok())
    }

    /// Advance past the current question once its answer validates.
    ///
    /// # Errors
    ///
    /// The answer's validation error (state unchanged), or a transition error.
    pub fn next(&mut self) -> Result<WizardState, WorkflowError> {
        self.guard(WizardEvent::Next)?;
        if let Some(answer) = self.current() {
            validation::validate_answer(answer)?;
        }
        self.apply(WizardEvent::Next)
    }

    /// Step back one question. No validation.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Transition`] on the first question or outside the
    /// question sequence.
    pub fn back(&mut self) -> Result<WizardState, WorkflowError> {
        self.apply(WizardEvent::Back)
    }

    /// # Errors
    ///
    /// [`WorkflowError::Transition`] once the wizard is done.
    pub fn set_global_remark(&mut self, remark: &str) -> Result<(), WorkflowError> {
        if self.state == WizardState::Done {
            return Err(WorkflowError::transition(
                "checklist_wizard",
                self.state,
                "set_global_remark",
            ));
        }
        self.global_remark = non_blank(remark);
        Ok(())
    }

    #[must_use]
    pub fn global_remark(&self) -> Option<&str> {
        self.global_remark.as_deref()
    }

    /// Close the wizard and hand back the full answer list for merging.
    ///
    /// # Errors
    ///
    /// A transition error outside `GlobalRemark`, or the first invalid answer.
    pub fn finish(&mut self) -> Result<CompletedChecklist, WorkflowError> {
        self.guard(WizardEvent::Finish)?;
        for answer in &self.answers {
            validation::validate_answer(answer)?;
        }
        self.apply(WizardEvent::Finish)?;
        tracing::debug!(serial = %self.serial, answers = self.answers.len(), "checklist finished");
        Ok(CompletedChecklist {
            serial: self.serial.clone(),
            answers: std::mem::take(&mut self.answers),
            global_remark: self.global_remark.clone(),
        })
    }

    /// Close the wizard discarding every answer gathered in this session.
    /// The selection keeps whatever checklist it had before.
    ///
    /// # Errors
    ///
    /// [`WorkflowError::Transition`] while loading or once done.
    pub fn cancel(&mut self) -> Result<(), WorkflowError> {
        self.apply(WizardEvent::Cancel)?;
        tracing::debug!(serial = %self.serial, "checklist cancelled");
        self.answers.clear();
        Ok(())
    }

    fn guard(&self, event: WizardEvent) -> Result<WizardState, WorkflowError> {
        next_state(self.state, event, self.answers.len())
            .ok_or_else(|| WorkflowError::transition("checklist_wizard", self.state, event))
    }

    fn apply(&mut self, event: WizardEvent) -> Result<WizardState, WorkflowError> {
        self.state = self.guard(event)?;
        Ok(self.state)
    }

    fn current_mut(&mut self, action: &str) -> Result<&mut ChecklistAnswer, WorkflowError> {
        let state = self.state;
        let answer = match state {
            WizardState::Question(i) => self.answers.get_mut(i),
            _ => None,
        };
        answer.ok_or_else(|| WorkflowError::transition("checklist_wizard", state, action))
    }
}

fn non_blank(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
