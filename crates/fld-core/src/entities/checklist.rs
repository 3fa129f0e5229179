use serde::{Deserialize, Serialize};

use crate::enums::AnswerType;

/// One inspection question from the per-material schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistQuestion {
    pub id: String,
    pub prompt: String,
    pub answer_type: AnswerType,
    pub product_group: String,
}

/// A result value within an [`AnswerType`] domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AnswerResult {
    Numeric(String),
    Ok,
    NotOk,
    Yes,
    No,
}

impl AnswerResult {
    /// Wire label sent to the remote service.
    #[must_use]
    pub fn as_wire(&self) -> &str {
        match self {
            Self::Numeric(value) => value,
            Self::Ok => "OK",
            Self::NotOk => "NOT OK",
            Self::Yes => "YES",
            Self::No => "NO",
        }
    }

    /// `NOT OK` and `NO` are failing values; they require a remark.
    #[must_use]
    pub const fn is_failing(&self) -> bool {
        matches!(self, Self::NotOk | Self::No)
    }

    /// Whether this value belongs to the domain of `answer_type`.
    #[must_use]
    pub const fn fits(&self, answer_type: AnswerType) -> bool {
        matches!(
            (answer_type, self),
            (AnswerType::Numeric, Self::Numeric(_))
                | (AnswerType::OkNotOk, Self::Ok | Self::NotOk)
                | (AnswerType::YesNo, Self::Yes | Self::No)
        )
    }
}

/// An answer to one checklist question.
///
/// Carries a copy of the question's prompt and product group so a re-opened
/// wizard can replay prior answers without refetching the schema.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistAnswer {
    pub question_id: String,
    pub prompt: String,
    pub answer_type: AnswerType,
    pub product_group: String,
    pub result: Option<AnswerResult>,
    pub remark: Option<String>,
}

impl ChecklistAnswer {
    /// An unanswered slot for `question`.
    #[must_use]
    pub fn blank(question: &ChecklistQuestion) -> Self {
        Self {
            question_id: question.id.clone(),
            prompt: question.prompt.clone(),
            answer_type: question.answer_type,
            product_group: question.product_group.clone(),
            result: None,
            remark: None,
        }
    }

    #[must_use]
    pub fn has_remark(&self) -> bool {
        self.remark.as_deref().is_some_and(|r| !r.trim().is_empty())
    }
}
