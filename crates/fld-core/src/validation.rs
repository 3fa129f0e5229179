//! Field validation rules shared by the selection set, the checklist wizard,
//! and batch assembly.
//!
//! Every rule returns a [`ValidationError`] naming the offending field so the
//! caller can refuse the transition without touching the network.

use std::sync::LazyLock;

use regex::Regex;

use crate::entities::{AnswerResult, ChecklistAnswer};
use crate::enums::AnswerType;
use crate::errors::ValidationError;

/// One to three digits with a non-zero leading digit.
static VOLTAGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[1-9][0-9]{0,2}$").expect("voltage pattern is valid"));

/// Validate a site voltage reading.
///
/// # Errors
///
/// Returns [`ValidationError`] if `value` is not 1–3 digits with a non-zero
/// leading digit (`"0"`, `"012"`, `""`, and `"abc"` are all rejected).
pub fn validate_voltage(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::required(field));
    }
    if VOLTAGE_PATTERN.is_match(value) {
        Ok(())
    } else {
        Err(ValidationError::new(
            field,
            format!("'{value}' is not a 1-3 digit reading without a leading zero"),
        ))
    }
}

/// Validate that a free-text field holds something other than whitespace.
///
/// # Errors
///
/// Returns [`ValidationError::required`] for empty or blank values.
pub fn require_text(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::required(field))
    } else {
        Ok(())
    }
}

/// Validate a checklist answer against its question type.
///
/// - `numeric`: a non-empty result
/// - `ok_not_ok`: a result; `NOT OK` additionally needs a remark
/// - `yes_no`: a result; `NO` additionally needs a remark
///
/// # Errors
///
/// Returns [`ValidationError`] naming `checklist.<question_id>.result` or
/// `checklist.<question_id>.remark`.
pub fn validate_answer(answer: &ChecklistAnswer) -> Result<(), ValidationError> {
    let result_field = format!("checklist.{}.result", answer.question_id);
    let Some(result) = &answer.result else {
        return Err(ValidationError::required(result_field));
    };

    if !result.fits(answer.answer_type) {
        return Err(ValidationError::new(
            result_field,
            format!("'{}' is not a valid {} answer", result.as_wire(), answer.answer_type),
        ));
    }

    match (answer.answer_type, result) {
        (AnswerType::Numeric, AnswerResult::Numeric(value)) if value.trim().is_empty() => {
            Err(ValidationError::required(result_field))
        }
        _ if result.is_failing() && !answer.has_remark() => Err(ValidationError::new(
            format!("checklist.{}.remark", answer.question_id),
            format!("is required when the result is {}", result.as_wire()),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::ChecklistQuestion;
    use rstest::rstest;

    #[rstest]
    #[case("1")]
    #[case("9")]
    #[case("230")]
    #[case("415")]
    #[case("999")]
    fn voltage_accepts_one_to_three_digits(#[case] value: &str) {
        assert!(validate_voltage("readings.phase_neutral", value).is_ok());
    }

    #[rstest]
    #[case("0")]
    #[case("012")]
    #[case("")]
    #[case("abc")]
    #[case("1000")]
    #[case(" 230")]
    #[case("23.5")]
    #[case("-12")]
    fn voltage_rejects_malformed(#[case] value: &str) {
        let err = validate_voltage("readings.phase_neutral", value).unwrap_err();
        assert_eq!(err.field, "readings.phase_neutral");
    }

    fn question(answer_type: AnswerType) -> ChecklistQuestion {
        ChecklistQuestion {
            id: "Q7".into(),
            prompt: "Is the unit earthed?".into(),
            answer_type,
            product_group: "Chillers".into(),
        }
    }

    #[test]
    fn unset_result_is_rejected() {
        let answer = ChecklistAnswer::blank(&question(AnswerType::YesNo));
        let err = validate_answer(&answer).unwrap_err();
        assert_eq!(err.field, "checklist.Q7.result");
    }

    #[test]
    fn failing_result_needs_remark() {
        let mut answer = ChecklistAnswer::blank(&question(AnswerType::OkNotOk));
        answer.result = Some(AnswerResult::NotOk);
        let err = validate_answer(&answer).unwrap_err();
        assert_eq!(err.field, "checklist.Q7.remark");

        answer.remark = Some("   ".into());
        assert!(validate_answer(&answer).is_err());

        answer.remark = Some("Loose terminal, retightened".into());
        assert!(validate_answer(&answer).is_ok());
    }

    #[test]
    fn passing_result_needs_no_remark() {
        let mut answer = ChecklistAnswer::blank(&question(AnswerType::YesNo));
        answer.result = Some(AnswerResult::Yes);
        assert!(validate_answer(&answer).is_ok());
    }

    #[test]
    fn numeric_must_be_non_empty() {
        let mut answer = ChecklistAnswer::blank(&question(AnswerType::Numeric));
        answer.result = Some(AnswerResult::Numeric(String::new()));
        assert!(validate_answer(&answer).is_err());

        answer.result = Some(AnswerResult::Numeric("4.5".into()));
        assert!(validate_answer(&answer).is_ok());
    }

    #[test]
    fn result_outside_domain_is_rejected() {
        let mut answer = ChecklistAnswer::blank(&question(AnswerType::YesNo));
        answer.result = Some(AnswerResult::Ok);
        let err = validate_answer(&answer).unwrap_err();
        assert!(err.reason.contains("not a valid yes_no answer"));
    }
}
