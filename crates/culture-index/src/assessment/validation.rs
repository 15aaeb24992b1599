use serde_json::Value;

use super::domain::{RawSubmission, Submission};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("required field `{0}` is missing or blank")]
    MissingField(&'static str),
    #[error("field `answers` must be an array")]
    AnswersNotSequence,
}

/// Checks required fields in form order and stops at the first failure.
pub fn validate(raw: RawSubmission) -> Result<Submission, ValidationError> {
    let RawSubmission {
        company_name,
        respondent_name,
        email,
        company_size,
        role,
        answers,
    } = raw;

    let company_name = required_text(company_name, "companyName")?;
    let respondent_name = required_text(respondent_name, "respondentName")?;
    let email = required_text(email, "email")?;
    let company_size = required_text(company_size, "companySize")?;
    let role = required_text(role, "role")?;

    let answers = match answers {
        Some(Value::Array(values)) => values,
        _ => return Err(ValidationError::AnswersNotSequence),
    };

    Ok(Submission {
        company_name,
        respondent_name,
        email,
        company_size,
        role,
        answers,
    })
}

fn required_text(value: Option<Value>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        Some(Value::String(text)) if !text.trim().is_empty() => Ok(text.trim().to_string()),
        _ => Err(ValidationError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn complete() -> RawSubmission {
        RawSubmission {
            company_name: Some(json!("Acme Ltda")),
            respondent_name: Some(json!("Ana Souza")),
            email: Some(json!("ana@acme.com.br")),
            company_size: Some(json!("51-200")),
            role: Some(json!("CEO")),
            answers: Some(json!([3, 4, 5])),
        }
    }

    #[test]
    fn accepts_complete_submission_and_trims_text() {
        let mut raw = complete();
        raw.company_name = Some(json!("  Acme Ltda "));
        let submission = validate(raw).expect("valid submission");
        assert_eq!(submission.company_name, "Acme Ltda");
        assert_eq!(submission.answers.len(), 3);
    }

    #[test]
    fn reports_first_missing_field() {
        let mut raw = complete();
        raw.email = None;
        raw.role = None;
        assert_eq!(validate(raw), Err(ValidationError::MissingField("email")));
    }

    #[test]
    fn blank_and_non_text_values_count_as_missing() {
        let mut blank = complete();
        blank.respondent_name = Some(json!("   "));
        assert_eq!(
            validate(blank),
            Err(ValidationError::MissingField("respondentName"))
        );

        let mut numeric = complete();
        numeric.company_size = Some(json!(50));
        assert_eq!(
            validate(numeric),
            Err(ValidationError::MissingField("companySize"))
        );
    }

    #[test]
    fn answers_must_be_an_array() {
        for answers in [None, Some(json!("5,5,5")), Some(json!({ "q1": 5 }))] {
            let mut raw = complete();
            raw.answers = answers;
            assert_eq!(validate(raw), Err(ValidationError::AnswersNotSequence));
        }
    }

    #[test]
    fn empty_answer_list_is_structurally_valid() {
        let mut raw = complete();
        raw.answers = Some(json!([]));
        assert!(validate(raw).expect("valid").answers.is_empty());
    }
}
