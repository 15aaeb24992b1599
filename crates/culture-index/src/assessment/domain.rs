use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Form payload exactly as posted, before any field is trusted.
///
/// Every field is optional and untyped so that a missing or mistyped field
/// surfaces as a validation failure instead of a body-parsing failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSubmission {
    #[serde(default)]
    pub company_name: Option<Value>,
    #[serde(default)]
    pub respondent_name: Option<Value>,
    #[serde(default)]
    pub email: Option<Value>,
    #[serde(default)]
    pub company_size: Option<Value>,
    #[serde(default)]
    pub role: Option<Value>,
    #[serde(default)]
    pub answers: Option<Value>,
}

/// A submission whose required fields have been checked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub company_name: String,
    pub respondent_name: String,
    pub email: String,
    pub company_size: String,
    pub role: String,
    pub answers: Vec<Value>,
}

/// Scored and classified outcome returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    pub total_score: i64,
    pub level_key: &'static str,
    pub description_html: &'static str,
    pub description_text: &'static str,
}
