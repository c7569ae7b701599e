use std::fmt;

use serde::{Deserialize, Serialize};

/// Result body of `POST /validate`, tagged by its `status` field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ValidationOutcome {
    Pass,
    Fail { errors: Vec<ValidationError> },
}

impl ValidationOutcome {
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Error records in the order the service reported them.
    pub fn errors(&self) -> &[ValidationError] {
        match self {
            Self::Pass => &[],
            Self::Fail { errors } => errors,
        }
    }
}

/// One problem found by the service. Only `error_message` is guaranteed;
/// `row_index` and `id` follow the service's own conventions and are passed
/// through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    #[serde(default)]
    pub id: Option<ErrorId>,
    #[serde(default)]
    pub row_index: Option<i64>,
    #[serde(default)]
    pub column: Option<String>,
    pub error_message: String,
}

/// Opaque record identifier; the service may send text or a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorId {
    Text(String),
    Number(serde_json::Number),
}

impl fmt::Display for ErrorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Number(number) => number.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pass() {
        let outcome: ValidationOutcome = serde_json::from_str(r#"{"status":"pass"}"#).unwrap();
        assert!(outcome.is_pass());
        assert!(outcome.errors().is_empty());
    }

    #[test]
    fn decodes_fail_preserving_order_and_optional_fields() {
        let raw = r#"{
            "status": "fail",
            "errors": [
                {"id": "1", "row_index": 3, "column": "email", "error_message": "invalid format"},
                {"id": 42, "row_index": null, "column": null, "error_message": "Missing required columns: age"},
                {"error_message": "Volume check failed"}
            ]
        }"#;
        let outcome: ValidationOutcome = serde_json::from_str(raw).unwrap();
        let errors = outcome.errors();
        assert_eq!(errors.len(), 3);

        assert_eq!(errors[0].id, Some(ErrorId::Text("1".into())));
        assert_eq!(errors[0].row_index, Some(3));
        assert_eq!(errors[0].column.as_deref(), Some("email"));

        assert_eq!(errors[1].id.as_ref().map(ToString::to_string).as_deref(), Some("42"));
        assert_eq!(errors[1].row_index, None);
        assert_eq!(errors[1].error_message, "Missing required columns: age");

        assert_eq!(errors[2].id, None);
        assert_eq!(errors[2].column, None);
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(serde_json::from_str::<ValidationOutcome>(r#"{"status":"maybe"}"#).is_err());
        assert!(serde_json::from_str::<ValidationOutcome>(r#"{"errors":[]}"#).is_err());
    }

    #[test]
    fn rejects_fail_without_errors_or_messages() {
        assert!(serde_json::from_str::<ValidationOutcome>(r#"{"status":"fail"}"#).is_err());
        assert!(serde_json::from_str::<ValidationOutcome>(
            r#"{"status":"fail","errors":[{"column":"age"}]}"#
        )
        .is_err());
    }
}
