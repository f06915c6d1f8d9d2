//! RFC 7807 problem details payloads.
//!
//! <https://tools.ietf.org/html/rfc7807>

use patients_core::ValidationErrors;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content type for problem details responses.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Extension key holding debug-only exception details.
pub const EXCEPTION_DETAILS_KEY: &str = "exceptionDetails";

/// Extension key holding per-field validation errors.
pub const ERRORS_KEY: &str = "errors";

/// Status used for validation failures.
pub const VALIDATION_STATUS: u16 = 422;

pub const VALIDATION_TITLE: &str = "Validation Failed";

/// Short label for an HTTP status code.
pub fn status_title(status: u16) -> String {
    let title = match status {
        400 => "Bad Request",
        401 => "Unauthorized",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        409 => "Conflict",
        422 => "Unprocessable Entity",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        503 => "Service Unavailable",
        other => return format!("Status Code {other}"),
    };
    title.to_string()
}

/// URI identifying the problem category for an HTTP status code.
pub fn status_type_uri(status: u16) -> String {
    let uri = match status {
        400 => "https://tools.ietf.org/html/rfc7231#section-6.5.1",
        401 => "https://tools.ietf.org/html/rfc7235#section-3.1",
        403 => "https://tools.ietf.org/html/rfc7231#section-6.5.3",
        404 => "https://tools.ietf.org/html/rfc7231#section-6.5.4",
        405 => "https://tools.ietf.org/html/rfc7231#section-6.5.5",
        409 => "https://tools.ietf.org/html/rfc7231#section-6.5.8",
        422 => "https://tools.ietf.org/html/rfc4918#section-11.2",
        500 => "https://tools.ietf.org/html/rfc7231#section-6.6.1",
        501 => "https://tools.ietf.org/html/rfc7231#section-6.6.2",
        503 => "https://tools.ietf.org/html/rfc7231#section-6.6.4",
        other => return format!("https://httpstatuses.com/{other}"),
    };
    uri.to_string()
}

/// A problem details body.
///
/// Fields outside the five standard members live in `extensions` and are serialised at the top
/// level of the JSON object.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_uri: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub instance: String,
    #[serde(flatten)]
    pub extensions: Map<String, Value>,
}

impl ProblemDetails {
    /// Generic payload for `status`, with title and type taken from the status table.
    pub fn for_status(status: u16, detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            type_uri: status_type_uri(status),
            title: status_title(status),
            status,
            detail: detail.into(),
            instance: instance.into(),
            extensions: Map::new(),
        }
    }

    pub fn with_extension(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extensions.insert(key.into(), value.into());
        self
    }

    /// Attaches `exceptionDetails { name, message, stack }`.
    pub fn with_exception_details(self, name: &str, message: &str, stack: &str) -> Self {
        let mut details = Map::new();
        details.insert("name".into(), Value::from(name));
        details.insert("message".into(), Value::from(message));
        details.insert("stack".into(), Value::from(stack));
        self.with_extension(EXCEPTION_DETAILS_KEY, Value::Object(details))
    }

    pub fn extension(&self, key: &str) -> Option<&Value> {
        self.extensions.get(key)
    }
}

/// A problem details body for validation failures.
///
/// The `errors` map is mandatory and keyed by the field names the failures were raised under.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValidationProblemDetails {
    #[serde(flatten)]
    pub problem: ProblemDetails,
    pub errors: ValidationErrors,
}

impl ValidationProblemDetails {
    pub fn new(errors: ValidationErrors, detail: impl Into<String>, instance: impl Into<String>) -> Self {
        Self {
            problem: ProblemDetails {
                type_uri: status_type_uri(VALIDATION_STATUS),
                title: VALIDATION_TITLE.to_string(),
                status: VALIDATION_STATUS,
                detail: detail.into(),
                instance: instance.into(),
                extensions: Map::new(),
            },
            errors,
        }
    }
}

impl From<ValidationProblemDetails> for ProblemDetails {
    fn from(value: ValidationProblemDetails) -> Self {
        let errors = value
            .errors
            .into_iter()
            .map(|(field, messages)| (field, Value::from(messages)))
            .collect::<Map<String, Value>>();
        value
            .problem
            .with_extension(ERRORS_KEY, Value::Object(errors))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_tables_cover_known_and_unknown_codes() {
        assert_eq!(status_title(404), "Not Found");
        assert_eq!(status_title(422), "Unprocessable Entity");
        assert_eq!(status_title(418), "Status Code 418");
        assert_eq!(
            status_type_uri(404),
            "https://tools.ietf.org/html/rfc7231#section-6.5.4"
        );
        assert_eq!(status_type_uri(418), "https://httpstatuses.com/418");
    }

    #[test]
    fn serialises_standard_members_and_flat_extensions() {
        let problem = ProblemDetails::for_status(403, "Not yours", "/api/patients/1")
            .with_extension("traceId", "abc");
        let value = serde_json::to_value(&problem).expect("serialise");

        assert_eq!(
            value,
            json!({
                "type": "https://tools.ietf.org/html/rfc7231#section-6.5.3",
                "title": "Forbidden",
                "status": 403,
                "detail": "Not yours",
                "instance": "/api/patients/1",
                "traceId": "abc",
            })
        );
    }

    #[test]
    fn exception_details_are_nested_under_one_key() {
        let problem = ProblemDetails::for_status(500, "boom", "/x").with_exception_details(
            "Error",
            "boom",
            "Error: boom",
        );
        assert_eq!(
            problem.extension(EXCEPTION_DETAILS_KEY),
            Some(&json!({"name": "Error", "message": "boom", "stack": "Error: boom"}))
        );
    }

    #[test]
    fn validation_problem_flattens_into_problem_details() {
        let mut errors = ValidationErrors::new();
        errors.insert(
            "Lifespan".into(),
            vec!["Age cannot be more than 120 years.".into()],
        );
        let validation = ValidationProblemDetails::new(errors, "bad age", "/api/patients");

        let direct = serde_json::to_value(&validation).expect("serialise validation");
        let converted =
            serde_json::to_value(ProblemDetails::from(validation)).expect("serialise converted");
        assert_eq!(direct, converted);
        assert_eq!(direct["status"], 422);
        assert_eq!(direct["title"], VALIDATION_TITLE);
        assert_eq!(
            direct["errors"]["Lifespan"][0],
            "Age cannot be more than 120 years."
        );
    }
}
