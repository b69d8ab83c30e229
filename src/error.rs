// HTTP API error contract
//
// Every handler step returns `Result<_, Failure>`. The failure is formatted
// exactly once, at the handler boundary, through `format_error`.
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::collections::BTreeMap;
use validator::ValidationErrors;

use crate::database::StoreError;

pub const UNAUTHORIZED_MESSAGE: &str = "Tidak terautentikasi";
pub const NOT_FOUND_MESSAGE: &str = "Data tidak ditemukan";
pub const VALIDATION_MESSAGE: &str = "Data tidak valid";
pub const INTERNAL_MESSAGE: &str = "Terjadi kesalahan pada server";

/// Stable machine-readable error codes
pub mod codes {
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const VALIDATION: &str = "VALIDATION";
    pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
}

/// Structured API error raised at the point of failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    status: u16,
    message: String,
    code: String,
    fields: Option<BTreeMap<String, String>>,
}

impl ApiError {
    /// Build an error from its raw parts. Statuses outside 400..=599 are
    /// clamped to 500 so the value can always become a response.
    pub fn new(status: u16, message: impl Into<String>, code: impl Into<String>) -> Self {
        let status = if (400..=599).contains(&status) { status } else { 500 };
        Self {
            status,
            message: message.into(),
            code: code.into(),
            fields: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(401, UNAUTHORIZED_MESSAGE, codes::UNAUTHORIZED)
    }

    pub fn unauthorized_with(message: impl Into<String>) -> Self {
        Self::new(401, message, codes::UNAUTHORIZED)
    }

    pub fn not_found() -> Self {
        Self::new(404, NOT_FOUND_MESSAGE, codes::NOT_FOUND)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(400, message, codes::VALIDATION)
    }

    pub fn internal() -> Self {
        Self::new(500, INTERNAL_MESSAGE, codes::INTERNAL_ERROR)
    }

    /// Attach per-field validation messages
    pub fn with_fields(mut self, fields: BTreeMap<String, String>) -> Self {
        if !fields.is_empty() {
            self.fields = Some(fields);
        }
        self
    }

    pub fn with_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        self.fields
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), message.into());
        self
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, String>> {
        self.fields.as_ref()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.status, self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Anything a handler step can fail with
#[derive(Debug)]
pub enum Failure {
    /// A failure the handler anticipated and described
    Api(ApiError),
    /// Anything else. Only its `Debug`/`Display` reach the logs.
    Unexpected(anyhow::Error),
}

impl From<ApiError> for Failure {
    fn from(err: ApiError) -> Self {
        Failure::Api(err)
    }
}

impl From<anyhow::Error> for Failure {
    fn from(err: anyhow::Error) -> Self {
        Failure::Unexpected(err)
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Failure::Api(ApiError::not_found()),
            StoreError::Conflict(field) => Failure::Api(
                ApiError::validation("Data dengan nilai tersebut sudah ada")
                    .with_field(field, "sudah digunakan"),
            ),
            StoreError::UnknownField(field) => Failure::Api(
                ApiError::validation(VALIDATION_MESSAGE).with_field(field, "kolom tidak dikenal"),
            ),
            other => Failure::Unexpected(other.into()),
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .filter_map(|(field, errs)| {
                errs.first().map(|err| {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    (field.to_string(), message)
                })
            })
            .collect();
        ApiError::validation(VALIDATION_MESSAGE).with_fields(fields)
    }
}

impl From<ValidationErrors> for Failure {
    fn from(errors: ValidationErrors) -> Self {
        Failure::Api(errors.into())
    }
}

/// JSON body of every error response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<BTreeMap<String, String>>,
}

/// Status plus body, ready to be sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    pub status: u16,
    pub body: ErrorBody,
}

fn structured(err: &ApiError) -> ErrorResponse {
    ErrorResponse {
        status: err.status,
        body: ErrorBody {
            error: err.message.clone(),
            code: Some(err.code.clone()),
            fields: err.fields.clone(),
        },
    }
}

/// Map any failure to the client-facing response. Never panics and never
/// copies anything from an unstructured error into the body.
pub fn format_error(failure: &Failure) -> ErrorResponse {
    match failure {
        Failure::Api(err) => structured(err),
        Failure::Unexpected(err) => match err.downcast_ref::<ApiError>() {
            Some(api) => structured(api),
            None => structured(&ApiError::internal()),
        },
    }
}

/// Operator-side record of a failed operation. Does not affect the response.
pub fn log_error(operation: &str, failure: &Failure) {
    match failure {
        Failure::Api(err) if err.status < 500 => {
            tracing::debug!(operation, status = err.status, code = %err.code, "request rejected");
        }
        Failure::Api(err) => {
            tracing::error!(operation, status = err.status, code = %err.code, "operation failed: {}", err.message);
        }
        Failure::Unexpected(err) => {
            tracing::error!(operation, "operation failed: {:#}", err);
        }
    }
}

/// Log the error side of a step result under an operation name
pub trait LogOperation<T> {
    fn log_operation(self, operation: &str) -> Result<T, Failure>;
}

impl<T, E: Into<Failure>> LogOperation<T> for Result<T, E> {
    fn log_operation(self, operation: &str) -> Result<T, Failure> {
        self.map_err(|err| {
            let failure = err.into();
            log_error(operation, &failure);
            failure
        })
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.body)).into_response()
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> axum::response::Response {
        format_error(&self).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        format_error(&Failure::Api(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_structured_error_verbatim() {
        let failure = Failure::Api(ApiError::new(404, "Not found", "NOT_FOUND"));
        let response = format_error(&failure);

        assert_eq!(response.status, 404);
        assert_eq!(
            serde_json::to_value(&response.body).unwrap(),
            json!({"error": "Not found", "code": "NOT_FOUND"})
        );
    }

    #[test]
    fn unstructured_errors_become_generic_500() {
        let raw = anyhow::anyhow!("duplicate key value violates unique constraint \"users_pkey\"");
        let response = format_error(&Failure::Unexpected(raw));

        assert_eq!(response.status, 500);
        assert_eq!(response.body.code.as_deref(), Some(codes::INTERNAL_ERROR));
        assert_eq!(response.body.error, INTERNAL_MESSAGE);
        assert!(response.body.fields.is_none());

        let text = serde_json::to_string(&response.body).unwrap();
        assert!(!text.contains("duplicate"));
        assert!(!text.contains("users_pkey"));
    }

    #[test]
    fn wrapped_api_error_is_recovered() {
        let raw: anyhow::Error = ApiError::unauthorized().into();
        let response = format_error(&Failure::Unexpected(raw));
        assert_eq!(response.status, 401);
        assert_eq!(response.body.error, UNAUTHORIZED_MESSAGE);
    }

    #[test]
    fn formatting_is_idempotent() {
        let failure = Failure::Api(ApiError::validation("bad").with_field("title", "wajib diisi"));
        assert_eq!(format_error(&failure), format_error(&failure));
    }

    #[test]
    fn store_errors_map_to_taxonomy() {
        let not_found = format_error(&StoreError::NotFound.into());
        assert_eq!((not_found.status, not_found.body.code.as_deref()), (404, Some("NOT_FOUND")));

        let conflict = format_error(&StoreError::Conflict("slug".to_string()).into());
        assert_eq!(conflict.status, 400);
        assert_eq!(conflict.body.fields.unwrap().get("slug").map(String::as_str), Some("sudah digunakan"));

        let backend = format_error(&StoreError::Backend("connection reset".to_string()).into());
        assert_eq!(backend.status, 500);
        assert_eq!(backend.body.error, INTERNAL_MESSAGE);
    }

    #[test]
    fn out_of_range_status_is_clamped() {
        assert_eq!(ApiError::new(200, "ok?", "WEIRD").status(), 500);
        assert_eq!(ApiError::new(418, "teapot", "TEAPOT").status(), 418);
    }

    #[test]
    fn log_operation_keeps_the_failure() {
        let result: Result<(), StoreError> = Err(StoreError::NotFound);
        let failure = result.log_operation("testimonials.delete").unwrap_err();
        assert_eq!(format_error(&failure).status, 404);
    }
}
