use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Response returned to calling code in both modes.
///
/// Mock handlers build these directly; the live transport fills them from the
/// backend's reply, so callers never need to know which mode is active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }

    pub fn created(body: Value) -> Self {
        Self::new(201, body)
    }

    pub fn no_content() -> Self {
        Self::new(204, Value::Null)
    }

    /// Error body in the backend's `{"detail": "..."}` form.
    pub fn detail(status: u16, message: &str) -> Self {
        Self::new(status, json!({ "detail": message }))
    }

    pub fn unauthorized() -> Self {
        Self::detail(401, "Not authenticated")
    }

    pub fn not_found(message: &str) -> Self {
        Self::detail(404, message)
    }

    /// 422 body listing every failed field, mirroring the backend's
    /// request validation errors.
    pub fn validation(errors: Vec<FieldError>) -> Self {
        Self::new(422, json!({ "detail": errors }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        T::deserialize(&self.body)
    }
}

/// One entry of a validation error body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub loc: Vec<String>,
    pub msg: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl FieldError {
    pub fn new(location: &str, field: &str, msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: vec![location.to_string(), field.to_string()],
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }

    pub fn missing(field: &str) -> Self {
        Self::new("body", field, "field required", "value_error.missing")
    }

    pub fn invalid(field: &str, msg: impl Into<String>) -> Self {
        Self::new("body", field, msg, "value_error")
    }

    pub fn invalid_query(field: &str, msg: impl Into<String>) -> Self {
        Self::new("query", field, msg, "value_error")
    }

    pub fn invalid_path(field: &str, msg: impl Into<String>) -> Self {
        Self::new("path", field, msg, "value_error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_shape() {
        let resp = ApiResponse::validation(vec![FieldError::missing("qty")]);
        assert_eq!(resp.status, 422);
        assert_eq!(resp.body["detail"][0]["loc"], json!(["body", "qty"]));
        assert_eq!(resp.body["detail"][0]["type"], "value_error.missing");
        assert!(!resp.is_success());
    }

    #[test]
    fn test_unauthorized_shape() {
        let resp = ApiResponse::unauthorized();
        assert_eq!(resp.status, 401);
        assert_eq!(resp.body, json!({ "detail": "Not authenticated" }));
    }
}
