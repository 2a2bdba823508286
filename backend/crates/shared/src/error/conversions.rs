//! HTTP rendering of [`AppError`] (`axum` feature)
//!
//! The body is an RFC 7807 problem document with an extra `errors` member
//! for field-level validation messages.

#[cfg(feature = "axum")]
use super::app_error::AppError;

#[cfg(feature = "axum")]
impl AppError {
    pub fn to_problem_json(&self) -> serde_json::Value {
        let mut body = serde_json::json!({
            "type": format!("https://httpstatuses.io/{}", self.status_code()),
            "title": self.kind().as_str(),
            "status": self.status_code(),
            "detail": self.message(),
            "action": self.action(),
        });
        if let Some(errors) = self.validation_errors() {
            body["errors"] = serde_json::to_value(errors).unwrap_or_default();
        }
        body
    }
}

#[cfg(feature = "axum")]
impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status = http::StatusCode::from_u16(self.status_code())
            .unwrap_or(http::StatusCode::INTERNAL_SERVER_ERROR);

        (status, axum::Json(self.to_problem_json())).into_response()
    }
}
