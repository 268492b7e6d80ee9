use actix_web::{http::StatusCode, HttpResponse};

use crate::validation::FieldErrors;

pub(crate) fn json_error_with_code(
    status: StatusCode,
    message: impl Into<String>,
    error_code: Option<&str>,
) -> HttpResponse {
    let mut body = serde_json::json!({
        "success": false,
        "error": message.into(),
    });
    if let Some(code) = error_code {
        body["error_code"] = serde_json::Value::String(code.to_string());
    }
    HttpResponse::build(status).json(body)
}

/// 422 with every failing field listed under `errors`.
pub(crate) fn json_validation_error(errors: &FieldErrors) -> HttpResponse {
    let mut body = serde_json::json!({
        "success": false,
        "error": "the given data was invalid",
        "error_code": "validation_failed",
    });
    body["errors"] = serde_json::json!(errors);
    HttpResponse::build(StatusCode::UNPROCESSABLE_ENTITY).json(body)
}

pub(crate) fn internal_error(context: &str, err: impl std::fmt::Display) -> HttpResponse {
    tracing::error!("{context} failed: {err}");
    json_error_with_code(
        StatusCode::INTERNAL_SERVER_ERROR,
        "race store error",
        Some("internal_error"),
    )
}
