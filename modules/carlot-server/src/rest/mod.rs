pub mod brand;
pub mod car;
pub mod chatbot;
pub mod multipart;
pub mod payment;
pub mod views;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Map, Value};
use tracing::{error, warn};

use carlot_domains::CatalogError;

/// `CatalogError` rendered as the `{success: false, message}` envelope.
#[derive(Debug)]
pub struct ApiError(pub CatalogError);

impl From<CatalogError> for ApiError {
    fn from(err: CatalogError) -> Self {
        ApiError(err)
    }
}

pub type ApiResult = Result<Response, ApiError>;

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CatalogError::Validation(_) => StatusCode::BAD_REQUEST,
            CatalogError::Duplicate(_) => StatusCode::CONFLICT,
            CatalogError::NotFound(_) => StatusCode::NOT_FOUND,
            CatalogError::Payment { .. } => StatusCode::PAYMENT_REQUIRED,
            CatalogError::PaymentUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            CatalogError::Dependency(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self.0 {
            CatalogError::Dependency(e) => {
                error!(error = ?e, "Request failed");
                json!({ "success": false, "message": "Something went wrong" })
            }
            CatalogError::Payment { message, payload } => {
                warn!(%message, "Payment declined");
                json!({ "success": false, "message": message, "error": payload })
            }
            other => json!({ "success": false, "message": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}

/// `{success: true, message, ...payload}` with the given status.
pub fn envelope(status: StatusCode, message: &str, payload: Value) -> Response {
    let mut body = Map::new();
    body.insert("success".into(), Value::Bool(true));
    body.insert("message".into(), Value::String(message.to_string()));
    if let Value::Object(fields) = payload {
        body.extend(fields);
    }
    (status, Json(Value::Object(body))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_error_kind_has_its_own_status() {
        let cases = [
            (CatalogError::validation("x"), StatusCode::BAD_REQUEST),
            (CatalogError::Duplicate("x".into()), StatusCode::CONFLICT),
            (CatalogError::not_found("x"), StatusCode::NOT_FOUND),
            (
                CatalogError::Payment {
                    message: "x".into(),
                    payload: Value::Null,
                },
                StatusCode::PAYMENT_REQUIRED,
            ),
            (CatalogError::PaymentUnavailable, StatusCode::SERVICE_UNAVAILABLE),
            (
                CatalogError::Dependency(anyhow::anyhow!("db down")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).into_response().status(), status);
        }
    }

    #[test]
    fn envelope_merges_payload_fields() {
        let resp = envelope(StatusCode::CREATED, "Done", json!({ "count": 2 }));
        assert_eq!(resp.status(), StatusCode::CREATED);
    }
}
