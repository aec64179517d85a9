use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::json;

use super::{envelope, ApiResult};
use crate::state::AppState;
use carlot_domains::payments::CartItem;

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    nonce: Option<String>,
    #[serde(default)]
    cart: Vec<CartItem>,
}

pub async fn client_token(State(state): State<Arc<AppState>>) -> ApiResult {
    let token = state.checkout.client_token().await?;
    Ok(envelope(
        StatusCode::OK,
        "Client token generated",
        json!({ "clientToken": token }),
    ))
}

pub async fn payment(
    State(state): State<Arc<AppState>>,
    Json(body): Json<PaymentRequest>,
) -> ApiResult {
    let order = state
        .checkout
        .checkout(body.nonce.as_deref(), &body.cart)
        .await?;
    Ok(envelope(
        StatusCode::OK,
        "Payment Successful",
        json!({ "ok": true, "order": order }),
    ))
}
