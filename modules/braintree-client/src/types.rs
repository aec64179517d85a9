use serde::{Deserialize, Serialize};

// --- GraphQL envelope ---

#[derive(Debug, Clone, Serialize)]
pub(crate) struct GraphQlRequest<'a> {
    pub query: &'a str,
    pub variables: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub extensions: Option<ErrorExtensions>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorExtensions {
    /// `VALIDATION` for caller-correctable problems, `INTERNAL`,
    /// `AUTHENTICATION` etc. otherwise.
    pub error_class: Option<String>,
    pub legacy_code: Option<String>,
}

// --- createClientToken ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientTokenData {
    pub create_client_token: ClientTokenPayload,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ClientTokenPayload {
    pub client_token: String,
}

// --- chargePaymentMethod ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChargeData {
    pub charge_payment_method: ChargePayload,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ChargePayload {
    pub transaction: Transaction,
}

/// A sale transaction as reported by the gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub status: String,
    pub amount: Option<Money>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    pub value: String,
    pub currency_code: Option<String>,
}

impl Transaction {
    /// Statuses that mean the money is (or will be) captured.
    pub fn is_successful(&self) -> bool {
        matches!(
            self.status.as_str(),
            "AUTHORIZED" | "SUBMITTED_FOR_SETTLEMENT" | "SETTLING" | "SETTLEMENT_PENDING" | "SETTLED"
        )
    }
}
