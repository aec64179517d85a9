pub mod error;
pub mod types;

pub use error::{BraintreeError, Result};
pub use types::{ErrorExtensions, GraphQlError, Money, Transaction};

use std::str::FromStr;
use std::time::Duration;

use serde::de::DeserializeOwned;
use types::{ChargeData, ClientTokenData, GraphQlRequest, GraphQlResponse};

/// Pinned GraphQL schema version sent with every request.
const API_VERSION: &str = "2019-01-01";

const SANDBOX_URL: &str = "https://payments.sandbox.braintree-api.com/graphql";
const PRODUCTION_URL: &str = "https://payments.braintree-api.com/graphql";

const CLIENT_TOKEN_MUTATION: &str = r#"
mutation ClientToken($input: CreateClientTokenInput) {
  createClientToken(input: $input) {
    clientToken
  }
}"#;

const CHARGE_MUTATION: &str = r#"
mutation Charge($input: ChargePaymentMethodInput!) {
  chargePaymentMethod(input: $input) {
    transaction {
      id
      status
      amount { value currencyCode }
    }
  }
}"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Sandbox,
    Production,
}

impl Environment {
    pub fn endpoint(&self) -> &'static str {
        match self {
            Environment::Sandbox => SANDBOX_URL,
            Environment::Production => PRODUCTION_URL,
        }
    }
}

impl FromStr for Environment {
    type Err = BraintreeError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" | "development" => Ok(Environment::Sandbox),
            "production" | "live" => Ok(Environment::Production),
            other => Err(BraintreeError::Environment(other.to_string())),
        }
    }
}

pub struct BraintreeClient {
    client: reqwest::Client,
    endpoint: String,
    merchant_id: String,
    public_key: String,
    private_key: String,
}

impl BraintreeClient {
    pub fn new(
        environment: Environment,
        merchant_id: String,
        public_key: String,
        private_key: String,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self {
            client,
            endpoint: environment.endpoint().to_string(),
            merchant_id,
            public_key,
            private_key,
        })
    }

    /// Point the client at a different GraphQL endpoint (local stubs).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    /// Generate a client token for the drop-in UI.
    pub async fn client_token(&self) -> Result<String> {
        let data: ClientTokenData = self
            .execute(CLIENT_TOKEN_MUTATION, serde_json::json!({ "input": {} }))
            .await?;
        tracing::debug!(merchant_id = %self.merchant_id, "Generated Braintree client token");
        Ok(data.create_client_token.client_token)
    }

    /// Charge a payment method nonce and submit the sale for settlement.
    /// `amount` is in whole currency units.
    pub async fn sale(&self, nonce: &str, amount: u64) -> Result<Transaction> {
        let variables = serde_json::json!({
            "input": {
                "paymentMethodId": nonce,
                "transaction": { "amount": format_amount(amount) },
            }
        });
        let data: ChargeData = self.execute(CHARGE_MUTATION, variables).await?;
        let transaction = data.charge_payment_method.transaction;
        tracing::info!(
            transaction_id = %transaction.id,
            status = %transaction.status,
            amount,
            "Braintree sale completed"
        );
        check_transaction(transaction)
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let resp = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.public_key, Some(&self.private_key))
            .header("Braintree-Version", API_VERSION)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(BraintreeError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let raw: serde_json::Value = resp.json().await?;
        into_data(raw)
    }
}

/// Render whole units the way the gateway expects decimal amounts.
pub fn format_amount(amount: u64) -> String {
    format!("{amount}.00")
}

/// Unwrap a GraphQL response, classifying `VALIDATION` errors as declines.
fn into_data<T: DeserializeOwned>(raw: serde_json::Value) -> Result<T> {
    let response: GraphQlResponse<T> = serde_json::from_value(raw.clone())?;

    if let Some(first) = response.errors.first() {
        let declined = response.errors.iter().any(|e| {
            e.extensions
                .as_ref()
                .and_then(|x| x.error_class.as_deref())
                == Some("VALIDATION")
        });
        if declined {
            return Err(BraintreeError::Declined {
                message: first.message.clone(),
                payload: raw,
            });
        }
        let message = response
            .errors
            .iter()
            .map(|e| e.message.as_str())
            .collect::<Vec<_>>()
            .join("; ");
        return Err(BraintreeError::Api {
            status: 200,
            message,
        });
    }

    response
        .data
        .ok_or_else(|| BraintreeError::Parse("response carried neither data nor errors".into()))
}

fn check_transaction(transaction: Transaction) -> Result<Transaction> {
    if transaction.is_successful() {
        return Ok(transaction);
    }
    let message = format!("transaction {} ended as {}", transaction.id, transaction.status);
    let payload = serde_json::to_value(&transaction)?;
    Err(BraintreeError::Declined { message, payload })
}
