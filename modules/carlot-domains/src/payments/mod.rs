// Payment boundary and checkout.
//
// PaymentGateway hides the card processor behind two calls. BraintreeGateway
// is the production implementation; FakeGateway in `crate::testing` backs
// unit and HTTP tests.
//
// Checkout never trusts client prices: the amount charged is the sum of the
// catalog prices of the cart entries.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use braintree_client::{BraintreeClient, BraintreeError};
use serde::Deserialize;
use uuid::Uuid;

use crate::catalog::{CatalogStore, NewOrder, Order};
use crate::error::{CatalogError, CatalogResult};

/// What the gateway reported for a successful sale.
#[derive(Debug, Clone)]
pub struct SaleOutcome {
    pub transaction_id: String,
    pub status: String,
    pub payload: serde_json::Value,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Token for the client-side drop-in UI.
    async fn client_token(&self) -> CatalogResult<String>;

    /// Charge `nonce` for `amount` whole currency units.
    async fn sale(&self, nonce: &str, amount: u64) -> CatalogResult<SaleOutcome>;
}

// ---------------------------------------------------------------------------
// BraintreeGateway
// ---------------------------------------------------------------------------

pub struct BraintreeGateway {
    client: BraintreeClient,
}

impl BraintreeGateway {
    pub fn new(client: BraintreeClient) -> Self {
        Self { client }
    }
}

fn gateway_error(err: BraintreeError) -> CatalogError {
    match err {
        BraintreeError::Declined { message, payload } => CatalogError::Payment { message, payload },
        other => CatalogError::Dependency(anyhow::Error::new(other).context("payment gateway")),
    }
}

#[async_trait]
impl PaymentGateway for BraintreeGateway {
    async fn client_token(&self) -> CatalogResult<String> {
        self.client.client_token().await.map_err(gateway_error)
    }

    async fn sale(&self, nonce: &str, amount: u64) -> CatalogResult<SaleOutcome> {
        let transaction = self.client.sale(nonce, amount).await.map_err(gateway_error)?;
        let payload = serde_json::to_value(&transaction)
            .map_err(|e| CatalogError::Dependency(e.into()))?;
        Ok(SaleOutcome {
            transaction_id: transaction.id,
            status: transaction.status,
            payload,
        })
    }
}

// ---------------------------------------------------------------------------
// Checkout
// ---------------------------------------------------------------------------

/// One cart entry as sent by the storefront. Only the id is read; any
/// price the client sends is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct CartItem {
    #[serde(alias = "_id")]
    pub id: String,
}

impl CartItem {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

#[derive(Clone)]
pub struct CheckoutService {
    store: Arc<dyn CatalogStore>,
    gateway: Option<Arc<dyn PaymentGateway>>,
}

impl CheckoutService {
    pub fn new(store: Arc<dyn CatalogStore>, gateway: Option<Arc<dyn PaymentGateway>>) -> Self {
        Self { store, gateway }
    }

    fn gateway(&self) -> CatalogResult<&Arc<dyn PaymentGateway>> {
        self.gateway.as_ref().ok_or(CatalogError::PaymentUnavailable)
    }

    pub async fn client_token(&self) -> CatalogResult<String> {
        self.gateway()?.client_token().await
    }

    /// Price the cart from the catalog, charge it, and record the order.
    pub async fn checkout(&self, nonce: Option<&str>, cart: &[CartItem]) -> CatalogResult<Order> {
        let gateway = self.gateway()?;

        if cart.is_empty() {
            return Err(CatalogError::validation("Cart is empty"));
        }
        let Some(nonce) = nonce.map(str::trim).filter(|n| !n.is_empty()) else {
            return Err(CatalogError::validation("Payment nonce is required"));
        };

        let car_ids = cart
            .iter()
            .map(|item| {
                Uuid::parse_str(item.id.trim())
                    .map_err(|_| CatalogError::validation("cart contains an invalid car id"))
            })
            .collect::<CatalogResult<Vec<Uuid>>>()?;

        let amount = self.price_cart(&car_ids).await?;
        let recorded_amount = i64::try_from(amount)
            .map_err(|_| CatalogError::validation("Cart total is too large"))?;
        let sale = gateway.sale(nonce, amount).await?;

        let order = self
            .store
            .insert_order(NewOrder {
                car_ids,
                amount: recorded_amount,
                transaction_id: sale.transaction_id.clone(),
                status: sale.status,
                payment: sale.payload,
            })
            .await
            .map_err(|e| {
                tracing::error!(
                    transaction_id = %sale.transaction_id,
                    error = %e,
                    "Payment captured but order was not recorded"
                );
                CatalogError::Dependency(e)
            })?;

        tracing::info!(
            order_id = %order.id,
            transaction_id = %order.transaction_id,
            amount = order.amount,
            cars = order.car_ids.len(),
            "Order recorded"
        );
        Ok(order)
    }

    /// Sum of catalog prices, one per cart entry (repeated ids count twice).
    async fn price_cart(&self, car_ids: &[Uuid]) -> CatalogResult<u64> {
        let prices: HashMap<Uuid, i64> = self
            .store
            .cars_by_ids(car_ids)
            .await?
            .into_iter()
            .map(|car| (car.id, car.price))
            .collect();

        let mut total: u64 = 0;
        for id in car_ids {
            let price = prices
                .get(id)
                .ok_or_else(|| CatalogError::not_found("Car not found"))?;
            let price = u64::try_from(*price)
                .map_err(|_| CatalogError::validation("price must be a number"))?;
            total = total
                .checked_add(price)
                .ok_or_else(|| CatalogError::validation("Cart total is too large"))?;
        }
        Ok(total)
    }
}
