use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// A settled checkout: which cars were bought and what the gateway said.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub car_ids: Vec<Uuid>,
    pub amount: i64,
    pub transaction_id: String,
    pub status: String,
    pub payment: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub car_ids: Vec<Uuid>,
    pub amount: i64,
    pub transaction_id: String,
    pub status: String,
    pub payment: serde_json::Value,
}

impl Order {
    pub async fn create(order: &NewOrder, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO orders (car_ids, amount, transaction_id, status, payment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(&order.car_ids)
        .bind(order.amount)
        .bind(&order.transaction_id)
        .bind(&order.status)
        .bind(&order.payment)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }
}
