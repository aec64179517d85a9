use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Car {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub brand_id: Uuid,
    pub description: String,
    /// Stored image file names, in upload order.
    pub pictures: Vec<String>,
    /// Whole currency units.
    pub price: i64,
    pub fuel_type: String,
    pub transmission: String,
    pub engine_size: String,
    pub mileage: String,
    pub safety_rating: String,
    pub warranty: String,
    pub seater: String,
    pub size: String,
    pub fuel_tank: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewCar {
    pub name: String,
    pub slug: String,
    pub brand_id: Uuid,
    pub description: String,
    pub pictures: Vec<String>,
    pub price: i64,
    pub fuel_type: String,
    pub transmission: String,
    pub engine_size: String,
    pub mileage: String,
    pub safety_rating: String,
    pub warranty: String,
    pub seater: String,
    pub size: String,
    pub fuel_tank: String,
}

/// Partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct CarPatch {
    pub name: Option<String>,
    pub slug: Option<String>,
    pub brand_id: Option<Uuid>,
    pub description: Option<String>,
    pub price: Option<i64>,
    pub fuel_type: Option<String>,
    pub transmission: Option<String>,
    pub engine_size: Option<String>,
    pub mileage: Option<String>,
    pub safety_rating: Option<String>,
    pub warranty: Option<String>,
    pub seater: Option<String>,
    pub size: Option<String>,
    pub fuel_tank: Option<String>,
}

impl CarPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.brand_id.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.fuel_type.is_none()
            && self.transmission.is_none()
            && self.engine_size.is_none()
            && self.mileage.is_none()
            && self.safety_rating.is_none()
            && self.warranty.is_none()
            && self.seater.is_none()
            && self.size.is_none()
            && self.fuel_tank.is_none()
    }

    /// Apply the patch to an in-memory record.
    pub fn apply_to(&self, car: &mut Car) {
        fn set<T: Clone>(target: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *target = v.clone();
            }
        }
        set(&mut car.name, &self.name);
        set(&mut car.slug, &self.slug);
        set(&mut car.brand_id, &self.brand_id);
        set(&mut car.description, &self.description);
        set(&mut car.price, &self.price);
        set(&mut car.fuel_type, &self.fuel_type);
        set(&mut car.transmission, &self.transmission);
        set(&mut car.engine_size, &self.engine_size);
        set(&mut car.mileage, &self.mileage);
        set(&mut car.safety_rating, &self.safety_rating);
        set(&mut car.warranty, &self.warranty);
        set(&mut car.seater, &self.seater);
        set(&mut car.size, &self.size);
        set(&mut car.fuel_tank, &self.fuel_tank);
    }
}

/// Reduce a price as typed by a person ("₹15,00,000", "1500000 INR") to
/// its whole-rupee digits. A decimal point after the first digit ends the
/// number, so paise are dropped. `None` when there are no digits or the
/// value overflows.
pub fn normalize_price(raw: &str) -> Option<i64> {
    let mut digits = String::new();
    for c in raw.chars() {
        if c.is_ascii_digit() {
            digits.push(c);
        } else if c == '.' && !digits.is_empty() {
            break;
        }
    }
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

impl Car {
    pub async fn create(car: &NewCar, pool: &PgPool) -> Result<Self> {
        sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO cars (
                name, slug, brand_id, description, pictures, price,
                fuel_type, transmission, engine_size, mileage,
                safety_rating, warranty, seater, size, fuel_tank
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING *
            "#,
        )
        .bind(&car.name)
        .bind(&car.slug)
        .bind(car.brand_id)
        .bind(&car.description)
        .bind(&car.pictures)
        .bind(car.price)
        .bind(&car.fuel_type)
        .bind(&car.transmission)
        .bind(&car.engine_size)
        .bind(&car.mileage)
        .bind(&car.safety_rating)
        .bind(&car.warranty)
        .bind(&car.seater)
        .bind(&car.size)
        .bind(&car.fuel_tank)
        .fetch_one(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_by_id(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM cars WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_ids(ids: &[Uuid], pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM cars WHERE id = ANY($1)")
            .bind(ids)
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn find_by_slug(slug: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM cars WHERE slug = $1 ORDER BY created_at ASC LIMIT 1",
        )
        .bind(slug)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>("SELECT * FROM cars ORDER BY created_at ASC")
            .fetch_all(pool)
            .await
            .map_err(Into::into)
    }

    pub async fn list_by_brand(brand_id: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM cars WHERE brand_id = $1 ORDER BY created_at ASC",
        )
        .bind(brand_id)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn list_related(brand_id: Uuid, exclude: Uuid, pool: &PgPool) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM cars WHERE brand_id = $1 AND id <> $2 ORDER BY created_at ASC",
        )
        .bind(brand_id)
        .bind(exclude)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn find_first_by_name_matching(pattern: &str, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT * FROM cars WHERE name ~* $1 ORDER BY created_at ASC, id ASC LIMIT 1",
        )
        .bind(pattern)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    /// Cars whose fuel type and transmission both match the pattern.
    pub async fn list_matching_fuel_and_transmission(
        pattern: &str,
        pool: &PgPool,
    ) -> Result<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM cars
            WHERE fuel_type ~* $1 AND transmission ~* $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(pattern)
        .fetch_all(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn update(id: Uuid, patch: &CarPatch, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>(
            r#"
            UPDATE cars SET
                name = COALESCE($2, name),
                slug = COALESCE($3, slug),
                brand_id = COALESCE($4, brand_id),
                description = COALESCE($5, description),
                price = COALESCE($6, price),
                fuel_type = COALESCE($7, fuel_type),
                transmission = COALESCE($8, transmission),
                engine_size = COALESCE($9, engine_size),
                mileage = COALESCE($10, mileage),
                safety_rating = COALESCE($11, safety_rating),
                warranty = COALESCE($12, warranty),
                seater = COALESCE($13, seater),
                size = COALESCE($14, size),
                fuel_tank = COALESCE($15, fuel_tank),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(&patch.slug)
        .bind(patch.brand_id)
        .bind(&patch.description)
        .bind(patch.price)
        .bind(&patch.fuel_type)
        .bind(&patch.transmission)
        .bind(&patch.engine_size)
        .bind(&patch.mileage)
        .bind(&patch.safety_rating)
        .bind(&patch.warranty)
        .bind(&patch.seater)
        .bind(&patch.size)
        .bind(&patch.fuel_tank)
        .fetch_optional(pool)
        .await
        .map_err(Into::into)
    }

    pub async fn delete(id: Uuid, pool: &PgPool) -> Result<Option<Self>> {
        sqlx::query_as::<_, Self>("DELETE FROM cars WHERE id = $1 RETURNING *")
            .bind(id)
            .fetch_optional(pool)
            .await
            .map_err(Into::into)
    }
}
