// Storage boundary for the catalog.
//
// CatalogStore is the only way services touch persisted brands, cars and
// orders. PgCatalogStore is the production implementation; the in-memory
// MemoryCatalogStore in `crate::testing` backs unit and HTTP tests.
//
// The brand -> cars relation is never stored on the brand. It is always
// answered by `cars_by_brand`, so there is no second write to keep in sync.

use anyhow::Result;
use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use sqlx::PgPool;
use uuid::Uuid;

use super::models::{Brand, BrandRename, Car, CarPatch, NewBrand, NewCar, NewOrder, Order};

// ---------------------------------------------------------------------------
// KeywordPattern
// ---------------------------------------------------------------------------

/// Case-insensitive alternation over chat keywords (`toyota|petrol|...`).
///
/// Only constructible from a non-empty keyword list, so a store can never be
/// asked to match the empty pattern (which would match every record).
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    source: String,
    regex: Regex,
}

impl KeywordPattern {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Option<Self> {
        let parts: Vec<String> = keywords
            .iter()
            .map(|k| k.as_ref().trim())
            .filter(|k| !k.is_empty())
            .map(regex::escape)
            .collect();
        if parts.is_empty() {
            return None;
        }
        let source = parts.join("|");
        let regex = RegexBuilder::new(&source)
            .case_insensitive(true)
            .build()
            .ok()?;
        Some(Self { source, regex })
    }

    /// Pattern text, suitable for Postgres `~*`.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

// ---------------------------------------------------------------------------
// CatalogStore
// ---------------------------------------------------------------------------

#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a brand. Returns `None` when the name is already taken.
    async fn insert_brand(&self, brand: NewBrand) -> Result<Option<Brand>>;

    async fn brand_by_id(&self, id: Uuid) -> Result<Option<Brand>>;

    async fn brand_by_name(&self, name: &str) -> Result<Option<Brand>>;

    async fn brand_by_slug(&self, slug: &str) -> Result<Option<Brand>>;

    async fn list_brands(&self) -> Result<Vec<Brand>>;

    /// Rename atomically. A missing id wins over a taken name.
    async fn rename_brand(&self, id: Uuid, name: &str, slug: &str) -> Result<BrandRename>;

    /// Delete and return the removed brand. Cars are left in place.
    async fn delete_brand(&self, id: Uuid) -> Result<Option<Brand>>;

    /// Oldest brand whose name matches the pattern.
    async fn first_brand_matching(&self, pattern: &KeywordPattern) -> Result<Option<Brand>>;

    async fn insert_car(&self, car: NewCar) -> Result<Car>;

    async fn car_by_id(&self, id: Uuid) -> Result<Option<Car>>;

    async fn cars_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Car>>;

    async fn car_by_slug(&self, slug: &str) -> Result<Option<Car>>;

    async fn list_cars(&self) -> Result<Vec<Car>>;

    async fn cars_by_brand(&self, brand_id: Uuid) -> Result<Vec<Car>>;

    /// Cars of `brand_id` other than `exclude`.
    async fn related_cars(&self, brand_id: Uuid, exclude: Uuid) -> Result<Vec<Car>>;

    async fn update_car(&self, id: Uuid, patch: &CarPatch) -> Result<Option<Car>>;

    async fn delete_car(&self, id: Uuid) -> Result<Option<Car>>;

    /// Oldest car whose name matches the pattern.
    async fn first_car_matching(&self, pattern: &KeywordPattern) -> Result<Option<Car>>;

    /// Cars whose fuel type AND transmission both match the pattern.
    async fn cars_matching_fuel_and_transmission(
        &self,
        pattern: &KeywordPattern,
    ) -> Result<Vec<Car>>;

    async fn insert_order(&self, order: NewOrder) -> Result<Order>;
}

// ---------------------------------------------------------------------------
// PgCatalogStore
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct PgCatalogStore {
    pool: PgPool,
}

impl PgCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl CatalogStore for PgCatalogStore {
    async fn insert_brand(&self, brand: NewBrand) -> Result<Option<Brand>> {
        Brand::create(&brand, &self.pool).await
    }

    async fn brand_by_id(&self, id: Uuid) -> Result<Option<Brand>> {
        Brand::find_by_id(id, &self.pool).await
    }

    async fn brand_by_name(&self, name: &str) -> Result<Option<Brand>> {
        Brand::find_by_name(name, &self.pool).await
    }

    async fn brand_by_slug(&self, slug: &str) -> Result<Option<Brand>> {
        Brand::find_by_slug(slug, &self.pool).await
    }

    async fn list_brands(&self) -> Result<Vec<Brand>> {
        Brand::list_all(&self.pool).await
    }

    async fn rename_brand(&self, id: Uuid, name: &str, slug: &str) -> Result<BrandRename> {
        Brand::rename(id, name, slug, &self.pool).await
    }

    async fn delete_brand(&self, id: Uuid) -> Result<Option<Brand>> {
        Brand::delete(id, &self.pool).await
    }

    async fn first_brand_matching(&self, pattern: &KeywordPattern) -> Result<Option<Brand>> {
        Brand::find_first_matching(pattern.as_str(), &self.pool).await
    }

    async fn insert_car(&self, car: NewCar) -> Result<Car> {
        Car::create(&car, &self.pool).await
    }

    async fn car_by_id(&self, id: Uuid) -> Result<Option<Car>> {
        Car::find_by_id(id, &self.pool).await
    }

    async fn cars_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Car>> {
        Car::find_by_ids(ids, &self.pool).await
    }

    async fn car_by_slug(&self, slug: &str) -> Result<Option<Car>> {
        Car::find_by_slug(slug, &self.pool).await
    }

    async fn list_cars(&self) -> Result<Vec<Car>> {
        Car::list_all(&self.pool).await
    }

    async fn cars_by_brand(&self, brand_id: Uuid) -> Result<Vec<Car>> {
        Car::list_by_brand(brand_id, &self.pool).await
    }

    async fn related_cars(&self, brand_id: Uuid, exclude: Uuid) -> Result<Vec<Car>> {
        Car::list_related(brand_id, exclude, &self.pool).await
    }

    async fn update_car(&self, id: Uuid, patch: &CarPatch) -> Result<Option<Car>> {
        Car::update(id, patch, &self.pool).await
    }

    async fn delete_car(&self, id: Uuid) -> Result<Option<Car>> {
        Car::delete(id, &self.pool).await
    }

    async fn first_car_matching(&self, pattern: &KeywordPattern) -> Result<Option<Car>> {
        Car::find_first_by_name_matching(pattern.as_str(), &self.pool).await
    }

    async fn cars_matching_fuel_and_transmission(
        &self,
        pattern: &KeywordPattern,
    ) -> Result<Vec<Car>> {
        Car::list_matching_fuel_and_transmission(pattern.as_str(), &self.pool).await
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        Order::create(&order, &self.pool).await
    }
}
