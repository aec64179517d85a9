// In-memory doubles for the storage and payment boundaries.
//
// MemoryCatalogStore keeps brands, cars and orders in insertion order, which
// matches the `ORDER BY created_at` the Postgres store uses. FakeGateway
// records every sale and can be told to decline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use anyhow::{bail, Result};
use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::catalog::{
    Brand, BrandRename, Car, CarFields, CarPatch, CatalogStore, KeywordPattern, NewBrand, NewCar, NewOrder,
    Order,
};
use crate::error::{CatalogError, CatalogResult};
use crate::payments::{PaymentGateway, SaleOutcome};
use crate::slug::slugify;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// A complete car record ready for `insert_car`.
pub fn new_car(name: &str, brand_id: Uuid, price: i64) -> NewCar {
    NewCar {
        name: name.to_string(),
        slug: slugify(name),
        brand_id,
        description: format!("{name} description"),
        pictures: Vec::new(),
        price,
        fuel_type: "Petrol".into(),
        transmission: "Automatic".into(),
        engine_size: "1498".into(),
        mileage: "17 kmpl".into(),
        safety_rating: "5".into(),
        warranty: "3 years".into(),
        seater: "5".into(),
        size: "Compact".into(),
        fuel_tank: "45 L".into(),
    }
}

/// A complete create-car form.
pub fn car_fields(name: &str, brand_id: Uuid, price: &str) -> CarFields {
    CarFields {
        name: Some(name.into()),
        description: Some(format!("{name} description")),
        brand: Some(brand_id.to_string()),
        price: Some(price.into()),
        fuel_type: Some("Petrol".into()),
        transmission: Some("Automatic".into()),
        engine_size: Some("1498".into()),
        mileage: Some("17 kmpl".into()),
        safety_rating: Some("5".into()),
        warranty: Some("3 years".into()),
        seater: Some("5".into()),
        size: Some("Compact".into()),
        fuel_tank: Some("45 L".into()),
    }
}

// ---------------------------------------------------------------------------
// MemoryCatalogStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryInner {
    brands: Vec<Brand>,
    cars: Vec<Car>,
    orders: Vec<Order>,
}

/// Thread-safe in-memory catalog. Keyword patterns are evaluated with the
/// same case-insensitive regex the Postgres store sends as `~*`.
#[derive(Default)]
pub struct MemoryCatalogStore {
    inner: Mutex<MemoryInner>,
    unavailable: AtomicBool,
}

impl MemoryCatalogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail, as a lost database would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn brands(&self) -> Vec<Brand> {
        self.lock().brands.clone()
    }

    pub fn cars(&self) -> Vec<Car> {
        self.lock().cars.clone()
    }

    pub fn orders(&self) -> Vec<Order> {
        self.lock().orders.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            bail!("catalog store unavailable");
        }
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn insert_brand(&self, brand: NewBrand) -> Result<Option<Brand>> {
        self.check()?;
        let mut inner = self.lock();
        if inner.brands.iter().any(|b| b.name == brand.name) {
            return Ok(None);
        }
        let now = Utc::now();
        let record = Brand {
            id: Uuid::new_v4(),
            name: brand.name,
            slug: brand.slug,
            picture: brand.picture,
            created_at: now,
            updated_at: now,
        };
        inner.brands.push(record.clone());
        Ok(Some(record))
    }

    async fn brand_by_id(&self, id: Uuid) -> Result<Option<Brand>> {
        self.check()?;
        Ok(self.lock().brands.iter().find(|b| b.id == id).cloned())
    }

    async fn brand_by_name(&self, name: &str) -> Result<Option<Brand>> {
        self.check()?;
        Ok(self.lock().brands.iter().find(|b| b.name == name).cloned())
    }

    async fn brand_by_slug(&self, slug: &str) -> Result<Option<Brand>> {
        self.check()?;
        Ok(self.lock().brands.iter().find(|b| b.slug == slug).cloned())
    }

    async fn list_brands(&self) -> Result<Vec<Brand>> {
        self.check()?;
        Ok(self.brands())
    }

    async fn rename_brand(&self, id: Uuid, name: &str, slug: &str) -> Result<BrandRename> {
        self.check()?;
        let mut inner = self.lock();
        let Some(pos) = inner.brands.iter().position(|b| b.id == id) else {
            return Ok(BrandRename::Missing);
        };
        if inner.brands.iter().any(|b| b.name == name && b.id != id) {
            return Ok(BrandRename::NameTaken);
        }
        let brand = &mut inner.brands[pos];
        brand.name = name.to_string();
        brand.slug = slug.to_string();
        brand.updated_at = Utc::now();
        Ok(BrandRename::Renamed(brand.clone()))
    }

    async fn delete_brand(&self, id: Uuid) -> Result<Option<Brand>> {
        self.check()?;
        let mut inner = self.lock();
        let pos = inner.brands.iter().position(|b| b.id == id);
        Ok(pos.map(|i| inner.brands.remove(i)))
    }

    async fn first_brand_matching(&self, pattern: &KeywordPattern) -> Result<Option<Brand>> {
        self.check()?;
        Ok(self
            .lock()
            .brands
            .iter()
            .find(|b| pattern.is_match(&b.name))
            .cloned())
    }

    async fn insert_car(&self, car: NewCar) -> Result<Car> {
        self.check()?;
        let now = Utc::now();
        let record = Car {
            id: Uuid::new_v4(),
            name: car.name,
            slug: car.slug,
            brand_id: car.brand_id,
            description: car.description,
            pictures: car.pictures,
            price: car.price,
            fuel_type: car.fuel_type,
            transmission: car.transmission,
            engine_size: car.engine_size,
            mileage: car.mileage,
            safety_rating: car.safety_rating,
            warranty: car.warranty,
            seater: car.seater,
            size: car.size,
            fuel_tank: car.fuel_tank,
            created_at: now,
            updated_at: now,
        };
        self.lock().cars.push(record.clone());
        Ok(record)
    }

    async fn car_by_id(&self, id: Uuid) -> Result<Option<Car>> {
        self.check()?;
        Ok(self.lock().cars.iter().find(|c| c.id == id).cloned())
    }

    async fn cars_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Car>> {
        self.check()?;
        Ok(self
            .lock()
            .cars
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn car_by_slug(&self, slug: &str) -> Result<Option<Car>> {
        self.check()?;
        Ok(self.lock().cars.iter().find(|c| c.slug == slug).cloned())
    }

    async fn list_cars(&self) -> Result<Vec<Car>> {
        self.check()?;
        Ok(self.cars())
    }

    async fn cars_by_brand(&self, brand_id: Uuid) -> Result<Vec<Car>> {
        self.check()?;
        Ok(self
            .lock()
            .cars
            .iter()
            .filter(|c| c.brand_id == brand_id)
            .cloned()
            .collect())
    }

    async fn related_cars(&self, brand_id: Uuid, exclude: Uuid) -> Result<Vec<Car>> {
        self.check()?;
        Ok(self
            .lock()
            .cars
            .iter()
            .filter(|c| c.brand_id == brand_id && c.id != exclude)
            .cloned()
            .collect())
    }

    async fn update_car(&self, id: Uuid, patch: &CarPatch) -> Result<Option<Car>> {
        self.check()?;
        let mut inner = self.lock();
        let Some(car) = inner.cars.iter_mut().find(|c| c.id == id) else {
            return Ok(None);
        };
        patch.apply_to(car);
        car.updated_at = Utc::now();
        Ok(Some(car.clone()))
    }

    async fn delete_car(&self, id: Uuid) -> Result<Option<Car>> {
        self.check()?;
        let mut inner = self.lock();
        let pos = inner.cars.iter().position(|c| c.id == id);
        Ok(pos.map(|i| inner.cars.remove(i)))
    }

    async fn first_car_matching(&self, pattern: &KeywordPattern) -> Result<Option<Car>> {
        self.check()?;
        Ok(self
            .lock()
            .cars
            .iter()
            .find(|c| pattern.is_match(&c.name))
            .cloned())
    }

    async fn cars_matching_fuel_and_transmission(
        &self,
        pattern: &KeywordPattern,
    ) -> Result<Vec<Car>> {
        self.check()?;
        Ok(self
            .lock()
            .cars
            .iter()
            .filter(|c| pattern.is_match(&c.fuel_type) && pattern.is_match(&c.transmission))
            .cloned()
            .collect())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order> {
        self.check()?;
        let record = Order {
            id: Uuid::new_v4(),
            car_ids: order.car_ids,
            amount: order.amount,
            transaction_id: order.transaction_id,
            status: order.status,
            payment: order.payment,
            created_at: Utc::now(),
        };
        self.lock().orders.push(record.clone());
        Ok(record)
    }
}

// ---------------------------------------------------------------------------
// FakeGateway
// ---------------------------------------------------------------------------

/// Payment gateway double. Approves or declines every sale and remembers
/// what it was asked to charge.
pub struct FakeGateway {
    decline: Option<String>,
    sales: Mutex<Vec<(String, u64)>>,
}

impl FakeGateway {
    pub fn approving() -> Self {
        Self {
            decline: None,
            sales: Mutex::new(Vec::new()),
        }
    }

    pub fn declining(message: impl Into<String>) -> Self {
        Self {
            decline: Some(message.into()),
            sales: Mutex::new(Vec::new()),
        }
    }

    /// `(nonce, amount)` for every sale attempted.
    pub fn sales(&self) -> Vec<(String, u64)> {
        self.sales
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl PaymentGateway for FakeGateway {
    async fn client_token(&self) -> CatalogResult<String> {
        Ok("fake-client-token".to_string())
    }

    async fn sale(&self, nonce: &str, amount: u64) -> CatalogResult<SaleOutcome> {
        self.sales
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((nonce.to_string(), amount));

        if let Some(message) = &self.decline {
            return Err(CatalogError::Payment {
                message: message.clone(),
                payload: serde_json::json!({
                    "errors": [{
                        "message": message,
                        "extensions": { "errorClass": "VALIDATION" }
                    }]
                }),
            });
        }

        let transaction_id = format!("fake_tx_{}", Uuid::new_v4().simple());
        Ok(SaleOutcome {
            payload: serde_json::json!({
                "id": transaction_id,
                "status": "SUBMITTED_FOR_SETTLEMENT",
                "amount": { "value": format!("{amount}.00"), "currencyCode": "INR" }
            }),
            transaction_id,
            status: "SUBMITTED_FOR_SETTLEMENT".to_string(),
        })
    }
}
