//! JSON shapes returned to the storefront. Stored image names become
//! absolute `/uploads/` URLs here and nowhere else.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use carlot_domains::catalog::{Brand, BrandWithCars, Car, CarWithBrand};
use carlot_domains::uploads::ImageStore;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub brand_pictures: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cars: Option<Vec<CarView>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CarView {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub brand_id: Uuid,
    /// Owning brand when it still exists and was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub brand: Option<Box<BrandView>>,
    pub description: String,
    pub product_pictures: Vec<String>,
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

impl BrandView {
    pub fn new(brand: &Brand, images: &ImageStore) -> Self {
        Self {
            id: brand.id,
            name: brand.name.clone(),
            slug: brand.slug.clone(),
            brand_pictures: images.url_for(&brand.picture),
            cars: None,
            created_at: brand.created_at,
            updated_at: brand.updated_at,
        }
    }

    pub fn with_cars(entry: &BrandWithCars, images: &ImageStore) -> Self {
        let mut view = Self::new(&entry.brand, images);
        view.cars = Some(entry.cars.iter().map(|c| CarView::new(c, images)).collect());
        view
    }
}

impl CarView {
    pub fn new(car: &Car, images: &ImageStore) -> Self {
        Self {
            id: car.id,
            name: car.name.clone(),
            slug: car.slug.clone(),
            brand_id: car.brand_id,
            brand: None,
            description: car.description.clone(),
            product_pictures: car.pictures.iter().map(|p| images.url_for(p)).collect(),
            price: car.price,
            fuel_type: car.fuel_type.clone(),
            transmission: car.transmission.clone(),
            engine_size: car.engine_size.clone(),
            mileage: car.mileage.clone(),
            safety_rating: car.safety_rating.clone(),
            warranty: car.warranty.clone(),
            seater: car.seater.clone(),
            size: car.size.clone(),
            fuel_tank: car.fuel_tank.clone(),
            created_at: car.created_at,
            updated_at: car.updated_at,
        }
    }

    pub fn with_brand(entry: &CarWithBrand, images: &ImageStore) -> Self {
        let mut view = Self::new(&entry.car, images);
        view.brand = entry
            .brand
            .as_ref()
            .map(|b| Box::new(BrandView::new(b, images)));
        view
    }
}
