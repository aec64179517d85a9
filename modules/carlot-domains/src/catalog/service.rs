use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use super::input::CarFields;
use super::models::{Brand, BrandRename, Car, NewBrand};
use super::store::CatalogStore;
use crate::error::{CatalogError, CatalogResult};
use crate::slug::slugify;
use crate::uploads::{ImageStore, UploadedFile};

/// A brand together with its cars (derived by query, never stored).
#[derive(Debug, Clone, Serialize)]
pub struct BrandWithCars {
    pub brand: Brand,
    pub cars: Vec<Car>,
}

/// A car with its owning brand resolved. `brand` is `None` when the brand
/// has since been deleted.
#[derive(Debug, Clone, Serialize)]
pub struct CarWithBrand {
    pub car: Car,
    pub brand: Option<Brand>,
}

/// Validated create/read/update/delete over brands and cars.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
    images: ImageStore,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>, images: ImageStore) -> Self {
        Self { store, images }
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    // --- Brands ---

    pub async fn create_brand(
        &self,
        name: Option<&str>,
        image: Option<UploadedFile>,
    ) -> CatalogResult<Brand> {
        let name = name.map(str::trim).filter(|n| !n.is_empty());
        let Some(name) = name else {
            return Err(CatalogError::validation("Brand Name is Required"));
        };
        let Some(image) = image else {
            return Err(CatalogError::validation("Brand Image is Required"));
        };

        if self.store.brand_by_name(name).await?.is_some() {
            return Err(CatalogError::Duplicate("Name Already Exists".into()));
        }

        let picture = self.images.save(&image).await?;
        let inserted = self
            .store
            .insert_brand(NewBrand::new(name, picture.clone()))
            .await;

        match inserted {
            Ok(Some(brand)) => {
                tracing::info!(brand_id = %brand.id, name = %brand.name, "Brand created");
                Ok(brand)
            }
            Ok(None) => {
                // Lost a race with a concurrent create of the same name.
                self.images.remove_best_effort(&[picture]).await;
                Err(CatalogError::Duplicate("Name Already Exists".into()))
            }
            Err(e) => {
                self.images.remove_best_effort(&[picture]).await;
                Err(e.into())
            }
        }
    }

    pub async fn list_brands(&self) -> CatalogResult<Vec<BrandWithCars>> {
        let brands = self.store.list_brands().await?;
        let mut by_brand: HashMap<Uuid, Vec<Car>> = HashMap::new();
        for car in self.store.list_cars().await? {
            by_brand.entry(car.brand_id).or_default().push(car);
        }
        Ok(brands
            .into_iter()
            .map(|brand| {
                let cars = by_brand.remove(&brand.id).unwrap_or_default();
                BrandWithCars { brand, cars }
            })
            .collect())
    }

    pub async fn brand_by_slug(&self, slug: &str) -> CatalogResult<BrandWithCars> {
        let brand = self
            .store
            .brand_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::not_found("Brand not found"))?;
        let cars = self.store.cars_by_brand(brand.id).await?;
        Ok(BrandWithCars { brand, cars })
    }

    pub async fn rename_brand(&self, id: Uuid, name: Option<&str>) -> CatalogResult<Brand> {
        let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) else {
            return Err(CatalogError::validation("Brand Name is Required"));
        };

        let brand = match self.store.rename_brand(id, name, &slugify(name)).await? {
            BrandRename::Renamed(brand) => brand,
            BrandRename::Missing => return Err(CatalogError::not_found("Brand not found")),
            BrandRename::NameTaken => {
                return Err(CatalogError::Duplicate("Name Already Exists".into()))
            }
        };
        tracing::info!(brand_id = %brand.id, slug = %brand.slug, "Brand renamed");
        Ok(brand)
    }

    /// Delete the brand record, then its image. Cars of the brand remain.
    pub async fn delete_brand(&self, id: Uuid) -> CatalogResult<Brand> {
        let brand = self
            .store
            .delete_brand(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Brand not found"))?;
        self.images
            .remove_best_effort(std::slice::from_ref(&brand.picture))
            .await;
        tracing::info!(brand_id = %brand.id, "Brand deleted");
        Ok(brand)
    }

    // --- Cars ---

    pub async fn create_car(
        &self,
        fields: CarFields,
        images: Vec<UploadedFile>,
    ) -> CatalogResult<Car> {
        // Validate with placeholder pictures so nothing is written for a bad form.
        let mut new_car = fields.into_new_car(Vec::new())?;

        if self.store.brand_by_id(new_car.brand_id).await?.is_none() {
            return Err(CatalogError::not_found("Brand not found"));
        }

        new_car.pictures = self.images.save_all(&images).await?;
        let pictures = new_car.pictures.clone();

        match self.store.insert_car(new_car).await {
            Ok(car) => {
                tracing::info!(
                    car_id = %car.id,
                    brand_id = %car.brand_id,
                    pictures = car.pictures.len(),
                    "Car created"
                );
                Ok(car)
            }
            Err(e) => {
                self.images.remove_best_effort(&pictures).await;
                Err(e.into())
            }
        }
    }

    pub async fn list_cars(&self) -> CatalogResult<Vec<CarWithBrand>> {
        let cars = self.store.list_cars().await?;
        self.attach_brands(cars).await
    }

    pub async fn car_by_slug(&self, slug: &str) -> CatalogResult<CarWithBrand> {
        let car = self
            .store
            .car_by_slug(slug)
            .await?
            .ok_or_else(|| CatalogError::not_found("Car not found"))?;
        let brand = self.store.brand_by_id(car.brand_id).await?;
        Ok(CarWithBrand { car, brand })
    }

    pub async fn related_cars(
        &self,
        car_id: Uuid,
        brand_id: Uuid,
    ) -> CatalogResult<Vec<CarWithBrand>> {
        let cars = self.store.related_cars(brand_id, car_id).await?;
        self.attach_brands(cars).await
    }

    pub async fn update_car(&self, id: Uuid, fields: CarFields) -> CatalogResult<Car> {
        let patch = fields.into_patch()?;
        if patch.is_empty() {
            return Err(CatalogError::validation("Nothing to update"));
        }
        let car = self
            .store
            .update_car(id, &patch)
            .await?
            .ok_or_else(|| CatalogError::not_found("Car not found"))?;
        tracing::info!(car_id = %car.id, "Car updated");
        Ok(car)
    }

    /// Delete the car record, then its images.
    pub async fn delete_car(&self, id: Uuid) -> CatalogResult<Car> {
        let car = self
            .store
            .delete_car(id)
            .await?
            .ok_or_else(|| CatalogError::not_found("Car not found"))?;
        self.images.remove_best_effort(&car.pictures).await;
        tracing::info!(car_id = %car.id, "Car deleted");
        Ok(car)
    }

    async fn attach_brands(&self, cars: Vec<Car>) -> CatalogResult<Vec<CarWithBrand>> {
        let brands: HashMap<Uuid, Brand> = self
            .store
            .list_brands()
            .await?
            .into_iter()
            .map(|b| (b.id, b))
            .collect();
        Ok(cars
            .into_iter()
            .map(|car| {
                let brand = brands.get(&car.brand_id).cloned();
                CarWithBrand { car, brand }
            })
            .collect())
    }
}
