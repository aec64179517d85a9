use std::sync::Arc;

use crate::catalog::{Brand, Car, CatalogStore, KeywordPattern};
use crate::error::CatalogResult;

use super::keywords::{extract_keywords, MAX_KEYWORDS};
use super::price::{parse_price_intent, PriceBand};

pub const FALLBACK_REPLY: &str = "Sorry, I couldn't understand that. Can you ask in another way?";
pub const ERROR_REPLY: &str = "Something went wrong.";

/// Answers chat messages from the catalog.
///
/// Strategies run in a fixed order and the first that produces something
/// wins: brand name, car name, then fuel type plus transmission within the
/// requested price band.
#[derive(Clone)]
pub struct IntentResolver {
    store: Arc<dyn CatalogStore>,
    max_keywords: usize,
}

impl IntentResolver {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self {
            store,
            max_keywords: MAX_KEYWORDS,
        }
    }

    pub fn with_max_keywords(mut self, max_keywords: usize) -> Self {
        self.max_keywords = max_keywords;
        self
    }

    pub async fn reply(&self, message: &str) -> CatalogResult<String> {
        let keywords = extract_keywords(message, self.max_keywords);
        tracing::debug!(?keywords, "Chat keywords");

        let Some(pattern) = KeywordPattern::new(&keywords) else {
            return Ok(FALLBACK_REPLY.to_string());
        };
        let band = parse_price_intent(message);

        if let Some(brand) = self.store.first_brand_matching(&pattern).await? {
            tracing::debug!(brand = %brand.name, "Chat matched brand");
            let cars = self.store.cars_by_brand(brand.id).await?;
            return Ok(brand_reply(&brand, &cars, band));
        }

        if let Some(car) = self.store.first_car_matching(&pattern).await? {
            tracing::debug!(car = %car.name, "Chat matched car");
            let brand = self.store.brand_by_id(car.brand_id).await?;
            return Ok(car_detail(&car, brand.as_ref()));
        }

        let matching: Vec<Car> = self
            .store
            .cars_matching_fuel_and_transmission(&pattern)
            .await?
            .into_iter()
            .filter(|car| band.contains(car.price))
            .collect();
        if !matching.is_empty() {
            tracing::debug!(count = matching.len(), "Chat matched filters");
            return Ok(format!(
                "Here are the cars matching your filters:\n\n{}",
                bullet_lines(&matching)
            ));
        }

        Ok(FALLBACK_REPLY.to_string())
    }
}

fn brand_reply(brand: &Brand, cars: &[Car], band: PriceBand) -> String {
    let in_band: Vec<Car> = cars
        .iter()
        .filter(|car| band.contains(car.price))
        .cloned()
        .collect();
    if in_band.is_empty() {
        if cars.is_empty() {
            return format!("Sorry, {} has no cars listed yet.", brand.name);
        }
        return format!("Sorry, no {} cars match that price range.", brand.name);
    }
    format!("Here are cars from {}:\n\n{}", brand.name, bullet_lines(&in_band))
}

fn bullet_lines(cars: &[Car]) -> String {
    cars.iter()
        .map(|car| format!("• {} – ₹{}", car.name, car.price))
        .collect::<Vec<_>>()
        .join("\n")
}

fn car_detail(car: &Car, brand: Option<&Brand>) -> String {
    let brand_name = brand.map(|b| b.name.as_str()).unwrap_or("Unknown");
    format!(
        "**{}**\n\nBrand: {}\nPrice: ₹{}\nFuel: {}\nTransmission: {}\nEngine: {} cc\nMileage: {}\nSeater: {}\n\nDescription: {}",
        car.name,
        brand_name,
        car.price,
        car.fuel_type,
        car.transmission,
        car.engine_size,
        car.mileage,
        car.seater,
        car.description,
    )
}
