use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use super::models::{normalize_price, CarPatch, NewCar};
use crate::error::{CatalogError, CatalogResult};
use crate::slug::slugify;

/// Car fields as submitted by a client, either as multipart form fields or
/// as a JSON body. Every value is optional here; `into_new_car` enforces
/// what creation requires. Numbers are accepted in place of strings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CarFields {
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub brand: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transmission: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub engine_size: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub mileage: Option<String>,
    #[serde(default, alias = "safetyrating", deserialize_with = "lenient_string")]
    pub safety_rating: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub warranty: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub seater: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub size: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub fuel_tank: Option<String>,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
        Flag(bool),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
        Raw::Flag(b) => b.to_string(),
    }))
}

/// Trimmed, non-empty value or `None`.
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn parse_brand_id(raw: &str) -> CatalogResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| CatalogError::validation("brand must be a valid id"))
}

fn parse_price(raw: &str) -> CatalogResult<i64> {
    match normalize_price(raw) {
        Some(p) if p > 0 => Ok(p),
        _ => Err(CatalogError::validation("price must be a number")),
    }
}

impl CarFields {
    /// Validate for creation. Fields are checked in form order and the
    /// first missing one is reported.
    pub fn into_new_car(self, pictures: Vec<String>) -> CatalogResult<NewCar> {
        let required: [(&str, &Option<String>); 13] = [
            ("name", &self.name),
            ("description", &self.description),
            ("brand", &self.brand),
            ("price", &self.price),
            ("fuelType", &self.fuel_type),
            ("transmission", &self.transmission),
            ("engineSize", &self.engine_size),
            ("mileage", &self.mileage),
            ("safetyRating", &self.safety_rating),
            ("warranty", &self.warranty),
            ("seater", &self.seater),
            ("size", &self.size),
            ("fuelTank", &self.fuel_tank),
        ];
        for (field, value) in required {
            if present(value).is_none() {
                return Err(CatalogError::validation(format!("{field} is required")));
            }
        }

        // All present after the loop above.
        let take = |v: &Option<String>| present(v).unwrap_or_default().to_string();
        let name = take(&self.name);

        Ok(NewCar {
            slug: slugify(&name),
            brand_id: parse_brand_id(&take(&self.brand))?,
            price: parse_price(&take(&self.price))?,
            description: take(&self.description),
            pictures,
            fuel_type: take(&self.fuel_type),
            transmission: take(&self.transmission),
            engine_size: take(&self.engine_size),
            mileage: take(&self.mileage),
            safety_rating: take(&self.safety_rating),
            warranty: take(&self.warranty),
            seater: take(&self.seater),
            size: take(&self.size),
            fuel_tank: take(&self.fuel_tank),
            name,
        })
    }

    /// Build a partial update. Blank values are ignored; a new name brings
    /// a new slug. The brand id is parsed but not checked for existence.
    pub fn into_patch(self) -> CatalogResult<CarPatch> {
        let own = |v: &Option<String>| present(v).map(str::to_string);
        let name = own(&self.name);

        Ok(CarPatch {
            slug: name.as_deref().map(slugify),
            brand_id: present(&self.brand).map(parse_brand_id).transpose()?,
            price: present(&self.price).map(parse_price).transpose()?,
            description: own(&self.description),
            fuel_type: own(&self.fuel_type),
            transmission: own(&self.transmission),
            engine_size: own(&self.engine_size),
            mileage: own(&self.mileage),
            safety_rating: own(&self.safety_rating),
            warranty: own(&self.warranty),
            seater: own(&self.seater),
            size: own(&self.size),
            fuel_tank: own(&self.fuel_tank),
            name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> CarFields {
        CarFields {
            name: Some("Corolla Altis".into()),
            description: Some("Reliable sedan".into()),
            brand: Some(Uuid::new_v4().to_string()),
            price: Some("₹15,00,000".into()),
            fuel_type: Some("Petrol".into()),
            transmission: Some("Automatic".into()),
            engine_size: Some("1798".into()),
            mileage: Some("14 kmpl".into()),
            safety_rating: Some("5".into()),
            warranty: Some("3 years".into()),
            seater: Some("5".into()),
            size: Some("Mid-size".into()),
            fuel_tank: Some("50 L".into()),
        }
    }

    #[test]
    fn complete_fields_build_a_car() {
        let car = complete().into_new_car(vec!["a.jpg".into()]).unwrap();
        assert_eq!(car.slug, "corolla-altis");
        assert_eq!(car.price, 1_500_000);
        assert_eq!(car.pictures, vec!["a.jpg".to_string()]);
    }

    #[test]
    fn first_missing_field_is_reported() {
        let mut fields = complete();
        fields.price = None;
        fields.mileage = Some("   ".into());
        match fields.into_new_car(vec![]) {
            Err(CatalogError::Validation(msg)) => assert_eq!(msg, "price is required"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn bad_price_and_brand_are_rejected() {
        let mut fields = complete();
        fields.price = Some("on request".into());
        assert!(matches!(
            fields.into_new_car(vec![]),
            Err(CatalogError::Validation(m)) if m == "price must be a number"
        ));

        let mut fields = complete();
        fields.brand = Some("toyota".into());
        assert!(matches!(
            fields.into_new_car(vec![]),
            Err(CatalogError::Validation(m)) if m == "brand must be a valid id"
        ));
    }

    #[test]
    fn json_accepts_numbers_and_legacy_names() {
        let fields: CarFields = serde_json::from_value(serde_json::json!({
            "price": 990000,
            "seater": 7,
            "safetyrating": "4",
            "fuelType": "Diesel"
        }))
        .unwrap();
        assert_eq!(fields.price.as_deref(), Some("990000"));
        assert_eq!(fields.seater.as_deref(), Some("7"));
        assert_eq!(fields.safety_rating.as_deref(), Some("4"));
        assert_eq!(fields.fuel_type.as_deref(), Some("Diesel"));
    }

    #[test]
    fn patch_recomputes_slug_only_with_name() {
        let patch = CarFields {
            name: Some("Fortuner Legender".into()),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert_eq!(patch.slug.as_deref(), Some("fortuner-legender"));

        let patch = CarFields {
            price: Some("1,200,000".into()),
            ..Default::default()
        }
        .into_patch()
        .unwrap();
        assert!(patch.slug.is_none());
        assert_eq!(patch.price, Some(1_200_000));
    }
}
