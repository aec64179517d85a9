use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::json;

use super::brand::parse_id;
use super::multipart::read_form;
use super::views::CarView;
use super::{envelope, ApiResult};
use crate::state::AppState;
use carlot_domains::catalog::CarFields;
use carlot_domains::CatalogError;

/// Accepted file field names for car images.
const CAR_IMAGE_FIELDS: &[&str] = &["productPictures", "images"];

pub async fn create_car(State(state): State<Arc<AppState>>, multipart: Multipart) -> ApiResult {
    let form = read_form(multipart, CAR_IMAGE_FIELDS, state.max_files).await?;
    let fields: CarFields = serde_json::from_value(form.fields_json())
        .map_err(|e| CatalogError::validation(format!("Invalid car fields: {e}")))?;
    let car = state.catalog.create_car(fields, form.files).await?;
    Ok(envelope(
        StatusCode::CREATED,
        "Car Created Successfully",
        json!({ "car": CarView::new(&car, state.images()) }),
    ))
}

pub async fn list_cars(State(state): State<Arc<AppState>>) -> ApiResult {
    let cars: Vec<CarView> = state
        .catalog
        .list_cars()
        .await?
        .iter()
        .map(|c| CarView::with_brand(c, state.images()))
        .collect();
    Ok(envelope(
        StatusCode::OK,
        "All Cars",
        json!({ "totalCar": cars.len(), "cars": cars }),
    ))
}

pub async fn car_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult {
    let car = state.catalog.car_by_slug(&slug).await?;
    Ok(envelope(
        StatusCode::OK,
        "Car By this ID",
        json!({ "car": CarView::with_brand(&car, state.images()) }),
    ))
}

pub async fn update_car(
    State(state): State<Arc<AppState>>,
    Path(pid): Path<String>,
    Json(fields): Json<CarFields>,
) -> ApiResult {
    let id = parse_id(&pid, "Car")?;
    let car = state.catalog.update_car(id, fields).await?;
    Ok(envelope(
        StatusCode::OK,
        "Car Updated Successfully",
        json!({ "car": CarView::new(&car, state.images()) }),
    ))
}

pub async fn delete_car(State(state): State<Arc<AppState>>, Path(pid): Path<String>) -> ApiResult {
    let id = parse_id(&pid, "Car")?;
    state.catalog.delete_car(id).await?;
    Ok(envelope(StatusCode::OK, "Car Deleted Successfully", json!({})))
}

pub async fn related_cars(
    State(state): State<Arc<AppState>>,
    Path((cid, bid)): Path<(String, String)>,
) -> ApiResult {
    let car_id = parse_id(&cid, "Car")?;
    let brand_id = parse_id(&bid, "Brand")?;
    let cars: Vec<CarView> = state
        .catalog
        .related_cars(car_id, brand_id)
        .await?
        .iter()
        .map(|c| CarView::with_brand(c, state.images()))
        .collect();
    Ok(envelope(StatusCode::OK, "Related Cars", json!({ "cars": cars })))
}
