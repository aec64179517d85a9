use std::sync::Arc;

use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::multipart::read_form;
use super::views::BrandView;
use super::{envelope, ApiError, ApiResult};
use crate::state::AppState;
use carlot_domains::CatalogError;

/// Accepted file field names for the brand logo.
const BRAND_IMAGE_FIELDS: &[&str] = &["brandPictures", "image"];

#[derive(Debug, Deserialize)]
pub struct RenameBrand {
    name: Option<String>,
}

pub(crate) fn parse_id(raw: &str, what: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError(CatalogError::not_found(format!("{what} not found"))))
}

pub async fn create_brand(State(state): State<Arc<AppState>>, multipart: Multipart) -> ApiResult {
    let mut form = read_form(multipart, BRAND_IMAGE_FIELDS, 1).await?;
    let image = form.files.pop();
    let brand = state.catalog.create_brand(form.field("name"), image).await?;
    Ok(envelope(
        StatusCode::CREATED,
        "Brand Created Successfully",
        json!({ "brand": BrandView::new(&brand, state.images()) }),
    ))
}

pub async fn list_brands(State(state): State<Arc<AppState>>) -> ApiResult {
    let brands: Vec<BrandView> = state
        .catalog
        .list_brands()
        .await?
        .iter()
        .map(|b| BrandView::with_cars(b, state.images()))
        .collect();
    Ok(envelope(
        StatusCode::OK,
        "All Brands",
        json!({ "totalBrand": brands.len(), "brands": brands }),
    ))
}

pub async fn brand_by_slug(
    State(state): State<Arc<AppState>>,
    Path(slug): Path<String>,
) -> ApiResult {
    let brand = state.catalog.brand_by_slug(&slug).await?;
    Ok(envelope(
        StatusCode::OK,
        "Brand By this Id",
        json!({ "brand": BrandView::with_cars(&brand, state.images()) }),
    ))
}

pub async fn update_brand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<RenameBrand>,
) -> ApiResult {
    let id = parse_id(&id, "Brand")?;
    let brand = state.catalog.rename_brand(id, body.name.as_deref()).await?;
    Ok(envelope(
        StatusCode::OK,
        "Brand Updated Successfully",
        json!({ "brand": BrandView::new(&brand, state.images()) }),
    ))
}

pub async fn delete_brand(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let id = parse_id(&id, "Brand")?;
    state.catalog.delete_brand(id).await?;
    Ok(envelope(
        StatusCode::OK,
        "Brand Deleted Successfully",
        json!({}),
    ))
}
