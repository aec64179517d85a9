use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue},
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use carlot_core::FileConfig;

use crate::rest;
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>, file_config: &FileConfig) -> Router {
    let allowed_origins = &file_config.server.allowed_origins;
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    };

    let uploads = ServeDir::new(state.images().dir());

    let api = Router::new()
        // Brands
        .route("/api/brand/getAll-brand", get(rest::brand::list_brands))
        .route(
            "/api/brand/getBrandBtId-brand/{slug}",
            get(rest::brand::brand_by_slug),
        )
        .route("/api/brand/create-brand", post(rest::brand::create_brand))
        .route("/api/brand/update-brand/{id}", put(rest::brand::update_brand))
        .route(
            "/api/brand/delete-brand/{id}",
            delete(rest::brand::delete_brand),
        )
        // Cars
        .route("/api/car/getAll-car", get(rest::car::list_cars))
        .route("/api/car/getCarById-car/{slug}", get(rest::car::car_by_slug))
        .route("/api/car/create-car", post(rest::car::create_car))
        .route("/api/car/update-car/{pid}", put(rest::car::update_car))
        .route("/api/car/delete-car/{pid}", delete(rest::car::delete_car))
        .route(
            "/api/car/related-car/{cid}/{bid}",
            get(rest::car::related_cars),
        )
        // Payments
        .route("/api/car/braintree/token", get(rest::payment::client_token))
        .route("/api/car/braintree/payment", post(rest::payment::payment))
        // Chatbot
        .route("/api/chatbot", post(rest::chatbot::chat))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    Router::new()
        .route("/health", get(health))
        .merge(api)
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(DefaultBodyLimit::max(file_config.uploads.max_body_bytes))
        .layer(cors)
        // Method + path + status + latency only
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

async fn health() -> &'static str {
    "ok"
}
