//! HTTP surface driven through the router with an in-memory catalog.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use carlot_domains::payments::PaymentGateway;
use carlot_domains::testing::{FakeGateway, MemoryCatalogStore};
use carlot_domains::uploads::ImageStore;
use carlot_server::{build_router, AppState};

const BOUNDARY: &str = "carlot-test-boundary";

struct Harness {
    _dir: tempfile::TempDir,
    upload_dir: PathBuf,
    store: Arc<MemoryCatalogStore>,
    router: Router,
}

fn harness(gateway: Option<Arc<FakeGateway>>) -> Harness {
    harness_with_config(gateway, "[server]\nport = 5000\n")
}

fn harness_with_config(gateway: Option<Arc<FakeGateway>>, config: &str) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let upload_dir = dir.path().to_path_buf();
    let file_config = carlot_core::file_config::parse_config(config).unwrap();
    let store = Arc::new(MemoryCatalogStore::new());
    let images = ImageStore::new(&upload_dir, file_config.server.public_url());
    let gateway = gateway.map(|g| g as Arc<dyn PaymentGateway>);
    let state = Arc::new(AppState::new(store.clone(), images, gateway, &file_config));
    Harness {
        router: build_router(state, &file_config),
        _dir: dir,
        upload_dir,
        store,
    }
}

enum Part<'a> {
    Text(&'a str, &'a str),
    File(&'a str, &'a str, &'a [u8]),
}

fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part {
            Part::Text(name, value) => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                        .as_bytes(),
                );
            }
            Part::File(name, file_name, bytes) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(bytes);
                body.extend_from_slice(b"\r\n");
            }
        }
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

impl Harness {
    async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    async fn json(&self, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.send(req).await
    }

    async fn form(&self, uri: &str, parts: &[Part<'_>]) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap();
        self.send(req).await
    }

    async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method(Method::DELETE)
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    async fn create_brand(&self, name: &str) -> String {
        let (status, body) = self
            .form(
                "/api/brand/create-brand",
                &[
                    Part::Text("name", name),
                    Part::File("brandPictures", "logo.png", b"png"),
                ],
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["brand"]["_id"].as_str().unwrap().to_string()
    }

    async fn create_car(
        &self,
        brand_id: &str,
        name: &str,
        price: &str,
        images: &[(&str, &[u8])],
    ) -> Value {
        let mut parts = vec![
            Part::Text("name", name),
            Part::Text("description", "A fine car"),
            Part::Text("brand", brand_id),
            Part::Text("price", price),
            Part::Text("fuelType", "Petrol"),
            Part::Text("transmission", "Automatic"),
            Part::Text("engineSize", "1498"),
            Part::Text("mileage", "17 kmpl"),
            Part::Text("safetyrating", "5"),
            Part::Text("warranty", "3 years"),
            Part::Text("seater", "5"),
            Part::Text("size", "Compact"),
            Part::Text("fuelTank", "45 L"),
        ];
        for (file_name, bytes) in images {
            parts.push(Part::File("productPictures", file_name, bytes));
        }
        let (status, body) = self.form("/api/car/create-car", &parts).await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        body["car"].clone()
    }

    fn upload_files(&self) -> usize {
        std::fs::read_dir(&self.upload_dir).unwrap().count()
    }
}

fn stored_name(url: &Value) -> String {
    url.as_str()
        .unwrap()
        .rsplit('/')
        .next()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn health_is_ok() {
    let h = harness(None);
    let resp = h
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn chatbot_lists_only_toyota_cars_within_budget() {
    let h = harness(None);
    let toyota = h.create_brand("Toyota").await;
    h.create_car(&toyota, "Corolla", "1500000", &[]).await;
    h.create_car(&toyota, "Fortuner", "2500000", &[]).await;

    let (status, body) = h
        .json(
            Method::POST,
            "/api/chatbot",
            json!({ "message": "Toyota cars under 2000000" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "Here are cars from Toyota:\n\n• Corolla – ₹1500000");
}

#[tokio::test]
async fn chatbot_falls_back_on_small_talk() {
    let h = harness(None);
    let (status, body) = h
        .json(Method::POST, "/api/chatbot", json!({ "message": "hi" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["reply"],
        "Sorry, I couldn't understand that. Can you ask in another way?"
    );
}

#[tokio::test]
async fn chatbot_store_failure_is_a_generic_500() {
    let h = harness(None);
    h.store.set_unavailable(true);
    let (status, body) = h
        .json(Method::POST, "/api/chatbot", json!({ "message": "toyota" }))
        .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "reply": "Something went wrong." }));
}

#[tokio::test]
async fn duplicate_brand_is_a_conflict_and_stored_once() {
    let h = harness(None);
    h.create_brand("Toyota").await;

    let (status, body) = h
        .form(
            "/api/brand/create-brand",
            &[
                Part::Text("name", "Toyota"),
                Part::File("image", "other.png", b"png"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Name Already Exists");

    let (_, body) = h.get("/api/brand/getAll-brand").await;
    assert_eq!(body["totalBrand"], 1);
    assert_eq!(h.upload_files(), 1);
}

#[tokio::test]
async fn brand_requires_name_and_image() {
    let h = harness(None);
    let (status, body) = h
        .form(
            "/api/brand/create-brand",
            &[Part::File("image", "logo.png", b"png")],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Brand Name is Required");

    let (status, body) = h
        .form("/api/brand/create-brand", &[Part::Text("name", "Kia")])
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Brand Image is Required");
    assert!(h.store.brands().is_empty());
}

#[tokio::test]
async fn created_car_is_listed_under_its_brand_with_image_urls() {
    let h = harness(None);
    let toyota = h.create_brand("Toyota").await;
    let car = h
        .create_car(&toyota, "Corolla Altis", "₹15,00,000", &[("front.jpg", &b"jpeg"[..])])
        .await;
    assert_eq!(car["slug"], "corolla-altis");
    assert_eq!(car["price"], 1_500_000);
    assert_eq!(car["safetyRating"], "5");

    let picture = &car["productPictures"][0];
    assert!(picture
        .as_str()
        .unwrap()
        .starts_with("http://localhost:5000/uploads/"));

    let (status, body) = h.get("/api/brand/getBrandBtId-brand/toyota").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brand"]["cars"][0]["_id"], car["_id"]);
    assert!(body["brand"]["brandPictures"]
        .as_str()
        .unwrap()
        .starts_with("http://localhost:5000/uploads/"));

    let (status, body) = h.get("/api/car/getCarById-car/corolla-altis").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["car"]["brand"]["name"], "Toyota");

    // The stored file is served back.
    let resp = h
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/uploads/{}", stored_name(picture)))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), 1024).await.unwrap();
    assert_eq!(&bytes[..], b"jpeg");
}

#[tokio::test]
async fn create_car_reports_first_missing_field() {
    let h = harness(None);
    let toyota = h.create_brand("Toyota").await;
    let (status, body) = h
        .form(
            "/api/car/create-car",
            &[
                Part::Text("name", "Corolla"),
                Part::Text("brand", &toyota),
                Part::Text("price", "1500000"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "description is required");
    assert!(h.store.cars().is_empty());
}

#[tokio::test]
async fn create_car_rejects_more_images_than_allowed() {
    let h = harness_with_config(None, "[server]\nport = 5000\n[uploads]\nmax_files = 2\n");
    let toyota = h.create_brand("Toyota").await;
    assert_eq!(h.upload_files(), 1);

    let (status, body) = h
        .form(
            "/api/car/create-car",
            &[
                Part::Text("name", "Fortuner"),
                Part::Text("description", "Seven seat SUV"),
                Part::Text("brand", &toyota),
                Part::Text("price", "3500000"),
                Part::Text("fuelType", "Diesel"),
                Part::Text("transmission", "Automatic"),
                Part::Text("engineSize", "2755"),
                Part::Text("mileage", "10 kmpl"),
                Part::Text("safetyRating", "5"),
                Part::Text("warranty", "3 years"),
                Part::Text("seater", "7"),
                Part::Text("size", "Large"),
                Part::Text("fuelTank", "80 L"),
                Part::File("productPictures", "front.jpg", b"1"),
                Part::File("productPictures", "side.jpg", b"2"),
                Part::File("productPictures", "back.jpg", b"3"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "At most 2 images can be uploaded");
    assert!(h.store.cars().is_empty());
    assert_eq!(h.upload_files(), 1);

    // Exactly the limit is accepted.
    let car = h
        .create_car(
            &toyota,
            "Fortuner",
            "3500000",
            &[("front.jpg", &b"1"[..]), ("side.jpg", &b"2"[..])],
        )
        .await;
    assert_eq!(car["productPictures"].as_array().unwrap().len(), 2);
    assert_eq!(h.upload_files(), 3);
}

#[tokio::test]
async fn create_car_with_unknown_brand_is_not_found() {
    let h = harness(None);
    let (status, body) = h
        .form(
            "/api/car/create-car",
            &[
                Part::Text("name", "Ghost"),
                Part::Text("description", "x"),
                Part::Text("brand", "0b6f1c1e-8d5a-4d7e-9c36-2f1f5d3a9b10"),
                Part::Text("price", "100"),
                Part::Text("fuelType", "Petrol"),
                Part::Text("transmission", "Manual"),
                Part::Text("engineSize", "999"),
                Part::Text("mileage", "20"),
                Part::Text("safetyRating", "3"),
                Part::Text("warranty", "1 year"),
                Part::Text("seater", "4"),
                Part::Text("size", "Small"),
                Part::Text("fuelTank", "30 L"),
            ],
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Brand not found");
}

#[tokio::test]
async fn deleting_a_car_removes_its_images() {
    let h = harness(None);
    let honda = h.create_brand("Honda").await;
    let car = h
        .create_car(
            &honda,
            "City",
            "1200000",
            &[("front.jpg", &b"1"[..]), ("back.jpg", &b"2"[..])],
        )
        .await;
    assert_eq!(h.upload_files(), 3);

    let id = car["_id"].as_str().unwrap();
    let (status, body) = h.delete(&format!("/api/car/delete-car/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    for url in car["productPictures"].as_array().unwrap() {
        assert!(!h.upload_dir.join(stored_name(url)).exists());
    }
    assert_eq!(h.upload_files(), 1);

    let (status, body) = h.get("/api/car/getCarById-car/city").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);

    let (status, _) = h.delete(&format!("/api/car/delete-car/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_car_and_brand() {
    let h = harness(None);
    let brand = h.create_brand("Mahindra").await;
    let car = h.create_car(&brand, "Thar", "1400000", &[]).await;
    let id = car["_id"].as_str().unwrap();

    let (status, body) = h
        .json(
            Method::PUT,
            &format!("/api/car/update-car/{id}"),
            json!({ "name": "Thar Roxx", "price": 1900000 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["car"]["slug"], "thar-roxx");
    assert_eq!(body["car"]["price"], 1_900_000);

    let (status, _) = h
        .json(
            Method::PUT,
            "/api/car/update-car/not-an-id",
            json!({ "name": "x" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = h
        .json(
            Method::PUT,
            &format!("/api/brand/update-brand/{brand}"),
            json!({ "name": "Mahindra & Mahindra" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["brand"]["slug"], "mahindra-and-mahindra");
}

#[tokio::test]
async fn deleting_a_brand_orphans_its_cars() {
    let h = harness(None);
    let brand = h.create_brand("Tata").await;
    h.create_car(&brand, "Nexon", "900000", &[]).await;

    let (status, _) = h.delete(&format!("/api/brand/delete-brand/{brand}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(h.upload_files(), 0);

    let (_, body) = h.get("/api/car/getAll-car").await;
    assert_eq!(body["totalCar"], 1);
    assert!(body["cars"][0].get("brand").is_none());
    assert_eq!(body["cars"][0]["brandId"], brand.as_str());
}

#[tokio::test]
async fn related_cars_exclude_the_current_car() {
    let h = harness(None);
    let brand = h.create_brand("Toyota").await;
    let camry = h.create_car(&brand, "Camry", "4000000", &[]).await;
    let innova = h.create_car(&brand, "Innova", "2000000", &[]).await;

    let cid = camry["_id"].as_str().unwrap();
    let (status, body) = h
        .get(&format!("/api/car/related-car/{cid}/{brand}"))
        .await;
    assert_eq!(status, StatusCode::OK);
    let cars = body["cars"].as_array().unwrap();
    assert_eq!(cars.len(), 1);
    assert_eq!(cars[0]["_id"], innova["_id"]);
}

#[tokio::test]
async fn listing_fails_generically_when_store_is_down() {
    let h = harness(None);
    h.store.set_unavailable(true);
    let (status, body) = h.get("/api/car/getAll-car").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body,
        json!({ "success": false, "message": "Something went wrong" })
    );
}

#[tokio::test]
async fn payments_are_unavailable_without_gateway() {
    let h = harness(None);
    let (status, body) = h.get("/api/car/braintree/token").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn checkout_charges_catalog_total() {
    let gateway = Arc::new(FakeGateway::approving());
    let h = harness(Some(gateway.clone()));
    let brand = h.create_brand("Toyota").await;
    let a = h.create_car(&brand, "Corolla", "1500000", &[]).await;
    let b = h.create_car(&brand, "Camry", "4000000", &[]).await;

    let (status, body) = h.get("/api/car/braintree/token").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["clientToken"], "fake-client-token");

    let (status, body) = h
        .json(
            Method::POST,
            "/api/car/braintree/payment",
            json!({
                "nonce": "fake-valid-nonce",
                "cart": [
                    { "_id": a["_id"], "price": 1 },
                    { "_id": b["_id"], "price": 1 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["ok"], true);
    assert_eq!(body["order"]["amount"], 5_500_000);
    assert_eq!(gateway.sales()[0].1, 5_500_000);
    assert_eq!(h.store.orders().len(), 1);

    let (status, _) = h
        .json(
            Method::POST,
            "/api/car/braintree/payment",
            json!({ "nonce": "n", "cart": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn declined_payment_echoes_gateway_payload() {
    let h = harness(Some(Arc::new(FakeGateway::declining("Insufficient Funds"))));
    let brand = h.create_brand("Toyota").await;
    let car = h.create_car(&brand, "Corolla", "1500000", &[]).await;

    let (status, body) = h
        .json(
            Method::POST,
            "/api/car/braintree/payment",
            json!({ "nonce": "n", "cart": [{ "id": car["_id"] }] }),
        )
        .await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert_eq!(body["message"], "Insufficient Funds");
    assert_eq!(
        body["error"]["errors"][0]["extensions"]["errorClass"],
        "VALIDATION"
    );
    assert!(h.store.orders().is_empty());
}
