pub mod input;
pub mod models;
pub mod service;
pub mod store;

pub use input::CarFields;
pub use models::{
    normalize_price, Brand, BrandRename, Car, CarPatch, NewBrand, NewCar, NewOrder, Order,
};
pub use service::{BrandWithCars, CarWithBrand, CatalogService};
pub use store::{CatalogStore, KeywordPattern, PgCatalogStore};
