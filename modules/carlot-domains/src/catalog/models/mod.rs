pub mod brand;
pub mod car;
pub mod order;

pub use brand::{Brand, BrandRename, NewBrand};
pub use car::{normalize_price, Car, CarPatch, NewCar};
pub use order::{NewOrder, Order};
