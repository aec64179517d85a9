pub mod catalog;
pub mod chatbot;
pub mod error;
pub mod payments;
pub mod slug;
pub mod uploads;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use error::{CatalogError, CatalogResult};
