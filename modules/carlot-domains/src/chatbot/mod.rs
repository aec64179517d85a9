//! Keyword chatbot over the catalog.

pub mod keywords;
pub mod price;
pub mod resolver;

pub use keywords::{extract_keywords, MAX_KEYWORDS};
pub use price::{parse_price_intent, PriceBand};
pub use resolver::{IntentResolver, ERROR_REPLY, FALLBACK_REPLY};
