use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Contains only secrets and env-specific values; server, upload and
/// chatbot settings live in the TOML FileConfig.
#[derive(Debug, Clone)]
pub struct AppConfig {
    // Database
    pub database_url: String,

    // Payments
    pub braintree: Option<BraintreeCredentials>,
}

/// Braintree gateway credentials. All three keys must be present for
/// payments to be enabled.
#[derive(Debug, Clone)]
pub struct BraintreeCredentials {
    pub environment: String,
    pub merchant_id: String,
    pub public_key: String,
    pub private_key: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            database_url: std::env::var("DATABASE_URL").context("DATABASE_URL is required")?,
            braintree: BraintreeCredentials::from_env(),
        };

        config.log_keys();
        Ok(config)
    }

    fn log_keys(&self) {
        tracing::info!("Config loaded:");
        match &self.braintree {
            Some(bt) => {
                tracing::info!("  BRAINTREE_ENVIRONMENT: {}", bt.environment);
                tracing::info!("  BRAINTREE_MERCHANT_ID: {}", preview(&bt.merchant_id));
                tracing::info!("  BRAINTREE_PUBLIC_KEY: {}", preview(&bt.public_key));
            }
            None => tracing::info!("  BRAINTREE_*: <not set>, payments disabled"),
        }
    }
}

impl BraintreeCredentials {
    fn from_env() -> Option<Self> {
        let merchant_id = non_empty_env("BRAINTREE_MERCHANT_ID")?;
        let public_key = non_empty_env("BRAINTREE_PUBLIC_KEY")?;
        let private_key = non_empty_env("BRAINTREE_PRIVATE_KEY")?;
        Some(Self {
            environment: non_empty_env("BRAINTREE_ENVIRONMENT")
                .unwrap_or_else(|| "sandbox".to_string()),
            merchant_id,
            public_key,
            private_key,
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// First five characters of a credential, for startup logs.
fn preview(val: &str) -> String {
    let head: String = val.chars().take(5).collect();
    format!("{}...({} chars)", head, val.chars().count())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_ascii() {
        assert_eq!(preview("merchant123"), "merch...(11 chars)");
        assert_eq!(preview("abc"), "abc...(3 chars)");
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("ключ-мерчанта"), "ключ-...(13 chars)");
        assert_eq!(preview("ñ"), "ñ...(1 chars)");
    }
}
