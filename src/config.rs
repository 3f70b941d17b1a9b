use std::env;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub paystack: PaystackConfig,
    pub checkout: CheckoutConfig,
    pub nominatim: NominatimConfig,
}

#[derive(Debug, Clone)]
pub struct PaystackConfig {
    pub base_url: String,
    pub secret_key: String,
    /// Applied to both initialize and verify calls.
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct CheckoutConfig {
    pub storefront_url: String,
    pub guest_user_id: Uuid,
    pub reference_namespace: String,
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            storefront_url: "https://www.4marketdays.com".to_string(),
            guest_user_id: Uuid::nil(),
            reference_namespace: "4MT".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = CheckoutConfig::default();
        let timeout = Duration::from_secs(parse_or("GATEWAY_TIMEOUT_SECS", 5)?);

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_or("PORT", 8080)?,
            paystack: PaystackConfig {
                base_url: env::var("PAYSTACK_BASE_URL")
                    .unwrap_or_else(|_| "https://api.paystack.co".to_string()),
                secret_key: required("PAYSTACK_SECRET_KEY")?,
                timeout,
            },
            checkout: CheckoutConfig {
                storefront_url: env::var("STOREFRONT_URL").unwrap_or(defaults.storefront_url),
                guest_user_id: parse_or("GUEST_USER_ID", defaults.guest_user_id)?,
                reference_namespace: env::var("REFERENCE_NAMESPACE")
                    .unwrap_or(defaults.reference_namespace),
            },
            nominatim: NominatimConfig {
                base_url: env::var("NOMINATIM_URL")
                    .unwrap_or_else(|_| "https://nominatim.openstreetmap.org".to_string()),
                user_agent: env::var("NOMINATIM_USER_AGENT")
                    .unwrap_or_else(|_| "storefront-orders/0.1".to_string()),
                timeout,
            },
        })
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(name))
}

fn parse_or<T: std::str::FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_or_falls_back_when_unset() {
        let port: u16 = parse_or("STOREFRONT_TEST_UNSET_PORT", 8080).expect("default");
        assert_eq!(port, 8080);
    }

    #[test]
    fn parse_or_reports_bad_values() {
        env::set_var("STOREFRONT_TEST_BAD_PORT", "eighty");
        let err = parse_or::<u16>("STOREFRONT_TEST_BAD_PORT", 8080).expect_err("must fail");
        assert!(matches!(err, ConfigError::Invalid { name: "STOREFRONT_TEST_BAD_PORT", .. }));
    }

    #[test]
    fn required_rejects_blank() {
        env::set_var("STOREFRONT_TEST_BLANK", "  ");
        assert!(matches!(
            required("STOREFRONT_TEST_BLANK"),
            Err(ConfigError::Missing("STOREFRONT_TEST_BLANK"))
        ));
    }
}
