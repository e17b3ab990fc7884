//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., iradah.myshopify.com)
//! - `SHOPIFY_STOREFRONT_TOKEN` - Storefront API access token
//!
//! ## Optional
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-07)
//! - `STOREFRONT_HOST` - Bind address (default: 127.0.0.1)
//! - `STOREFRONT_PORT` - Listen port (default: 3000)
//! - `STOREFRONT_BASE_URL` - Public URL of the storefront; enables CORS for
//!   that origin and secure session cookies when it is `https`
//! - `STOREFRONT_CURRENCY` - Currency of an empty cart (default: PKR)
//! - `STOREFRONT_PRODUCT_LIMIT` - Products fetched per listing (default: 50)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};

use iradah_core::CurrencyCode;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;
const MAX_PRODUCT_LIMIT: i64 = 250;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the storefront
    pub base_url: Option<Url>,
    /// Currency used for totals of an empty cart
    pub currency: CurrencyCode,
    /// How many products listing pages request
    pub product_limit: i64,
    /// Shopify Storefront API configuration
    pub shopify: ShopifyStorefrontConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g. "production")
    pub sentry_environment: Option<String>,
}

/// Shopify Storefront API configuration.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopifyStorefrontConfig {
    /// Shopify store domain (e.g., iradah.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2025-07)
    pub api_version: String,
    /// Storefront API access token
    pub storefront_token: SecretString,
}

impl std::fmt::Debug for ShopifyStorefrontConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyStorefrontConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("storefront_token", &"[REDACTED]")
            .finish()
    }
}

impl ShopifyStorefrontConfig {
    /// Load the Shopify settings on their own (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store or token is missing or the token
    /// looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_vars(&env_var)
    }

    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let store = get_required_env(vars, "SHOPIFY_STORE")?;
        if store.contains('/') || store.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidEnvVar(
                "SHOPIFY_STORE".to_string(),
                "expected a bare domain such as iradah.myshopify.com".to_string(),
            ));
        }

        Ok(Self {
            store,
            api_version: get_env_or_default(vars, "SHOPIFY_API_VERSION", "2025-07"),
            storefront_token: get_validated_secret(vars, "SHOPIFY_STOREFRONT_TOKEN")?,
        })
    }

    /// GraphQL endpoint for this store and API version.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!(
            "https://{}/api/{}/graphql.json",
            self.store, self.api_version
        )
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid, or
    /// if the access token fails validation.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_vars(&env_var)
    }

    fn from_vars(vars: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let host = parse_env(vars, "STOREFRONT_HOST", "127.0.0.1")?;
        let port = parse_env(vars, "STOREFRONT_PORT", "3000")?;
        let currency = parse_env(vars, "STOREFRONT_CURRENCY", "PKR")?;
        let product_limit: i64 = parse_env(vars, "STOREFRONT_PRODUCT_LIMIT", "50")?;
        if !(1..=MAX_PRODUCT_LIMIT).contains(&product_limit) {
            return Err(ConfigError::InvalidEnvVar(
                "STOREFRONT_PRODUCT_LIMIT".to_string(),
                format!("must be between 1 and {MAX_PRODUCT_LIMIT}"),
            ));
        }

        let base_url = get_optional_env(vars, "STOREFRONT_BASE_URL")
            .map(|raw| {
                Url::parse(&raw).map_err(|e| {
                    ConfigError::InvalidEnvVar("STOREFRONT_BASE_URL".to_string(), e.to_string())
                })
            })
            .transpose()?;

        Ok(Self {
            host,
            port,
            base_url,
            currency,
            product_limit,
            shopify: ShopifyStorefrontConfig::from_vars(vars)?,
            sentry_dsn: get_optional_env(vars, "SENTRY_DSN"),
            sentry_environment: get_optional_env(vars, "SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether session cookies should be marked `Secure`.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.base_url.as_ref().is_some_and(|url| url.scheme() == "https")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get a required environment variable.
fn get_required_env(
    vars: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<String, ConfigError> {
    get_optional_env(vars, key).ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable. Blank values count as unset.
fn get_optional_env(vars: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    vars(key).filter(|v| !v.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(vars: &impl Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    get_optional_env(vars, key).unwrap_or_else(|| default.to_string())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(
    vars: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get_env_or_default(vars, key, default)
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret.
fn get_validated_secret(
    vars: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<SecretString, ConfigError> {
    let value = get_required_env(vars, key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const TOKEN: &str = "3f9a1c7be24d80f6a5c1e9b27d4f0a83";

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![
            ("SHOPIFY_STORE", "iradah.myshopify.com"),
            ("SHOPIFY_STOREFRONT_TOKEN", TOKEN),
        ]
    }

    #[test]
    fn test_defaults() {
        let config = StorefrontConfig::from_vars(&vars(&minimal())).unwrap();
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
        assert_eq!(config.currency, CurrencyCode::pkr());
        assert_eq!(config.product_limit, 50);
        assert_eq!(config.shopify.api_version, "2025-07");
        assert!(config.base_url.is_none());
        assert!(!config.secure_cookies());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_overrides() {
        let mut pairs = minimal();
        pairs.extend([
            ("STOREFRONT_HOST", "0.0.0.0"),
            ("STOREFRONT_PORT", "8080"),
            ("STOREFRONT_CURRENCY", "usd"),
            ("STOREFRONT_PRODUCT_LIMIT", "12"),
            ("STOREFRONT_BASE_URL", "https://iradah.pk"),
            ("SENTRY_ENVIRONMENT", "staging"),
        ]);
        let config = StorefrontConfig::from_vars(&vars(&pairs)).unwrap();
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:8080");
        assert_eq!(config.currency.code(), "USD");
        assert_eq!(config.product_limit, 12);
        assert!(config.secure_cookies());
        assert_eq!(config.sentry_environment.as_deref(), Some("staging"));
    }

    #[test]
    fn test_missing_required() {
        let err = StorefrontConfig::from_vars(&vars(&[("SHOPIFY_STORE", "x.myshopify.com")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SHOPIFY_STOREFRONT_TOKEN"));

        let err = StorefrontConfig::from_vars(&vars(&[("SHOPIFY_STORE", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvVar(ref k) if k == "SHOPIFY_STORE"));
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("STOREFRONT_PORT", "http"),
            ("STOREFRONT_HOST", "localhost:3000"),
            ("STOREFRONT_CURRENCY", "rupees"),
            ("STOREFRONT_PRODUCT_LIMIT", "0"),
            ("STOREFRONT_PRODUCT_LIMIT", "1000"),
            ("STOREFRONT_BASE_URL", "not a url"),
            ("SHOPIFY_STORE", "https://iradah.myshopify.com"),
        ] {
            let mut pairs = minimal();
            pairs.retain(|(k, _)| *k != key);
            pairs.push((key, value));
            let err = StorefrontConfig::from_vars(&vars(&pairs)).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidEnvVar(ref k, _) if k == key),
                "{key}={value} gave {err}"
            );
        }
    }

    #[test]
    fn test_placeholder_token_rejected() {
        let pairs = [
            ("SHOPIFY_STORE", "iradah.myshopify.com"),
            ("SHOPIFY_STOREFRONT_TOKEN", "your-storefront-token"),
        ];
        let err = ShopifyStorefrontConfig::from_vars(&vars(&pairs)).unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_shannon_entropy() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("aaaaaaa") - 0.0).abs() < f64::EPSILON);
        assert!((shannon_entropy("ab") - 1.0).abs() < 0.01);
        assert!(shannon_entropy(TOKEN) > MIN_ENTROPY_BITS_PER_CHAR);
    }

    #[test]
    fn test_low_entropy_rejected() {
        let result = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR");
        assert!(matches!(result, Err(ConfigError::InsecureSecret(_, _))));
    }

    #[test]
    fn test_endpoint() {
        let config = ShopifyStorefrontConfig::from_vars(&vars(&minimal())).unwrap();
        assert_eq!(
            config.endpoint(),
            "https://iradah.myshopify.com/api/2025-07/graphql.json"
        );
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ShopifyStorefrontConfig::from_vars(&vars(&minimal())).unwrap();
        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("iradah.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains(TOKEN));
    }
}
