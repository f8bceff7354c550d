//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Sales behaviour configuration.
    #[serde(default)]
    pub sales: SalesConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Database connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

/// Sales configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SalesConfig {
    /// Discount policy attached to every sale handled by the service.
    #[serde(default)]
    pub discount_policy: DiscountPolicySettings,
    /// Page size used when a list request does not specify one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u32,
}

impl Default for SalesConfig {
    fn default() -> Self {
        Self {
            discount_policy: DiscountPolicySettings::default(),
            default_page_size: default_page_size(),
        }
    }
}

fn default_page_size() -> u32 {
    10
}

/// Which discount policy sales should use.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DiscountPolicySettings {
    /// No automatic discount.
    None,
    /// Quantity-tiered discount (0% / 10% / 20%).
    #[default]
    QuantityTier,
    /// The same rate for every line item.
    FlatRate {
        /// Discount rate as a fraction (0.05 = 5%).
        rate: Decimal,
    },
}

/// Decimal places a configured flat discount rate may carry.
const FLAT_RATE_MAX_SCALE: u32 = 4;

impl DiscountPolicySettings {
    /// Rejects flat rates outside `0..=1` or with more than four decimal
    /// places.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let Self::FlatRate { rate } = self else {
            return Ok(());
        };
        if *rate < Decimal::ZERO || *rate > Decimal::ONE {
            return Err(config::ConfigError::Message(format!(
                "sales.discount_policy.rate must be between 0 and 1, got {rate}"
            )));
        }
        if rate.normalize().scale() > FLAT_RATE_MAX_SCALE {
            return Err(config::ConfigError::Message(format!(
                "sales.discount_policy.rate must have at most {FLAT_RATE_MAX_SCALE} decimal places, got {rate}"
            )));
        }
        Ok(())
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(
                config::Environment::with_prefix("SALESDESK")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.sales.discount_policy.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_load_from_environment() {
        temp_env::with_vars(
            [
                ("SALESDESK__DATABASE__URL", Some("postgres://localhost/sales")),
                ("SALESDESK__SERVER__PORT", Some("9090")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                let config = AppConfig::load().unwrap();
                assert_eq!(config.database.url, "postgres://localhost/sales");
                assert_eq!(config.database.max_connections, 10);
                assert_eq!(config.server.port, 9090);
                assert_eq!(config.server.host, "0.0.0.0");
                assert_eq!(
                    config.sales.discount_policy,
                    DiscountPolicySettings::QuantityTier
                );
                assert_eq!(config.sales.default_page_size, 10);
            },
        );
    }

    #[test]
    fn test_missing_database_url_fails() {
        temp_env::with_vars(
            [
                ("SALESDESK__DATABASE__URL", None::<&str>),
                ("RUN_MODE", Some("test")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_load_rejects_over_precise_flat_rate() {
        temp_env::with_vars(
            [
                ("SALESDESK__DATABASE__URL", Some("postgres://localhost/sales")),
                ("SALESDESK__SALES__DISCOUNT_POLICY__KIND", Some("flat_rate")),
                ("SALESDESK__SALES__DISCOUNT_POLICY__RATE", Some("0.12345")),
                ("RUN_MODE", Some("test")),
            ],
            || {
                assert!(AppConfig::load().is_err());
            },
        );
    }

    #[test]
    fn test_flat_rate_bounds() {
        assert!(DiscountPolicySettings::None.validate().is_ok());
        assert!(DiscountPolicySettings::QuantityTier.validate().is_ok());
        assert!(
            DiscountPolicySettings::FlatRate { rate: dec!(0.1250) }
                .validate()
                .is_ok()
        );
        assert!(
            DiscountPolicySettings::FlatRate { rate: dec!(0.12345) }
                .validate()
                .is_err()
        );
        assert!(
            DiscountPolicySettings::FlatRate { rate: dec!(1.5) }
                .validate()
                .is_err()
        );
        assert!(
            DiscountPolicySettings::FlatRate { rate: dec!(-0.1) }
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_discount_policy_settings_deserialize() {
        let none: DiscountPolicySettings = serde_json::from_str(r#"{"kind":"none"}"#).unwrap();
        assert_eq!(none, DiscountPolicySettings::None);

        let flat: DiscountPolicySettings =
            serde_json::from_str(r#"{"kind":"flat_rate","rate":"0.05"}"#).unwrap();
        assert_eq!(flat, DiscountPolicySettings::FlatRate { rate: dec!(0.05) });

        let tier: DiscountPolicySettings =
            serde_json::from_str(r#"{"kind":"quantity_tier"}"#).unwrap();
        assert_eq!(tier, DiscountPolicySettings::QuantityTier);
    }
}
