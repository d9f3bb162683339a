use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::currency::{Currency, CurrencyError, ExchangeRates};

// ============================================================================
// Configuration - Environment-driven settings
// ============================================================================
//
//   ORDERS_BASE_CURRENCY   base currency of the rate table     (ARS)
//   ORDERS_RATE_USD        base units per 1 USD                (1400)
//   ORDERS_RATE_BRL        base units per 1 BRL                (260)
//   ORDERS_RATE_ARS        base units per 1 ARS                (unset)
//   ORDERS_LOG_FILTER      default tracing filter when RUST_LOG is unset
//
// Unparsable numbers fall back to the default. Rates that parse but are not
// positive are rejected.
//
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue { var: &'static str, reason: String },

    #[error(transparent)]
    Currency(#[from] CurrencyError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRateSettings {
    pub base: Currency,
    pub usd: Option<f64>,
    pub brl: Option<f64>,
    pub ars: Option<f64>,
}

impl Default for ExchangeRateSettings {
    fn default() -> Self {
        Self {
            base: Currency::Ars,
            usd: Some(1400.0),
            brl: Some(260.0),
            ars: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info,order_lifecycle=debug".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub exchange_rates: ExchangeRateSettings,
    pub logging: LoggingSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ExchangeRateSettings::default();

        let base = match lookup("ORDERS_BASE_CURRENCY") {
            Some(raw) => raw.parse::<Currency>().map_err(|e| ConfigError::InvalidValue {
                var: "ORDERS_BASE_CURRENCY",
                reason: e.to_string(),
            })?,
            None => defaults.base,
        };

        let exchange_rates = ExchangeRateSettings {
            base,
            usd: parse_rate(&lookup, "ORDERS_RATE_USD", defaults.usd)?,
            brl: parse_rate(&lookup, "ORDERS_RATE_BRL", defaults.brl)?,
            ars: parse_rate(&lookup, "ORDERS_RATE_ARS", defaults.ars)?,
        };

        let logging = LoggingSettings {
            filter: lookup("ORDERS_LOG_FILTER")
                .map(|f| f.trim().to_string())
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| LoggingSettings::default().filter),
        };

        Ok(Self { exchange_rates, logging })
    }

    /// Rate table for the currency converter
    pub fn exchange_rates(&self) -> Result<ExchangeRates, ConfigError> {
        let settings = &self.exchange_rates;
        let mut rates = ExchangeRates::new(settings.base);
        for (currency, rate) in [
            (Currency::Usd, settings.usd),
            (Currency::Brl, settings.brl),
            (Currency::Ars, settings.ars),
        ] {
            if let Some(rate) = rate {
                rates = rates.with_rate(currency, rate)?;
            }
        }
        Ok(rates)
    }
}

fn parse_rate(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: Option<f64>,
) -> Result<Option<f64>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(default);
    };

    match raw.trim().parse::<f64>() {
        Ok(rate) if rate.is_finite() && rate > 0.0 => Ok(Some(rate)),
        Ok(rate) => Err(ConfigError::InvalidValue {
            var,
            reason: format!("rate must be positive, got {rate}"),
        }),
        Err(_) => {
            tracing::warn!(var, value = %raw, "Unparsable rate, using default");
            Ok(default)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| vars.get(var).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, AppConfig::default());

        let rates = config.exchange_rates().unwrap();
        assert_eq!(rates.base(), Currency::Ars);
        assert_eq!(rates.rate_to_base(Currency::Usd).unwrap(), 1400.0);
        assert_eq!(rates.rate_to_base(Currency::Brl).unwrap(), 260.0);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ORDERS_RATE_USD", "1500.5"),
            ("ORDERS_LOG_FILTER", "warn"),
        ]))
        .unwrap();
        assert_eq!(config.exchange_rates.usd, Some(1500.5));
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn test_unparsable_rate_falls_back() {
        let config = AppConfig::from_lookup(lookup(&[("ORDERS_RATE_BRL", "lots")])).unwrap();
        assert_eq!(config.exchange_rates.brl, Some(260.0));
    }

    #[test]
    fn test_non_positive_rate_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[("ORDERS_RATE_USD", "-3")]));
        assert!(matches!(result, Err(ConfigError::InvalidValue { var: "ORDERS_RATE_USD", .. })));
    }

    #[test]
    fn test_unknown_base_currency_is_rejected() {
        let result = AppConfig::from_lookup(lookup(&[("ORDERS_BASE_CURRENCY", "EUR")]));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { var: "ORDERS_BASE_CURRENCY", .. })
        ));
    }

    #[test]
    fn test_usd_base_table() {
        let config = AppConfig::from_lookup(lookup(&[
            ("ORDERS_BASE_CURRENCY", "usd"),
            ("ORDERS_RATE_ARS", "0.0007"),
            ("ORDERS_RATE_BRL", "0.19"),
        ]))
        .unwrap();
        let rates = config.exchange_rates().unwrap();
        assert_eq!(rates.base(), Currency::Usd);
        assert_eq!(rates.rate_to_base(Currency::Usd).unwrap(), 1.0);
        assert_eq!(rates.rate_to_base(Currency::Ars).unwrap(), 0.0007);
    }
}
