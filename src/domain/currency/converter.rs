use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::errors::CurrencyError;
use super::value_objects::Currency;

// ============================================================================
// Exchange Rate Table
// ============================================================================
//
// Every rate is expressed as "units of the base currency per one unit of the
// currency". The base currency has an implicit rate of 1.
//
// Conversions use plain f64 arithmetic. Results are not rounded, so a
// conversion followed by its inverse may differ from the input in the last
// bits. Callers that need exact cents must round at their own boundary.
//
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    base: Currency,
    rates: HashMap<Currency, f64>,
}

impl ExchangeRates {
    /// Empty table: only the base currency is convertible
    pub fn new(base: Currency) -> Self {
        Self {
            base,
            rates: HashMap::new(),
        }
    }

    pub fn with_rate(mut self, currency: Currency, rate: f64) -> Result<Self, CurrencyError> {
        if !rate.is_finite() || rate <= 0.0 {
            return Err(CurrencyError::InvalidRate {
                currency: currency.code().to_string(),
                rate,
            });
        }
        if currency != self.base {
            self.rates.insert(currency, rate);
        }
        Ok(self)
    }

    pub fn base(&self) -> Currency {
        self.base
    }

    /// Units of the base currency per one unit of `currency`
    pub fn rate_to_base(&self, currency: Currency) -> Result<f64, CurrencyError> {
        if currency == self.base {
            return Ok(1.0);
        }
        self.rates
            .get(&currency)
            .copied()
            .ok_or_else(|| CurrencyError::UnsupportedCurrency(currency.code().to_string()))
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        let mut rates = HashMap::new();
        rates.insert(Currency::Usd, 1400.0);
        rates.insert(Currency::Brl, 260.0);
        Self {
            base: Currency::Ars,
            rates,
        }
    }
}

// ============================================================================
// Currency Converter
// ============================================================================

#[derive(Debug, Clone)]
pub struct CurrencyConverter {
    rates: ExchangeRates,
}

impl CurrencyConverter {
    pub fn new(rates: ExchangeRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> &ExchangeRates {
        &self.rates
    }

    /// Convert `amount` from one currency to another through the base rate.
    ///
    /// Same-currency conversions return `amount` untouched, even when the
    /// currency has no configured rate.
    pub fn convert(&self, amount: f64, from: Currency, to: Currency) -> Result<f64, CurrencyError> {
        if from == to {
            return Ok(amount);
        }

        let from_rate = self.rates.rate_to_base(from)?;
        let to_rate = self.rates.rate_to_base(to)?;

        Ok(amount * from_rate / to_rate)
    }
}

impl Default for CurrencyConverter {
    fn default() -> Self {
        Self::new(ExchangeRates::default())
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
