use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::CurrencyError;

// ============================================================================
// Currency Value Objects
// ============================================================================

/// Currencies accepted by the marketplace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "ARS")]
    Ars,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "BRL")]
    Brl,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Ars, Currency::Usd, Currency::Brl];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Ars => "ARS",
            Currency::Usd => "USD",
            Currency::Brl => "BRL",
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Currency {
    type Err = CurrencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "ARS" => Ok(Currency::Ars),
            "USD" => Ok(Currency::Usd),
            "BRL" => Ok(Currency::Brl),
            other => Err(CurrencyError::UnsupportedCurrency(other.to_string())),
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================
