//! Checkout Config

use clap::Args;
use rusty_money::iso::{self, Currency};
use thiserror::Error;

/// Configuration problems detected after parsing.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("unknown currency code `{0}`")]
    UnknownCurrency(String),
}

/// Checkout settings.
#[derive(Debug, Clone, Args)]
pub struct CheckoutConfig {
    /// ISO 4217 code of the currency prices are held in
    #[arg(long, env = "CURRENCY", default_value = "USD")]
    pub currency: String,
}

impl CheckoutConfig {
    /// Resolves the configured currency code.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownCurrency`] for codes rusty-money does not know.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        iso::find(&self.currency.trim().to_ascii_uppercase())
            .ok_or_else(|| ConfigError::UnknownCurrency(self.currency.clone()))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn resolves_known_codes_case_insensitively() -> TestResult {
        let config = CheckoutConfig {
            currency: "nzd".to_string(),
        };

        assert_eq!(config.currency()?, iso::NZD);

        Ok(())
    }

    #[test]
    fn rejects_unknown_codes() {
        let config = CheckoutConfig {
            currency: "XYZ".to_string(),
        };

        assert_eq!(
            config.currency(),
            Err(ConfigError::UnknownCurrency("XYZ".to_string()))
        );
    }
}
