//! Configuration management.
//!
//! Loads settings from environment variables and .env file.

use rust_decimal::Decimal;
use std::str::FromStr;
use std::time::Duration;

use crate::extract::queue::QueueConfig;
use crate::models::BankrollConfig;

/// Application configuration loaded from environment.
#[derive(Debug, Clone)]
pub struct Settings {
    // Bankroll sizing
    pub bankroll: Decimal,
    pub kelly_multiplier: f64,
    pub max_bet_percent: f64,

    // Extraction queue
    pub extract_max_concurrent: usize,
    pub extract_max_retries: u32,
    pub extract_base_delay_ms: u64,
    pub extract_rate_per_second: u32,

    // Logging
    pub log_level: String,
    pub log_json: bool,
}

impl Settings {
    /// Load settings from environment variables (and .env file).
    pub fn from_env() -> Self {
        // Try to load .env file (ignore if not found).
        let _ = dotenvy::dotenv();

        Self {
            bankroll: env_decimal("BANKROLL", Decimal::new(1000, 0)),
            kelly_multiplier: env_f64("KELLY_MULTIPLIER", 0.25),
            max_bet_percent: env_f64("MAX_BET_PERCENT", 0.05),

            extract_max_concurrent: env_usize("EXTRACT_MAX_CONCURRENT", 4),
            extract_max_retries: env_u32("EXTRACT_MAX_RETRIES", 3),
            extract_base_delay_ms: env_u64("EXTRACT_BASE_DELAY_MS", 500),
            extract_rate_per_second: env_u32("EXTRACT_RATE_PER_SECOND", 5),

            log_level: env_str("LOG_LEVEL", "info"),
            log_json: env_bool("LOG_JSON", false),
        }
    }

    /// Validate configuration for critical requirements.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.bankroll < Decimal::new(10, 0) {
            errors.push("BANKROLL must be at least $10".to_string());
        }

        if self.kelly_multiplier <= 0.0 || self.kelly_multiplier > 1.0 {
            errors.push("KELLY_MULTIPLIER must be in (0, 1]".to_string());
        }

        if self.max_bet_percent <= 0.0 || self.max_bet_percent > 0.25 {
            errors.push("MAX_BET_PERCENT must be in (0, 0.25]".to_string());
        }

        if self.extract_max_concurrent == 0 {
            errors.push("EXTRACT_MAX_CONCURRENT must be at least 1".to_string());
        }

        if self.extract_max_retries == 0 {
            errors.push("EXTRACT_MAX_RETRIES must be at least 1".to_string());
        }

        if self.extract_rate_per_second == 0 {
            errors.push("EXTRACT_RATE_PER_SECOND must be at least 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Bankroll parameters for the Kelly sizer.
    pub fn bankroll_config(&self) -> BankrollConfig {
        BankrollConfig {
            bankroll: self.bankroll,
            kelly_multiplier: self.kelly_multiplier,
            max_bet_percent: self.max_bet_percent,
        }
    }

    /// Tuning knobs for the extraction queue.
    pub fn queue_config(&self) -> QueueConfig {
        QueueConfig {
            max_concurrent: self.extract_max_concurrent,
            max_retries: self.extract_max_retries,
            base_delay: Duration::from_millis(self.extract_base_delay_ms),
            rate_per_second: self.extract_rate_per_second,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bankroll: Decimal::new(1000, 0),
            kelly_multiplier: 0.25,
            max_bet_percent: 0.05,
            extract_max_concurrent: 4,
            extract_max_retries: 3,
            extract_base_delay_ms: 500,
            extract_rate_per_second: 5,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

// =============================================================================
// Environment helpers
// =============================================================================

fn env_str(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(default)
}

fn env_decimal(key: &str, default: Decimal) -> Decimal {
    std::env::var(key)
        .ok()
        .and_then(|v| Decimal::from_str(&v).ok())
        .unwrap_or(default)
}

fn env_f64(key: &str, default: f64) -> f64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_usize(key: &str, default: usize) -> usize {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u32(key: &str, default: u32) -> u32 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_validate_accumulates_errors() {
        let settings = Settings {
            bankroll: dec!(5),
            kelly_multiplier: 1.5,
            max_bet_percent: 0.30,
            extract_max_concurrent: 0,
            ..Settings::default()
        };
        let errors = settings.validate().unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn test_queue_config_conversion() {
        let settings = Settings {
            extract_base_delay_ms: 250,
            ..Settings::default()
        };
        let qc = settings.queue_config();
        assert_eq!(qc.base_delay, Duration::from_millis(250));
        assert_eq!(qc.max_concurrent, 4);
    }
}
