//! Rate limiting configuration for API endpoints.
//!
//! Backed by `tower_governor`, which implements a token bucket per client IP:
//!
//! - one token is replenished every `*_replenish_secs` seconds
//! - the bucket holds at most `*_burst_size` tokens
//! - a request without a token is rejected with 429
//!
//! Client IPs are taken from `X-Forwarded-For`, `X-Real-IP` or `Forwarded`
//! headers first, falling back to the peer address.
//!
//! # Environment Variables
//!
//! - `RATE_LIMIT_ENABLED`: default true
//! - `RATE_LIMIT_GENERAL_REPLENISH_SECS`: default 1
//! - `RATE_LIMIT_GENERAL_BURST_SIZE`: default 60
//! - `RATE_LIMIT_AUTH_REPLENISH_SECS`: default 180
//! - `RATE_LIMIT_AUTH_BURST_SIZE`: default 5
//!
//! The auth defaults allow 5 attempts, then one more every three minutes,
//! which works out to 5 requests per 15 minutes.

use tower_governor::governor::{GovernorConfig, GovernorConfigBuilder};
use tower_governor::key_extractor::SmartIpKeyExtractor;

pub type IpGovernorConfig =
    GovernorConfig<SmartIpKeyExtractor, ::governor::middleware::NoOpMiddleware>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub general_replenish_secs: u64,
    pub general_burst_size: u32,
    /// Stricter bucket for register, verify, login and password reset.
    pub auth_replenish_secs: u64,
    pub auth_burst_size: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            general_replenish_secs: 1,
            general_burst_size: 60,
            auth_replenish_secs: 180,
            auth_burst_size: 5,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enabled),
            general_replenish_secs: std::env::var("RATE_LIMIT_GENERAL_REPLENISH_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.general_replenish_secs),
            general_burst_size: std::env::var("RATE_LIMIT_GENERAL_BURST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.general_burst_size),
            auth_replenish_secs: std::env::var("RATE_LIMIT_AUTH_REPLENISH_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.auth_replenish_secs),
            auth_burst_size: std::env::var("RATE_LIMIT_AUTH_BURST_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.auth_burst_size),
        }
    }

    /// Disabled limiter, for tests driving the router without client addresses.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// # Panics
    ///
    /// Never in practice: zero values are raised to one before building.
    #[must_use]
    pub fn general_governor_config(&self) -> IpGovernorConfig {
        GovernorConfigBuilder::default()
            .per_second(self.general_replenish_secs.max(1))
            .burst_size(self.general_burst_size.max(1))
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("Failed to build general rate limiter config")
    }

    /// # Panics
    ///
    /// Never in practice: zero values are raised to one before building.
    #[must_use]
    pub fn auth_governor_config(&self) -> IpGovernorConfig {
        GovernorConfigBuilder::default()
            .per_second(self.auth_replenish_secs.max(1))
            .burst_size(self.auth_burst_size.max(1))
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .expect("Failed to build auth rate limiter config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RateLimitConfig::default();
        assert!(config.enabled);
        assert_eq!(config.auth_replenish_secs, 180);
        assert_eq!(config.auth_burst_size, 5);
    }

    #[test]
    fn test_disabled() {
        let config = RateLimitConfig::disabled();
        assert!(!config.enabled);
        assert_eq!(config.general_burst_size, 60);
    }

    #[test]
    fn test_zero_values_still_build() {
        let config = RateLimitConfig {
            enabled: true,
            general_replenish_secs: 0,
            general_burst_size: 0,
            auth_replenish_secs: 0,
            auth_burst_size: 0,
        };
        let _ = config.general_governor_config();
        let _ = config.auth_governor_config();
    }
}
