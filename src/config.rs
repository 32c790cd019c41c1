//! Environment configuration

use crate::runtime::RuntimeLimits;
use std::time::Duration;

/// Server and simulation settings
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// Simulated classifier latency
    pub classify_delay: Duration,
    /// Simulated submission latency
    pub submit_delay: Duration,
    pub voice_delay: Duration,
    pub wallet_delay: Duration,
    pub classify_timeout: Duration,
    pub submit_timeout: Duration,
    /// Fixed seed for the simulated backends; entropy when unset
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8000,
            classify_delay: Duration::from_millis(2000),
            submit_delay: Duration::from_millis(3000),
            voice_delay: Duration::from_millis(2000),
            wallet_delay: Duration::from_millis(1500),
            classify_timeout: Duration::from_secs(30),
            submit_timeout: Duration::from_secs(60),
            rng_seed: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unparseable values keep their default
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let millis = |key: &str, default: Duration| {
            parse_var(&lookup, key).map_or(default, Duration::from_millis)
        };

        Self {
            port: parse_var(&lookup, "INTELLICHAIN_PORT").unwrap_or(defaults.port),
            classify_delay: millis("INTELLICHAIN_CLASSIFY_DELAY_MS", defaults.classify_delay),
            submit_delay: millis("INTELLICHAIN_SUBMIT_DELAY_MS", defaults.submit_delay),
            voice_delay: millis("INTELLICHAIN_VOICE_DELAY_MS", defaults.voice_delay),
            wallet_delay: millis("INTELLICHAIN_WALLET_DELAY_MS", defaults.wallet_delay),
            classify_timeout: millis("INTELLICHAIN_CLASSIFY_TIMEOUT_MS", defaults.classify_timeout),
            submit_timeout: millis("INTELLICHAIN_SUBMIT_TIMEOUT_MS", defaults.submit_timeout),
            rng_seed: parse_var(&lookup, "INTELLICHAIN_RNG_SEED"),
        }
    }

    pub fn limits(&self) -> RuntimeLimits {
        RuntimeLimits {
            classify_timeout: self.classify_timeout,
            submit_timeout: self.submit_timeout,
        }
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = %raw, "Ignoring malformed setting");
            None
        }
    }
}
