//! Process configuration, read once at startup from the environment (spec
//! §4.7). Missing or malformed required values fail fast, before the
//! socket is ever bound (spec §8 A10).

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use nutvault_common::{CurrencyUnit, Limits};

pub const ENV_MINT_URL: &str = "NUTVAULT_MINT_URL";
pub const ENV_DATABASE_URL: &str = "NUTVAULT_DATABASE_URL";
pub const ENV_UNIT: &str = "NUTVAULT_UNIT";
pub const ENV_LISTEN_ADDR: &str = "NUTVAULT_LISTEN_ADDR";
pub const ENV_MAX_BALANCE: &str = "NUTVAULT_MAX_BALANCE";
pub const ENV_MAX_SEND: &str = "NUTVAULT_MAX_SEND";
pub const ENV_MAX_PAY: &str = "NUTVAULT_MAX_PAY";
pub const ENV_RATE_LIMIT_MAX: &str = "NUTVAULT_RATE_LIMIT_MAX";
pub const ENV_RATE_LIMIT_CREATE_WALLET_MAX: &str = "NUTVAULT_RATE_LIMIT_CREATE_WALLET_MAX";
pub const ENV_RATE_LIMIT_WINDOW_SECS: &str = "NUTVAULT_RATE_LIMIT_WINDOW_SECS";
pub const ENV_SERVICE_STATUS: &str = "NUTVAULT_SERVICE_STATUS";
pub const ENV_SERVICE_HELP: &str = "NUTVAULT_SERVICE_HELP";
pub const ENV_SERVICE_TERMS: &str = "NUTVAULT_SERVICE_TERMS";
pub const ENV_DATABASE_POOL_MAX_SIZE: &str = "NUTVAULT_DATABASE_POOL_MAX_SIZE";
pub const ENV_DATABASE_CONNECT_TIMEOUT_SECS: &str = "NUTVAULT_DATABASE_CONNECT_TIMEOUT_SECS";

const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:3338";
const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
const DEFAULT_RATE_LIMIT_CREATE_WALLET_MAX: u32 = 10;
const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;
const DEFAULT_DATABASE_POOL_MAX_SIZE: usize = 10;
const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Everything the process needs to start serving, resolved once and passed
/// down rather than re-read from the environment at call sites.
#[derive(Debug, Clone)]
pub struct Settings {
    pub mint_url: String,
    pub database_url: String,
    pub unit: CurrencyUnit,
    pub listen_addr: SocketAddr,
    pub limits: Limits,
    pub rate_limit_max: u32,
    pub rate_limit_create_wallet_max: u32,
    pub rate_limit_window: Duration,
    pub service_status: String,
    pub service_help: String,
    pub service_terms: String,
    pub database_pool_max_size: usize,
    pub database_connect_timeout: Duration,
}

impl Settings {
    /// Reads every setting from the environment. Fails on the first missing
    /// required variable or malformed value, rather than starting with a
    /// partially-sane configuration.
    pub fn from_env() -> Result<Self> {
        let mint_url = required_env(ENV_MINT_URL)?;
        let database_url = required_env(ENV_DATABASE_URL)?;

        let unit = match env::var(ENV_UNIT) {
            Ok(raw) => raw.parse::<CurrencyUnit>().map_err(|e| anyhow::anyhow!(e))?,
            Err(_) => CurrencyUnit::Sat,
        };

        let listen_addr = match env::var(ENV_LISTEN_ADDR) {
            Ok(raw) => raw.parse().with_context(|| format!("{ENV_LISTEN_ADDR} is not a valid socket address"))?,
            Err(_) => DEFAULT_LISTEN_ADDR.parse().expect("default listen addr is valid"),
        };

        let defaults = Limits::default();
        let limits = Limits {
            max_balance: parse_env_or(ENV_MAX_BALANCE, defaults.max_balance)?,
            max_send: parse_env_or(ENV_MAX_SEND, defaults.max_send)?,
            max_pay: parse_env_or(ENV_MAX_PAY, defaults.max_pay)?,
        };

        let rate_limit_max = parse_env_or(ENV_RATE_LIMIT_MAX, DEFAULT_RATE_LIMIT_MAX)?;
        let rate_limit_create_wallet_max =
            parse_env_or(ENV_RATE_LIMIT_CREATE_WALLET_MAX, DEFAULT_RATE_LIMIT_CREATE_WALLET_MAX)?;
        let rate_limit_window = Duration::from_secs(parse_env_or(ENV_RATE_LIMIT_WINDOW_SECS, DEFAULT_RATE_LIMIT_WINDOW_SECS)?);

        let database_pool_max_size = parse_env_or(ENV_DATABASE_POOL_MAX_SIZE, DEFAULT_DATABASE_POOL_MAX_SIZE)?;
        let database_connect_timeout =
            Duration::from_secs(parse_env_or(ENV_DATABASE_CONNECT_TIMEOUT_SECS, DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS)?);

        if mint_url.trim().is_empty() {
            bail!("{ENV_MINT_URL} must not be empty");
        }

        Ok(Self {
            mint_url,
            database_url,
            unit,
            listen_addr,
            limits,
            rate_limit_max,
            rate_limit_create_wallet_max,
            rate_limit_window,
            service_status: env::var(ENV_SERVICE_STATUS).unwrap_or_else(|_| "ready".to_string()),
            service_help: env::var(ENV_SERVICE_HELP).unwrap_or_default(),
            service_terms: env::var(ENV_SERVICE_TERMS).unwrap_or_default(),
            database_pool_max_size,
            database_connect_timeout,
        })
    }
}

fn required_env(key: &str) -> Result<String> {
    env::var(key).with_context(|| format!("{key} must be set"))
}

fn parse_env_or<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw.parse::<T>().map_err(|e| anyhow::anyhow!("{key} is invalid: {e}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_env_or_falls_back_to_default() {
        env::remove_var("NUTVAULT_TEST_UNSET_VALUE");
        let value: u32 = parse_env_or("NUTVAULT_TEST_UNSET_VALUE", 42).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn parse_env_or_rejects_malformed_value() {
        env::set_var("NUTVAULT_TEST_MALFORMED_VALUE", "not-a-number");
        let result: Result<u32> = parse_env_or("NUTVAULT_TEST_MALFORMED_VALUE", 1);
        assert!(result.is_err());
        env::remove_var("NUTVAULT_TEST_MALFORMED_VALUE");
    }

    #[test]
    fn from_env_fails_fast_without_required_variables() {
        env::remove_var(ENV_MINT_URL);
        env::remove_var(ENV_DATABASE_URL);
        let err = Settings::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_MINT_URL));
    }

    #[test]
    fn from_env_fails_on_empty_mint_url() {
        env::set_var(ENV_MINT_URL, "");
        env::set_var(ENV_DATABASE_URL, "postgres://localhost/test");
        let err = Settings::from_env().unwrap_err();
        assert!(err.to_string().contains(ENV_MINT_URL));
        env::remove_var(ENV_MINT_URL);
        env::remove_var(ENV_DATABASE_URL);
    }
}
