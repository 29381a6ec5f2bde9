//! Runtime configuration from the environment (and `.env`, if present)

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::FixedOffset;

/// Service configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub database_max_connections: u32,
    /// Dealership UTC offset used to map bookings onto calendar days
    pub dealer_offset: FixedOffset,
    pub cache_ttl: Duration,
}

impl Config {
    /// Load `.env` and read configuration from environment variables
    pub fn from_env() -> Result<Self> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                return Err(e).context("failed to load .env");
            }
        }

        let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

        let bind_addr = var_or("BIND_ADDR", "0.0.0.0:8080")
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let database_max_connections = var_or("DATABASE_MAX_CONNECTIONS", "5")
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?;

        let offset_minutes: i32 = var_or("DEALER_UTC_OFFSET_MINUTES", "0")
            .parse()
            .context("DEALER_UTC_OFFSET_MINUTES must be an integer")?;
        let dealer_offset = offset_from_minutes(offset_minutes)
            .context("DEALER_UTC_OFFSET_MINUTES is out of range")?;

        let cache_ttl_secs: u64 = var_or("CACHE_TTL_SECS", "300")
            .parse()
            .context("CACHE_TTL_SECS must be a positive integer")?;

        Ok(Self {
            database_url,
            bind_addr,
            database_max_connections,
            dealer_offset,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Fixed offset east of UTC, `None` outside +-24h
pub fn offset_from_minutes(minutes: i32) -> Option<FixedOffset> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_from_minutes() {
        assert_eq!(offset_from_minutes(0).unwrap().local_minus_utc(), 0);
        assert_eq!(offset_from_minutes(-300).unwrap().local_minus_utc(), -18_000);
        assert_eq!(offset_from_minutes(330).unwrap().local_minus_utc(), 19_800);
        assert!(offset_from_minutes(24 * 60).is_none());
        assert!(offset_from_minutes(i32::MAX).is_none());
    }
}
