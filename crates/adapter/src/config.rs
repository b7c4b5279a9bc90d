//! Adapter configuration from `DIG_CHAIN_*` environment variables.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context};

use crate::core::Rules;
use crate::types::Cell;

pub const PROTOCOL_VERSION: &str = "1.0.0";

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
    /// Milliseconds between automatic row raises; 0 disables the timer.
    pub rise_interval_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 16,
            rise_interval_ms: 5000,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset or unparsable values keep the default.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        Self {
            host: lookup("DIG_CHAIN_HOST")
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or(d.host),
            port: parse_or(&lookup, "DIG_CHAIN_PORT", d.port),
            protocol_version: d.protocol_version,
            max_pending_commands: parse_or(
                &lookup,
                "DIG_CHAIN_MAX_PENDING",
                d.max_pending_commands,
            ),
            rise_interval_ms: parse_or(&lookup, "DIG_CHAIN_RISE_MS", d.rise_interval_ms),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid socket address {}:{}", self.host, self.port))
    }

    pub fn rise_interval(&self) -> Option<Duration> {
        (self.rise_interval_ms > 0).then(|| Duration::from_millis(self.rise_interval_ms))
    }
}

/// Board seeding parameters for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct BoardConfig {
    pub height: usize,
    pub width: usize,
    /// Bottom rows filled with random colors at start and on restart.
    pub filled_rows: usize,
    /// Colors used for seeding are `1..=colors`.
    pub colors: Cell,
    pub seed: u64,
    pub rules: Rules,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            height: 40,
            width: 10,
            filled_rows: 3,
            colors: 4,
            seed: 1,
            rules: Rules::default(),
        }
    }
}

impl BoardConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ServerConfig::from_lookup`]. An unset seed is taken from the clock.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let d = Self::default();
        let seed = lookup("DIG_CHAIN_SEED")
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or_else(clock_seed);
        Self {
            height: parse_or(&lookup, "DIG_CHAIN_HEIGHT", d.height),
            width: parse_or(&lookup, "DIG_CHAIN_WIDTH", d.width),
            filled_rows: parse_or(&lookup, "DIG_CHAIN_FILLED_ROWS", d.filled_rows),
            colors: parse_or(&lookup, "DIG_CHAIN_COLORS", d.colors),
            seed,
            rules: d.rules,
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.height == 0 || self.width == 0 {
            bail!("board must be at least 1x1 (got {}x{})", self.height, self.width);
        }
        if self.filled_rows >= self.height {
            bail!(
                "filled_rows ({}) must leave row 0 empty on a board of height {}",
                self.filled_rows,
                self.height
            );
        }
        if self.colors == 0 {
            bail!("colors must be at least 1");
        }
        self.rules.validate()?;
        Ok(())
    }
}

/// Complete adapter configuration.
#[derive(Debug, Clone, Default)]
pub struct AdapterConfig {
    pub server: ServerConfig,
    pub board: BoardConfig,
}

impl AdapterConfig {
    pub fn from_env() -> Self {
        Self {
            server: ServerConfig::from_env(),
            board: BoardConfig::from_env(),
        }
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

fn clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_server_defaults() {
        let cfg = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(cfg.host, "127.0.0.1");
        assert_eq!(cfg.port, 7878);
        assert_eq!(cfg.rise_interval(), Some(Duration::from_millis(5000)));
        assert!(cfg.socket_addr().is_ok());
    }

    #[test]
    fn test_server_overrides_and_bad_values() {
        let cfg = ServerConfig::from_lookup(lookup(&[
            ("DIG_CHAIN_PORT", "9000"),
            ("DIG_CHAIN_MAX_PENDING", "nope"),
            ("DIG_CHAIN_RISE_MS", "0"),
        ]));
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.max_pending_commands, 16);
        assert_eq!(cfg.rise_interval(), None);
    }

    #[test]
    fn test_invalid_host_is_an_error() {
        let cfg = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(cfg.socket_addr().is_err());
    }

    #[test]
    fn test_board_from_lookup() {
        let cfg = BoardConfig::from_lookup(lookup(&[
            ("DIG_CHAIN_HEIGHT", "12"),
            ("DIG_CHAIN_WIDTH", "6"),
            ("DIG_CHAIN_SEED", "77"),
        ]));
        assert_eq!(cfg.height, 12);
        assert_eq!(cfg.width, 6);
        assert_eq!(cfg.seed, 77);
        assert_eq!(cfg.filled_rows, 3);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_board_validation() {
        let full = BoardConfig {
            height: 3,
            filled_rows: 3,
            ..BoardConfig::default()
        };
        assert!(full.validate().is_err());

        let colorless = BoardConfig {
            colors: 0,
            ..BoardConfig::default()
        };
        assert!(colorless.validate().is_err());
    }
}
