//! Configuration Module
//!
//! Loads node configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

use crate::cache::EvictionPolicy;
use crate::error::{CacheError, Result};
use crate::group::GroupOptions;
use crate::peer::{TransportOptions, DEFAULT_BASE_PATH};

/// Node configuration parameters.
///
/// All values can be configured via environment variables with defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Base URL other nodes use to reach this one
    pub self_url: String,
    /// Base URLs of the other nodes
    pub peers: Vec<String>,
    /// Byte budget of each group's cache
    pub max_bytes: usize,
    /// Eviction policy of each group's cache
    pub policy: EvictionPolicy,
    /// Lifetime of locally loaded entries, None = never expire
    pub ttl: Option<Duration>,
    /// Upper bound for one peer request
    pub peer_timeout: Duration,
    /// Routing prefix, starting and ending with `/`
    pub base_path: String,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_SERVER_PORT` - HTTP server port (default: 8001)
    /// - `CACHE_SELF_URL` - this node's base URL (default: `http://localhost:{port}`)
    /// - `CACHE_PEERS` - comma-separated peer base URLs (default: none)
    /// - `CACHE_MAX_BYTES` - per-group byte budget (default: 2048)
    /// - `CACHE_POLICY` - `lru` or `lfu` (default: lru)
    /// - `CACHE_TTL_SECS` - entry lifetime in seconds (default: unset)
    /// - `CACHE_PEER_TIMEOUT_MS` - peer request timeout (default: 3000)
    /// - `CACHE_BASE_PATH` - routing prefix (default: `/cache/`)
    ///
    /// Unparsable values fall back to the default with a warning.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let server_port = parse_or(&lookup, "CACHE_SERVER_PORT", defaults.server_port);

        Self {
            server_port,
            self_url: lookup("CACHE_SELF_URL")
                .map(|url| url.trim().trim_end_matches('/').to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| format!("http://localhost:{}", server_port)),
            peers: lookup("CACHE_PEERS")
                .map(|peers| parse_peer_list(&peers))
                .unwrap_or_default(),
            max_bytes: parse_or(&lookup, "CACHE_MAX_BYTES", defaults.max_bytes),
            policy: parse_or(&lookup, "CACHE_POLICY", defaults.policy),
            ttl: parse_opt(&lookup, "CACHE_TTL_SECS").map(Duration::from_secs),
            peer_timeout: Duration::from_millis(parse_or(
                &lookup,
                "CACHE_PEER_TIMEOUT_MS",
                defaults.peer_timeout.as_millis() as u64,
            )),
            base_path: lookup("CACHE_BASE_PATH").unwrap_or(defaults.base_path),
        }
    }

    /// Rejects values the node cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !self.base_path.starts_with('/') || !self.base_path.ends_with('/') {
            return Err(CacheError::InvalidConfig(format!(
                "base path '{}' must start and end with '/'",
                self.base_path
            )));
        }
        if self.max_bytes == 0 {
            return Err(CacheError::InvalidConfig(
                "max bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Full cluster membership: the configured peers plus this node.
    pub fn cluster_peers(&self) -> Vec<String> {
        let mut peers = self.peers.clone();
        if !peers.contains(&self.self_url) {
            peers.push(self.self_url.clone());
        }
        peers
    }

    /// Options for a group named `name` using the configured cache settings.
    pub fn group_options(&self, name: impl Into<String>) -> GroupOptions {
        let options = GroupOptions::new(name, self.max_bytes).policy(self.policy);
        match self.ttl {
            Some(ttl) => options.ttl(ttl),
            None => options,
        }
    }

    pub fn transport_options(&self) -> TransportOptions {
        TransportOptions {
            timeout: self.peer_timeout,
            ..TransportOptions::default()
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8001,
            self_url: "http://localhost:8001".to_string(),
            peers: Vec::new(),
            max_bytes: 2 << 10,
            policy: EvictionPolicy::Lru,
            ttl: None,
            peer_timeout: Duration::from_millis(3000),
            base_path: DEFAULT_BASE_PATH.to_string(),
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str, default: T) -> T {
    parse_opt(lookup, name).unwrap_or(default)
}

/// Parses a variable if set, warning about and ignoring an unparsable value.
fn parse_opt<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T> {
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparsable value");
            None
        }
    }
}

fn parse_peer_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|peer| peer.trim().trim_end_matches('/'))
        .filter(|peer| !peer.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_vars(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8001);
        assert_eq!(config.self_url, "http://localhost:8001");
        assert!(config.peers.is_empty());
        assert_eq!(config.max_bytes, 2048);
        assert_eq!(config.policy, EvictionPolicy::Lru);
        assert_eq!(config.ttl, None);
        assert_eq!(config.base_path, "/cache/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_from_empty_env() {
        let config = from_vars(&[]);
        assert_eq!(config.server_port, 8001);
        assert_eq!(config.self_url, "http://localhost:8001");
        assert_eq!(config.peer_timeout, Duration::from_secs(3));
    }

    #[test]
    fn test_config_from_vars() {
        let config = from_vars(&[
            ("CACHE_SERVER_PORT", "8002"),
            ("CACHE_PEERS", " http://localhost:8001/, ,http://localhost:8003"),
            ("CACHE_MAX_BYTES", "4096"),
            ("CACHE_POLICY", "LFU"),
            ("CACHE_TTL_SECS", "30"),
            ("CACHE_PEER_TIMEOUT_MS", "250"),
        ]);

        assert_eq!(config.server_port, 8002);
        assert_eq!(config.self_url, "http://localhost:8002");
        assert_eq!(
            config.peers,
            vec!["http://localhost:8001", "http://localhost:8003"]
        );
        assert_eq!(config.max_bytes, 4096);
        assert_eq!(config.policy, EvictionPolicy::Lfu);
        assert_eq!(config.ttl, Some(Duration::from_secs(30)));
        assert_eq!(config.transport_options().timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_unparsable_values_fall_back() {
        let config = from_vars(&[
            ("CACHE_SERVER_PORT", "eighty"),
            ("CACHE_POLICY", "fifo"),
            ("CACHE_TTL_SECS", "soon"),
        ]);
        assert_eq!(config.server_port, 8001);
        assert_eq!(config.policy, EvictionPolicy::Lru);
        assert_eq!(config.ttl, None);
    }

    #[test]
    fn test_parse_opt_distinguishes_unset_and_unparsable() {
        let lookup = |name: &str| match name {
            "SET" => Some(" 42 ".to_string()),
            "BAD" => Some("forty-two".to_string()),
            _ => None,
        };

        assert_eq!(parse_opt::<u64>(&lookup, "SET"), Some(42));
        assert_eq!(parse_opt::<u64>(&lookup, "BAD"), None);
        assert_eq!(parse_opt::<u64>(&lookup, "UNSET"), None);
        assert_eq!(parse_or(&lookup, "BAD", 7_u64), 7);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = from_vars(&[("CACHE_BASE_PATH", "cache")]);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));

        let config = from_vars(&[("CACHE_MAX_BYTES", "0")]);
        assert!(matches!(config.validate(), Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_cluster_peers_include_self() {
        let config = from_vars(&[("CACHE_PEERS", "http://localhost:8002")]);
        assert_eq!(
            config.cluster_peers(),
            vec!["http://localhost:8002", "http://localhost:8001"]
        );

        let config = from_vars(&[("CACHE_PEERS", "http://localhost:8001,http://localhost:8002")]);
        assert_eq!(config.cluster_peers().len(), 2);
    }

    #[test]
    fn test_group_options_follow_config() {
        let config = from_vars(&[("CACHE_POLICY", "lfu"), ("CACHE_TTL_SECS", "5")]);
        let options = config.group_options("scores");

        assert_eq!(options.name, "scores");
        assert_eq!(options.max_bytes, 2048);
        assert_eq!(options.policy, EvictionPolicy::Lfu);
        assert_eq!(options.ttl, Some(Duration::from_secs(5)));
    }
}
