//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of plain text
    pub log_json: bool,

    /// Directory of client files served at `/`. No client ships with the
    /// server; when unset only `/health` and `/ws` are routed.
    pub static_dir: Option<PathBuf>,
    /// Allowed CORS origins; `None` allows any origin
    pub client_origins: Option<Vec<String>>,
    /// Seed for the session RNG; random when unset
    pub session_seed: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // hosting platforms hand out PORT; SERVER_ADDR is the local override
        let server_addr = match var("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => var("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string()),
        };

        let client_origins = var("CLIENT_ORIGIN").map(|raw| {
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect::<Vec<_>>()
        });

        let session_seed = var("SESSION_SEED")
            .map(|raw| raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidSeed(raw)))
            .transpose()?;

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress(server_addr))?,
            log_level: var("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_json: var("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            static_dir: var("STATIC_DIR")
                .filter(|dir| !dir.trim().is_empty())
                .map(PathBuf::from),
            client_origins,
            session_seed,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid server address: {0}")]
    InvalidAddress(String),

    #[error("SESSION_SEED must be an unsigned integer, got {0:?}")]
    InvalidSeed(String),
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config::from_lookup(|_| None).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();

        assert_eq!(config.server_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.log_level, "info");
        assert!(!config.log_json);
        assert!(config.static_dir.is_none());
        assert!(config.client_origins.is_none());
        assert!(config.session_seed.is_none());
    }

    #[test]
    fn test_static_dir_only_when_set() {
        let config = load(&[("STATIC_DIR", "/srv/soc-client")]).unwrap();
        assert_eq!(config.static_dir, Some(PathBuf::from("/srv/soc-client")));

        assert!(load(&[("STATIC_DIR", " ")]).unwrap().static_dir.is_none());
    }

    #[test]
    fn test_port_wins_over_server_addr() {
        let config = load(&[("PORT", "9100"), ("SERVER_ADDR", "127.0.0.1:1")]).unwrap();
        assert_eq!(config.server_addr.port(), 9100);
    }

    #[test]
    fn test_origins_are_split() {
        let config = load(&[("CLIENT_ORIGIN", "http://a.test, http://b.test,")]).unwrap();
        assert_eq!(
            config.client_origins.unwrap(),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            load(&[("SERVER_ADDR", "nowhere")]),
            Err(ConfigError::InvalidAddress(_))
        ));
        assert!(matches!(
            load(&[("SESSION_SEED", "-4")]),
            Err(ConfigError::InvalidSeed(_))
        ));
        assert_eq!(load(&[("SESSION_SEED", "42")]).unwrap().session_seed, Some(42));
    }
}
