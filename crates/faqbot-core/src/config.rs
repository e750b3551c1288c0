//! Server configuration.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Default HTTP port, the same one the hosted chat widget listened on.
pub const DEFAULT_PORT: u16 = 7860;
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Top-level FAQ Bot server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqBotConfig {
    /// Interface to bind.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
}

impl Default for FaqBotConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.into(),
            port: DEFAULT_PORT,
        }
    }
}

impl FaqBotConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env), reading variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("PORT is not a valid port: {raw:?}")))?,
            None => DEFAULT_PORT,
        };
        let host = lookup("FAQBOT_HOST").unwrap_or_else(|| DEFAULT_HOST.into());

        debug!("Server config: host={} port={}", host, port);
        Ok(Self { host, port })
    }

    /// Socket address string for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = FaqBotConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, FaqBotConfig::default());
        assert_eq!(config.bind_addr(), "0.0.0.0:7860");
    }

    #[test]
    fn test_port_and_host_override() {
        let config =
            FaqBotConfig::from_lookup(lookup(&[("PORT", "8080"), ("FAQBOT_HOST", "127.0.0.1")]))
                .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = FaqBotConfig::from_lookup(lookup(&[("PORT", "seventy")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
