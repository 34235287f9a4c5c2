use std::env;
use std::str::FromStr;

use crate::error::{EventMapError, Result};

pub const DEFAULT_EONET_API_URL: &str = "https://eonet.sci.gsfc.nasa.gov/api/v2.1";

/// Application configuration loaded from environment variables.
/// Every variable has a default; only malformed values are errors.
#[derive(Debug, Clone)]
pub struct Config {
    // Events API
    pub eonet_api_url: String,
    pub eonet_status: Option<String>,
    pub eonet_limit: Option<u32>,
    pub eonet_days: Option<u32>,

    // Web server
    pub web_host: String,
    pub web_port: u16,
    pub max_sessions: usize,

    // Map tiles
    pub mapbox_access_token: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let eonet_status = get("EONET_STATUS").map(|s| s.trim().to_lowercase());
        if let Some(status) = &eonet_status {
            if !matches!(status.as_str(), "open" | "closed" | "all") {
                return Err(EventMapError::Config(format!(
                    "EONET_STATUS must be one of open, closed, all (got {status:?})"
                )));
            }
        }

        Ok(Self {
            eonet_api_url: get("EONET_API_URL")
                .unwrap_or_else(|| DEFAULT_EONET_API_URL.to_string()),
            eonet_status,
            eonet_limit: parse_optional(&get, "EONET_LIMIT")?,
            eonet_days: parse_optional(&get, "EONET_DAYS")?,
            web_host: get("WEB_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            web_port: parse_optional(&get, "WEB_PORT")?.unwrap_or(3000),
            max_sessions: parse_optional(&get, "MAX_SESSIONS")?.unwrap_or(256),
            mapbox_access_token: get("MAPBOX_ACCESS_TOKEN"),
        })
    }
}

fn parse_optional<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>> {
    match get(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| EventMapError::Config(format!("{key} must be a number (got {raw:?})"))),
    }
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
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.eonet_api_url, DEFAULT_EONET_API_URL);
        assert_eq!(config.web_host, "0.0.0.0");
        assert_eq!(config.web_port, 3000);
        assert_eq!(config.max_sessions, 256);
        assert!(config.eonet_status.is_none());
        assert!(config.eonet_limit.is_none());
        assert!(config.mapbox_access_token.is_none());
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup(&[
            ("EONET_API_URL", "https://eonet.gsfc.nasa.gov/api/v3"),
            ("EONET_STATUS", "Closed"),
            ("EONET_LIMIT", "25"),
            ("EONET_DAYS", " 30 "),
            ("WEB_PORT", "8080"),
            ("MAPBOX_ACCESS_TOKEN", "pk.test"),
        ]))
        .unwrap();
        assert_eq!(config.eonet_api_url, "https://eonet.gsfc.nasa.gov/api/v3");
        assert_eq!(config.eonet_status.as_deref(), Some("closed"));
        assert_eq!(config.eonet_limit, Some(25));
        assert_eq!(config.eonet_days, Some(30));
        assert_eq!(config.web_port, 8080);
        assert_eq!(config.mapbox_access_token.as_deref(), Some("pk.test"));
    }

    #[test]
    fn empty_values_count_as_unset() {
        let config = Config::from_lookup(lookup(&[("WEB_PORT", ""), ("MAPBOX_ACCESS_TOKEN", " ")]))
            .unwrap();
        assert_eq!(config.web_port, 3000);
        assert!(config.mapbox_access_token.is_none());
    }

    #[test]
    fn malformed_number_is_config_error() {
        let err = Config::from_lookup(lookup(&[("WEB_PORT", "http")])).unwrap_err();
        assert!(matches!(err, EventMapError::Config(ref msg) if msg.contains("WEB_PORT")));
    }

    #[test]
    fn unknown_status_is_config_error() {
        let err = Config::from_lookup(lookup(&[("EONET_STATUS", "pending")])).unwrap_err();
        assert!(matches!(err, EventMapError::Config(_)));
    }
}
