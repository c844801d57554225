//! Environment configuration.

use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use crate::logbook::HosRules;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid value: {value:?}")]
    Parse { name: &'static str, value: String },

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub cache_capacity: u64,
    pub cache_ttl: Duration,
    pub rules: HosRules,
}

impl Config {
    /// Read configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// missing variables.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = HosRules::default();
        let rules = HosRules {
            refuel_miles: parse_or(&lookup, "HOS_REFUEL_MILES", defaults.refuel_miles)?,
            resumption_hours: parse_or(&lookup, "HOS_RESUMPTION_HOURS", defaults.resumption_hours)?,
            stop_hours: parse_or(&lookup, "HOS_STOP_HOURS", defaults.stop_hours)?,
            cycle_limit_hours: parse_or(&lookup, "HOS_CYCLE_LIMIT_HOURS", defaults.cycle_limit_hours)?,
            max_days: parse_or(&lookup, "HOS_MAX_DAYS", defaults.max_days)?,
            ..defaults
        };
        rules.validate()?;

        let cache_capacity = parse_or(&lookup, "LOGBOOK_CACHE_CAPACITY", 1000)?;
        let cache_ttl_secs: u64 = parse_or(&lookup, "LOGBOOK_CACHE_TTL_SECS", 600)?;
        if cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "LOGBOOK_CACHE_TTL_SECS",
                reason: "must be at least one second".to_string(),
            });
        }

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
            cache_capacity,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
            rules,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::Parse { name, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.cache_capacity, 1000);
        assert_eq!(config.cache_ttl, Duration::from_secs(600));
        assert_eq!(config.rules, HosRules::default());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("HOS_REFUEL_MILES", "950"),
            ("HOS_MAX_DAYS", "30"),
            ("LOGBOOK_CACHE_CAPACITY", " 50 "),
        ])
        .unwrap();

        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.rules.refuel_miles, 950.0);
        assert_eq!(config.rules.max_days, 30);
        assert_eq!(config.cache_capacity, 50);
    }

    #[test]
    fn test_unparseable_value() {
        let err = config_from(&[("HOS_REFUEL_MILES", "lots")]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { name: "HOS_REFUEL_MILES", .. }));
    }

    #[test]
    fn test_invalid_rule_value() {
        let err = config_from(&[("HOS_STOP_HOURS", "-0.5")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "stop_hours", .. }));
    }

    #[test]
    fn test_resumption_leaving_no_room_to_drive_rejected() {
        let err = config_from(&[("HOS_RESUMPTION_HOURS", "23")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "resumption_hours", .. }));
    }

    #[test]
    fn test_zero_ttl_rejected() {
        assert!(config_from(&[("LOGBOOK_CACHE_TTL_SECS", "0")]).is_err());
    }
}
