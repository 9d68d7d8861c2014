use std::time::Duration;

use jobtrack_core::pagination::DEFAULT_PAGE_SIZE;

/// Client configuration loaded from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the applications service.
    pub api_url: String,
    /// Rows per list page.
    pub page_size: u32,
    /// How long a notification stays visible.
    pub notify_duration: Duration,
    /// Per-request transport timeout.
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a positive integer, got '{value}'")]
    Invalid { var: &'static str, value: String },
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8000".to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            notify_duration: Duration::from_millis(1800),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                          | Default                 |
    /// |----------------------------------|-------------------------|
    /// | `JOBTRACK_API_URL`               | `http://localhost:8000` |
    /// | `JOBTRACK_PAGE_SIZE`             | `10`                    |
    /// | `JOBTRACK_NOTIFY_MS`             | `1800`                  |
    /// | `JOBTRACK_REQUEST_TIMEOUT_SECS`  | `30`                    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let api_url = lookup("JOBTRACK_API_URL")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.api_url);

        let page_size = match lookup("JOBTRACK_PAGE_SIZE") {
            Some(raw) => parse_positive("JOBTRACK_PAGE_SIZE", &raw)? as u32,
            None => defaults.page_size,
        };

        let notify_duration = match lookup("JOBTRACK_NOTIFY_MS") {
            Some(raw) => Duration::from_millis(parse_positive("JOBTRACK_NOTIFY_MS", &raw)?),
            None => defaults.notify_duration,
        };

        let request_timeout = match lookup("JOBTRACK_REQUEST_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_positive("JOBTRACK_REQUEST_TIMEOUT_SECS", &raw)?),
            None => defaults.request_timeout,
        };

        Ok(Self {
            api_url,
            page_size,
            notify_duration,
            request_timeout,
        })
    }
}

fn parse_positive(var: &'static str, raw: &str) -> Result<u64, ConfigError> {
    let invalid = || ConfigError::Invalid {
        var,
        value: raw.to_string(),
    };
    let value: u64 = raw.trim().parse().map_err(|_| invalid())?;
    if value == 0 || value > u64::from(u32::MAX) {
        return Err(invalid());
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var: &str| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.page_size, 10);
        assert_eq!(config.notify_duration, Duration::from_millis(1800));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("JOBTRACK_API_URL", "https://tracker.example"),
            ("JOBTRACK_PAGE_SIZE", "25"),
            ("JOBTRACK_NOTIFY_MS", "3000"),
            ("JOBTRACK_REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "https://tracker.example");
        assert_eq!(config.page_size, 25);
        assert_eq!(config.notify_duration, Duration::from_millis(3000));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
    }

    #[test]
    fn zero_and_garbage_are_rejected() {
        let err = ClientConfig::from_lookup(lookup(&[("JOBTRACK_PAGE_SIZE", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                var: "JOBTRACK_PAGE_SIZE",
                value: "0".into()
            }
        );
        assert!(ClientConfig::from_lookup(lookup(&[("JOBTRACK_NOTIFY_MS", "soon")])).is_err());
    }
}
