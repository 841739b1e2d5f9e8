use std::time::Duration;

use labelsheet_core::notice::DEFAULT_NOTICE_DURATION;
use labelsheet_db::store::DEFAULT_HTTP_TIMEOUT;

/// Default application id used in collection paths.
pub const DEFAULT_APP_ID: &str = "default-app-id";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be a valid {expected}, got {value:?}")]
    Invalid {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("could not set up the document store client: {0}")]
    StoreClient(#[source] labelsheet_db::StoreError),
}

/// Application configuration.
///
/// Built once at startup and handed to the store, identity provider and
/// manager constructors; nothing reads the environment after that.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Application id, the `{appId}` segment of `apps/{appId}/users/{userId}/templates`.
    pub app_id: String,
    /// Custom sign-in token tried before anonymous sign-in.
    pub initial_auth_token: Option<String>,
    /// HS256 secret for verifying custom tokens.
    pub auth_token_secret: Option<String>,
    /// Base URL of a REST document store. `None` keeps documents in memory.
    pub store_url: Option<String>,
    /// HTTP request timeout for the REST store.
    pub store_timeout: Duration,
    /// How long a success/error notice stays visible.
    pub notice_duration: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_id: DEFAULT_APP_ID.to_string(),
            initial_auth_token: None,
            auth_token_secret: None,
            store_url: None,
            store_timeout: DEFAULT_HTTP_TIMEOUT,
            notice_duration: DEFAULT_NOTICE_DURATION,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default          |
    /// |----------------------|------------------|
    /// | `APP_ID`             | `default-app-id` |
    /// | `INITIAL_AUTH_TOKEN` | unset            |
    /// | `AUTH_TOKEN_SECRET`  | unset            |
    /// | `STORE_URL`          | unset (memory)   |
    /// | `STORE_TIMEOUT_SECS` | `30`             |
    /// | `NOTICE_DURATION_MS` | `3000`           |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    /// Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| {
            lookup(var)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let store_timeout = match get("STORE_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_u64("STORE_TIMEOUT_SECS", raw)?),
            None => defaults.store_timeout,
        };
        let notice_duration = match get("NOTICE_DURATION_MS") {
            Some(raw) => Duration::from_millis(parse_u64("NOTICE_DURATION_MS", raw)?),
            None => defaults.notice_duration,
        };

        Ok(Self {
            app_id: get("APP_ID").unwrap_or(defaults.app_id),
            initial_auth_token: get("INITIAL_AUTH_TOKEN"),
            auth_token_secret: get("AUTH_TOKEN_SECRET"),
            store_url: get("STORE_URL"),
            store_timeout,
            notice_duration,
        })
    }
}

fn parse_u64(var: &'static str, raw: String) -> Result<u64, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw,
        expected: "non-negative integer",
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.app_id, "default-app-id");
        assert_eq!(config.initial_auth_token, None);
        assert_eq!(config.store_url, None);
        assert_eq!(config.notice_duration, Duration::from_secs(3));
        assert_eq!(config.store_timeout, Duration::from_secs(30));
    }

    #[test]
    fn values_are_read_and_blank_means_unset() {
        let config = AppConfig::from_lookup(lookup(&[
            ("APP_ID", "labels"),
            ("INITIAL_AUTH_TOKEN", "  "),
            ("STORE_URL", "http://localhost:8080"),
            ("NOTICE_DURATION_MS", "1500"),
        ]))
        .unwrap();
        assert_eq!(config.app_id, "labels");
        assert_eq!(config.initial_auth_token, None);
        assert_eq!(config.store_url.as_deref(), Some("http://localhost:8080"));
        assert_eq!(config.notice_duration, Duration::from_millis(1500));
    }

    #[test]
    fn malformed_numbers_are_reported() {
        assert_matches!(
            AppConfig::from_lookup(lookup(&[("STORE_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::Invalid { var: "STORE_TIMEOUT_SECS", .. })
        );
    }
}
