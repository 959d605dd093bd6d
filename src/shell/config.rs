use std::{env, net::SocketAddr, str::FromStr, time::Duration};

use thiserror::Error;
use tracing::info;

use crate::modules::live_roster::session::SessionOptions;
use crate::modules::live_roster::use_cases::sync_room_events::backoff::ReconnectPolicy;
use crate::shared::core::primitives::RoomId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("environment variable {0} is required")]
    Missing(&'static str),

    #[error("invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_url: String,
    pub ws_url: String,
    pub room_id: RoomId,
    pub access_token: Option<String>,
    pub bind: SocketAddr,
    pub search_debounce: Duration,
    pub reconnect: ReconnectPolicy,
    pub resync_on_rejoin: bool,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &'static str| lookup(key).filter(|value| !value.trim().is_empty());
        let required = |key: &'static str| var(key).ok_or(ConfigError::Missing(key));

        let raw_room = required("LIVE_ROSTER_ROOM_ID")?;
        let room_id = RoomId::parse(&raw_room).map_err(|e| ConfigError::Invalid {
            key: "LIVE_ROSTER_ROOM_ID",
            value: raw_room.clone(),
            reason: e.message,
        })?;

        Ok(Self {
            api_url: required("LIVE_ROSTER_API_URL")?,
            ws_url: required("LIVE_ROSTER_WS_URL")?,
            room_id,
            access_token: var("LIVE_ROSTER_ACCESS_TOKEN"),
            bind: parse_or(&var, "LIVE_ROSTER_BIND", "127.0.0.1:8080")?,
            search_debounce: Duration::from_millis(parse_or(
                &var,
                "LIVE_ROSTER_SEARCH_DEBOUNCE_MS",
                "500",
            )?),
            reconnect: ReconnectPolicy {
                base_delay: Duration::from_millis(parse_or(
                    &var,
                    "LIVE_ROSTER_RECONNECT_BASE_MS",
                    "500",
                )?),
                max_delay: Duration::from_millis(parse_or(
                    &var,
                    "LIVE_ROSTER_RECONNECT_MAX_MS",
                    "30000",
                )?),
                surface_after_attempts: parse_or(&var, "LIVE_ROSTER_SURFACE_AFTER_ATTEMPTS", "5")?,
                stable_after: Duration::from_millis(parse_or(
                    &var,
                    "LIVE_ROSTER_RECONNECT_STABLE_MS",
                    "5000",
                )?),
            },
            resync_on_rejoin: parse_or(&var, "LIVE_ROSTER_RESYNC_ON_REJOIN", "true")?,
            http_timeout: Duration::from_secs(parse_or(
                &var,
                "LIVE_ROSTER_HTTP_TIMEOUT_SECS",
                "30",
            )?),
        })
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            search_debounce: self.search_debounce,
            reconnect: self.reconnect,
            resync_on_rejoin: self.resync_on_rejoin,
        }
    }
}

fn parse_or<T>(
    var: &impl Fn(&'static str) -> Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = var(key).unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
        value,
    })
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use crate::tests::fixtures::entries::ROOM_ID;
    use rstest::{fixture, rstest};
    use std::collections::HashMap;

    #[fixture]
    fn before_each() -> HashMap<&'static str, String> {
        HashMap::from([
            ("LIVE_ROSTER_API_URL", "https://shop.example.com/api".to_string()),
            ("LIVE_ROSTER_WS_URL", "wss://shop.example.com/realtime".to_string()),
            ("LIVE_ROSTER_ROOM_ID", ROOM_ID.to_string()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<Config, ConfigError> {
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[rstest]
    fn it_should_apply_defaults(before_each: HashMap<&'static str, String>) {
        let config = load(&before_each).unwrap();

        assert_eq!(config.room_id.as_str(), ROOM_ID);
        assert_eq!(config.access_token, None);
        assert_eq!(config.bind, "127.0.0.1:8080".parse::<SocketAddr>().unwrap());
        assert_eq!(config.search_debounce, Duration::from_millis(500));
        assert_eq!(config.reconnect, ReconnectPolicy::default());
        assert!(config.resync_on_rejoin);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[rstest]
    fn it_should_read_overrides(mut before_each: HashMap<&'static str, String>) {
        before_each.insert("LIVE_ROSTER_ACCESS_TOKEN", "secret".into());
        before_each.insert("LIVE_ROSTER_RECONNECT_MAX_MS", "8000".into());
        before_each.insert("LIVE_ROSTER_RECONNECT_STABLE_MS", "1500".into());
        before_each.insert("LIVE_ROSTER_RESYNC_ON_REJOIN", "false".into());

        let config = load(&before_each).unwrap();
        let options = config.session_options();

        assert_eq!(config.access_token.as_deref(), Some("secret"));
        assert_eq!(options.reconnect.max_delay, Duration::from_millis(8000));
        assert_eq!(options.reconnect.stable_after, Duration::from_millis(1500));
        assert!(!options.resync_on_rejoin);
    }

    #[rstest]
    fn it_should_require_the_api_url(mut before_each: HashMap<&'static str, String>) {
        before_each.insert("LIVE_ROSTER_API_URL", "  ".into());

        assert_eq!(
            load(&before_each).unwrap_err(),
            ConfigError::Missing("LIVE_ROSTER_API_URL")
        );
    }

    #[rstest]
    #[case("LIVE_ROSTER_ROOM_ID", "room-1")]
    #[case("LIVE_ROSTER_SEARCH_DEBOUNCE_MS", "soon")]
    #[case("LIVE_ROSTER_BIND", "localhost")]
    fn it_should_reject_unparsable_values(
        mut before_each: HashMap<&'static str, String>,
        #[case] key: &'static str,
        #[case] value: &str,
    ) {
        before_each.insert(key, value.into());

        match load(&before_each).unwrap_err() {
            ConfigError::Invalid { key: invalid, .. } => assert_eq!(invalid, key),
            other => panic!("expected an invalid value error, got {other:?}"),
        }
    }
}
