use std::fmt;

use tracing::debug;

use crate::errors::{ConfigError, Result};

/// environment variable holding the listing api key.
pub const API_KEY_VAR: &str = "YOUTUBE_API_KEY";
/// environment variable holding the playlist to download.
pub const PLAYLIST_ID_VAR: &str = "YOUTUBE_PLAYLIST_ID";

/// settings resolved once at startup and passed explicitly afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub api_key: String,
    pub playlist_id: String,
}

impl Config {
    /// reads the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// reads the configuration through `lookup`.
    ///
    /// a value that is absent or only whitespace counts as missing. the api
    /// key is checked first.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = non_empty(lookup(API_KEY_VAR))
            .ok_or(ConfigError::MissingCredential { var: API_KEY_VAR })?;
        let playlist_id = non_empty(lookup(PLAYLIST_ID_VAR))
            .ok_or(ConfigError::MissingPlaylistId { var: PLAYLIST_ID_VAR })?;

        debug!(playlist_id = %playlist_id, "configuration loaded");
        Ok(Self {
            api_key,
            playlist_id,
        })
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("playlist_id", &self.playlist_id)
            .finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn loads_both_values() {
        let config = Config::from_lookup(lookup(&[
            (API_KEY_VAR, "key"),
            (PLAYLIST_ID_VAR, " PL123 "),
        ]))
        .expect("config should load");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.playlist_id, "PL123");
    }

    #[test]
    fn missing_credential_is_reported_first() {
        let err = Config::from_lookup(lookup(&[])).expect_err("empty env should fail");
        assert_eq!(err, ConfigError::MissingCredential { var: API_KEY_VAR });
    }

    #[test]
    fn empty_credential_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, ""), (PLAYLIST_ID_VAR, "PL123")]))
            .expect_err("empty key should fail");
        assert!(matches!(err, ConfigError::MissingCredential { .. }));
    }

    #[test]
    fn whitespace_playlist_id_counts_as_missing() {
        let err = Config::from_lookup(lookup(&[(API_KEY_VAR, "key"), (PLAYLIST_ID_VAR, "  ")]))
            .expect_err("blank playlist id should fail");
        assert_eq!(err, ConfigError::MissingPlaylistId { var: PLAYLIST_ID_VAR });
        assert!(err.to_string().contains(PLAYLIST_ID_VAR));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let config = Config {
            api_key: "super-secret".into(),
            playlist_id: "PL123".into(),
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("PL123"));
    }
}
