use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";
pub const DEFAULT_RADARR_ROOT_FOLDER: &str = "/external-media/movies";
pub const DEFAULT_RADARR_QUALITY_PROFILE_ID: u32 = 4;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} environment variable must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Process configuration, loaded once at startup and passed down explicitly
#[derive(Debug, Clone)]
pub struct Settings {
    pub bot_token: String,
    pub telegram_api_url: String,
    pub allowed_user_id: String,
    pub tmdb_api_key: String,
    pub tmdb_base_url: String,
    pub radarr_api_key: String,
    pub radarr_url: String,
    pub radarr_root_folder: String,
    pub radarr_quality_profile_id: u32,
    pub session_ttl: Duration,
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds settings from any name → value lookup; empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let radarr_quality_profile_id = match get("RADARR_QUALITY_PROFILE_ID") {
            Some(raw) => parse_number("RADARR_QUALITY_PROFILE_ID", raw)?,
            None => DEFAULT_RADARR_QUALITY_PROFILE_ID,
        };
        let session_ttl_secs = match get("SESSION_TTL_SECS") {
            Some(raw) => parse_number("SESSION_TTL_SECS", raw)?,
            None => DEFAULT_SESSION_TTL_SECS,
        };

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            telegram_api_url: trim_base_url(
                get("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
            ),
            allowed_user_id: required("ALLOWED_USER_ID")?,
            tmdb_api_key: required("TMDB_API_KEY")?,
            tmdb_base_url: trim_base_url(
                get("TMDB_BASE_URL").unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string()),
            ),
            radarr_api_key: required("RADARR_API_KEY")?,
            radarr_url: trim_base_url(required("RADARR_URL")?),
            radarr_root_folder: get("RADARR_ROOT_FOLDER")
                .unwrap_or_else(|| DEFAULT_RADARR_ROOT_FOLDER.to_string()),
            radarr_quality_profile_id,
            session_ttl: Duration::from_secs(session_ttl_secs),
        })
    }
}

fn parse_number<T: std::str::FromStr>(name: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.parse()
        .map_err(|_| ConfigError::Invalid { name, value: raw })
}

fn trim_base_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
