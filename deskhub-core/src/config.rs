//! deskhub configuration.
//!
//! Merged from built-in defaults, an optional TOML file
//! (`~/.config/deskhub/config.toml` unless overridden) and `DESKHUB_*`
//! environment variables, e.g. `DESKHUB_WEATHER__LATITUDE=60.17`.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::Deserialize;

use crate::error::{DeskhubError, DeskhubResult};

const DEFAULT_PORT: u16 = 8000;

/// Read-only Gmail and Calendar access.
pub const DEFAULT_GOOGLE_SCOPES: &[&str] = &[
    "https://www.googleapis.com/auth/gmail.readonly",
    "https://www.googleapis.com/auth/calendar.readonly",
];

pub const DEFAULT_GMAIL_BASE_URL: &str = "https://gmail.googleapis.com/gmail/v1";
pub const DEFAULT_CALENDAR_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const DEFAULT_OPEN_METEO_URL: &str = "https://api.open-meteo.com/v1/forecast";

/// Directory holding the config file, OAuth client descriptor and token.
pub fn config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("deskhub"))
        .unwrap_or_else(|| PathBuf::from("~/.config/deskhub"))
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DeskhubConfig {
    pub server: ServerConfig,
    pub sources: SourcesConfig,
    pub google: GoogleConfig,
    pub weather: WeatherConfig,
    pub todo: TodoConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourcesConfig {
    /// Time budget for each source, in seconds.
    pub timeout_secs: u64,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig { timeout_secs: 5 }
    }
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    /// OAuth client descriptor downloaded from the Google Cloud console.
    pub client_secrets: PathBuf,
    /// Where the access/refresh token is persisted.
    pub token_file: PathBuf,
    pub scopes: Vec<String>,
    pub gmail_base_url: String,
    pub calendar_base_url: String,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        let dir = config_dir();
        GoogleConfig {
            client_secrets: dir.join("credentials.json"),
            token_file: dir.join("token.toml"),
            scopes: DEFAULT_GOOGLE_SCOPES.iter().map(|s| s.to_string()).collect(),
            gmail_base_url: DEFAULT_GMAIL_BASE_URL.to_string(),
            calendar_base_url: DEFAULT_CALENDAR_BASE_URL.to_string(),
        }
    }
}

impl GoogleConfig {
    pub fn client_secrets_path(&self) -> PathBuf {
        expand(&self.client_secrets)
    }

    pub fn token_path(&self) -> PathBuf {
        expand(&self.token_file)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub latitude: f64,
    pub longitude: f64,
    pub base_url: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        // Kuopio
        WeatherConfig {
            latitude: 62.9,
            longitude: 27.7,
            base_url: DEFAULT_OPEN_METEO_URL.to_string(),
        }
    }
}

/// Reserved for a real todo backend (Notion).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TodoConfig {
    pub notion_api_token: Option<String>,
    pub notion_database_id: Option<String>,
}

impl DeskhubConfig {
    pub fn default_path() -> PathBuf {
        config_dir().join("config.toml")
    }

    /// Load config from `path` (required) or the default location (optional),
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> DeskhubResult<Self> {
        let (path, required) = match path {
            Some(p) => (expand(p), true),
            None => (Self::default_path(), false),
        };

        let builder = Config::builder()
            .add_source(File::from(path).required(required))
            .add_source(
                Environment::with_prefix("DESKHUB")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        Self::from_builder(builder)
    }

    pub fn from_toml(contents: &str) -> DeskhubResult<Self> {
        Self::from_builder(Config::builder().add_source(File::from_str(contents, FileFormat::Toml)))
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> DeskhubResult<Self> {
        builder
            .build()
            .map_err(|e| DeskhubError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| DeskhubError::Config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = DeskhubConfig::from_toml("").unwrap();

        assert_eq!(config.server.bind.port(), 8000);
        assert_eq!(config.sources.timeout(), Duration::from_secs(5));
        assert_eq!(config.google.scopes.len(), 2);
        assert_eq!(config.weather.latitude, 62.9);
        assert!(config.todo.notion_api_token.is_none());
    }

    #[test]
    fn test_partial_sections_keep_other_defaults() {
        let config = DeskhubConfig::from_toml(
            r#"
[server]
bind = "127.0.0.1:9000"

[weather]
latitude = 60.17
longitude = 24.94

[todo]
notion_database_id = "abc123"
"#,
        )
        .unwrap();

        assert_eq!(config.server.bind.to_string(), "127.0.0.1:9000");
        assert_eq!(config.weather.longitude, 24.94);
        assert_eq!(config.weather.base_url, DEFAULT_OPEN_METEO_URL);
        assert_eq!(config.todo.notion_database_id.as_deref(), Some("abc123"));
        assert_eq!(config.google.gmail_base_url, DEFAULT_GMAIL_BASE_URL);
    }

    #[test]
    fn test_tilde_paths_are_expanded() {
        let config = DeskhubConfig::from_toml(
            r#"
[google]
token_file = "~/deskhub/token.toml"
"#,
        )
        .unwrap();

        let path = config.google.token_path();
        assert!(!path.to_string_lossy().starts_with('~'));
        assert!(path.ends_with("deskhub/token.toml"));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DeskhubConfig::load(Some(&dir.path().join("nope.toml")));

        assert!(matches!(result, Err(DeskhubError::Config(_))));
    }

    #[test]
    fn test_invalid_bind_address_is_rejected() {
        let result = DeskhubConfig::from_toml("[server]\nbind = \"not an address\"\n");

        assert!(result.is_err());
    }
}
