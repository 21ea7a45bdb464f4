use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::annotations::MapRenderMode;

const CONFIG_FILE_NAME: &str = "capmap.conf";

pub const DEFAULT_SEARCH_URL: &str = "https://nominatim.openstreetmap.org/search";
pub const DEFAULT_ROUTE_URL: &str = "https://router.project-osrm.org";
pub const DEFAULT_LOCATION_URL: &str = "http://ip-api.com/json";
pub const DEFAULT_USER_AGENT: &str = concat!("capmap/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize, Deserialize, Clone)]
pub struct GuiConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self { width: Some(1280), height: Some(720) }
    }
}

/// Tile URL templates per render mode, `{x}`/`{y}`/`{z}` placeholders.
/// Unset entries use the built-in providers.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct TileConfig {
    pub standard: Option<String>,
    pub hybrid: Option<String>,
    pub satellite: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Default)]
pub struct ServiceConfig {
    pub search_url: Option<String>,
    pub route_url: Option<String>,
    pub location_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Serialize, Deserialize, Clone)]
pub struct Config {
    /// Consent for the IP-based location lookup. Off means the location
    /// authorization request comes back denied without network traffic.
    #[serde(default = "default_true")]
    pub allow_location: bool,
    /// Show capital callouts as plain dialogs instead of opening the
    /// Wikipedia article in the browser.
    #[serde(default)]
    pub plain_callouts: bool,
    #[serde(default)]
    pub start_mode: Option<String>,
    #[serde(default)]
    pub gui: GuiConfig,
    #[serde(default)]
    pub tiles: TileConfig,
    #[serde(default)]
    pub services: ServiceConfig,
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_location: true,
            plain_callouts: false,
            start_mode: None,
            gui: GuiConfig::default(),
            tiles: TileConfig::default(),
            services: ServiceConfig::default(),
        }
    }
}

impl Config {
    pub fn search_url(&self) -> &str {
        self.services.search_url.as_deref().unwrap_or(DEFAULT_SEARCH_URL)
    }

    pub fn route_url(&self) -> &str {
        self.services.route_url.as_deref().unwrap_or(DEFAULT_ROUTE_URL)
    }

    pub fn location_url(&self) -> &str {
        self.services.location_url.as_deref().unwrap_or(DEFAULT_LOCATION_URL)
    }

    pub fn user_agent(&self) -> &str {
        self.services.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn start_mode(&self) -> MapRenderMode {
        self.start_mode
            .as_deref()
            .and_then(MapRenderMode::from_name)
            .unwrap_or_default()
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_FILE_NAME))
}

/// Loads the config file, falling back to defaults when it is missing or
/// malformed. A broken file is logged, never fatal.
pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    match fs::read_to_string(&path) {
        Ok(text) => match parse(&text) {
            Ok(config) => config,
            Err(err) => {
                log::warn!("ignoring malformed {}: {err}", path.display());
                Config::default()
            }
        },
        Err(_) => Config::default(),
    }
}

pub(crate) fn parse(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_all_defaults() {
        let config = parse("").unwrap();
        assert!(config.allow_location);
        assert!(!config.plain_callouts);
        assert_eq!(config.start_mode(), MapRenderMode::Standard);
        assert_eq!(config.search_url(), DEFAULT_SEARCH_URL);
        assert_eq!(config.route_url(), DEFAULT_ROUTE_URL);
        assert_eq!(config.gui.width, None);
    }

    #[test]
    fn test_full_config_parses() {
        let config = parse(
            r#"
            allow_location = false
            plain_callouts = true
            start_mode = "satellite"

            [gui]
            width = 1600
            height = 900

            [tiles]
            standard = "https://tiles.example/{z}/{x}/{y}.png"

            [services]
            search_url = "https://nominatim.example/search"
            user_agent = "capmap-test/0.0"
            "#,
        )
        .unwrap();
        assert!(!config.allow_location);
        assert!(config.plain_callouts);
        assert_eq!(config.start_mode(), MapRenderMode::Satellite);
        assert_eq!(config.gui.width, Some(1600));
        assert_eq!(config.tiles.standard.as_deref(), Some("https://tiles.example/{z}/{x}/{y}.png"));
        assert_eq!(config.tiles.hybrid, None);
        assert_eq!(config.search_url(), "https://nominatim.example/search");
        assert_eq!(config.user_agent(), "capmap-test/0.0");
        assert_eq!(config.route_url(), DEFAULT_ROUTE_URL);
    }

    #[test]
    fn test_unknown_start_mode_falls_back_to_standard() {
        let config = parse(r#"start_mode = "flyover""#).unwrap();
        assert_eq!(config.start_mode(), MapRenderMode::Standard);
    }

    #[test]
    fn test_malformed_config_is_an_error() {
        assert!(parse("allow_location = \"maybe\"").is_err());
    }
}
