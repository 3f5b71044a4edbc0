use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::model::Coordinates;

/// Environment variable that overrides the stored API key at runtime.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// API key baked in at build time, if `WEATHER_API_KEY` was set when compiling.
const BUILD_API_KEY: Option<&str> = option_env!("WEATHER_API_KEY");

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org";
pub const DEFAULT_LOOKUP_URL: &str = "http://ip-api.com/json/?fields=status,message,lat,lon";

/// OpenWeather connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for OpenWeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

/// Whether the user has allowed location access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PermissionSetting {
    /// Ask on every `show`.
    #[default]
    Ask,
    Granted,
    Denied,
}

/// Location settings. Fixed coordinates act as the last-known location;
/// the network lookup provides a fresh fix when none is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationConfig {
    pub enabled: bool,
    pub permission: PermissionSetting,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub network_lookup: bool,
    pub lookup_url: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            permission: PermissionSetting::default(),
            latitude: None,
            longitude: None,
            network_lookup: true,
            lookup_url: DEFAULT_LOOKUP_URL.to_string(),
        }
    }
}

impl LocationConfig {
    /// Stored coordinates, if both halves are present.
    pub fn fixed_coordinates(&self) -> Option<Coordinates> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }

    pub fn set_fixed_coordinates(&mut self, coordinates: Option<Coordinates>) {
        self.latitude = coordinates.map(|c| c.latitude);
        self.longitude = coordinates.map(|c| c.longitude);
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// lang = "de"
///
/// [openweather]
/// api_key = "..."
///
/// [location]
/// permission = "granted"
/// latitude = 48.8566
/// longitude = 2.3522
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Language tag for condition descriptions; derived from the system locale when absent.
    pub lang: Option<String>,
    pub openweather: OpenWeatherConfig,
    pub location: LocationConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(self)
            .context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "localweather", "localweather")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        let loc = &self.location;
        match (loc.latitude, loc.longitude) {
            (Some(lat), Some(lon)) => {
                Coordinates::new(lat, lon).map_err(|e| anyhow!("[location] {e}"))?;
            }
            (None, None) => {}
            _ => bail!("[location] latitude and longitude must be set together"),
        }

        if self.openweather.timeout_secs == 0 {
            bail!("[openweather] timeout_secs must be greater than zero");
        }

        Ok(())
    }

    /// Resolve the API key: environment first, then the config file, then the build-time value.
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with_env(std::env::var(API_KEY_ENV).ok())
    }

    fn api_key_with_env(&self, env_value: Option<String>) -> Option<String> {
        let non_blank = |k: &String| !k.trim().is_empty();

        env_value
            .filter(non_blank)
            .or_else(|| self.openweather.api_key.clone().filter(non_blank))
            .or_else(|| BUILD_API_KEY.map(str::to_string))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.openweather.api_key = Some(api_key);
    }

    /// Language for the request: configured value, else the system locale.
    pub fn language(&self) -> Option<String> {
        if let Some(lang) = self.lang.as_deref().filter(|l| !l.is_empty()) {
            return Some(lang.to_string());
        }

        ["LC_ALL", "LC_MESSAGES", "LANG"]
            .iter()
            .filter_map(|var| std::env::var(var).ok())
            .find(|v| !v.is_empty())
            .and_then(|v| language_from_locale(&v))
    }
}

/// Extract the language part of a POSIX locale string, e.g. `de_DE.UTF-8` -> `de`.
pub fn language_from_locale(locale: &str) -> Option<String> {
    let lang = locale
        .split(['_', '.', '@', '-'])
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();

    if lang.is_empty() || lang == "c" || lang == "posix" {
        return None;
    }

    Some(lang)
}
