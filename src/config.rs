use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use camino::Utf8PathBuf;
use serde::Deserialize;

use crate::domain::TitleId;
use crate::error::ArtworkError;

pub const DEFAULT_CONFIG_FILE: &str = "artwork-scraper.json";
pub const DEFAULT_METADATA_URL_TEMPLATE: &str = "https://raw.githubusercontent.com/xenia-manager/Database/temp-main/Database/Xbox%20Marketplace/{id}/{id}.json";
pub const DEFAULT_MARKETPLACE_URL: &str = "https://gist.githubusercontent.com/shazzaam7/f5d16a46a0c16dd1b926af2ace3b9155/raw/92bc31a447b81907af70963b0ebc8bf21ea8334b/test.json";
pub const DEFAULT_OUTPUT_ROOT: &str = "Artwork";
pub const DEFAULT_MARKETPLACE_ROOT: &str = "Assets/Marketplace";
pub const MAX_RETRIES: u32 = 5;
pub const RETRY_DELAY_SECS: u64 = 5;
pub const ASSET_TIMEOUT_SECS: u64 = 10;
pub const JSON_TIMEOUT_SECS: u64 = 30;

/// Optional on-disk settings. Every field falls back to the environment and
/// then to the built-in default.
#[derive(Debug, Default, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub catalog_url: Option<String>,
    #[serde(default)]
    pub metadata_url_template: Option<String>,
    #[serde(default)]
    pub output_dir: Option<String>,
    #[serde(default)]
    pub marketplace_url: Option<String>,
    #[serde(default)]
    pub marketplace_dir: Option<String>,
    #[serde(default)]
    pub box_art_field: Option<String>,
    #[serde(default)]
    pub icon_field: Option<String>,
    #[serde(default)]
    pub max_retries: Option<u32>,
    #[serde(default)]
    pub retry_delay_secs: Option<u64>,
    #[serde(default)]
    pub accept_invalid_certs: Option<bool>,
}

/// Command-line values that win over everything else.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub catalog_url: Option<String>,
    pub output_dir: Option<String>,
    pub marketplace_url: Option<String>,
    pub marketplace_dir: Option<String>,
    pub box_art_field: Option<String>,
    pub icon_field: Option<String>,
    pub accept_invalid_certs: bool,
}

#[derive(Debug, Clone)]
pub struct ScraperConfig {
    pub catalog_url: Option<String>,
    pub metadata_url_template: String,
    pub output_root: Utf8PathBuf,
    pub marketplace_url: String,
    pub marketplace_root: Utf8PathBuf,
    pub box_art_field: Option<String>,
    pub icon_field: Option<String>,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub asset_timeout: Duration,
    pub json_timeout: Duration,
    /// Skips TLS certificate verification for every request. Off unless asked for.
    pub accept_invalid_certs: bool,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            catalog_url: None,
            metadata_url_template: DEFAULT_METADATA_URL_TEMPLATE.to_string(),
            output_root: Utf8PathBuf::from(DEFAULT_OUTPUT_ROOT),
            marketplace_url: DEFAULT_MARKETPLACE_URL.to_string(),
            marketplace_root: Utf8PathBuf::from(DEFAULT_MARKETPLACE_ROOT),
            box_art_field: None,
            icon_field: None,
            max_retries: MAX_RETRIES,
            retry_delay: Duration::from_secs(RETRY_DELAY_SECS),
            asset_timeout: Duration::from_secs(ASSET_TIMEOUT_SECS),
            json_timeout: Duration::from_secs(JSON_TIMEOUT_SECS),
            accept_invalid_certs: false,
        }
    }
}

impl ScraperConfig {
    pub fn metadata_url(&self, id: &TitleId) -> String {
        self.metadata_url_template.replace("{id}", id.as_str())
    }

    pub fn require_catalog_url(&self) -> Result<&str, ArtworkError> {
        self.catalog_url
            .as_deref()
            .ok_or(ArtworkError::MissingCatalogUrl)
    }

    /// Field names for the marketplace flow. At least one must be set.
    pub fn require_marketplace_fields(
        &self,
    ) -> Result<(Option<&str>, Option<&str>), ArtworkError> {
        let box_art = self.box_art_field.as_deref();
        let icon = self.icon_field.as_deref();
        if box_art.is_none() && icon.is_none() {
            return Err(ArtworkError::MissingAssetFields);
        }
        Ok((box_art, icon))
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(url) = non_empty(overrides.catalog_url) {
            self.catalog_url = Some(url);
        }
        if let Some(dir) = non_empty(overrides.output_dir) {
            self.output_root = Utf8PathBuf::from(dir);
        }
        if let Some(url) = non_empty(overrides.marketplace_url) {
            self.marketplace_url = url;
        }
        if let Some(dir) = non_empty(overrides.marketplace_dir) {
            self.marketplace_root = Utf8PathBuf::from(dir);
        }
        if let Some(field) = non_empty(overrides.box_art_field) {
            self.box_art_field = Some(field);
        }
        if let Some(field) = non_empty(overrides.icon_field) {
            self.icon_field = Some(field);
        }
        if overrides.accept_invalid_certs {
            self.accept_invalid_certs = true;
        }
    }
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads the optional config file and layers the process environment on top.
    pub fn resolve(path: Option<&str>) -> Result<ScraperConfig, ArtworkError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };

        let file = if path.is_some() || config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .map_err(|_| ArtworkError::ConfigRead(config_path.clone()))?;
            serde_json::from_str(&content)
                .map_err(|err| ArtworkError::ConfigParse(err.to_string()))?
        } else {
            ConfigFile::default()
        };

        Self::resolve_config(file, |key| std::env::var(key).ok())
    }

    pub fn resolve_config<F>(file: ConfigFile, env: F) -> Result<ScraperConfig, ArtworkError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| non_empty(env(key));
        let mut config = ScraperConfig::default();

        config.catalog_url = lookup("GAMES_LIST_URL").or(non_empty(file.catalog_url));
        let template = lookup("METADATA_URL_TEMPLATE").or(non_empty(file.metadata_url_template));
        if let Some(template) = template {
            config.metadata_url_template = template;
        }
        if let Some(dir) = lookup("ARTWORK_DIR").or(non_empty(file.output_dir)) {
            config.output_root = Utf8PathBuf::from(dir);
        }
        if let Some(url) = lookup("MARKETPLACE_URL").or(non_empty(file.marketplace_url)) {
            config.marketplace_url = url;
        }
        if let Some(dir) = lookup("MARKETPLACE_DIR").or(non_empty(file.marketplace_dir)) {
            config.marketplace_root = Utf8PathBuf::from(dir);
        }
        config.box_art_field = lookup("BOX_ART_ENV").or(non_empty(file.box_art_field));
        config.icon_field = lookup("ICON_ENV").or(non_empty(file.icon_field));

        let max_retries = match lookup("MAX_RETRIES") {
            Some(value) => parse_setting::<u32>("MAX_RETRIES", &value)?,
            None => file.max_retries.unwrap_or(MAX_RETRIES),
        };
        if max_retries == 0 {
            return Err(ArtworkError::InvalidSetting {
                key: "MAX_RETRIES".to_string(),
                value: "0".to_string(),
            });
        }
        config.max_retries = max_retries;

        let delay_secs = match lookup("RETRY_DELAY") {
            Some(value) => parse_setting::<u64>("RETRY_DELAY", &value)?,
            None => file.retry_delay_secs.unwrap_or(RETRY_DELAY_SECS),
        };
        config.retry_delay = Duration::from_secs(delay_secs);

        config.accept_invalid_certs = match lookup("ARTWORK_ACCEPT_INVALID_CERTS") {
            Some(value) => parse_flag("ARTWORK_ACCEPT_INVALID_CERTS", &value)?,
            None => file.accept_invalid_certs.unwrap_or(false),
        };

        if !config.metadata_url_template.contains("{id}") {
            return Err(ArtworkError::InvalidUrlTemplate(
                config.metadata_url_template,
            ));
        }

        Ok(config)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_setting<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ArtworkError> {
    value.parse().map_err(|_| ArtworkError::InvalidSetting {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ArtworkError> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ArtworkError::InvalidSetting {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}
