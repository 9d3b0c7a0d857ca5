use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::i18n::{Lang, Text};

pub const CONFIG_FILE: &str = "site.json";
pub const DEFAULT_PORT: u16 = 8080;
const DEFAULT_GALLERY_DATA: &str = "data/gallery.json";
const DEFAULT_ACHIEVEMENTS_DATA: &str = "data/achievements.json";
const DEFAULT_PLACEHOLDER: &str = "assets/images/common/placeholder.jpg";

/// Optional settings read from `site.json`.
#[derive(Deserialize, Default, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FileConfig {
    pub site_name: Option<Text>,
    pub default_lang: Option<Lang>,
    pub gallery_data: Option<PathBuf>,
    pub achievements_data: Option<PathBuf>,
    pub placeholder_image: Option<String>,
    pub port: Option<u16>,
    pub localhost: Option<bool>,
}

/// Settings given on the command line; they win over the file.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub port: Option<u16>,
    pub localhost: bool,
    pub lang: Option<Lang>,
}

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub root: PathBuf,
    pub site_name: Text,
    pub default_lang: Lang,
    pub gallery_path: PathBuf,
    pub achievements_path: PathBuf,
    pub placeholder_image: String,
    pub port: u16,
    pub localhost: bool,
}

impl SiteConfig {
    pub fn resolve(root: &Path, file: Option<FileConfig>, overrides: &Overrides) -> Self {
        let file = file.unwrap_or_default();
        SiteConfig {
            root: root.to_path_buf(),
            site_name: file
                .site_name
                .unwrap_or_else(|| Text::Plain("Sarberia Pally Seba Samity".to_string())),
            default_lang: overrides.lang.or(file.default_lang).unwrap_or_default(),
            gallery_path: root.join(
                file.gallery_data
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_GALLERY_DATA)),
            ),
            achievements_path: root.join(
                file.achievements_data
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_ACHIEVEMENTS_DATA)),
            ),
            placeholder_image: file
                .placeholder_image
                .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string()),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            localhost: overrides.localhost || file.localhost.unwrap_or(false),
        }
    }

    /// Address the server binds to.
    pub fn bind_addr(&self) -> String {
        let host = if self.localhost { "127.0.0.1" } else { "0.0.0.0" };
        format!("{host}:{}", self.port)
    }
}

/// Explicit path first, then `site.json` in the site root.
pub fn find_config_file(explicit: Option<&Path>, root: &Path) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_owned());
    }
    let candidate = root.join(CONFIG_FILE);
    candidate.exists().then_some(candidate)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

pub fn load_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: FileConfig = serde_json::from_str(&content)?;
    Ok(config)
}
