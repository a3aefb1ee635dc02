use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::popover::PopoverOptions;

const APP_DIR: &str = "markmenu";
const APP_CONFIG_FILE: &str = "config.json";

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing HOME environment variable")]
    MissingHomeDirectory,
    #[error("failed to read menu config: {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse menu config: {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Settings from `config.json`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub update_delay_ms: u64,
    pub mark_type: String,
    pub href_attribute: String,
    pub popover: PopoverOptions,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            update_delay_ms: 250,
            mark_type: "link".to_string(),
            href_attribute: "href".to_string(),
            popover: PopoverOptions::default(),
        }
    }
}

/// Loads the user's config, falling back to defaults on any failure.
pub fn load_menu_config() -> MenuConfig {
    let (xdg_config_home, home) = config_env_dirs();
    load_menu_config_with(xdg_config_home.as_deref(), home.as_deref())
}

fn load_menu_config_with(xdg_config_home: Option<&Path>, home: Option<&Path>) -> MenuConfig {
    let path = match app_config_path(APP_DIR, APP_CONFIG_FILE, xdg_config_home, home) {
        Ok(path) => path,
        Err(err) => {
            tracing::debug!(%err, "no config directory; using defaults");
            return MenuConfig::default();
        }
    };
    if !path.exists() {
        return MenuConfig::default();
    }
    read_menu_config(&path).unwrap_or_else(|err| {
        tracing::warn!(%err, ?path, "failed to load config.json; using defaults");
        MenuConfig::default()
    })
}

pub fn read_menu_config(path: &Path) -> ConfigResult<MenuConfig> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn config_env_dirs() -> (Option<PathBuf>, Option<PathBuf>) {
    (
        std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from),
        std::env::var_os("HOME").map(PathBuf::from),
    )
}

pub(crate) fn app_config_path(
    app_dir: &str,
    file_name: &str,
    xdg_config_home: Option<&Path>,
    home: Option<&Path>,
) -> ConfigResult<PathBuf> {
    let mut path = config_root(xdg_config_home, home)?;
    path.push(app_dir);
    path.push(file_name);
    Ok(path)
}

fn config_root(xdg_config_home: Option<&Path>, home: Option<&Path>) -> ConfigResult<PathBuf> {
    if let Some(xdg) = xdg_config_home.filter(|path| !path.as_os_str().is_empty()) {
        return Ok(xdg.to_path_buf());
    }

    let home = home.ok_or(ConfigError::MissingHomeDirectory)?;
    Ok(home.join(".config"))
}
