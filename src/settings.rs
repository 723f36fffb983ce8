use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::SettingsError;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    pub file_path: String,
    pub svg_path: String,
    pub undo_limit: usize,
    /// Paints each waypoint's touch area.
    pub show_touch_bounds: bool,
    pub grid_size: f32,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            file_path: "diagram.json".to_string(),
            svg_path: "diagram.svg".to_string(),
            undo_limit: 200,
            show_touch_bounds: false,
            grid_size: 64.0,
        }
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "toml")
}

/// First existing settings file: the user config, then the working directory.
pub fn config_path() -> Option<PathBuf> {
    if let Some(home) = std::env::var_os("HOME") {
        let path = PathBuf::from(home).join(".config").join("classlink.toml");
        if path.exists() {
            return Some(path);
        }
    }
    ["settings.toml", "settings.json"]
        .into_iter()
        .map(PathBuf::from)
        .find(|p| p.exists())
}

/// Reads settings in the format the extension names, trying the other one if that fails.
pub fn load_settings(path: impl AsRef<Path>) -> Result<AppSettings, SettingsError> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path)?;
    if is_toml(path) {
        match toml::from_str::<AppSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(e) => serde_json::from_str(&s).map_err(|_| SettingsError::from(e)),
        }
    } else {
        match serde_json::from_str::<AppSettings>(&s) {
            Ok(settings) => Ok(settings),
            Err(e) => toml::from_str(&s).map_err(|_| SettingsError::from(e)),
        }
    }
}

pub fn save_settings(path: impl AsRef<Path>, settings: &AppSettings) -> Result<(), SettingsError> {
    let path = path.as_ref();
    let text = if is_toml(path) {
        toml::to_string_pretty(settings)?
    } else {
        serde_json::to_string_pretty(settings)?
    };
    std::fs::write(path, text)?;
    tracing::info!(path = %path.display(), "settings saved");
    Ok(())
}

/// Settings from the first file [`config_path`] finds, or the defaults.
pub fn load_or_default() -> (AppSettings, PathBuf) {
    let Some(path) = config_path() else {
        return (AppSettings::default(), PathBuf::from("settings.toml"));
    };
    match load_settings(&path) {
        Ok(settings) => (settings, path),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            (AppSettings::default(), path)
        }
    }
}
