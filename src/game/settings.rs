use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::StoreError;

const DATA_DIR_VAR: &str = "MATCHCARDS_DATA_DIR";
const DEBUG_VAR: &str = "MATCHCARDS_DEBUG";
const RENEW_IMAGES_VAR: &str = "MATCHCARDS_RENEW_IMAGES";

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub data_dir: PathBuf,
    pub renew_images: bool,
    pub debug: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        GameSettings {
            data_dir: default_data_dir(),
            renew_images: true,
            debug: false,
        }
    }
}

fn default_data_dir() -> PathBuf {
    match std::env::var("HOME") {
        Ok(home) => PathBuf::from(home).join(".config/matchcards"),
        Err(_) => PathBuf::from(".matchcards"),
    }
}

fn flag_enabled(value: &str) -> bool {
    let v = value.trim().to_ascii_lowercase();
    matches!(v.as_str(), "1" | "true" | "yes" | "on")
}

impl GameSettings {
    pub fn from_env() -> Self {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = GameSettings::default();
        if let Some(dir) = var(DATA_DIR_VAR).filter(|dir| !dir.trim().is_empty()) {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Some(value) = var(DEBUG_VAR) {
            settings.debug = flag_enabled(&value);
        }
        if let Some(value) = var(RENEW_IMAGES_VAR) {
            settings.renew_images = flag_enabled(&value);
        }
        settings
    }

    pub fn load(path: &Path) -> Result<Self, StoreError> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
