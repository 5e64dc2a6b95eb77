use std::{
    env, fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::warn;
use multiseek_search::SearchPreferences;

const CONFIG_DIR_ENV: &str = "MULTISEEK_CONFIG_DIR";
const APP_DIR_NAME: &str = "multiseek";
const PREFERENCES_FILE_NAME: &str = "preferences.json";

/// Directory holding the remembered search toggles.
pub fn config_dir() -> Option<PathBuf> {
    if let Ok(dir) = env::var(CONFIG_DIR_ENV)
        && !dir.trim().is_empty()
    {
        return Some(PathBuf::from(dir));
    }

    if let Ok(xdg_config_home) = env::var("XDG_CONFIG_HOME")
        && !xdg_config_home.trim().is_empty()
    {
        return Some(Path::new(&xdg_config_home).join(APP_DIR_NAME));
    }

    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME))
}

/// Reads and writes the preference file. Without a location everything
/// stays in memory.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: Option<PathBuf>,
}

impl PreferenceStore {
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    pub fn default_location() -> Self {
        Self::new(config_dir().map(|dir| dir.join(PREFERENCES_FILE_NAME)))
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Missing or unreadable files fall back to the defaults.
    pub fn load(&self) -> SearchPreferences {
        let Some(path) = &self.path else {
            return SearchPreferences::default();
        };
        if !path.exists() {
            return SearchPreferences::default();
        }

        match Self::read(path) {
            Ok(preferences) => preferences,
            Err(error) => {
                warn!("Ignoring search preferences at {}: {:#}", path.display(), error);
                SearchPreferences::default()
            }
        }
    }

    pub fn save(&self, preferences: &SearchPreferences) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let contents = serde_json::to_string_pretty(preferences)?;
        fs::write(path, contents + "\n")
            .with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }

    fn read(path: &Path) -> Result<SearchPreferences> {
        let contents =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        if contents.trim().is_empty() {
            return Ok(SearchPreferences::default());
        }
        serde_json::from_str(&contents).with_context(|| format!("parsing {}", path.display()))
    }
}
