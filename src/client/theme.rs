//! Light/dark theme preference.
//!
//! [`ThemeSettings`] is created once at startup from a [`PreferenceStore`]
//! and handed to the view; toggling updates it and persists the choice
//! under the `theme` key.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThemeName {
    Light,
    Dark,
}

impl ThemeName {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemeName::Light => "light",
            ThemeName::Dark => "dark",
        }
    }

    /// Stored value to theme; anything but `light` is dark.
    pub fn from_stored(value: &str) -> Self {
        if value == "light" {
            ThemeName::Light
        } else {
            ThemeName::Dark
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemeName::Light => ThemeName::Dark,
            ThemeName::Dark => ThemeName::Light,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub text: &'static str,
    pub primary: &'static str,
    pub secondary: &'static str,
    pub input_background: &'static str,
    pub button_hover: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: ThemeName,
    pub colors: Palette,
}

pub const LIGHT_THEME: Theme = Theme {
    name: ThemeName::Light,
    colors: Palette {
        background: "#E8E9EC",
        text: "#4A5568",
        primary: "#5D7AB9",
        secondary: "#C65F5F",
        input_background: "#F0F1F4",
        button_hover: "rgba(0, 0, 0, 0.08)",
    },
};

pub const DARK_THEME: Theme = Theme {
    name: ThemeName::Dark,
    colors: Palette {
        background: "#141518",
        text: "#B0B8C1",
        primary: "#546DA8",
        secondary: "#B35757",
        input_background: "#1E2124",
        button_hover: "rgba(255, 255, 255, 0.03)",
    },
};

impl Theme {
    pub fn named(name: ThemeName) -> Self {
        match name {
            ThemeName::Light => LIGHT_THEME,
            ThemeName::Dark => DARK_THEME,
        }
    }
}

/// Key/value preference storage.
pub trait PreferenceStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Preferences kept as a flat JSON object in a file.
pub struct FilePreferenceStore {
    path: PathBuf,
}

impl FilePreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(json) if json.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }
}

impl PreferenceStore for FilePreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self.read_all()?;
        values.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&values)?)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryPreferenceStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryPreferenceStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| Error::Generic("preference store lock poisoned".to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| Error::Generic("preference store lock poisoned".to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Current theme plus the store it persists to.
pub struct ThemeSettings<S: PreferenceStore> {
    theme: Theme,
    store: S,
}

impl<S: PreferenceStore> ThemeSettings<S> {
    /// Load the saved theme, defaulting to dark.
    ///
    /// An unreadable store falls back to the default instead of failing startup.
    pub fn load(store: S) -> Self {
        let name = match store.get(THEME_KEY) {
            Ok(Some(saved)) => ThemeName::from_stored(&saved),
            Ok(None) => ThemeName::Dark,
            Err(e) => {
                tracing::warn!("Could not read theme preference: {}. Using dark theme.", e);
                ThemeName::Dark
            }
        };

        Self {
            theme: Theme::named(name),
            store,
        }
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    /// Switch theme and persist the new choice.
    pub fn toggle(&mut self) -> Result<&Theme> {
        let next = Theme::named(self.theme.name.toggled());
        self.store.set(THEME_KEY, next.name.as_str())?;
        self.theme = next;
        Ok(&self.theme)
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_dark() {
        let settings = ThemeSettings::load(MemoryPreferenceStore::new());
        assert_eq!(settings.theme().name, ThemeName::Dark);
        assert_eq!(settings.theme().colors.background, "#141518");
    }

    #[test]
    fn test_loads_saved_light_theme() {
        let store = MemoryPreferenceStore::new();
        store.set(THEME_KEY, "light").unwrap();
        let settings = ThemeSettings::load(store);
        assert_eq!(*settings.theme(), LIGHT_THEME);
    }

    #[test]
    fn test_unknown_saved_value_is_dark() {
        let store = MemoryPreferenceStore::new();
        store.set(THEME_KEY, "sepia").unwrap();
        assert_eq!(ThemeSettings::load(store).theme().name, ThemeName::Dark);
    }

    #[test]
    fn test_toggle_persists_choice() {
        let mut settings = ThemeSettings::load(MemoryPreferenceStore::new());

        assert_eq!(settings.toggle().unwrap().name, ThemeName::Light);
        assert_eq!(
            settings.store().get(THEME_KEY).unwrap().as_deref(),
            Some("light")
        );

        assert_eq!(settings.toggle().unwrap().name, ThemeName::Dark);
        assert_eq!(
            settings.store().get(THEME_KEY).unwrap().as_deref(),
            Some("dark")
        );
    }

    #[test]
    fn test_file_store_round_trips_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs").join("preferences.json");

        let mut settings = ThemeSettings::load(FilePreferenceStore::new(&path));
        settings.toggle().unwrap();

        let reloaded = ThemeSettings::load(FilePreferenceStore::new(&path));
        assert_eq!(reloaded.theme().name, ThemeName::Light);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"theme\": \"light\""));
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FilePreferenceStore::new(dir.path().join("preferences.json"));

        store.set("font", "large").unwrap();
        store.set(THEME_KEY, "light").unwrap();

        assert_eq!(store.get("font").unwrap().as_deref(), Some("large"));
        assert_eq!(store.get("missing").unwrap(), None);
    }

    #[test]
    fn test_corrupt_file_falls_back_to_dark() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();

        let settings = ThemeSettings::load(FilePreferenceStore::new(&path));
        assert_eq!(settings.theme().name, ThemeName::Dark);
    }
}
