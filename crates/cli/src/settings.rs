//! Last-used paths, remembered between runs.

use std::{
    env,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::io::OutputFile;

pub const SETTINGS_ENV: &str = "LIGAFONT_SETTINGS";
pub const DEFAULT_SETTINGS_FILE: &str = "ligafont-settings.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub last_input: Option<PathBuf>,
    pub last_mapping: Option<PathBuf>,
    pub last_output_dir: Option<PathBuf>,
    /// Directory of the most recently used file.
    pub last_path: Option<PathBuf>,
}

impl Settings {
    /// `--settings`, then `$LIGAFONT_SETTINGS`, then the working directory.
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        explicit
            .map(Path::to_path_buf)
            .or_else(|| env::var_os(SETTINGS_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE))
    }

    /// Loads settings, falling back to defaults when the file is missing or
    /// unreadable.
    pub fn load(path: &Path) -> Self {
        let json = match read_to_string(path) {
            Ok(json) => json,
            Err(e) => {
                debug!("No settings at {}: {e}", path.display());
                return Self::default();
            }
        };
        match serde_json::from_str(&json) {
            Ok(settings) => settings,
            Err(e) => {
                warn!("Ignoring corrupt settings file {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize settings")?;
        OutputFile::new(path).write(json)
    }

    /// Records the paths of a successful build.
    pub fn remember(&mut self, input: &Path, mapping: Option<&Path>, output_dir: &Path) {
        self.last_input = Some(input.to_path_buf());
        if let Some(mapping) = mapping {
            self.last_mapping = Some(mapping.to_path_buf());
        }
        self.last_output_dir = Some(output_dir.to_path_buf());
        self.last_path = input.parent().map(Path::to_path_buf);
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let mut settings = Settings::default();
        settings.remember(Path::new("fonts/icons.ttf"), Some(Path::new("map.json")), dir.path());
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.last_path, Some(PathBuf::from("fonts")));
    }

    #[test]
    fn test_missing_or_corrupt_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load(&path), Settings::default());

        write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        write(&path, r#"{ "last_input": "icons.ttf" }"#).unwrap();

        let loaded = Settings::load(&path);
        assert_eq!(loaded.last_input, Some(PathBuf::from("icons.ttf")));
        assert_eq!(loaded.last_mapping, None);
    }

    #[test]
    fn test_explicit_path_wins() {
        assert_eq!(
            Settings::resolve_path(Some(Path::new("custom.json"))),
            PathBuf::from("custom.json")
        );
    }
}
