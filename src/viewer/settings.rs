//! Persistent viewer settings

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::config::SolidShadeMode;
use crate::table::NumberFormat;
use crate::util::Result;

/// Viewer settings that persist between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Camera
    pub camera_speed: f32,
    pub fov_guess: f32,

    // Tables
    pub sync_views: bool,
    pub highlight_vertices: bool,
    pub hex_by_default: bool,
    pub number_format: NumberFormat,

    // Preview
    pub solid_shade: SolidShadeMode,
    pub wireframe: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            camera_speed: 0.05,
            fov_guess: 90.0,
            sync_views: true,
            highlight_vertices: true,
            hex_by_default: false,
            number_format: NumberFormat::default(),
            solid_shade: SolidShadeMode::None,
            wireframe: true,
        }
    }
}

impl Settings {
    /// Get settings file path
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("mesh-inspector");
            p.push("settings.json");
            p
        })
    }

    /// Load settings from the user config dir, falling back to defaults.
    pub fn load() -> Self {
        match Self::path() {
            Some(path) if path.exists() => Self::load_from(&path).unwrap_or_else(|e| {
                warn!("Ignoring settings at {}: {}", path.display(), e);
                Self::default()
            }),
            _ => Self::default(),
        }
    }

    /// Save settings to the user config dir.
    pub fn save(&self) -> Result<()> {
        match Self::path() {
            Some(path) => self.save_to(&path),
            None => {
                debug!("No config dir, settings not saved");
                Ok(())
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut settings: Self = serde_json::from_str(&text)?;
        settings.validate();
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    fn validate(&mut self) {
        if !(self.camera_speed.is_finite() && self.camera_speed > 0.0) {
            self.camera_speed = Self::default().camera_speed;
        }
        if !(self.fov_guess > 0.0 && self.fov_guess < 180.0) {
            self.fov_guess = Self::default().fov_guess;
        }
        // no solid fill means wireframe is the only thing drawn
        if self.solid_shade == SolidShadeMode::None {
            self.wireframe = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");

        let settings = Settings {
            camera_speed: 0.2,
            hex_by_default: true,
            solid_shade: SolidShadeMode::Lit,
            wireframe: false,
            number_format: NumberFormat::fixed(3),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "sync_views": false, "fov_guess": 500.0 }"#).unwrap();

        let s = Settings::load_from(&path).unwrap();
        assert!(!s.sync_views);
        assert_eq!(s.fov_guess, 90.0);
        assert_eq!(s.camera_speed, 0.05);
        assert!(s.wireframe);
    }

    #[test]
    fn test_bad_json_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(Settings::load_from(&path), Err(crate::Error::Json(_))));
        assert!(matches!(
            Settings::load_from(&dir.path().join("missing.json")),
            Err(crate::Error::Io(_))
        ));
    }
}
