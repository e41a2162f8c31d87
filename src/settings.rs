//! Simulation tuning
//!
//! Loaded from a JSON file by the native runner. Any field missing from the
//! file keeps its default.

use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{
    ARRIVAL_TOLERANCE, CHASE_SPEED, DEFAULT_ELASTICITY, LOOK_TIME, MAX_DT, MAX_PATH_LEGS,
    STALK_RADIUS, STALK_SPEED, VISION_RADIUS,
};

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read or write settings: {0}")]
    Io(#[from] io::Error),
    #[error("invalid settings JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Stalker difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "medium" | "med" => Some(Difficulty::Medium),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Patrol radius around the player in cells; tighter is harder
    pub fn stalk_radius(&self) -> usize {
        match self {
            Difficulty::Easy => 20,
            Difficulty::Medium => STALK_RADIUS,
            Difficulty::Hard => 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimSettings {
    // === Physics ===
    /// Largest dt a scene tick integrates
    pub max_dt: f64,
    /// Elasticity of player-vs-wall bounces
    pub default_elasticity: f64,

    // === Stalker ===
    pub vision_radius: f64,
    pub stalk_speed: f64,
    pub chase_speed: f64,
    /// Pause at each patrol leg end (seconds)
    pub look_time: f64,
    /// Patrol sampling radius around the player (cells)
    pub stalk_radius: usize,
    pub max_path_legs: usize,
    /// Distance at which a waypoint counts as reached
    pub arrival_tolerance: f64,

    /// Seeds map generation and patrol shuffles
    pub seed: u64,
}

impl Default for SimSettings {
    fn default() -> Self {
        Self {
            max_dt: MAX_DT,
            default_elasticity: DEFAULT_ELASTICITY,

            vision_radius: VISION_RADIUS,
            stalk_speed: STALK_SPEED,
            chase_speed: CHASE_SPEED,
            look_time: LOOK_TIME,
            stalk_radius: STALK_RADIUS,
            max_path_legs: MAX_PATH_LEGS,
            arrival_tolerance: ARRIVAL_TOLERANCE,

            seed: 0,
        }
    }
}

impl SimSettings {
    /// Defaults with the stalk radius of a difficulty preset
    pub fn from_difficulty(difficulty: Difficulty) -> Self {
        let mut settings = Self::default();
        settings.apply_difficulty(difficulty);
        settings
    }

    pub fn apply_difficulty(&mut self, difficulty: Difficulty) {
        self.stalk_radius = difficulty.stalk_radius();
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Read settings from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => {
                let settings = Self::from_json(&json)?;
                log::info!("Loaded settings from {}", path.display());
                Ok(settings)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(err) => Err(err.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("polyarcade-{}-{}.json", name, std::process::id()))
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = SimSettings::from_json(r#"{ "chase_speed": 90.0, "seed": 7 }"#).unwrap();
        assert_eq!(settings.chase_speed, 90.0);
        assert_eq!(settings.seed, 7);
        assert_eq!(settings.vision_radius, VISION_RADIUS);
        assert_eq!(settings.max_dt, MAX_DT);
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = SimSettings::from_json("{ not json").unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let path = scratch_path("missing");
        let _ = std::fs::remove_file(&path);
        assert_eq!(SimSettings::load(&path).unwrap(), SimSettings::default());
    }

    #[test]
    fn test_save_then_load() {
        let path = scratch_path("saved");
        let mut settings = SimSettings::from_difficulty(Difficulty::Hard);
        settings.look_time = 2.5;
        settings.save(&path).unwrap();

        let loaded = SimSettings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
        assert_eq!(loaded.stalk_radius, 10);
    }

    #[test]
    fn test_difficulty_parsing() {
        assert_eq!(Difficulty::from_str("EASY"), Some(Difficulty::Easy));
        assert_eq!(Difficulty::from_str("med"), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_str("nightmare"), None);
        assert_eq!(Difficulty::default().stalk_radius(), STALK_RADIUS);
        assert_eq!(Difficulty::Hard.as_str(), "Hard");
    }
}
