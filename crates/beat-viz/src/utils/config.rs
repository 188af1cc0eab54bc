//! Configuration file management.
//!
//! Handles loading and saving user preferences to `~/.beat-viz.toml`.

use beat_viz_core::{BeatConfig, FlashThresholds, PulseConfig, VisualizerConfig, DEFAULT_SPEEDS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const CONFIG_TEMPLATE: &str = r#"# beat-viz configuration file

# Last opened track (auto-saved), reopened when no file is given
# last_file = "/home/me/Music/track.mp3"

# =============================================================================
# Beat detection
# =============================================================================

# beat_threshold = 120.0        # Bass average (0-255) that must be crossed upward
# beat_min_interval = 0.2       # Seconds of playback between two beats

# =============================================================================
# Beat circle pulse
# =============================================================================

# pulse_magnitude = 30.0        # Radius boost in pixels right after a beat
# pulse_decay_per_ms = 0.15     # Boost lost per wall-clock millisecond

# =============================================================================
# Flash
# =============================================================================

# flash_bass_threshold = 170.0
# flash_overall_threshold = 180.0

# Speeds cycled with S
# playback_speeds = [1.0, 1.5, 2.0, 0.5]
"#;

#[derive(Serialize, Deserialize, Default, Debug, PartialEq)]
pub struct Config {
    pub last_file: Option<PathBuf>,

    pub beat_threshold: Option<f32>,
    pub beat_min_interval: Option<f64>,
    pub pulse_magnitude: Option<f32>,
    pub pulse_decay_per_ms: Option<f32>,
    pub flash_bass_threshold: Option<f32>,
    pub flash_overall_threshold: Option<f32>,
    pub playback_speeds: Option<Vec<f64>>,
}

impl Config {
    fn path() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".beat-viz.toml"))
    }

    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Reads `path`, writing the commented template first if it is missing.
    /// Unreadable or malformed files fall back to defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            match fs::write(path, CONFIG_TEMPLATE) {
                Ok(()) => info!(?path, "created config template"),
                Err(err) => warn!(?path, %err, "could not write config template"),
            }
        }

        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) => {
                warn!(?path, %err, "could not read config, using defaults");
                return Self::default();
            }
        };
        match toml::from_str(&content) {
            Ok(config) => config,
            Err(err) => {
                warn!(?path, %err, "malformed config, using defaults");
                Self::default()
            }
        }
    }

    pub fn save(&self) {
        if let Some(path) = Self::path() {
            self.save_to(&path);
        }
    }

    pub fn save_to(&self, path: &Path) {
        match toml::to_string(self) {
            Ok(content) => match fs::write(path, content) {
                Ok(()) => info!(?path, "config saved"),
                Err(err) => warn!(?path, %err, "could not save config"),
            },
            Err(err) => warn!(%err, "could not serialize config"),
        }
    }

    pub fn set_last_file(&mut self, file: &Path) {
        self.last_file = Some(file.to_path_buf());
        self.save();
    }

    pub fn beat_threshold(&self) -> f32 {
        self.beat_threshold.unwrap_or(120.0)
    }
    pub fn beat_min_interval(&self) -> f64 {
        self.beat_min_interval.unwrap_or(0.2)
    }
    pub fn pulse_magnitude(&self) -> f32 {
        self.pulse_magnitude.unwrap_or(30.0)
    }
    pub fn pulse_decay_per_ms(&self) -> f32 {
        self.pulse_decay_per_ms.unwrap_or(0.15)
    }
    pub fn flash_bass_threshold(&self) -> f32 {
        self.flash_bass_threshold.unwrap_or(170.0)
    }
    pub fn flash_overall_threshold(&self) -> f32 {
        self.flash_overall_threshold.unwrap_or(180.0)
    }

    pub fn playback_speeds(&self) -> Vec<f64> {
        self.playback_speeds
            .clone()
            .unwrap_or_else(|| DEFAULT_SPEEDS.to_vec())
    }

    /// Visualizer settings with defaults filled in
    pub fn visualizer_config(&self) -> VisualizerConfig {
        VisualizerConfig {
            beat: BeatConfig {
                threshold: self.beat_threshold(),
                min_interval: self.beat_min_interval(),
            },
            pulse: PulseConfig {
                magnitude: self.pulse_magnitude(),
                decay_per_ms: self.pulse_decay_per_ms(),
                ..PulseConfig::default()
            },
            flash: FlashThresholds {
                bass: self.flash_bass_threshold(),
                overall: self.flash_overall_threshold(),
            },
            speeds: self.playback_speeds(),
        }
    }
}
