//! Configuration persistence for cellsnap settings
//!
//! The editing session never reads storage itself. Hosts load an
//! [`EditorConfig`] once and hand it to the session, then push changes
//! through `EditorSession::update_config`.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::overlap::ConflictConfig;

/// Editor settings persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Master switch for move, resize and create snapping
    pub snap_enabled: bool,
    /// Snap distance in document pixels
    pub snap_threshold: f32,
    /// Multiplier applied to pointer deltas while drag-moving
    pub movement_speed: f32,
    /// Pixels moved per arrow-key nudge
    pub nudge_step: f32,
    /// Minimum width and height of a committed cell (exclusive)
    pub min_cell_size: f32,
    /// How far a dragged cell may drift from its commanded position before resync
    pub drift_tolerance: f32,
    /// Corner grab radius in surface pixels
    pub handle_radius: f32,
    /// Max distance between two edges treated as the same border
    pub border_align_tolerance: f32,
    /// Exact-equality tolerance for borders
    pub border_epsilon: f32,
    /// Number of undo snapshots kept, origin included
    pub history_capacity: usize,
    /// Resize co-selected cells by the same width/height change
    pub linked_resize: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            snap_enabled: true,
            snap_threshold: crate::snap::DEFAULT_THRESHOLD,
            movement_speed: 1.0,
            nudge_step: 1.0,
            min_cell_size: 5.0,
            drift_tolerance: 0.5,
            handle_radius: 8.0,
            border_align_tolerance: 3.0,
            border_epsilon: 0.5,
            history_capacity: crate::session::history::DEFAULT_CAPACITY,
            // Off by default, only the grabbed cell resizes
            linked_resize: false,
        }
    }
}

impl EditorConfig {
    /// Directory name under the platform config dir
    pub const APP_DIR: &'static str = "cellsnap";
    pub const FILE_NAME: &'static str = "config.json";

    /// Default location, `None` when the platform has no config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::APP_DIR).join(Self::FILE_NAME))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::default_path() {
            Some(path) if path.exists() => match Self::load_from(&path) {
                Ok(config) => config,
                Err(err) => {
                    log::warn!("Error loading config, using defaults: {:?}", err);
                    Self::default()
                }
            },
            Some(_) => Self::default(),
            None => {
                log::warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config {}", path.display()))?;
        Ok(config.sanitized())
    }

    /// Save configuration to disk
    pub fn save(&self) {
        let Some(path) = Self::default_path() else {
            log::error!("Could not determine config directory for saving");
            return;
        };
        if let Err(err) = self.save_to(&path) {
            log::error!("Failed to save config: {:?}", err);
        }
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        log::info!("Saved config to {}", path.display());
        Ok(())
    }

    /// Replace out-of-range values with their defaults
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32, fallback: f32, name: &str| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                log::warn!("Invalid {name} {value}, using {fallback}");
                fallback
            }
        };
        let non_negative = |value: f32, fallback: f32, name: &str| {
            if value.is_finite() && value >= 0.0 {
                value
            } else {
                log::warn!("Invalid {name} {value}, using {fallback}");
                fallback
            }
        };

        self.snap_threshold =
            non_negative(self.snap_threshold, defaults.snap_threshold, "snap_threshold");
        self.movement_speed =
            positive(self.movement_speed, defaults.movement_speed, "movement_speed");
        self.nudge_step = positive(self.nudge_step, defaults.nudge_step, "nudge_step");
        self.min_cell_size =
            non_negative(self.min_cell_size, defaults.min_cell_size, "min_cell_size");
        self.drift_tolerance =
            non_negative(self.drift_tolerance, defaults.drift_tolerance, "drift_tolerance");
        self.handle_radius =
            positive(self.handle_radius, defaults.handle_radius, "handle_radius");
        self.border_epsilon =
            non_negative(self.border_epsilon, defaults.border_epsilon, "border_epsilon");
        self.border_align_tolerance = non_negative(
            self.border_align_tolerance,
            defaults.border_align_tolerance,
            "border_align_tolerance",
        );
        if self.history_capacity == 0 {
            log::warn!(
                "history_capacity must be at least 1, using {}",
                defaults.history_capacity
            );
            self.history_capacity = defaults.history_capacity;
        }
        self
    }

    /// Snap distance handed to the snapping engine, 0 when snapping is off
    pub fn effective_snap_threshold(&self) -> f32 {
        if self.snap_enabled {
            self.snap_threshold
        } else {
            0.0
        }
    }

    pub fn conflict_config(&self) -> ConflictConfig {
        ConflictConfig {
            align_tolerance: self.border_align_tolerance,
            epsilon: self.border_epsilon,
        }
    }
}
