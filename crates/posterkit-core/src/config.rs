//! Editor configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Tunable constants of the editor.
///
/// Every field has a default, so a configuration file only needs the keys it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Side of the square canvas in logical pixels.
    pub canvas_size: f64,
    /// Grid cell size used by drag snapping.
    pub grid_size: f64,
    /// Distance within which alignment snapping engages.
    pub snap_threshold: f64,
    /// Maximum guides reported per axis.
    pub max_guides_per_axis: usize,
    pub min_zoom: f64,
    pub max_zoom: f64,
    /// Wheel/zoom button factor when zooming in.
    pub zoom_in_factor: f64,
    /// Wheel/zoom button factor when zooming out.
    pub zoom_out_factor: f64,
    /// Offset applied to both axes when duplicating.
    pub duplicate_offset: f64,
    /// Maximum undo depth; unbounded when absent.
    pub history_limit: Option<usize>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_size: 720.0,
            grid_size: 10.0,
            snap_threshold: 5.0,
            max_guides_per_axis: 3,
            min_zoom: 0.25,
            max_zoom: 4.0,
            zoom_in_factor: 1.1,
            zoom_out_factor: 0.9,
            duplicate_offset: 10.0,
            history_limit: None,
        }
    }
}

impl EditorConfig {
    /// Parse and validate a JSON configuration.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid {
                    field,
                    reason: format!("expected a positive number, got {}", value),
                })
            }
        }

        positive("canvas_size", self.canvas_size)?;
        positive("grid_size", self.grid_size)?;
        positive("min_zoom", self.min_zoom)?;
        positive("max_zoom", self.max_zoom)?;
        positive("zoom_in_factor", self.zoom_in_factor)?;
        positive("zoom_out_factor", self.zoom_out_factor)?;
        if !(self.snap_threshold.is_finite() && self.snap_threshold >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "snap_threshold",
                reason: format!("expected a non-negative number, got {}", self.snap_threshold),
            });
        }
        if !self.duplicate_offset.is_finite() {
            return Err(ConfigError::Invalid {
                field: "duplicate_offset",
                reason: "must be finite".to_string(),
            });
        }
        if self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid {
                field: "min_zoom",
                reason: format!("{} exceeds max_zoom {}", self.min_zoom, self.max_zoom),
            });
        }
        if self.zoom_in_factor <= 1.0 {
            return Err(ConfigError::Invalid {
                field: "zoom_in_factor",
                reason: "must be greater than 1".to_string(),
            });
        }
        if self.zoom_out_factor >= 1.0 {
            return Err(ConfigError::Invalid {
                field: "zoom_out_factor",
                reason: "must be less than 1".to_string(),
            });
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::Invalid {
                field: "history_limit",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Center of the canvas on either axis.
    pub fn canvas_center(&self) -> f64 {
        self.canvas_size / 2.0
    }
}
