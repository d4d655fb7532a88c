//! Interaction configuration structures
//!
//! Tunable settings for smoothing, gizmo appearance, drag response,
//! snapping and release inertia. Every section falls back to its defaults when left out of a
//! configuration file.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::color::LinearColor;

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading or writing the file failed
    #[error("IO error: {0}")]
    Io(String),
    /// Encoding to RON failed
    #[error("Serialization error: {0}")]
    Serialize(String),
    /// Decoding from RON failed
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    /// A value is out of range
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Laser smoothing (One-Euro filter) configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SmoothingConfig {
    /// Whether laser positions are smoothed for interactors that allow it
    pub enabled: bool,
    /// Cutoff frequency at rest (Hz)
    pub min_cutoff: f32,
    /// Cutoff increase per unit of speed
    pub cutoff_slope: f32,
    /// Cutoff used for the speed estimate (Hz)
    pub delta_cutoff: f32,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_cutoff: 0.9,
            cutoff_slope: 0.007,
            delta_cutoff: 1.0,
        }
    }
}

/// Handle colors
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HandleColors {
    /// Color of handles without an axis
    pub default: LinearColor,
    /// Color of the handle being dragged
    pub dragging: LinearColor,
    /// Color hovered handles fade toward
    pub hover: LinearColor,
    /// X-axis color
    pub x_axis: LinearColor,
    /// Y-axis color
    pub y_axis: LinearColor,
    /// Z-axis color
    pub z_axis: LinearColor,
}

impl Default for HandleColors {
    fn default() -> Self {
        Self {
            default: LinearColor::WHITE,
            dragging: LinearColor::YELLOW,
            hover: LinearColor::rgb(1.0, 0.85, 0.3),
            x_axis: LinearColor::rgb(1.0, 0.2, 0.2),
            y_axis: LinearColor::rgb(0.2, 1.0, 0.2),
            z_axis: LinearColor::rgb(0.2, 0.2, 1.0),
        }
    }
}

impl HandleColors {
    /// Returns the color for an axis index (0 = X, 1 = Y, 2 = Z).
    pub fn axis(&self, axis: usize) -> LinearColor {
        match axis {
            0 => self.x_axis,
            1 => self.y_axis,
            2 => self.z_axis,
            _ => self.default,
        }
    }
}

/// Gizmo appearance configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GizmoConfig {
    /// Gizmo scale multiplier
    pub scale: f32,
    /// Handle scale multiplier at full hover
    pub hover_scale: f32,
    /// Seconds for the hover fade to go from 0 to 1
    pub hover_duration: f32,
    /// Seconds for the selection-appear animation
    pub appear_duration: f32,
    /// Exponent of the ease-out curve used by the appear animation
    pub appear_curve_power: f32,
    /// Handle colors
    #[serde(default)]
    pub colors: HandleColors,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            scale: 1.0,
            hover_scale: 1.5,
            hover_duration: 0.1,
            appear_duration: 0.15,
            appear_curve_power: 2.0,
            colors: HandleColors::default(),
        }
    }
}

/// Drag response configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DragConfig {
    /// Scale change per meter dragged along a scale handle
    pub scale_sensitivity: f32,
    /// Scale change per meter dragged on the uniform scale handle
    pub uniform_scale_sensitivity: f32,
    /// Maximum laser reach used for picking and drag constraints
    pub laser_max_length: f32,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            scale_sensitivity: 0.5,
            uniform_scale_sensitivity: 0.5,
            laser_max_length: 100.0,
        }
    }
}

/// Release inertia configuration
///
/// Velocities are in meters per frame, matching how drag motion is sampled.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InertiaConfig {
    /// Keep a freely carried selection moving after release
    pub enabled: bool,
    /// Device motion per frame below which the drag carries no inertia
    pub min_velocity: f32,
    /// Fraction (0..1) of the velocity kept each frame after release
    pub damping: f32,
    /// Speed below which the coasting selection comes to rest
    pub stop_epsilon: f32,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_velocity: 0.01,
            damping: 0.95,
            stop_epsilon: 1.0e-4,
        }
    }
}

/// Snapping presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SnapConfig {
    /// Blend toward snapped poses instead of jumping
    pub smooth: bool,
    /// Blend speed (per second) for smooth snapping
    pub smooth_speed: f32,
    /// Let the snapped target lean toward the unsnapped pose
    pub elastic: bool,
    /// How far (0..1) the elastic target leans toward the unsnapped pose
    pub elastic_strength: f32,
}

impl Default for SnapConfig {
    fn default() -> Self {
        Self {
            smooth: true,
            smooth_speed: 30.0,
            elastic: true,
            elastic_strength: 0.3,
        }
    }
}

/// Complete interaction configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct InteractionConfig {
    /// Smoothing settings
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    /// Gizmo settings
    #[serde(default)]
    pub gizmo: GizmoConfig,
    /// Drag settings
    #[serde(default)]
    pub drag: DragConfig,
    /// Snap settings
    #[serde(default)]
    pub snap: SnapConfig,
    /// Inertia settings
    #[serde(default)]
    pub inertia: InertiaConfig,
}

impl InteractionConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks that every duration, cutoff, sensitivity and length is positive.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("smoothing.min_cutoff", self.smoothing.min_cutoff),
            ("smoothing.delta_cutoff", self.smoothing.delta_cutoff),
            ("gizmo.scale", self.gizmo.scale),
            ("gizmo.hover_scale", self.gizmo.hover_scale),
            ("gizmo.hover_duration", self.gizmo.hover_duration),
            ("gizmo.appear_duration", self.gizmo.appear_duration),
            ("gizmo.appear_curve_power", self.gizmo.appear_curve_power),
            ("drag.scale_sensitivity", self.drag.scale_sensitivity),
            ("drag.uniform_scale_sensitivity", self.drag.uniform_scale_sensitivity),
            ("drag.laser_max_length", self.drag.laser_max_length),
            ("snap.smooth_speed", self.snap.smooth_speed),
            ("inertia.stop_epsilon", self.inertia.stop_epsilon),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, value)| !(*value > 0.0)) {
            return Err(ConfigError::Invalid(format!(
                "{name} must be positive, got {value}"
            )));
        }
        if self.smoothing.cutoff_slope < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "smoothing.cutoff_slope must not be negative, got {}",
                self.smoothing.cutoff_slope
            )));
        }
        if !(0.0..=1.0).contains(&self.snap.elastic_strength) {
            return Err(ConfigError::Invalid(format!(
                "snap.elastic_strength must be within 0..=1, got {}",
                self.snap.elastic_strength
            )));
        }
        if self.inertia.min_velocity < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "inertia.min_velocity must not be negative, got {}",
                self.inertia.min_velocity
            )));
        }
        if !(0.0..1.0).contains(&self.inertia.damping) {
            return Err(ConfigError::Invalid(format!(
                "inertia.damping must be within 0..1, got {}",
                self.inertia.damping
            )));
        }
        Ok(())
    }

    /// Parses a configuration from RON text and validates it.
    pub fn from_ron_str(content: &str) -> Result<Self> {
        let config: InteractionConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration to pretty RON.
    pub fn to_ron_string(&self) -> Result<String> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load configuration from a file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_ron_str(&content)?;
        tracing::info!("Loaded interaction config from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_ron_string()?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(e.to_string()))?;
        tracing::info!("Saved interaction config to {}", path.display());
        Ok(())
    }
}
