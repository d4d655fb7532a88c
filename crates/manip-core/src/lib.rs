//! Manipulation core
//!
//! Value types and ambient services shared by the gizmo and interaction
//! crates.
//!
//! # Module Structure
//!
//! ```text
//! manip-core/
//! ├── pose.rs        # Position + rotation + non-uniform scale
//! ├── ray.rs         # Pointer rays (optionally length-bounded)
//! ├── bounds.rs      # Axis-aligned bounding boxes
//! ├── collision.rs   # Ray/segment intersection helpers
//! ├── color.rs       # Linear RGBA color with HSV blending
//! ├── filter.rs      # One-Euro smoothing filter
//! ├── config.rs      # Serializable interaction configuration
//! └── constants.rs   # Shared tolerances and defaults
//! ```

pub mod bounds;
pub mod collision;
pub mod color;
pub mod config;
pub mod constants;
pub mod filter;
pub mod pose;
pub mod ray;

pub use bounds::BoundingBox;
pub use color::LinearColor;
pub use config::{
    ConfigError, DragConfig, GizmoConfig, HandleColors, InertiaConfig, InteractionConfig,
    SmoothingConfig, SnapConfig,
};
pub use filter::{LowPassFilter, SmoothingFilter};
pub use pose::Pose;
pub use ray::Ray;

/// Coordinate space used by the gizmo, its handles and the drag strategies.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize,
)]
pub enum CoordinateSpace {
    /// Scene-aligned axes
    #[default]
    World,
    /// Selection-aligned axes
    Local,
}

impl CoordinateSpace {
    /// Returns the other space.
    pub fn toggled(self) -> Self {
        match self {
            CoordinateSpace::World => CoordinateSpace::Local,
            CoordinateSpace::Local => CoordinateSpace::World,
        }
    }
}
