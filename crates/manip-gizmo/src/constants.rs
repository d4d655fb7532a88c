//! Gizmo geometry constants
//!
//! Distances are in meters at gizmo scale 1.

/// Handle layout
pub mod layout {
    /// Distance of translate arrows from the pivot
    pub const TRANSLATE_OFFSET: f32 = 0.6;
    /// Distance of plane-translate handles from the pivot
    pub const PLANE_TRANSLATE_OFFSET: f32 = 0.35;
    /// Radius of the rotation rings
    pub const ROTATE_OFFSET: f32 = 0.5;
    /// Distance of scale handles from the pivot
    pub const SCALE_OFFSET: f32 = 0.8;
    /// Height of the uniform scale handle above the pivot
    pub const UNIFORM_SCALE_OFFSET: f32 = 0.0;
    /// Outward offset of stretch handles from the bounding box
    pub const STRETCH_OUTWARD_OFFSET: f32 = 0.01;
    /// Multiplier applied to the offset at the start of the appear animation
    pub const APPEAR_OFFSET_MULTIPLIER: f32 = 10.0;
}

/// Handle picking
pub mod picking {
    /// Pick radius for point-like handles
    pub const HANDLE_RADIUS: f32 = 0.08;
    /// Pick radius for bounding-box stretch handles
    pub const STRETCH_HANDLE_RADIUS: f32 = 0.05;
    /// Half width of the rotation ring pick band
    pub const RING_THICKNESS: f32 = 0.04;
}
