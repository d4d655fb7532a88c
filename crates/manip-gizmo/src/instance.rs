//! Per-handle records for a renderer

use bytemuck::{Pod, Zeroable};
use glam::Mat4;
use manip_core::LinearColor;

/// One materialised handle, laid out for direct upload as instance data.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct HandleInstance {
    /// World transform, column major
    pub transform: [[f32; 4]; 4],
    /// Linear RGBA color
    pub color: [f32; 4],
    /// Renderable id of the handle
    pub renderable: u32,
    /// 1 if the handle is visible, 0 otherwise
    pub visible: u32,
    /// Index of the handle's kind in [`crate::HandleKind::ALL`]
    pub kind: u32,
    /// Pads the record to a multiple of 16 bytes
    pub _pad: u32,
}

impl HandleInstance {
    /// Creates an instance record.
    pub fn new(
        transform: Mat4,
        color: LinearColor,
        renderable: u32,
        visible: bool,
        kind: u32,
    ) -> Self {
        Self {
            transform: transform.to_cols_array_2d(),
            color: color.to_array(),
            renderable,
            visible: u32::from(visible),
            kind,
            _pad: 0,
        }
    }

    /// Returns true if the handle should be drawn.
    pub fn is_visible(&self) -> bool {
        self.visible != 0
    }
}

impl Default for HandleInstance {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY, LinearColor::WHITE, 0, false, 0)
    }
}
