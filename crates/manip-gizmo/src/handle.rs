//! Individual gizmo handles

use manip_core::{LinearColor, Pose};

use crate::placement::HandlePlacement;

/// Identifies one handle of a gizmo: its group and its placement slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandleId {
    /// Index of the owning group within the gizmo
    pub group: usize,
    /// Placement slot within the group
    pub slot: usize,
}

impl HandleId {
    /// Creates a handle id.
    pub fn new(group: usize, slot: usize) -> Self {
        Self { group, slot }
    }
}

/// Opaque reference to whatever the host renders for a handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderableId(pub u64);

/// One draggable part of a gizmo.
///
/// Handles live for as long as their group; hiding is the only way to take
/// one away.
#[derive(Debug, Clone)]
pub struct GizmoHandle {
    /// Where the handle sits around the pivot
    pub placement: HandlePlacement,
    /// Hover fade, 0 = idle and 1 = fully hovered
    pub hover_alpha: f32,
    /// What the host renders for this handle
    pub renderable: RenderableId,
    /// Shown this frame
    pub visible: bool,
    /// Pickable this frame
    pub collision_enabled: bool,
    /// Pose relative to the gizmo
    pub local_pose: Pose,
    /// Color this frame
    pub color: LinearColor,
    /// True when the handle was turned around to face the viewer
    pub flipped: bool,
    /// Pick sphere radius, or ring radius for rotation handles
    pub pick_radius: f32,
}

impl GizmoHandle {
    /// Creates a hidden, idle handle.
    pub fn new(placement: HandlePlacement, renderable: RenderableId) -> Self {
        Self {
            placement,
            hover_alpha: 0.0,
            renderable,
            visible: false,
            collision_enabled: false,
            local_pose: Pose::IDENTITY,
            color: LinearColor::WHITE,
            flipped: false,
            pick_radius: 0.0,
        }
    }

    /// Advances the hover fade by one frame.
    ///
    /// `hover_duration` is the time to fade fully in or out.
    pub fn update_hover_alpha(&mut self, active: bool, delta_time: f32, hover_duration: f32) {
        self.hover_alpha = step_hover_alpha(self.hover_alpha, active, delta_time, hover_duration);
    }

    /// Placement after the view flip, which is what the user sees.
    pub fn effective_placement(&self) -> HandlePlacement {
        if self.flipped {
            self.placement.with_flipped_facing()
        } else {
            self.placement
        }
    }
}

fn step_hover_alpha(alpha: f32, active: bool, delta_time: f32, hover_duration: f32) -> f32 {
    let step = if hover_duration > 0.0 {
        delta_time.max(0.0) / hover_duration
    } else {
        1.0
    };
    let next = if active { alpha + step } else { alpha - step };
    next.clamp(0.0, 1.0)
}
