//! Snapping collaborator
//!
//! The interaction loop never snaps on its own. Each drag frame it hands the
//! unsnapped candidate to a [`Snapper`] and applies whatever comes back.

use glam::{EulerRot, Quat, Vec3};
use manip_core::Pose;

use crate::interactor::InteractorId;

/// One frame's snapping request.
#[derive(Debug, Clone, Copy)]
pub struct SnapRequest {
    /// Interactor doing the drag
    pub interactor: InteractorId,
    /// Candidate gizmo pose
    pub unsnapped: Pose,
    /// False when the drag operation forbids snapping
    pub allow_snap: bool,
    /// The candidate moves the selection
    pub translated: bool,
    /// The candidate rotates the selection
    pub rotated: bool,
    /// The candidate scales the selection
    pub scaled: bool,
}

/// Turns unsnapped candidate poses into applied poses.
pub trait Snapper {
    /// Returns true if any kind of snapping is currently on.
    fn is_snapping_enabled(&self) -> bool;

    /// Pose to apply for `request`.
    fn snap(&mut self, request: &SnapRequest) -> Pose;
}

/// Applies every candidate unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSnap;

impl Snapper for NoSnap {
    fn is_snapping_enabled(&self) -> bool {
        false
    }

    fn snap(&mut self, request: &SnapRequest) -> Pose {
        request.unsnapped
    }
}

/// Grid, angle and scale-step snapping.
///
/// Each step is optional; `None` leaves that component alone.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GridSnapper {
    /// Translation grid size
    pub grid: Option<f32>,
    /// Rotation step in radians, applied per Euler angle
    pub rotation_step: Option<f32>,
    /// Scale step
    pub scale_step: Option<f32>,
}

impl GridSnapper {
    /// Creates a snapper with the given steps.
    pub fn new(grid: Option<f32>, rotation_step: Option<f32>, scale_step: Option<f32>) -> Self {
        Self {
            grid,
            rotation_step,
            scale_step,
        }
    }
}

impl Snapper for GridSnapper {
    fn is_snapping_enabled(&self) -> bool {
        [self.grid, self.rotation_step, self.scale_step]
            .into_iter()
            .flatten()
            .any(|step| step > 0.0)
    }

    fn snap(&mut self, request: &SnapRequest) -> Pose {
        let mut pose = request.unsnapped;
        if !request.allow_snap {
            return pose;
        }
        if request.translated
            && let Some(grid) = positive(self.grid)
        {
            pose.position = snap_vec3(pose.position, grid);
        }
        if request.rotated
            && let Some(step) = positive(self.rotation_step)
        {
            let (x, y, z) = pose.rotation.to_euler(EulerRot::XYZ);
            pose.rotation = Quat::from_euler(
                EulerRot::XYZ,
                snap_value(x, step),
                snap_value(y, step),
                snap_value(z, step),
            )
            .normalize();
        }
        if request.scaled
            && let Some(step) = positive(self.scale_step)
        {
            pose.scale = snap_vec3(pose.scale, step);
        }
        pose
    }
}

fn positive(step: Option<f32>) -> Option<f32> {
    step.filter(|step| *step > 0.0)
}

fn snap_value(value: f32, step: f32) -> f32 {
    (value / step).round() * step
}

fn snap_vec3(value: Vec3, step: f32) -> Vec3 {
    (value / step).round() * step
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_4;

    fn request(unsnapped: Pose) -> SnapRequest {
        SnapRequest {
            interactor: InteractorId(0),
            unsnapped,
            allow_snap: true,
            translated: true,
            rotated: true,
            scaled: true,
        }
    }

    #[test]
    fn test_no_snap_passes_through() {
        let pose = Pose::from_position(Vec3::new(0.13, 2.7, -1.1));
        assert!(!NoSnap.is_snapping_enabled());
        assert_eq!(NoSnap.snap(&request(pose)), pose);
    }

    #[test]
    fn test_grid_snaps_translation() {
        let mut snapper = GridSnapper::new(Some(0.5), None, None);
        assert!(snapper.is_snapping_enabled());
        let snapped = snapper.snap(&request(Pose::from_position(Vec3::new(0.3, 1.1, -0.8))));
        assert!(snapped.position.abs_diff_eq(Vec3::new(0.5, 1.0, -1.0), 1e-6));
    }

    #[test]
    fn test_grid_snaps_rotation() {
        let mut snapper = GridSnapper::new(None, Some(FRAC_PI_4), None);
        let pose = Pose::from_rotation_position(Quat::from_rotation_z(0.7), Vec3::ZERO);
        let snapped = snapper.snap(&request(pose));
        assert!(snapped.rotation.abs_diff_eq(Quat::from_rotation_z(FRAC_PI_4), 1e-5));
    }

    #[test]
    fn test_snap_respects_flags() {
        let mut snapper = GridSnapper::new(Some(1.0), None, Some(0.25));
        let pose = Pose::new(Vec3::splat(0.4), Quat::IDENTITY, Vec3::new(1.1, 1.0, 0.9));

        let mut translate_only = request(pose);
        translate_only.scaled = false;
        let snapped = snapper.snap(&translate_only);
        assert_eq!(snapped.position, Vec3::ZERO);
        assert_eq!(snapped.scale, pose.scale);

        let mut forbidden = request(pose);
        forbidden.allow_snap = false;
        assert_eq!(snapper.snap(&forbidden), pose);
    }

    #[test]
    fn test_zero_steps_disable_snapping() {
        let snapper = GridSnapper::new(Some(0.0), None, None);
        assert!(!snapper.is_snapping_enabled());
    }
}
