//! Drag constraint solver
//!
//! Turns a raw world-space drag delta into the delta the gizmo origin is
//! allowed to move by. Arrow and plane handles (two Center axes) pin the
//! motion to their axis line or plane using the laser directly, so the
//! selection tracks exactly what is under the pointer. Everything else gets
//! the raw delta with the locked axes zeroed out.

use glam::Vec3;
use manip_core::collision::{closest_points_between_segments, segment_plane_intersection};
use manip_core::{Pose, Ray};
use manip_gizmo::{HandleDirection, HandlePlacement};

/// Offsets carried across the frames of one drag.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ConstraintOffsets {
    /// Constrained gizmo-space point recorded on the first drag update
    pub first_update_offset: Vec3,
    /// Last difference between the constrained and the raw gizmo-space delta
    pub delta_from_start_offset: Vec3,
}

impl ConstraintOffsets {
    /// Clears both offsets for a new drag.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// One frame of constraint input.
#[derive(Debug, Clone, Copy)]
pub struct ConstraintInput<'a> {
    /// True on the first update of a drag
    pub is_first_update: bool,
    /// Constrain to the plane normal to the facing axis instead of the axis
    pub on_plane: bool,
    /// Placement of the grabbed handle, if a handle was grabbed
    pub placement: Option<HandlePlacement>,
    /// Raw world-space drag delta since the drag started
    pub drag_delta_from_start: Vec3,
    /// World laser this frame
    pub laser: Option<&'a Ray>,
    /// Gizmo pose when the drag started
    pub gizmo_start: &'a Pose,
    /// Reach of the laser
    pub laser_max_length: f32,
}

/// Result of [`compute_constrained_drag_delta`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConstrainedDrag {
    /// World-space delta the gizmo origin moves by
    pub delta: Vec3,
    /// Point on the laser closest to the constraint, relative to the gizmo
    /// start position and rotated into world space
    pub closest_point_on_laser: Option<Vec3>,
}

/// Constrains a drag delta to the grabbed handle's line or plane.
pub fn compute_constrained_drag_delta(
    input: &ConstraintInput<'_>,
    offsets: &mut ConstraintOffsets,
) -> ConstrainedDrag {
    let gizmo_start = input.gizmo_start.without_scale();
    let raw_gizmo_delta = gizmo_start.inverse_transform_vector_no_scale(input.drag_delta_from_start);

    if let Some(placement) = input.placement
        && let Some(laser) = input.laser.filter(|laser| laser.is_valid())
        && let Some(axis_index) = placement.facing_axis_index()
    {
        let local_laser = laser.to_local_no_scale(&gizmo_start);
        let laser_start = local_laser.origin;
        let laser_end = laser_start + local_laser.direction * input.laser_max_length;

        let mut axis = Vec3::ZERO;
        axis[axis_index] = 1.0;
        if placement.axes[axis_index] == HandleDirection::Negative {
            axis = -axis;
        }

        let (mut constrained, closest_on_laser) = if input.on_plane {
            let point = segment_plane_intersection(laser_start, laser_end, Vec3::ZERO, axis)
                .unwrap_or(Vec3::ZERO);
            (point, point)
        } else {
            let axis_reach = input.laser_max_length * 2.0;
            let (on_laser, on_axis) = closest_points_between_segments(
                laser_start,
                laser_end,
                -axis * axis_reach,
                axis * axis_reach,
            );
            (on_axis, on_laser)
        };

        // Keep the selection under the handle on the first frame rather than
        // jumping it to the pointer
        if input.is_first_update {
            offsets.first_update_offset = constrained;
        }
        constrained -= offsets.first_update_offset;
        offsets.delta_from_start_offset = constrained - raw_gizmo_delta;

        return ConstrainedDrag {
            delta: gizmo_start.transform_vector_no_scale(constrained),
            closest_point_on_laser: Some(gizmo_start.transform_vector_no_scale(closest_on_laser)),
        };
    }

    let mut constrained = raw_gizmo_delta;
    if let Some(placement) = input.placement {
        constrained += offsets.delta_from_start_offset;
        for axis in 0..3 {
            let locked = if input.on_plane {
                placement.axes[axis] != HandleDirection::Center
            } else {
                placement.axes[axis] == HandleDirection::Center
            };
            if locked {
                constrained[axis] = 0.0;
            }
        }
    }

    ConstrainedDrag {
        delta: gizmo_start.transform_vector_no_scale(constrained),
        closest_point_on_laser: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use glam::Quat;
    use manip_gizmo::HandleDirection::*;
    use std::f32::consts::FRAC_PI_2;

    fn input<'a>(
        placement: Option<HandlePlacement>,
        on_plane: bool,
        laser: Option<&'a Ray>,
        gizmo_start: &'a Pose,
        delta: Vec3,
        is_first_update: bool,
    ) -> ConstraintInput<'a> {
        ConstraintInput {
            is_first_update,
            on_plane,
            placement,
            drag_delta_from_start: delta,
            laser,
            gizmo_start,
            laser_max_length: 100.0,
        }
    }

    fn downward_laser(x: f32, y: f32) -> Ray {
        Ray::bounded(Vec3::new(x, y, 5.0), Vec3::NEG_Z, 100.0)
    }

    #[test]
    fn test_axis_constraint_absorbs_first_offset() {
        let gizmo_start = Pose::IDENTITY;
        let placement = Some(HandlePlacement::on_axis(0, Positive));
        let mut offsets = ConstraintOffsets::default();

        let laser = downward_laser(0.6, 0.0);
        let first = compute_constrained_drag_delta(
            &input(placement, false, Some(&laser), &gizmo_start, Vec3::ZERO, true),
            &mut offsets,
        );
        assert_abs_diff_eq!(first.delta.length(), 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(offsets.first_update_offset.x, 0.6, epsilon = 1e-4);

        // Off-axis pointer motion is dropped
        let laser = downward_laser(2.6, 0.7);
        let moved = compute_constrained_drag_delta(
            &input(placement, false, Some(&laser), &gizmo_start, Vec3::new(2.0, 0.7, 0.0), false),
            &mut offsets,
        );
        assert!(moved.delta.abs_diff_eq(Vec3::new(2.0, 0.0, 0.0), 1e-3));
        assert!(moved.closest_point_on_laser.is_some());
    }

    #[test]
    fn test_negative_handle_constrains_same_line() {
        let gizmo_start = Pose::IDENTITY;
        let placement = Some(HandlePlacement::on_axis(0, Negative));
        let mut offsets = ConstraintOffsets::default();

        let laser = downward_laser(-0.6, 0.0);
        compute_constrained_drag_delta(
            &input(placement, false, Some(&laser), &gizmo_start, Vec3::ZERO, true),
            &mut offsets,
        );
        let laser = downward_laser(-1.6, 0.0);
        let moved = compute_constrained_drag_delta(
            &input(placement, false, Some(&laser), &gizmo_start, Vec3::new(-1.0, 0.0, 0.0), false),
            &mut offsets,
        );
        assert!(moved.delta.abs_diff_eq(Vec3::new(-1.0, 0.0, 0.0), 1e-3));
    }

    #[test]
    fn test_plane_constraint_stays_in_plane() {
        let gizmo_start = Pose::IDENTITY;
        // Plane normal to Z
        let placement = Some(HandlePlacement::on_axis(2, Positive));
        let mut offsets = ConstraintOffsets::default();

        let laser = Ray::bounded(Vec3::new(0.0, 0.0, 3.0), Vec3::new(0.3, 0.2, -1.0), 100.0);
        compute_constrained_drag_delta(
            &input(placement, true, Some(&laser), &gizmo_start, Vec3::ZERO, true),
            &mut offsets,
        );
        let laser = Ray::bounded(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.3, 0.2, -1.0), 100.0);
        let moved = compute_constrained_drag_delta(
            &input(placement, true, Some(&laser), &gizmo_start, Vec3::new(1.0, 2.0, 0.0), false),
            &mut offsets,
        );
        assert!(moved.delta.abs_diff_eq(Vec3::new(1.0, 2.0, 0.0), 1e-3));
    }

    #[test]
    fn test_plane_miss_gives_no_delta() {
        let gizmo_start = Pose::IDENTITY;
        let placement = Some(HandlePlacement::on_axis(2, Positive));
        let mut offsets = ConstraintOffsets::default();
        // Parallel to the plane
        let laser = Ray::bounded(Vec3::new(0.0, 0.0, 3.0), Vec3::X, 100.0);
        let result = compute_constrained_drag_delta(
            &input(placement, true, Some(&laser), &gizmo_start, Vec3::new(4.0, 0.0, 0.0), true),
            &mut offsets,
        );
        assert_eq!(result.delta, Vec3::ZERO);
    }

    #[test]
    fn test_without_laser_locks_center_axes() {
        let gizmo_start = Pose::IDENTITY;
        let placement = Some(HandlePlacement::on_axis(1, Positive));
        let mut offsets = ConstraintOffsets::default();
        let result = compute_constrained_drag_delta(
            &input(placement, false, None, &gizmo_start, Vec3::new(1.0, 2.0, 3.0), false),
            &mut offsets,
        );
        assert_eq!(result.delta, Vec3::new(0.0, 2.0, 0.0));
        assert!(result.closest_point_on_laser.is_none());
    }

    #[test]
    fn test_without_laser_plane_locks_facing_axis() {
        let gizmo_start = Pose::IDENTITY;
        let placement = Some(HandlePlacement::on_axis(1, Negative));
        let mut offsets = ConstraintOffsets::default();
        let result = compute_constrained_drag_delta(
            &input(placement, true, None, &gizmo_start, Vec3::new(1.0, 2.0, 3.0), false),
            &mut offsets,
        );
        assert_eq!(result.delta, Vec3::new(1.0, 0.0, 3.0));
    }

    #[test]
    fn test_no_placement_passes_raw_delta() {
        let gizmo_start = Pose::from_rotation_position(Quat::from_rotation_z(FRAC_PI_2), Vec3::ONE);
        let mut offsets = ConstraintOffsets::default();
        let laser = downward_laser(0.0, 0.0);
        let delta = Vec3::new(0.5, -1.0, 2.0);
        let result = compute_constrained_drag_delta(
            &input(None, false, Some(&laser), &gizmo_start, delta, true),
            &mut offsets,
        );
        assert!(result.delta.abs_diff_eq(delta, 1e-5));
    }

    #[test]
    fn test_local_gizmo_constrains_along_rotated_axis() {
        // Gizmo X points along world Y
        let gizmo_start = Pose::from_rotation_position(Quat::from_rotation_z(FRAC_PI_2), Vec3::ZERO);
        let placement = Some(HandlePlacement::on_axis(0, Positive));
        let mut offsets = ConstraintOffsets::default();

        let laser = downward_laser(0.0, 0.5);
        compute_constrained_drag_delta(
            &input(placement, false, Some(&laser), &gizmo_start, Vec3::ZERO, true),
            &mut offsets,
        );
        let laser = downward_laser(0.8, 1.5);
        let moved = compute_constrained_drag_delta(
            &input(placement, false, Some(&laser), &gizmo_start, Vec3::new(0.8, 1.0, 0.0), false),
            &mut offsets,
        );
        assert!(moved.delta.abs_diff_eq(Vec3::new(0.0, 1.0, 0.0), 1e-3));
    }
}
