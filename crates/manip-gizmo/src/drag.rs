//! Drag operations
//!
//! A drag operation turns one frame of pointer-derived drag input into a
//! candidate gizmo pose. The caller builds a fresh
//! [`DraggingTransformableData`] every frame of an active drag, runs the
//! operation bound to the grabbed handle, then reads back the output
//! fields. Snapping is left to the caller.

use std::f32::consts::{PI, TAU};

use glam::{Quat, Vec3};
use manip_core::constants::KINDA_SMALL_NUMBER;
use manip_core::{BoundingBox, CoordinateSpace, Pose, Ray};

use crate::placement::{HandleDirection, HandlePlacement};

/// Per-frame drag input and output.
#[derive(Debug, Clone)]
pub struct DraggingTransformableData {
    /// Index of the interactor doing the drag
    pub interactor: usize,
    /// Placement of the grabbed handle, after the view flip
    pub placement: HandlePlacement,
    /// Gizmo pose when the drag started
    pub gizmo_start: Pose,
    /// Selection bounds in gizmo space when the drag started
    pub local_bounds_at_start: BoundingBox,
    /// Active coordinate space
    pub space: CoordinateSpace,
    /// World point the gizmo origin is being dragged to
    pub pass_dragged_to: Vec3,
    /// Drag target this frame
    pub dragged_to: Vec3,
    /// Drag target last frame
    pub last_dragged_to: Vec3,
    /// Pointer ray this frame, if the device has a valid pose
    pub laser: Option<Ray>,
    /// Scale change per meter along a scale handle
    pub scale_sensitivity: f32,
    /// Scale change per meter on the uniform scale handle
    pub uniform_scale_sensitivity: f32,

    /// Candidate pose before snapping
    pub out_unsnapped_target: Pose,
    /// Whether the candidate moves the selection
    pub out_translated: bool,
    /// Whether the candidate rotates the selection
    pub out_rotated: bool,
    /// Whether the candidate scales the selection
    pub out_scaled: bool,
    /// Whether the caller may snap the candidate
    pub out_allow_snap: bool,
}

impl DraggingTransformableData {
    /// Creates input for one frame with outputs reset to "no change".
    pub fn new(
        interactor: usize,
        placement: HandlePlacement,
        gizmo_start: Pose,
        local_bounds_at_start: BoundingBox,
        space: CoordinateSpace,
    ) -> Self {
        Self {
            interactor,
            placement,
            gizmo_start,
            local_bounds_at_start,
            space,
            pass_dragged_to: gizmo_start.position,
            dragged_to: gizmo_start.position,
            last_dragged_to: gizmo_start.position,
            laser: None,
            scale_sensitivity: 0.5,
            uniform_scale_sensitivity: 0.5,
            out_unsnapped_target: gizmo_start,
            out_translated: false,
            out_rotated: false,
            out_scaled: false,
            out_allow_snap: true,
        }
    }

    /// Rotation of the frame the drag is measured in.
    pub fn basis_rotation(&self) -> Quat {
        match self.space {
            CoordinateSpace::Local => self.gizmo_start.rotation,
            CoordinateSpace::World => Quat::IDENTITY,
        }
    }

    /// Drag target in the unscaled gizmo-start frame.
    fn local_drag_target(&self) -> Vec3 {
        self.gizmo_start.inverse_transform_point_no_scale(self.pass_dragged_to)
    }
}

/// Kind of drag operation, without any tracking state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DragOperationKind {
    /// Free or axis translation
    Translate,
    /// Translation within a plane
    PlaneTranslate,
    /// Rotation about the facing axis
    RotateOnAngle,
    /// Scale along the facing axis
    Scale,
    /// Scale on all axes
    UniformScale,
    /// Bounding-box resize about the opposite face
    Stretch,
}

/// Angle tracking for rotation drags.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngleTracker {
    started: bool,
    space: CoordinateSpace,
    start_angle: f32,
    last_angle: f32,
    total_angle: f32,
}

impl AngleTracker {
    /// Angle of the very first sample.
    pub fn start_angle(&self) -> f32 {
        self.start_angle
    }

    /// Accumulated rotation since the drag started (radians).
    pub fn total_angle(&self) -> f32 {
        self.total_angle
    }

    /// Feeds a new angle sample measured in `space`.
    ///
    /// A change of space re-anchors without accumulating, since the two
    /// frames measure angles from different zero directions.
    fn track(&mut self, angle: f32, space: CoordinateSpace) {
        if !self.started {
            self.started = true;
            self.space = space;
            self.start_angle = angle;
            self.last_angle = angle;
            return;
        }
        if self.space != space {
            self.space = space;
            self.last_angle = angle;
            return;
        }
        self.total_angle += wrap_angle(angle - self.last_angle);
        self.last_angle = angle;
    }
}

/// A drag operation bound to a handle group.
#[derive(Debug, Clone, PartialEq)]
pub enum DragOperation {
    /// Move the gizmo to the drag target
    Translate,
    /// Move the gizmo to a drag target the caller kept on a plane
    PlaneTranslate,
    /// Rotate about the grabbed handle's facing axis
    RotateOnAngle(AngleTracker),
    /// Scale along the grabbed handle's facing axis
    Scale,
    /// Scale on all three axes
    UniformScale,
    /// Resize the bounding box by its faces
    Stretch,
}

impl DragOperation {
    /// Creates a fresh operation of `kind`.
    pub fn new(kind: DragOperationKind) -> Self {
        match kind {
            DragOperationKind::Translate => DragOperation::Translate,
            DragOperationKind::PlaneTranslate => DragOperation::PlaneTranslate,
            DragOperationKind::RotateOnAngle => {
                DragOperation::RotateOnAngle(AngleTracker::default())
            }
            DragOperationKind::Scale => DragOperation::Scale,
            DragOperationKind::UniformScale => DragOperation::UniformScale,
            DragOperationKind::Stretch => DragOperation::Stretch,
        }
    }

    /// The operation's kind.
    pub fn kind(&self) -> DragOperationKind {
        match self {
            DragOperation::Translate => DragOperationKind::Translate,
            DragOperation::PlaneTranslate => DragOperationKind::PlaneTranslate,
            DragOperation::RotateOnAngle(_) => DragOperationKind::RotateOnAngle,
            DragOperation::Scale => DragOperationKind::Scale,
            DragOperation::UniformScale => DragOperationKind::UniformScale,
            DragOperation::Stretch => DragOperationKind::Stretch,
        }
    }

    /// Whether the caller must keep the drag target on the plane normal to
    /// the facing axis rather than on the axis line.
    pub fn plane_constraint(&self) -> bool {
        matches!(self, DragOperation::PlaneTranslate)
    }

    /// Runs one frame of the operation.
    pub fn execute(&mut self, data: DraggingTransformableData) -> DraggingTransformableData {
        match self {
            DragOperation::Translate | DragOperation::PlaneTranslate => translate(data),
            DragOperation::RotateOnAngle(tracker) => rotate_on_angle(tracker, data),
            DragOperation::Scale => scale(data),
            DragOperation::UniformScale => uniform_scale(data),
            DragOperation::Stretch => stretch(data),
        }
    }
}

fn translate(mut data: DraggingTransformableData) -> DraggingTransformableData {
    data.out_unsnapped_target = data.gizmo_start.with_position(data.pass_dragged_to);
    data.out_translated = true;
    data
}

fn scale(mut data: DraggingTransformableData) -> DraggingTransformableData {
    let Some(axis) = data.placement.facing_axis_index() else {
        tracing::warn!(
            "Scale drag on placement {} without a facing axis",
            data.placement.name()
        );
        return data;
    };

    let mut amount = data.local_drag_target()[axis] * data.scale_sensitivity;
    if data.placement.axes[axis] == HandleDirection::Negative {
        amount = -amount;
    }

    let mut new_scale = data.gizmo_start.scale;
    new_scale[axis] += amount;
    data.out_unsnapped_target = data.gizmo_start.with_scale(new_scale);
    data.out_scaled = true;
    data
}

fn uniform_scale(mut data: DraggingTransformableData) -> DraggingTransformableData {
    let amount = data.local_drag_target().z * data.uniform_scale_sensitivity;
    data.out_unsnapped_target = data
        .gizmo_start
        .with_scale(data.gizmo_start.scale + Vec3::splat(amount));
    data.out_scaled = true;
    data
}

fn rotate_on_angle(
    tracker: &mut AngleTracker,
    mut data: DraggingTransformableData,
) -> DraggingTransformableData {
    let Some(axis) = data.placement.facing_axis_index() else {
        tracing::warn!(
            "Rotate drag on placement {} without a facing axis",
            data.placement.name()
        );
        return data;
    };

    let basis = data.basis_rotation();
    let mut unit = Vec3::ZERO;
    unit[axis] = 1.0;
    let world_axis = basis * unit;

    let hit = data.laser.as_ref().and_then(|laser| {
        let unbounded = Ray::new(laser.origin, laser.direction);
        manip_core::collision::ray_plane_intersection(
            &unbounded,
            data.gizmo_start.position,
            world_axis,
        )
    });

    if let Some(hit) = hit {
        let on_plane = basis.inverse() * (hit - data.gizmo_start.position);
        if on_plane.length_squared() > KINDA_SMALL_NUMBER * KINDA_SMALL_NUMBER {
            let angle = on_plane[(axis + 2) % 3].atan2(on_plane[(axis + 1) % 3]);
            tracker.track(angle, data.space);
        }
    }

    let delta = Quat::from_axis_angle(world_axis, tracker.total_angle());
    data.out_unsnapped_target = data
        .gizmo_start
        .with_rotation((delta * data.gizmo_start.rotation).normalize());
    data.out_rotated = true;
    data
}

fn stretch(mut data: DraggingTransformableData) -> DraggingTransformableData {
    let start = data.gizmo_start;
    let bounds = data.local_bounds_at_start;
    let delta = start.inverse_transform_point(data.pass_dragged_to);

    let mut ratio = Vec3::ONE;
    let mut pivot = Vec3::ZERO;
    for axis in 0..3 {
        let (new_min, new_max) = match data.placement.axes[axis] {
            HandleDirection::Center => continue,
            HandleDirection::Positive => {
                pivot[axis] = bounds.min[axis];
                (bounds.min[axis], bounds.max[axis] + delta[axis])
            }
            HandleDirection::Negative => {
                pivot[axis] = bounds.max[axis];
                (bounds.min[axis] + delta[axis], bounds.max[axis])
            }
        };
        ratio[axis] = if bounds.is_flat_along(axis) {
            0.0
        } else {
            (new_max - new_min) / bounds.axis_size(axis)
        };
    }

    let anchor_shift = start.rotation * (start.scale * pivot * (Vec3::ONE - ratio));
    data.out_unsnapped_target = Pose::new(
        start.position + anchor_shift,
        start.rotation,
        start.scale * ratio,
    );
    data.out_translated = true;
    data.out_scaled = true;
    data.out_allow_snap = false;
    data
}

/// Wraps an angle difference into `(-PI, PI]`.
fn wrap_angle(angle: f32) -> f32 {
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { wrapped + TAU } else { wrapped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use HandleDirection::*;

    fn data(placement: HandlePlacement) -> DraggingTransformableData {
        DraggingTransformableData::new(
            0,
            placement,
            Pose::IDENTITY,
            BoundingBox::unit_cube(1.0),
            CoordinateSpace::World,
        )
    }

    #[test]
    fn test_translate_moves_to_target() {
        let mut input = data(HandlePlacement::on_axis(0, Positive));
        input.pass_dragged_to = Vec3::new(1.5, 0.0, 0.0);
        let out = DragOperation::new(DragOperationKind::Translate).execute(input);
        assert_eq!(out.out_unsnapped_target.position, Vec3::new(1.5, 0.0, 0.0));
        assert!(out.out_translated && !out.out_rotated && !out.out_scaled);
        assert!(out.out_allow_snap);
    }

    #[test]
    fn test_only_plane_translate_is_plane_constrained() {
        assert!(DragOperation::PlaneTranslate.plane_constraint());
        assert!(!DragOperation::Translate.plane_constraint());
        assert!(!DragOperation::Scale.plane_constraint());
    }

    #[test]
    fn test_scale_grows_along_facing_axis() {
        let mut input = data(HandlePlacement::on_axis(0, Positive));
        input.pass_dragged_to = Vec3::new(2.0, 0.0, 0.0);
        let out = DragOperation::Scale.execute(input);
        assert_relative_eq!(out.out_unsnapped_target.scale.x, 2.0, epsilon = 1e-6);
        assert_eq!(out.out_unsnapped_target.scale.y, 1.0);
        assert_eq!(out.out_unsnapped_target.position, Vec3::ZERO);
        assert!(out.out_scaled && !out.out_translated);
    }

    #[test]
    fn test_scale_negative_handle_grows_outward() {
        let mut input = data(HandlePlacement::on_axis(1, Negative));
        input.pass_dragged_to = Vec3::new(0.0, -1.0, 0.0);
        let out = DragOperation::Scale.execute(input);
        assert_relative_eq!(out.out_unsnapped_target.scale.y, 1.5, epsilon = 1e-6);
    }

    #[test]
    fn test_uniform_scale_uses_local_z() {
        let mut input = data(HandlePlacement::on_axis(2, Positive));
        input.pass_dragged_to = Vec3::new(5.0, 5.0, 1.0);
        let out = DragOperation::UniformScale.execute(input);
        assert!(out.out_unsnapped_target.scale.abs_diff_eq(Vec3::splat(1.5), 1e-6));
    }

    #[test]
    fn test_stretch_zero_delta_is_identity() {
        for placement in HandlePlacement::all().filter(HandlePlacement::is_valid) {
            let mut input = data(placement);
            input.gizmo_start =
                Pose::from_rotation_position(Quat::from_rotation_y(0.3), Vec3::ONE);
            input.pass_dragged_to = input.gizmo_start.position;
            let out = DragOperation::Stretch.execute(input.clone());
            assert!(out.out_unsnapped_target.abs_diff_eq(&input.gizmo_start, 1e-5));
            assert!(!out.out_allow_snap);
        }
    }

    #[test]
    fn test_stretch_keeps_opposite_face_fixed() {
        let mut input = data(HandlePlacement::on_axis(0, Positive));
        input.pass_dragged_to = Vec3::new(1.0, 0.0, 0.0);
        let out = DragOperation::Stretch.execute(input);
        let target = out.out_unsnapped_target;
        assert_relative_eq!(target.scale.x, 2.0, epsilon = 1e-6);
        // The -X face at x = -0.5 stays where it was
        let fixed_face = target.transform_point(Vec3::new(-0.5, 0.0, 0.0));
        assert!(fixed_face.abs_diff_eq(Vec3::new(-0.5, 0.0, 0.0), 1e-5));
        let dragged_face = target.transform_point(Vec3::new(0.5, 0.0, 0.0));
        assert!(dragged_face.abs_diff_eq(Vec3::new(1.5, 0.0, 0.0), 1e-5));
    }

    #[test]
    fn test_stretch_negative_corner() {
        let mut input = data(HandlePlacement::new(Negative, Negative, Center));
        input.pass_dragged_to = Vec3::new(-0.5, -1.0, 0.0);
        let target = DragOperation::Stretch.execute(input).out_unsnapped_target;
        assert!(target.scale.abs_diff_eq(Vec3::new(1.5, 2.0, 1.0), 1e-6));
        assert!(target.transform_point(Vec3::splat(0.5)).abs_diff_eq(Vec3::splat(0.5), 1e-5));
    }

    #[test]
    fn test_stretch_flat_axis_ratio_is_zero() {
        let mut input = data(HandlePlacement::on_axis(1, Positive));
        input.local_bounds_at_start =
            BoundingBox::new(Vec3::new(-1.0, 0.0, -1.0), Vec3::new(1.0, 0.0, 1.0));
        input.pass_dragged_to = Vec3::new(0.0, 1.0, 0.0);
        let target = DragOperation::Stretch.execute(input).out_unsnapped_target;
        assert_eq!(target.scale.y, 0.0);
        assert!(target.scale.is_finite() && target.position.is_finite());
    }

    fn laser_at_angle(angle: f32) -> Ray {
        // Straight down onto the XY plane at unit radius
        let point = Vec3::new(angle.cos(), angle.sin(), 0.0);
        Ray::new(point + Vec3::Z * 2.0, Vec3::NEG_Z)
    }

    #[test]
    fn test_rotate_follows_pointer_about_facing_axis() {
        let mut operation = DragOperation::new(DragOperationKind::RotateOnAngle);
        let placement = HandlePlacement::on_axis(2, Positive);

        let mut input = data(placement);
        input.laser = Some(laser_at_angle(0.0));
        let first = operation.execute(input.clone());
        assert!(first.out_unsnapped_target.rotation.abs_diff_eq(Quat::IDENTITY, 1e-6));

        input.laser = Some(laser_at_angle(0.5));
        let out = operation.execute(input);
        let expected = Quat::from_rotation_z(0.5);
        let expected = Pose::from_rotation_position(expected, Vec3::ZERO);
        assert!(out.out_unsnapped_target.abs_diff_eq(&expected, 1e-5));
        assert!(out.out_rotated);
    }

    #[test]
    fn test_rotate_full_revolution_is_continuous() {
        let mut operation = DragOperation::new(DragOperationKind::RotateOnAngle);
        let mut input = data(HandlePlacement::on_axis(2, Positive));
        let steps = 72;
        let step = TAU / steps as f32;
        let mut previous_total = 0.0;
        for i in 0..=steps {
            input.laser = Some(laser_at_angle(2.0 + i as f32 * step));
            operation.execute(input.clone());
            let DragOperation::RotateOnAngle(tracker) = &operation else {
                unreachable!()
            };
            let total = tracker.total_angle();
            assert!(total >= previous_total);
            assert!(total - previous_total <= step + 1e-4);
            previous_total = total;
        }
        assert_relative_eq!(previous_total, TAU, epsilon = 1e-3);
    }

    #[test]
    fn test_rotate_keeps_previous_output_when_ray_misses_plane() {
        let mut operation = DragOperation::new(DragOperationKind::RotateOnAngle);
        let mut input = data(HandlePlacement::on_axis(2, Positive));
        input.laser = Some(laser_at_angle(0.0));
        operation.execute(input.clone());
        input.laser = Some(laser_at_angle(0.3));
        let before = operation.execute(input.clone()).out_unsnapped_target;

        input.laser = Some(Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::X));
        let after = operation.execute(input).out_unsnapped_target;
        assert!(after.abs_diff_eq(&before, 1e-6));
    }

    #[test]
    fn test_rotate_local_space_uses_start_rotation() {
        let mut operation = DragOperation::new(DragOperationKind::RotateOnAngle);
        let start_rotation = Quat::from_rotation_x(std::f32::consts::FRAC_PI_2);
        let mut input = data(HandlePlacement::on_axis(2, Positive));
        input.space = CoordinateSpace::Local;
        input.gizmo_start = Pose::from_rotation_position(start_rotation, Vec3::ZERO);

        // Local Z is world -Y; the rotation plane is world XZ.
        let at = |angle: f32| {
            let local = Vec3::new(angle.cos(), angle.sin(), 0.0);
            let world = start_rotation * local;
            Ray::new(world + Vec3::NEG_Y * 2.0, Vec3::Y)
        };
        input.laser = Some(at(0.0));
        operation.execute(input.clone());
        input.laser = Some(at(0.4));
        let out = operation.execute(input).out_unsnapped_target;
        let expected = Quat::from_axis_angle(start_rotation * Vec3::Z, 0.4) * start_rotation;
        let expected = Pose::from_rotation_position(expected, Vec3::ZERO);
        assert!(out.abs_diff_eq(&expected, 1e-5));
    }

    #[test]
    fn test_wrap_angle() {
        assert_relative_eq!(wrap_angle(0.1), 0.1, epsilon = 1e-6);
        assert_relative_eq!(wrap_angle(TAU - 0.1), -0.1, epsilon = 1e-5);
        assert_relative_eq!(wrap_angle(-TAU + 0.1), 0.1, epsilon = 1e-5);
        assert_relative_eq!(wrap_angle(-PI), PI, epsilon = 1e-5);
    }
}
