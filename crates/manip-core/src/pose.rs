//! Rigid pose with non-uniform scale

use glam::{Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

/// Position, rotation and non-uniform scale.
///
/// Points are transformed scale-first, then rotated, then translated. The
/// `*_no_scale` variants ignore [`Pose::scale`], which is what the drag
/// strategies use when they reason in gizmo space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    /// World-space position
    pub position: Vec3,
    /// Unit rotation
    pub rotation: Quat,
    /// Scale along each local axis
    pub scale: Vec3,
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Pose {
    /// The identity pose.
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// Creates a pose from all three components.
    pub fn new(position: Vec3, rotation: Quat, scale: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Creates an unrotated, unscaled pose at `position`.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Self::IDENTITY
        }
    }

    /// Creates an unscaled pose.
    pub fn from_rotation_position(rotation: Quat, position: Vec3) -> Self {
        Self {
            position,
            rotation,
            scale: Vec3::ONE,
        }
    }

    /// Returns the equivalent affine matrix.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }

    /// Returns a copy with unit scale.
    pub fn without_scale(&self) -> Self {
        Self {
            scale: Vec3::ONE,
            ..*self
        }
    }

    /// Returns a copy with a different position.
    pub fn with_position(&self, position: Vec3) -> Self {
        Self { position, ..*self }
    }

    /// Returns a copy with a different rotation.
    pub fn with_rotation(&self, rotation: Quat) -> Self {
        Self { rotation, ..*self }
    }

    /// Returns a copy with a different scale.
    pub fn with_scale(&self, scale: Vec3) -> Self {
        Self { scale, ..*self }
    }

    /// Transforms a local point into world space.
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * (self.scale * point)
    }

    /// Transforms a world point into local space.
    ///
    /// Axes with zero scale map to zero.
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        let unrotated = self.rotation.inverse() * (point - self.position);
        Vec3::new(
            safe_div(unrotated.x, self.scale.x),
            safe_div(unrotated.y, self.scale.y),
            safe_div(unrotated.z, self.scale.z),
        )
    }

    /// Transforms a world point into local space, ignoring scale.
    pub fn inverse_transform_point_no_scale(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }

    /// Rotates a local direction into world space.
    pub fn transform_vector_no_scale(&self, vector: Vec3) -> Vec3 {
        self.rotation * vector
    }

    /// Rotates a world direction into local space.
    pub fn inverse_transform_vector_no_scale(&self, vector: Vec3) -> Vec3 {
        self.rotation.inverse() * vector
    }

    /// Interpolates between two poses: linear for position and scale,
    /// spherical for rotation.
    pub fn blend(from: &Pose, to: &Pose, alpha: f32) -> Pose {
        Pose {
            position: from.position.lerp(to.position, alpha),
            rotation: from.rotation.slerp(to.rotation, alpha).normalize(),
            scale: from.scale.lerp(to.scale, alpha),
        }
    }

    /// Moves an object that was at `object_start` while the gizmo was at
    /// `gizmo_start` so it keeps its relative placement under `gizmo_now`.
    ///
    /// Composed per component: rotations compose, scales multiply per local
    /// axis and the position goes through both point maps. The object keeps
    /// its own rotation under non-uniform gizmo scale instead of picking up
    /// shear.
    pub fn rebase(object_start: &Pose, gizmo_start: &Pose, gizmo_now: &Pose) -> Pose {
        let relative_position = gizmo_start.inverse_transform_point(object_start.position);
        let scale_ratio = Vec3::new(
            safe_div(gizmo_now.scale.x, gizmo_start.scale.x),
            safe_div(gizmo_now.scale.y, gizmo_start.scale.y),
            safe_div(gizmo_now.scale.z, gizmo_start.scale.z),
        );
        Pose {
            position: gizmo_now.transform_point(relative_position),
            rotation: (gizmo_now.rotation * gizmo_start.rotation.inverse() * object_start.rotation)
                .normalize(),
            scale: object_start.scale * scale_ratio,
        }
    }

    /// Component-wise comparison within `tolerance`. Rotations `q` and `-q`
    /// compare equal.
    pub fn abs_diff_eq(&self, other: &Pose, tolerance: f32) -> bool {
        let same_rotation = self.rotation.abs_diff_eq(other.rotation, tolerance)
            || self.rotation.abs_diff_eq(-other.rotation, tolerance);
        self.position.abs_diff_eq(other.position, tolerance)
            && self.scale.abs_diff_eq(other.scale, tolerance)
            && same_rotation
    }
}

fn safe_div(value: f32, divisor: f32) -> f32 {
    if divisor.abs() <= f32::EPSILON {
        0.0
    } else {
        value / divisor
    }
}
