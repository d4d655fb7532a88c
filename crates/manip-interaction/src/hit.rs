//! Raycast results and the scene raycast seam

use glam::Vec3;
use manip_core::Ray;
use manip_gizmo::HandleId;

/// Host-side identifier of a scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub u64);

/// What a laser hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// A handle of the transform gizmo
    GizmoHandle(HandleId),
    /// A scene object
    Object(ObjectId),
}

/// A single laser hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitResult {
    /// What was hit
    pub target: HitTarget,
    /// World impact point
    pub location: Vec3,
    /// Distance from the laser start
    pub distance: f32,
}

impl HitResult {
    /// Creates a hit at parameter `distance` along `ray`.
    pub fn along(ray: &Ray, target: HitTarget, distance: f32) -> Self {
        Self {
            target,
            location: ray.at(distance),
            distance,
        }
    }

    /// Gizmo handle that was hit, if any.
    pub fn gizmo_handle(&self) -> Option<HandleId> {
        match self.target {
            HitTarget::GizmoHandle(id) => Some(id),
            HitTarget::Object(_) => None,
        }
    }

    /// Scene object that was hit, if any.
    pub fn object(&self) -> Option<ObjectId> {
        match self.target {
            HitTarget::Object(id) => Some(id),
            HitTarget::GizmoHandle(_) => None,
        }
    }
}

/// Scene geometry the interactors can raycast against.
///
/// Gizmo handles are tested separately; implementors only report scene
/// objects.
pub trait SceneRaycaster {
    /// Closest object hit along `ray`, skipping anything in `ignore`.
    fn raycast(&self, ray: &Ray, ignore: &[ObjectId]) -> Option<HitResult>;
}

/// A scene with nothing in it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyScene;

impl SceneRaycaster for EmptyScene {
    fn raycast(&self, _ray: &Ray, _ignore: &[ObjectId]) -> Option<HitResult> {
        None
    }
}
