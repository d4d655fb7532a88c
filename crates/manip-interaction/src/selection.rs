//! Selection collaborator
//!
//! The host owns the selected objects. [`SelectionHost`] is everything the
//! interaction loop needs from it: where to put the gizmo, how big the
//! selection is, and where to send the final pose. [`TransformableSet`] is
//! a ready-made host for callers that keep plain poses.

use manip_core::{BoundingBox, Pose};

use crate::hit::ObjectId;

/// Scene-side owner of the current selection.
pub trait SelectionHost {
    /// Returns true if nothing is selected.
    fn is_empty(&self) -> bool;

    /// Pose the gizmo is anchored to. Scale is ignored.
    fn pivot_pose(&self) -> Pose;

    /// Combined bounds of the selection in the frame of `gizmo_pose`.
    fn local_bounds(&self, gizmo_pose: &Pose) -> BoundingBox;

    /// False when the selection cannot meaningfully rotate or scale.
    fn allow_rotation_and_scale(&self) -> bool {
        true
    }

    /// Objects the laser-impact placement raycast should skip.
    fn ignored_objects(&self) -> Vec<ObjectId> {
        Vec::new()
    }

    /// Called once when a drag begins, before any pose is applied.
    fn begin_drag(&mut self);

    /// Moves the selection so it follows the gizmo from `gizmo_start` to
    /// `gizmo_now`.
    fn apply_gizmo_pose(&mut self, gizmo_start: &Pose, gizmo_now: &Pose);

    /// Called once the selection has come to rest after a drag.
    fn end_drag(&mut self);
}

/// A selected object moved by the gizmo.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformable {
    /// Host id
    pub id: ObjectId,
    /// Current world pose
    pub pose: Pose,
    /// Pose when the current drag started
    pub start_pose: Pose,
    /// Bounds in the object's own frame
    pub local_bounds: BoundingBox,
    /// A point without orientation, such as a mesh vertex
    pub unoriented_point: bool,
}

impl Transformable {
    /// Creates an oriented object.
    pub fn new(id: ObjectId, pose: Pose, local_bounds: BoundingBox) -> Self {
        Self {
            id,
            pose,
            start_pose: pose,
            local_bounds,
            unoriented_point: false,
        }
    }

    /// Creates an unoriented point at `pose`'s position.
    pub fn point(id: ObjectId, pose: Pose) -> Self {
        Self {
            unoriented_point: true,
            ..Self::new(id, pose, BoundingBox::unit_cube(0.0))
        }
    }
}

/// A list of transformables, the last of which anchors the gizmo.
#[derive(Debug, Clone, Default)]
pub struct TransformableSet {
    objects: Vec<Transformable>,
    dragging: bool,
}

impl TransformableSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the selection.
    pub fn set(&mut self, objects: Vec<Transformable>) {
        self.objects = objects;
        self.dragging = false;
    }

    /// Adds an object; it becomes the anchor.
    pub fn push(&mut self, object: Transformable) {
        self.objects.push(object);
    }

    /// Removes every object.
    pub fn clear(&mut self) {
        self.objects.clear();
        self.dragging = false;
    }

    /// Selected objects in selection order.
    pub fn objects(&self) -> &[Transformable] {
        &self.objects
    }

    /// Object with `id`.
    pub fn get(&self, id: ObjectId) -> Option<&Transformable> {
        self.objects.iter().find(|object| object.id == id)
    }

    /// Number of selected objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Returns true if nothing is selected.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Returns true between `begin_drag` and `end_drag`.
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }
}

impl SelectionHost for TransformableSet {
    fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn pivot_pose(&self) -> Pose {
        self.objects
            .last()
            .map(|object| object.pose.without_scale())
            .unwrap_or(Pose::IDENTITY)
    }

    fn local_bounds(&self, gizmo_pose: &Pose) -> BoundingBox {
        self.objects
            .iter()
            .map(|object| object.local_bounds.in_frame_of(&object.pose, gizmo_pose))
            .fold(BoundingBox::empty(), |bounds, next| bounds.union(&next))
    }

    fn allow_rotation_and_scale(&self) -> bool {
        !matches!(self.objects.as_slice(), [only] if only.unoriented_point)
    }

    fn ignored_objects(&self) -> Vec<ObjectId> {
        self.objects.iter().map(|object| object.id).collect()
    }

    fn begin_drag(&mut self) {
        for object in &mut self.objects {
            object.start_pose = object.pose;
        }
        self.dragging = true;
    }

    fn apply_gizmo_pose(&mut self, gizmo_start: &Pose, gizmo_now: &Pose) {
        for object in &mut self.objects {
            object.pose = Pose::rebase(&object.start_pose, gizmo_start, gizmo_now);
        }
    }

    fn end_drag(&mut self) {
        self.dragging = false;
    }
}
