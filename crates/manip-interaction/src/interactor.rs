//! Interactors
//!
//! An interactor is one pointing device: a tracked controller or a 2D
//! pointer projected into the scene. It holds the device pose, its laser,
//! hover state and the bookkeeping of whatever drag it is part of. Mode
//! transitions are made by [`crate::WorldInteraction`]; the interactor
//! itself only answers queries.

use std::fmt;

use glam::Vec3;
use manip_core::{BoundingBox, Pose, Ray, SmoothingConfig, SmoothingFilter};
use manip_gizmo::{DragOperation, HandleId, HandlePlacement, TransformGizmo};

use crate::constraint::ConstraintOffsets;
use crate::hit::{HitResult, HitTarget, ObjectId, SceneRaycaster};

/// Index of an interactor in its [`crate::WorldInteraction`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractorId(pub usize);

impl fmt::Display for InteractorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What an interactor is currently dragging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DraggingMode {
    /// Idle
    #[default]
    Nothing,
    /// Selection moved through a grabbed gizmo handle
    TransformablesWithGizmo,
    /// Selection placed where the laser hits the scene
    TransformablesAtLaserImpact,
    /// Helping the paired interactor with its drag
    AssistingDrag,
    /// Selection carried along with the interactor
    TransformablesFreely,
    /// The world itself
    World,
    /// A host interactable
    Interactable,
    /// A material being dropped onto the scene
    Material,
}

impl DraggingMode {
    /// Returns true for the modes that move the selection.
    pub fn is_transforming(self) -> bool {
        matches!(
            self,
            DraggingMode::TransformablesWithGizmo
                | DraggingMode::TransformablesAtLaserImpact
                | DraggingMode::TransformablesFreely
        )
    }
    /// Returns true for the modes whose motion keeps coasting after release.
    pub fn carries_inertia(self) -> bool {
        matches!(
            self,
            DraggingMode::TransformablesAtLaserImpact | DraggingMode::TransformablesFreely
        )
    }
}

/// Kind of pointing device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractorKind {
    /// 6-DOF tracked controller
    MotionController,
    /// 2D pointer projected into the scene
    Mouse,
}

/// Per-interactor drag and hover bookkeeping.
#[derive(Debug, Clone)]
pub struct InteractorData {
    /// World pose this frame, after smoothing
    pub pose: Pose,
    /// World pose last frame
    pub last_pose: Pose,
    /// False when the device reported no usable pose this frame
    pub has_valid_pose: bool,

    /// Mode of the drag in progress
    pub dragging_mode: DraggingMode,
    /// Mode of the most recent drag, kept after release
    pub last_dragging_mode: DraggingMode,
    /// True for the interactor that handed its drag over to its pair
    pub was_assisting_drag: bool,
    /// Set until the first drag update has run
    pub is_first_drag_update: bool,

    /// Handle grabbed for the current drag
    pub dragged_handle: Option<HandleId>,
    /// Operation bound to the grabbed handle
    pub drag_operation: Option<DragOperation>,
    /// Placement of the grabbed handle as the user saw it
    pub handle_placement: Option<HandlePlacement>,

    /// Distance along the laser to the dragged point
    pub drag_ray_length: f32,
    /// World point grabbed when the drag started
    pub impact_location_at_drag_start: Vec3,
    /// Drag target of the previous frame
    pub last_drag_to_location: Vec3,
    /// Drag target motion per frame, carried on as inertia after release
    pub drag_translation_velocity: Vec3,

    /// Gizmo pose when the drag started
    pub gizmo_start: Pose,
    /// Pose last applied to the selection
    pub gizmo_last: Pose,
    /// Snapped pose the selection is heading to
    pub gizmo_target: Pose,
    /// Target before snapping
    pub gizmo_unsnapped_target: Pose,
    /// Selection bounds in gizmo space when the drag started
    pub gizmo_start_local_bounds: BoundingBox,
    /// Grab offsets recorded on the first constrained update
    pub constraint_offsets: ConstraintOffsets,

    /// Gizmo handle under the laser this frame
    pub hovered_handle: Option<HandleId>,
    /// Where the laser hit this frame
    pub hover_location: Option<Vec3>,
}

impl Default for InteractorData {
    fn default() -> Self {
        Self {
            pose: Pose::IDENTITY,
            last_pose: Pose::IDENTITY,
            has_valid_pose: false,
            dragging_mode: DraggingMode::Nothing,
            last_dragging_mode: DraggingMode::Nothing,
            was_assisting_drag: false,
            is_first_drag_update: false,
            dragged_handle: None,
            drag_operation: None,
            handle_placement: None,
            drag_ray_length: 0.0,
            impact_location_at_drag_start: Vec3::ZERO,
            last_drag_to_location: Vec3::ZERO,
            drag_translation_velocity: Vec3::ZERO,
            gizmo_start: Pose::IDENTITY,
            gizmo_last: Pose::IDENTITY,
            gizmo_target: Pose::IDENTITY,
            gizmo_unsnapped_target: Pose::IDENTITY,
            gizmo_start_local_bounds: BoundingBox::empty(),
            constraint_offsets: ConstraintOffsets::default(),
            hovered_handle: None,
            hover_location: None,
        }
    }
}

impl InteractorData {
    /// Clears the drag bookkeeping and puts the gizmo tracking at `gizmo_start`.
    pub fn reset_drag(&mut self, gizmo_start: Pose, local_bounds: BoundingBox) {
        self.is_first_drag_update = true;
        self.was_assisting_drag = false;
        self.drag_translation_velocity = Vec3::ZERO;
        self.gizmo_start = gizmo_start;
        self.gizmo_last = gizmo_start;
        self.gizmo_target = gizmo_start;
        self.gizmo_unsnapped_target = gizmo_start;
        self.gizmo_start_local_bounds = local_bounds;
        self.constraint_offsets.reset();
    }
}

/// One pointing device.
#[derive(Debug, Clone)]
pub struct Interactor {
    id: InteractorId,
    kind: InteractorKind,
    pub(crate) data: InteractorData,
    pub(crate) other: Option<InteractorId>,
    filter: SmoothingFilter,
    smoothing_enabled: bool,
    hit_cache: Option<(u64, Option<HitResult>)>,
}

impl Interactor {
    /// Creates an interactor with no valid pose yet.
    pub fn new(id: InteractorId, kind: InteractorKind, smoothing: &SmoothingConfig) -> Self {
        Self {
            id,
            kind,
            data: InteractorData::default(),
            other: None,
            filter: SmoothingFilter::from_config(smoothing),
            smoothing_enabled: smoothing.enabled,
            hit_cache: None,
        }
    }

    /// Index in the owning world.
    pub fn id(&self) -> InteractorId {
        self.id
    }

    /// Device kind.
    pub fn kind(&self) -> InteractorKind {
        self.kind
    }

    /// Drag and hover bookkeeping.
    pub fn data(&self) -> &InteractorData {
        &self.data
    }

    /// The interactor this one is paired with for two-handed drags.
    pub fn other_interactor(&self) -> Option<InteractorId> {
        self.other
    }

    /// Mode of the drag in progress.
    pub fn dragging_mode(&self) -> DraggingMode {
        self.data.dragging_mode
    }

    /// Whether the laser position goes through the smoothing filter.
    ///
    /// A projected 2D pointer is already stable, so only tracked
    /// controllers are smoothed.
    pub fn allow_laser_smoothing(&self) -> bool {
        self.kind == InteractorKind::MotionController
    }

    /// Feeds this frame's device pose, or `None` when the device has none.
    pub fn set_input(&mut self, pose: Option<Pose>, delta_time: f32) {
        let Some(pose) = pose else {
            if self.data.has_valid_pose {
                tracing::debug!("Interactor {} lost its pose", self.id);
            }
            self.data.has_valid_pose = false;
            self.filter.reset();
            return;
        };

        let position = if self.smoothing_enabled && self.allow_laser_smoothing() {
            self.filter.filter(pose.position, delta_time)
        } else {
            pose.position
        };
        let smoothed = pose.with_position(position);

        self.data.last_pose = if self.data.has_valid_pose {
            self.data.pose
        } else {
            smoothed
        };
        self.data.pose = smoothed;
        self.data.has_valid_pose = true;
    }

    /// Replaces the smoothing parameters.
    pub fn set_smoothing(&mut self, smoothing: &SmoothingConfig) {
        self.filter.set_parameters(
            smoothing.min_cutoff,
            smoothing.cutoff_slope,
            smoothing.delta_cutoff,
        );
        self.smoothing_enabled = smoothing.enabled;
    }

    /// Laser start and end in world space, or `None` without a valid pose.
    ///
    /// The laser points along the device's local +X axis.
    pub fn get_laser_pointer(&self, max_length: f32) -> Option<(Vec3, Vec3)> {
        if !self.data.has_valid_pose {
            return None;
        }
        let start = self.data.pose.position;
        let direction = (self.data.pose.rotation * Vec3::X).normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }
        Some((start, start + direction * max_length))
    }

    /// Laser as a bounded ray.
    pub fn laser_ray(&self, max_length: f32) -> Option<Ray> {
        self.get_laser_pointer(max_length)
            .map(|(start, end)| Ray::bounded(start, end - start, max_length))
    }

    /// Raycasts the laser against the gizmo and the scene.
    ///
    /// The first call in a frame does the work; later calls in the same
    /// frame return the cached result so every system sees the same hit.
    /// With `prefer_gizmo`, a gizmo hit wins over a closer scene hit.
    pub fn get_hit_result_from_laser_pointer(
        &mut self,
        frame: u64,
        gizmo: Option<&TransformGizmo>,
        scene: &dyn SceneRaycaster,
        ignore: &[ObjectId],
        prefer_gizmo: bool,
        max_length: f32,
    ) -> Option<HitResult> {
        if let Some((cached_frame, hit)) = self.hit_cache
            && cached_frame == frame
        {
            return hit;
        }

        let hit = self.laser_ray(max_length).and_then(|ray| {
            let gizmo_hit = gizmo.and_then(|gizmo| gizmo.hit_test(&ray)).map(|(id, distance)| {
                HitResult::along(&ray, HitTarget::GizmoHandle(id), distance)
            });
            let scene_hit = scene.raycast(&ray, ignore);
            match (gizmo_hit, scene_hit) {
                (Some(gizmo_hit), _) if prefer_gizmo => Some(gizmo_hit),
                (Some(gizmo_hit), Some(scene_hit)) => Some(if gizmo_hit.distance <= scene_hit.distance {
                    gizmo_hit
                } else {
                    scene_hit
                }),
                (gizmo_hit, scene_hit) => gizmo_hit.or(scene_hit),
            }
        });

        self.hit_cache = Some((frame, hit));
        hit
    }

    /// Clears the per-frame hover flags.
    pub fn reset_hover_state(&mut self) {
        self.data.hovered_handle = None;
        self.data.hover_location = None;
    }
}
