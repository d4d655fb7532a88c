//! Transform gizmo
//!
//! Aggregates one handle group per editing kind around a selection, drives
//! the selection-appear animation, binds grabbed handles to drag operations
//! and answers pick queries.

use glam::Vec3;
use manip_core::collision::{ray_ring_intersection, ray_sphere_intersection};
use manip_core::{BoundingBox, CoordinateSpace, GizmoConfig, Pose, Ray};

use crate::constants::picking;
use crate::drag::DragOperation;
use crate::group::{GizmoType, GroupUpdateContext, HandleGroup, HandleKind};
use crate::handle::{GizmoHandle, HandleId};
use crate::instance::HandleInstance;
use crate::placement::{HandlePlacement, NUM_PLACEMENTS};

/// Per-frame input for [`TransformGizmo::update_gizmo`].
#[derive(Debug, Clone)]
pub struct GizmoUpdateParams<'a> {
    /// Gizmo pose; scale is ignored
    pub pose: Pose,
    /// Selection bounds in gizmo space
    pub local_bounds: BoundingBox,
    /// World position of the viewer
    pub viewer_position: Vec3,
    /// Requested gizmo type
    pub gizmo_type: GizmoType,
    /// Active coordinate space
    pub space: CoordinateSpace,
    /// False while any interactor is dragging
    pub all_handles_visible: bool,
    /// Whether rotation and scale handles may show
    pub allow_rotation_and_scale: bool,
    /// Handle currently being dragged
    pub dragging_handle: Option<HandleId>,
    /// Handles hovered this frame
    pub hovered_handles: &'a [HandleId],
    /// Seconds since the last update
    pub delta_time: f32,
}

/// The handle cluster attached to a selection.
#[derive(Debug, Clone)]
pub struct TransformGizmo {
    groups: Vec<HandleGroup>,
    pose: Pose,
    local_bounds: BoundingBox,
    space: CoordinateSpace,
    gizmo_type: GizmoType,
    appear_elapsed: f32,
    config: GizmoConfig,
}

impl TransformGizmo {
    /// Creates a gizmo with one group per [`HandleKind`].
    pub fn new(config: GizmoConfig) -> Self {
        let groups = HandleKind::ALL
            .into_iter()
            .enumerate()
            .map(|(index, kind)| HandleGroup::new(kind, (index * NUM_PLACEMENTS) as u64))
            .collect();
        Self {
            groups,
            pose: Pose::IDENTITY,
            local_bounds: BoundingBox::unit_cube(1.0),
            space: CoordinateSpace::World,
            gizmo_type: GizmoType::All,
            appear_elapsed: 0.0,
            config,
        }
    }

    /// Restarts the selection-appear animation.
    pub fn on_new_objects_selected(&mut self) {
        tracing::debug!("Gizmo appear animation restarted");
        self.appear_elapsed = 0.0;
    }

    /// Selection-appear progress, eased out, in `0..=1`.
    pub fn animation_alpha(&self) -> f32 {
        let duration = self.config.appear_duration;
        let linear = if duration > 0.0 {
            (self.appear_elapsed / duration).clamp(0.0, 1.0)
        } else {
            1.0
        };
        1.0 - (1.0 - linear).powf(self.config.appear_curve_power)
    }

    /// Advances animations and refreshes every handle.
    pub fn update_gizmo(&mut self, params: &GizmoUpdateParams<'_>) {
        self.pose = params.pose.without_scale();
        self.local_bounds = params.local_bounds;
        self.space = params.space;
        self.gizmo_type = params.gizmo_type;
        self.appear_elapsed += params.delta_time.max(0.0);

        let ctx = GroupUpdateContext {
            gizmo_pose: self.pose,
            local_bounds: self.local_bounds,
            viewer_position: params.viewer_position,
            gizmo_type: params.gizmo_type,
            space: params.space,
            all_handles_visible: params.all_handles_visible,
            allow_rotation_and_scale: params.allow_rotation_and_scale,
            dragging_handle: params.dragging_handle,
            hovered_handles: params.hovered_handles,
            gizmo_scale: self.config.scale,
            animation_alpha: self.animation_alpha(),
            delta_time: params.delta_time,
            config: &self.config,
        };
        for (index, group) in self.groups.iter_mut().enumerate() {
            group.update(index, &ctx);
        }
    }

    /// Drag operation bound to `handle` and the handle's placement as the
    /// user sees it (facing axis flipped toward the viewer).
    pub fn interaction_for(&self, handle: HandleId) -> Option<(DragOperation, HandlePlacement)> {
        let group = self.groups.get(handle.group)?;
        let gizmo_handle = group.handle(handle.slot)?;
        Some((
            DragOperation::new(group.kind().drag_operation_kind()),
            gizmo_handle.effective_placement(),
        ))
    }

    /// Closest pickable handle along `ray` and its ray parameter.
    pub fn hit_test(&self, ray: &Ray) -> Option<(HandleId, f32)> {
        let ring_thickness = picking::RING_THICKNESS * self.config.scale;
        let mut closest: Option<(HandleId, f32)> = None;

        for (group_index, group) in self.groups.iter().enumerate() {
            for (slot, handle) in group.handles() {
                if !handle.collision_enabled {
                    continue;
                }
                let hit = if group.kind() == HandleKind::Rotate {
                    let normal = self.pose.rotation * (handle.local_pose.rotation * Vec3::X);
                    ray_ring_intersection(
                        ray,
                        self.pose.position,
                        normal,
                        handle.pick_radius,
                        ring_thickness,
                    )
                } else {
                    let center = self.pose.transform_point(handle.local_pose.position);
                    ray_sphere_intersection(ray, center, handle.pick_radius)
                };
                if let Some(t) = hit
                    && closest.is_none_or(|(_, best)| t < best)
                {
                    closest = Some((HandleId::new(group_index, slot), t));
                }
            }
        }
        closest
    }

    /// One renderer record per materialised handle.
    pub fn handle_instances(&self) -> Vec<HandleInstance> {
        let gizmo_matrix = self.pose.to_mat4();
        self.groups
            .iter()
            .flat_map(|group| {
                group.handles().map(move |(_, handle)| {
                    HandleInstance::new(
                        gizmo_matrix * handle.local_pose.to_mat4(),
                        handle.color,
                        handle.renderable.0 as u32,
                        handle.visible,
                        group.kind() as u32,
                    )
                })
            })
            .collect()
    }

    /// Index of the group of `kind`.
    pub fn group_index(&self, kind: HandleKind) -> Option<usize> {
        self.groups.iter().position(|group| group.kind() == kind)
    }

    /// Id of the handle of `kind` at `placement`, if the gizmo has one.
    pub fn handle_id(&self, kind: HandleKind, placement: HandlePlacement) -> Option<HandleId> {
        let group = self.group_index(kind)?;
        let slot = placement.index();
        self.groups[group]
            .handle(slot)
            .map(|_| HandleId::new(group, slot))
    }

    /// Handle with `id`.
    pub fn handle(&self, id: HandleId) -> Option<&GizmoHandle> {
        self.groups.get(id.group)?.handle(id.slot)
    }

    /// Returns true if the handle exists and is visible.
    pub fn is_handle_visible(&self, id: HandleId) -> bool {
        self.handle(id).is_some_and(|handle| handle.visible)
    }

    /// Handle groups in creation order.
    pub fn groups(&self) -> &[HandleGroup] {
        &self.groups
    }

    /// Gizmo pose from the last update.
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// Selection bounds in gizmo space from the last update.
    pub fn local_bounds(&self) -> BoundingBox {
        self.local_bounds
    }

    /// Coordinate space from the last update.
    pub fn space(&self) -> CoordinateSpace {
        self.space
    }

    /// Gizmo type from the last update.
    pub fn gizmo_type(&self) -> GizmoType {
        self.gizmo_type
    }

    /// Appearance settings.
    pub fn config(&self) -> &GizmoConfig {
        &self.config
    }

    /// Replaces the appearance settings.
    pub fn set_config(&mut self, config: GizmoConfig) {
        self.config = config;
    }
}
