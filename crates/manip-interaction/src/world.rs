//! World interaction
//!
//! The per-frame orchestrator. It owns the interactors and the transform
//! gizmo, turns interactor motion into gizmo poses through the bound drag
//! operations, hands candidates to the snapping collaborator and pushes the
//! result to the selection.
//!
//! A frame is `set_interactor_input` for every device followed by one
//! [`WorldInteraction::tick`], which runs hover, then dragging, then the
//! gizmo refresh. A selection released from a free or laser-impact drag
//! keeps coasting on its last velocity until damping brings it to rest.

use glam::{Quat, Vec3};
use manip_core::constants::{KINDA_SMALL_NUMBER, MAX_SMOOTH_SNAP_STEP};
use manip_core::{CoordinateSpace, InteractionConfig, Pose};
use manip_gizmo::{
    DragOperation, DraggingTransformableData, GizmoType, GizmoUpdateParams, HandleId,
    TransformGizmo,
};

use crate::constraint::{ConstraintInput, compute_constrained_drag_delta};
use crate::error::{InteractionError, Result};
use crate::hit::SceneRaycaster;
use crate::interactor::{DraggingMode, Interactor, InteractorId, InteractorKind};
use crate::selection::SelectionHost;
use crate::snapping::{SnapRequest, Snapper};

/// Host collaborators for one call.
pub struct FrameContext<'a> {
    /// Owner of the selected objects
    pub selection: &'a mut dyn SelectionHost,
    /// Scene geometry for hover and laser-impact placement
    pub scene: &'a dyn SceneRaycaster,
    /// Snapping policy
    pub snapper: &'a mut dyn Snapper,
}

impl<'a> FrameContext<'a> {
    /// Bundles the collaborators.
    pub fn new(
        selection: &'a mut dyn SelectionHost,
        scene: &'a dyn SceneRaycaster,
        snapper: &'a mut dyn Snapper,
    ) -> Self {
        Self {
            selection,
            scene,
            snapper,
        }
    }
}

/// Interactors, the live gizmo and the drag loop that connects them.
pub struct WorldInteraction {
    config: InteractionConfig,
    interactors: Vec<Interactor>,
    gizmo: TransformGizmo,
    gizmo_visible: bool,
    space: CoordinateSpace,
    gizmo_type: GizmoType,
    frame: u64,
    delta_time: f32,
    viewer_position: Vec3,
    new_objects_selected: bool,
    /// True from drag start until the selection comes to rest
    transformables_moving: bool,
    /// Interactor whose released drag is still coasting or smooth-snapping
    /// into place
    settling_interactor: Option<InteractorId>,
    hovered_handles: Vec<HandleId>,
}

impl WorldInteraction {
    /// Creates an orchestrator with no interactors.
    pub fn new(config: InteractionConfig) -> Self {
        let gizmo = TransformGizmo::new(config.gizmo.clone());
        Self {
            config,
            interactors: Vec::new(),
            gizmo,
            gizmo_visible: false,
            space: CoordinateSpace::World,
            gizmo_type: GizmoType::All,
            frame: 0,
            delta_time: 0.0,
            viewer_position: Vec3::ZERO,
            new_objects_selected: false,
            transformables_moving: false,
            settling_interactor: None,
            hovered_handles: Vec::new(),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    /// Replaces the configuration, including every interactor's smoothing.
    pub fn set_config(&mut self, config: InteractionConfig) {
        self.gizmo.set_config(config.gizmo.clone());
        for interactor in &mut self.interactors {
            interactor.set_smoothing(&config.smoothing);
        }
        self.config = config;
    }

    /// The transform gizmo.
    pub fn gizmo(&self) -> &TransformGizmo {
        &self.gizmo
    }

    /// Returns true if the gizmo was shown by the last refresh.
    pub fn is_gizmo_visible(&self) -> bool {
        self.gizmo_visible
    }

    /// Number of completed ticks.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Gizmo handles hovered by any interactor this frame.
    pub fn hovered_handles(&self) -> &[HandleId] {
        &self.hovered_handles
    }

    /// Returns true from drag start until the selection has come to rest.
    pub fn are_transformables_moving(&self) -> bool {
        self.transformables_moving
    }

    /// Registers a new interactor.
    pub fn add_interactor(&mut self, kind: InteractorKind) -> InteractorId {
        let id = InteractorId(self.interactors.len());
        self.interactors
            .push(Interactor::new(id, kind, &self.config.smoothing));
        tracing::info!("Added interactor {} ({:?})", id, kind);
        id
    }

    /// Pairs two interactors for two-handed drags.
    pub fn pair_interactors(&mut self, first: InteractorId, second: InteractorId) -> Result<()> {
        let first_index = self.index(first)?;
        let second_index = self.index(second)?;
        if first_index == second_index {
            return Err(InteractionError::SelfPairing(first.0));
        }
        self.interactors[first_index].other = Some(second);
        self.interactors[second_index].other = Some(first);
        tracing::debug!("Paired interactors {} and {}", first, second);
        Ok(())
    }

    /// Interactor with `id`.
    pub fn interactor(&self, id: InteractorId) -> Result<&Interactor> {
        let index = self.index(id)?;
        Ok(&self.interactors[index])
    }

    /// All interactors in registration order.
    pub fn interactors(&self) -> &[Interactor] {
        &self.interactors
    }

    /// Feeds one device's pose for the coming tick.
    pub fn set_interactor_input(
        &mut self,
        id: InteractorId,
        pose: Option<Pose>,
        delta_time: f32,
    ) -> Result<()> {
        let index = self.index(id)?;
        self.interactors[index].set_input(pose, delta_time);
        Ok(())
    }

    /// Current gizmo and drag coordinate space.
    pub fn coordinate_space(&self) -> CoordinateSpace {
        self.space
    }

    /// Switches the gizmo and drag coordinate space. Active drags continue
    /// in the new space.
    pub fn set_coordinate_space(&mut self, space: CoordinateSpace) {
        if self.space != space {
            tracing::info!("Coordinate space changed to {:?}", space);
            self.space = space;
        }
    }

    /// Toggles between world and local space.
    pub fn cycle_coordinate_space(&mut self) {
        self.set_coordinate_space(self.space.toggled());
    }

    /// Which handle kinds the gizmo shows.
    pub fn gizmo_type(&self) -> GizmoType {
        self.gizmo_type
    }

    /// Selects which handle kinds the gizmo shows.
    pub fn set_gizmo_type(&mut self, gizmo_type: GizmoType) {
        if self.gizmo_type != gizmo_type {
            tracing::debug!("Gizmo type changed to {:?}", gizmo_type);
            self.gizmo_type = gizmo_type;
        }
    }

    /// Restarts the gizmo appear animation on the next refresh.
    pub fn on_selection_changed(&mut self) {
        self.new_objects_selected = true;
    }

    /// Runs one frame: hover, dragging, then the gizmo refresh.
    pub fn tick(&mut self, delta_time: f32, viewer_position: Vec3, ctx: &mut FrameContext<'_>) {
        self.delta_time = delta_time.max(0.0);
        self.viewer_position = viewer_position;

        self.hover_tick(ctx.scene);
        self.interaction_tick(ctx);

        let new_objects_selected = std::mem::take(&mut self.new_objects_selected);
        self.refresh_transform_gizmo(&*ctx.selection, new_objects_selected);

        self.frame += 1;
    }

    /// Resets hover state and raycasts every interactor's laser.
    pub fn hover_tick(&mut self, scene: &dyn SceneRaycaster) {
        self.hovered_handles.clear();
        let gizmo = self.gizmo_visible.then_some(&self.gizmo);
        let max_length = self.config.drag.laser_max_length;

        for interactor in &mut self.interactors {
            interactor.reset_hover_state();
            let Some(hit) = interactor.get_hit_result_from_laser_pointer(
                self.frame,
                gizmo,
                scene,
                &[],
                true,
                max_length,
            ) else {
                continue;
            };

            interactor.data.hover_location = Some(hit.location);
            if let Some(handle) = hit.gizmo_handle() {
                interactor.data.hovered_handle = Some(handle);
                if !self.hovered_handles.contains(&handle) {
                    self.hovered_handles.push(handle);
                }
            }
        }
    }

    /// Advances the active drag and moves the selection.
    pub fn interaction_tick(&mut self, ctx: &mut FrameContext<'_>) {
        if let Some(index) = self
            .interactors
            .iter()
            .position(|interactor| interactor.data.dragging_mode == DraggingMode::AssistingDrag)
        {
            self.update_assisting_drag(index);
        }

        if let Some(index) = self.dragging_index() {
            self.update_dragging(index, ctx);
        }

        // Dragging may have stopped for lack of a laser
        let dragging = self.dragging_index();
        if dragging.is_none()
            && let Some(id) = self.settling_interactor
        {
            self.update_inertia(id.0, ctx);
        }
        self.update_transformables(dragging, ctx);
    }

    /// Starts a drag.
    ///
    /// With `handle` the drag goes through that gizmo handle; without one
    /// the selection is carried freely, or placed at the laser impact when
    /// `at_laser_impact` is set.
    pub fn start_dragging(
        &mut self,
        id: InteractorId,
        handle: Option<HandleId>,
        hit_location: Vec3,
        at_laser_impact: bool,
        ctx: &mut FrameContext<'_>,
    ) -> Result<()> {
        let index = self.index(id)?;
        if let Some(other) = self.dragging_index()
            && other != index
        {
            return Err(InteractionError::AlreadyDragging(id.0, other));
        }
        let max_length = self.config.drag.laser_max_length;
        let laser = self.interactors[index]
            .laser_ray(max_length)
            .ok_or(InteractionError::NoValidPose(id.0))?;

        let binding = match handle {
            Some(handle) => Some(
                self.gizmo
                    .interaction_for(handle)
                    .ok_or(InteractionError::UnknownHandle(handle.group, handle.slot))?,
            ),
            None => None,
        };

        let mode = if at_laser_impact {
            DraggingMode::TransformablesAtLaserImpact
        } else if handle.is_some() {
            DraggingMode::TransformablesWithGizmo
        } else {
            DraggingMode::TransformablesFreely
        };

        // A previous drag still settling into place is finished first
        if self.transformables_moving {
            self.finish_moving_transformables(ctx.selection);
        }

        if let Some(other) = self.interactors[index].other {
            self.interactors[other.0].data.was_assisting_drag = false;
        }

        let gizmo_start = self.gizmo_pivot(&*ctx.selection);
        let local_bounds = ctx.selection.local_bounds(&gizmo_start);

        let data = &mut self.interactors[index].data;
        data.dragging_mode = mode;
        data.last_dragging_mode = mode;
        data.reset_drag(gizmo_start, local_bounds);
        data.drag_ray_length = (hit_location - laser.origin).length();
        data.impact_location_at_drag_start = hit_location;
        data.last_drag_to_location = hit_location;
        data.dragged_handle = handle;
        (data.drag_operation, data.handle_placement) = match binding {
            Some((operation, placement)) => (Some(operation), Some(placement)),
            None => (None, None),
        };

        self.transformables_moving = true;
        self.settling_interactor = None;
        ctx.selection.begin_drag();

        tracing::info!("Interactor {} started dragging ({:?})", id, mode);
        Ok(())
    }

    /// Makes `id` assist its paired interactor's drag.
    ///
    /// Returns false if the paired interactor is not dragging the selection.
    pub fn start_assisting_drag(&mut self, id: InteractorId, hit_location: Vec3) -> Result<bool> {
        let index = self.index(id)?;
        let paired_is_dragging = self.interactors[index]
            .other
            .and_then(|other| self.interactors.get(other.0))
            .is_some_and(|other| other.data.dragging_mode.is_transforming());
        if !paired_is_dragging {
            return Ok(false);
        }

        let max_length = self.config.drag.laser_max_length;
        let laser = self.interactors[index]
            .laser_ray(max_length)
            .ok_or(InteractionError::NoValidPose(id.0))?;

        let data = &mut self.interactors[index].data;
        data.dragging_mode = DraggingMode::AssistingDrag;
        data.last_dragging_mode = DraggingMode::AssistingDrag;
        data.was_assisting_drag = false;
        data.drag_ray_length = (hit_location - laser.origin).length();
        data.impact_location_at_drag_start = hit_location;
        data.last_drag_to_location = hit_location;
        data.drag_translation_velocity = Vec3::ZERO;

        tracing::info!("Interactor {} is assisting a drag", id);
        Ok(true)
    }

    /// Ends whatever `id` is dragging.
    ///
    /// If the paired interactor is assisting, it takes the drag over and
    /// carries on from the selection's current pose.
    pub fn stop_dragging(&mut self, id: InteractorId, ctx: &mut FrameContext<'_>) -> Result<()> {
        let index = self.index(id)?;
        self.stop_dragging_at(index, ctx);
        Ok(())
    }

    /// Re-anchors the gizmo on the selection and refreshes every handle.
    pub fn refresh_transform_gizmo(
        &mut self,
        selection: &dyn SelectionHost,
        new_objects_selected: bool,
    ) {
        if selection.is_empty() {
            if self.gizmo_visible {
                tracing::debug!("Selection is empty, hiding gizmo");
            }
            self.gizmo_visible = false;
            return;
        }
        self.gizmo_visible = true;

        let dragging = self
            .interactors
            .iter()
            .find(|interactor| interactor.data.dragging_mode.is_transforming());
        let all_handles_visible = dragging.is_none();
        let dragging_handle = dragging.and_then(|interactor| interactor.data.dragged_handle);

        let pose = self.gizmo_pivot(selection);
        let local_bounds = selection.local_bounds(&pose);

        if new_objects_selected {
            self.gizmo.on_new_objects_selected();
        }

        let params = GizmoUpdateParams {
            pose,
            local_bounds,
            viewer_position: self.viewer_position,
            gizmo_type: self.gizmo_type,
            space: self.space,
            all_handles_visible,
            allow_rotation_and_scale: selection.allow_rotation_and_scale(),
            dragging_handle,
            hovered_handles: &self.hovered_handles,
            delta_time: self.delta_time,
        };
        self.gizmo.update_gizmo(&params);
    }

    /// Returns true if applied poses blend toward their snapped targets.
    pub fn is_smooth_snapping_enabled(&self, snapper: &dyn Snapper) -> bool {
        snapper.is_snapping_enabled()
            && self.config.snap.smooth
            && self.config.snap.smooth_speed > KINDA_SMALL_NUMBER
    }

    fn index(&self, id: InteractorId) -> Result<usize> {
        if id.0 < self.interactors.len() {
            Ok(id.0)
        } else {
            Err(InteractionError::UnknownInteractor(id.0))
        }
    }

    fn dragging_index(&self) -> Option<usize> {
        self.interactors
            .iter()
            .position(|interactor| interactor.data.dragging_mode.is_transforming())
    }

    /// Gizmo pose for the selection in the active space.
    fn gizmo_pivot(&self, selection: &dyn SelectionHost) -> Pose {
        let mut pose = selection.pivot_pose().without_scale();
        if self.space == CoordinateSpace::World {
            pose.rotation = Quat::IDENTITY;
        }
        pose
    }

    fn update_assisting_drag(&mut self, index: usize) {
        let max_length = self.config.drag.laser_max_length;
        let interactor = &mut self.interactors[index];
        let Some(laser) = interactor.laser_ray(max_length) else {
            tracing::debug!("Interactor {} lost its laser, no longer assisting", interactor.id());
            interactor.data.dragging_mode = DraggingMode::Nothing;
            return;
        };

        let data = &mut interactor.data;
        let dragged_to = laser.at(data.drag_ray_length);
        data.drag_translation_velocity = dragged_to - data.last_drag_to_location;
        data.last_drag_to_location = dragged_to;
        data.hover_location = Some(dragged_to);
    }

    fn update_dragging(&mut self, index: usize, ctx: &mut FrameContext<'_>) {
        let max_length = self.config.drag.laser_max_length;
        let Some(laser) = self.interactors[index].laser_ray(max_length) else {
            tracing::debug!("Interactor {} lost its laser, stopping drag", index);
            self.stop_dragging_at(index, ctx);
            return;
        };

        let space = self.space;
        let smooth_snapping = self.is_smooth_snapping_enabled(&*ctx.snapper);
        let scale_sensitivity = self.config.drag.scale_sensitivity;
        let uniform_scale_sensitivity = self.config.drag.uniform_scale_sensitivity;
        let min_inertia_velocity = self.config.inertia.min_velocity;

        let interactor = &mut self.interactors[index];
        let id = interactor.id();
        let kind = interactor.kind();
        let data = &mut interactor.data;

        let dragged_to = if data.dragging_mode == DraggingMode::TransformablesAtLaserImpact {
            let ignore = ctx.selection.ignored_objects();
            let impact = ctx
                .scene
                .raycast(&laser, &ignore)
                .map(|hit| hit.location)
                .unwrap_or_else(|| laser.at(data.drag_ray_length));
            data.drag_ray_length = (impact - laser.origin).length();
            impact
        } else {
            laser.at(data.drag_ray_length)
        };

        let last_dragged_to = data.last_drag_to_location;
        let drag_delta = dragged_to - last_dragged_to;
        let drag_delta_from_start = dragged_to - data.impact_location_at_drag_start;
        // A hand held nearly still must not fling the selection on release
        let device_motion = match kind {
            InteractorKind::Mouse => drag_delta,
            InteractorKind::MotionController => data.pose.position - data.last_pose.position,
        };
        data.drag_translation_velocity = if data.dragging_mode.carries_inertia()
            && device_motion.length() >= min_inertia_velocity
        {
            drag_delta
        } else {
            Vec3::ZERO
        };
        data.last_drag_to_location = dragged_to;
        data.hover_location = Some(dragged_to);

        let request = match data.dragging_mode {
            DraggingMode::TransformablesWithGizmo => {
                let (Some(operation), Some(placement)) =
                    (data.drag_operation.as_mut(), data.handle_placement)
                else {
                    return;
                };
                let constrained = compute_constrained_drag_delta(
                    &ConstraintInput {
                        is_first_update: data.is_first_drag_update,
                        on_plane: operation.plane_constraint(),
                        placement: Some(placement),
                        drag_delta_from_start,
                        laser: Some(&laser),
                        gizmo_start: &data.gizmo_start,
                        laser_max_length: max_length,
                    },
                    &mut data.constraint_offsets,
                );
                if let Some(closest) = constrained.closest_point_on_laser {
                    data.hover_location = Some(data.gizmo_start.position + closest);
                }

                let mut drag = DraggingTransformableData::new(
                    id.0,
                    placement,
                    data.gizmo_start,
                    data.gizmo_start_local_bounds,
                    space,
                );
                drag.pass_dragged_to = data.gizmo_start.position + constrained.delta;
                drag.dragged_to = dragged_to;
                drag.last_dragged_to = last_dragged_to;
                drag.laser = Some(laser);
                drag.scale_sensitivity = scale_sensitivity;
                drag.uniform_scale_sensitivity = uniform_scale_sensitivity;

                let drag = operation.execute(drag);
                SnapRequest {
                    interactor: id,
                    unsnapped: drag.out_unsnapped_target,
                    allow_snap: drag.out_allow_snap,
                    translated: drag.out_translated,
                    rotated: drag.out_rotated,
                    scaled: drag.out_scaled,
                }
            }
            DraggingMode::TransformablesAtLaserImpact => {
                let constrained = compute_constrained_drag_delta(
                    &ConstraintInput {
                        is_first_update: data.is_first_drag_update,
                        on_plane: false,
                        placement: None,
                        drag_delta_from_start,
                        laser: Some(&laser),
                        gizmo_start: &data.gizmo_start,
                        laser_max_length: max_length,
                    },
                    &mut data.constraint_offsets,
                );
                translation_request(
                    id,
                    data.gizmo_start
                        .with_position(data.gizmo_start.position + constrained.delta),
                )
            }
            DraggingMode::TransformablesFreely => {
                let unsnapped = data.gizmo_unsnapped_target;
                translation_request(id, unsnapped.with_position(unsnapped.position + drag_delta))
            }
            _ => return,
        };

        data.gizmo_unsnapped_target = request.unsnapped;
        data.gizmo_target = if request.allow_snap {
            ctx.snapper.snap(&request)
        } else {
            request.unsnapped
        };

        if !smooth_snapping {
            data.gizmo_last = data.gizmo_target;
            ctx.selection
                .apply_gizmo_pose(&data.gizmo_start, &data.gizmo_last);
        }
        data.is_first_drag_update = false;

        tracing::trace!(
            "Interactor {} drag target {:?}",
            id,
            data.gizmo_target.position
        );
    }

    /// Smooth and elastic snapping, and detecting when the selection has
    /// come to rest.
    fn update_transformables(&mut self, dragging: Option<usize>, ctx: &mut FrameContext<'_>) {
        if !self.transformables_moving {
            return;
        }
        let coasting = dragging.is_none()
            && self.settling_interactor.is_some_and(|id| {
                self.interactors[id.0].data.drag_translation_velocity != Vec3::ZERO
            });
        if !self.is_smooth_snapping_enabled(&*ctx.snapper) {
            if dragging.is_none() && !coasting {
                self.finish_moving_transformables(ctx.selection);
            }
            return;
        }

        let Some(index) = dragging.or(self.settling_interactor.map(|id| id.0)) else {
            self.finish_moving_transformables(ctx.selection);
            return;
        };

        let snap = &self.config.snap;
        let step = self.delta_time.min(MAX_SMOOTH_SNAP_STEP);
        let data = &mut self.interactors[index].data;

        let mut target = data.gizmo_target;
        if snap.elastic && dragging.is_some() {
            // Reach toward the unsnapped pose so small drags stay visible
            target = Pose::blend(&target, &data.gizmo_unsnapped_target, snap.elastic_strength);
        }

        let mut still_snapping = false;
        if target != data.gizmo_last {
            if target.abs_diff_eq(&data.gizmo_last, KINDA_SMALL_NUMBER) {
                data.gizmo_last = target;
            } else {
                still_snapping = true;
                let alpha = (snap.smooth_speed * step).min(1.0);
                data.gizmo_last = Pose::blend(&data.gizmo_last, &target, alpha);
            }
        }
        ctx.selection
            .apply_gizmo_pose(&data.gizmo_start, &data.gizmo_last);

        if dragging.is_none() && !still_snapping && !coasting {
            self.finish_moving_transformables(ctx.selection);
        }
    }

    /// Keeps a released selection moving with its last drag velocity,
    /// damped every frame until it drops below the stop threshold.
    fn update_inertia(&mut self, index: usize, ctx: &mut FrameContext<'_>) {
        let smooth_snapping = self.is_smooth_snapping_enabled(&*ctx.snapper);
        let damping = self.config.inertia.damping;
        let stop_epsilon = self.config.inertia.stop_epsilon;

        let interactor = &mut self.interactors[index];
        let id = interactor.id();
        let data = &mut interactor.data;
        let velocity = data.drag_translation_velocity;
        if velocity == Vec3::ZERO {
            return;
        }

        data.last_drag_to_location += velocity;
        let unsnapped = data.gizmo_unsnapped_target;
        let request = translation_request(id, unsnapped.with_position(unsnapped.position + velocity));
        data.gizmo_unsnapped_target = request.unsnapped;
        data.gizmo_target = ctx.snapper.snap(&request);
        if !smooth_snapping {
            data.gizmo_last = data.gizmo_target;
            ctx.selection
                .apply_gizmo_pose(&data.gizmo_start, &data.gizmo_last);
        }

        let damped = velocity * damping;
        data.drag_translation_velocity = if damped.length() <= stop_epsilon {
            tracing::debug!("Interactor {} inertia came to rest", id);
            Vec3::ZERO
        } else {
            damped
        };
    }

    fn stop_dragging_at(&mut self, index: usize, ctx: &mut FrameContext<'_>) {
        let mode = self.interactors[index].data.dragging_mode;
        if mode == DraggingMode::Nothing {
            return;
        }
        let id = self.interactors[index].id();

        let assisting = self.interactors[index]
            .other
            .map(|other| other.0)
            .filter(|&other| {
                self.interactors
                    .get(other)
                    .is_some_and(|other| other.data.dragging_mode == DraggingMode::AssistingDrag)
            });

        if let Some(other_index) = assisting
            && mode.is_transforming()
        {
            self.hand_over_drag(index, other_index, ctx);
        } else if mode.is_transforming() {
            let data = &mut self.interactors[index].data;
            data.drag_operation = None;
            data.handle_placement = None;

            let coasting = self.config.inertia.enabled
                && mode.carries_inertia()
                && data.drag_translation_velocity != Vec3::ZERO;
            if coasting {
                tracing::debug!(
                    "Interactor {} released with inertia {:?}",
                    id,
                    data.drag_translation_velocity
                );
            } else {
                data.drag_translation_velocity = Vec3::ZERO;
            }

            if coasting || self.is_smooth_snapping_enabled(&*ctx.snapper) {
                self.settling_interactor = Some(id);
            } else {
                self.finish_moving_transformables(ctx.selection);
            }
            tracing::info!("Interactor {} stopped dragging", id);
        }

        let data = &mut self.interactors[index].data;
        data.dragging_mode = DraggingMode::Nothing;
        data.dragged_handle = None;
    }

    /// Gives the drag of `from` to the assisting interactor `to`.
    ///
    /// The selection is re-anchored at its current pose so the new drag
    /// continues without a jump.
    fn hand_over_drag(&mut self, from: usize, to: usize, ctx: &mut FrameContext<'_>) {
        let source = &mut self.interactors[from].data;
        let mode = source.dragging_mode;
        let handle = source.dragged_handle;
        let placement = source.handle_placement.take();
        let operation = source
            .drag_operation
            .take()
            .map(|operation| DragOperation::new(operation.kind()));
        let gizmo_now = source.gizmo_last;
        let local_bounds = source.gizmo_start_local_bounds;
        source.was_assisting_drag = true;
        source.drag_translation_velocity = Vec3::ZERO;

        ctx.selection.begin_drag();

        let target = &mut self.interactors[to].data;
        target.dragging_mode = mode;
        target.last_dragging_mode = mode;
        target.reset_drag(gizmo_now, local_bounds);
        target.impact_location_at_drag_start = target.last_drag_to_location;
        target.dragged_handle = handle;
        target.handle_placement = placement;
        target.drag_operation = operation;

        tracing::info!(
            "Interactor {} took over the drag from interactor {}",
            self.interactors[to].id(),
            self.interactors[from].id()
        );
    }

    fn finish_moving_transformables(&mut self, selection: &mut dyn SelectionHost) {
        self.transformables_moving = false;
        if let Some(id) = self.settling_interactor.take()
            && let Some(interactor) = self.interactors.get_mut(id.0)
        {
            interactor.data.drag_translation_velocity = Vec3::ZERO;
        }
        selection.end_drag();
        tracing::debug!("Transformables came to rest");
    }
}

fn translation_request(interactor: InteractorId, unsnapped: Pose) -> SnapRequest {
    SnapRequest {
        interactor,
        unsnapped,
        allow_snap: true,
        translated: true,
        rotated: false,
        scaled: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::{EmptyScene, ObjectId};
    use crate::selection::{Transformable, TransformableSet};
    use crate::snapping::NoSnap;
    use manip_core::BoundingBox;
    use std::f32::consts::FRAC_PI_2;

    fn pointing_down(position: Vec3) -> Pose {
        Pose::from_rotation_position(Quat::from_rotation_y(FRAC_PI_2), position)
    }

    fn selection() -> TransformableSet {
        let mut set = TransformableSet::new();
        set.push(Transformable::new(ObjectId(1), Pose::IDENTITY, BoundingBox::unit_cube(1.0)));
        set
    }

    #[test]
    fn test_unknown_interactor() {
        let mut world = WorldInteraction::new(InteractionConfig::default());
        let mut set = selection();
        let mut snapper = NoSnap;
        let mut ctx = FrameContext::new(&mut set, &EmptyScene, &mut snapper);
        let result = world.start_dragging(InteractorId(3), None, Vec3::ZERO, false, &mut ctx);
        assert_eq!(result, Err(InteractionError::UnknownInteractor(3)));
        assert!(world.interactor(InteractorId(0)).is_err());
    }

    #[test]
    fn test_pairing_rejects_self() {
        let mut world = WorldInteraction::new(InteractionConfig::default());
        let a = world.add_interactor(InteractorKind::MotionController);
        let b = world.add_interactor(InteractorKind::MotionController);
        assert_eq!(world.pair_interactors(a, a), Err(InteractionError::SelfPairing(0)));
        world.pair_interactors(a, b).unwrap();
        assert_eq!(world.interactor(a).unwrap().other_interactor(), Some(b));
        assert_eq!(world.interactor(b).unwrap().other_interactor(), Some(a));
    }

    #[test]
    fn test_start_dragging_needs_pose() {
        let mut world = WorldInteraction::new(InteractionConfig::default());
        let id = world.add_interactor(InteractorKind::Mouse);
        let mut set = selection();
        let mut snapper = NoSnap;
        let mut ctx = FrameContext::new(&mut set, &EmptyScene, &mut snapper);
        let result = world.start_dragging(id, None, Vec3::ZERO, false, &mut ctx);
        assert_eq!(result, Err(InteractionError::NoValidPose(0)));
    }

    #[test]
    fn test_world_space_gizmo_ignores_rotation() {
        let mut world = WorldInteraction::new(InteractionConfig::default());
        let mut set = TransformableSet::new();
        let rotated = Pose::from_rotation_position(Quat::from_rotation_z(0.4), Vec3::new(1.0, 2.0, 3.0));
        set.push(Transformable::new(ObjectId(1), rotated, BoundingBox::unit_cube(1.0)));

        world.refresh_transform_gizmo(&set, true);
        assert!(world.is_gizmo_visible());
        assert_eq!(world.gizmo().pose().rotation, Quat::IDENTITY);
        assert_eq!(world.gizmo().pose().position, rotated.position);

        world.cycle_coordinate_space();
        world.refresh_transform_gizmo(&set, false);
        assert!(world.gizmo().pose().rotation.abs_diff_eq(rotated.rotation, 1e-6));
    }

    #[test]
    fn test_empty_selection_hides_gizmo() {
        let mut world = WorldInteraction::new(InteractionConfig::default());
        world.refresh_transform_gizmo(&selection(), false);
        assert!(world.is_gizmo_visible());
        world.refresh_transform_gizmo(&TransformableSet::new(), false);
        assert!(!world.is_gizmo_visible());
    }

    #[test]
    fn test_unknown_handle() {
        let mut world = WorldInteraction::new(InteractionConfig::default());
        let id = world.add_interactor(InteractorKind::Mouse);
        world
            .set_interactor_input(id, Some(pointing_down(Vec3::new(0.0, 0.0, 5.0))), 0.016)
            .unwrap();
        let mut set = selection();
        let mut snapper = NoSnap;
        let mut ctx = FrameContext::new(&mut set, &EmptyScene, &mut snapper);
        let result = world.start_dragging(id, Some(HandleId::new(99, 0)), Vec3::ZERO, false, &mut ctx);
        assert_eq!(result, Err(InteractionError::UnknownHandle(99, 0)));
        assert_eq!(world.interactor(id).unwrap().dragging_mode(), DraggingMode::Nothing);
    }

    /// Drags the selection freely by `step` along X in one frame, then releases.
    fn fling(world: &mut WorldInteraction, ctx: &mut FrameContext<'_>, step: f32) -> InteractorId {
        let id = world.add_interactor(InteractorKind::Mouse);
        world
            .set_interactor_input(id, Some(pointing_down(Vec3::new(0.0, 0.0, 5.0))), 0.016)
            .unwrap();
        world.start_dragging(id, None, Vec3::ZERO, false, ctx).unwrap();
        world.interaction_tick(ctx);
        world
            .set_interactor_input(id, Some(pointing_down(Vec3::new(step, 0.0, 5.0))), 0.016)
            .unwrap();
        world.interaction_tick(ctx);
        world.stop_dragging(id, ctx).unwrap();
        id
    }

    #[test]
    fn test_release_coasts_until_damped() {
        let mut world = WorldInteraction::new(InteractionConfig::default());
        let mut set = selection();
        let mut snapper = NoSnap;
        {
            let mut ctx = FrameContext::new(&mut set, &EmptyScene, &mut snapper);
            let id = fling(&mut world, &mut ctx, 0.1);
            assert!(world.are_transformables_moving());
            let velocity = world.interactor(id).unwrap().data().drag_translation_velocity;
            assert!(velocity.abs_diff_eq(Vec3::new(0.1, 0.0, 0.0), 1e-5));

            world.interaction_tick(&mut ctx);
            assert!((ctx.selection.pivot_pose().position.x - 0.2).abs() < 1e-5);
            let velocity = world.interactor(id).unwrap().data().drag_translation_velocity;
            assert!((velocity.x - 0.095).abs() < 1e-5);

            for _ in 0..500 {
                if !world.are_transformables_moving() {
                    break;
                }
                world.interaction_tick(&mut ctx);
            }
            assert!(!world.are_transformables_moving());
            // 0.1 dragged plus the geometric tail 0.1 / (1 - 0.95)
            assert!((ctx.selection.pivot_pose().position.x - 2.1).abs() < 5e-3);
        }
        assert!(!set.is_dragging());
    }

    #[test]
    fn test_slow_release_has_no_inertia() {
        let mut world = WorldInteraction::new(InteractionConfig::default());
        let mut set = selection();
        let mut snapper = NoSnap;
        {
            let mut ctx = FrameContext::new(&mut set, &EmptyScene, &mut snapper);
            let id = fling(&mut world, &mut ctx, 0.005);
            assert_eq!(
                world.interactor(id).unwrap().data().drag_translation_velocity,
                Vec3::ZERO
            );
            world.interaction_tick(&mut ctx);
            assert!(!world.are_transformables_moving());
        }
        assert!(!set.is_dragging());
        assert!((set.objects()[0].pose.position.x - 0.005).abs() < 1e-6);
    }

    #[test]
    fn test_inertia_can_be_disabled() {
        let mut config = InteractionConfig::default();
        config.inertia.enabled = false;
        let mut world = WorldInteraction::new(config);
        let mut set = selection();
        let mut snapper = NoSnap;
        {
            let mut ctx = FrameContext::new(&mut set, &EmptyScene, &mut snapper);
            fling(&mut world, &mut ctx, 0.1);
            assert!(!world.are_transformables_moving());
        }
        assert!((set.objects()[0].pose.position.x - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_new_drag_stops_coasting() {
        let mut world = WorldInteraction::new(InteractionConfig::default());
        let mut set = selection();
        let mut snapper = NoSnap;
        let mut ctx = FrameContext::new(&mut set, &EmptyScene, &mut snapper);
        let id = fling(&mut world, &mut ctx, 0.1);
        assert!(world.are_transformables_moving());

        let grab = Vec3::new(0.1, 0.0, 0.0);
        world.start_dragging(id, None, grab, false, &mut ctx).unwrap();
        assert_eq!(
            world.interactor(id).unwrap().data().drag_translation_velocity,
            Vec3::ZERO
        );
        world.interaction_tick(&mut ctx);
        assert!((ctx.selection.pivot_pose().position.x - 0.1).abs() < 1e-5);
    }
}
