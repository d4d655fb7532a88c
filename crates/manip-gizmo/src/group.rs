//! Handle groups
//!
//! A group owns every handle of one editing kind. Kind-specific behaviour
//! (which gizmo type it belongs to, where its handles sit, which drag
//! operation it binds) comes from a per-kind trait table rather than from
//! separate group types.

use glam::{Mat3, Quat, Vec3};
use manip_core::{BoundingBox, CoordinateSpace, GizmoConfig, LinearColor, Pose};
use serde::{Deserialize, Serialize};

use crate::constants::{layout, picking};
use crate::drag::DragOperationKind;
use crate::handle::{GizmoHandle, HandleId, RenderableId};
use crate::placement::{HandleDirection, HandlePlacement, NUM_PLACEMENTS};

/// Which handles the gizmo shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GizmoType {
    /// Every group that opts into universal display
    #[default]
    All,
    /// Translation groups
    Translate,
    /// Rotation groups
    Rotate,
    /// Scale groups
    Scale,
}

/// Editing kind of a handle group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Arrows along each axis
    Translate,
    /// Plane handles normal to each axis
    PlaneTranslate,
    /// Rings about each axis
    Rotate,
    /// Per-axis scale handles
    Scale,
    /// Single handle scaling all axes
    UniformScale,
    /// Bounding-box corner and edge handles
    Stretch,
}

struct KindTraits {
    gizmo_type: GizmoType,
    universal: bool,
    supports_world_space: bool,
    faces_viewer: bool,
    axis_colored: bool,
    base_offset: f32,
    drag: DragOperationKind,
}

impl HandleKind {
    /// Every kind, in the order a gizmo creates its groups.
    pub const ALL: [HandleKind; 6] = [
        HandleKind::Translate,
        HandleKind::PlaneTranslate,
        HandleKind::Rotate,
        HandleKind::Scale,
        HandleKind::UniformScale,
        HandleKind::Stretch,
    ];

    const fn traits(self) -> KindTraits {
        match self {
            HandleKind::Translate => KindTraits {
                gizmo_type: GizmoType::Translate,
                universal: true,
                supports_world_space: true,
                faces_viewer: true,
                axis_colored: true,
                base_offset: layout::TRANSLATE_OFFSET,
                drag: DragOperationKind::Translate,
            },
            HandleKind::PlaneTranslate => KindTraits {
                gizmo_type: GizmoType::Translate,
                universal: false,
                supports_world_space: true,
                faces_viewer: true,
                axis_colored: true,
                base_offset: layout::PLANE_TRANSLATE_OFFSET,
                drag: DragOperationKind::PlaneTranslate,
            },
            HandleKind::Rotate => KindTraits {
                gizmo_type: GizmoType::Rotate,
                universal: true,
                supports_world_space: true,
                faces_viewer: false,
                axis_colored: true,
                base_offset: layout::ROTATE_OFFSET,
                drag: DragOperationKind::RotateOnAngle,
            },
            HandleKind::Scale => KindTraits {
                gizmo_type: GizmoType::Scale,
                universal: false,
                supports_world_space: true,
                faces_viewer: true,
                axis_colored: true,
                base_offset: layout::SCALE_OFFSET,
                drag: DragOperationKind::Scale,
            },
            HandleKind::UniformScale => KindTraits {
                gizmo_type: GizmoType::Scale,
                universal: true,
                supports_world_space: true,
                faces_viewer: false,
                axis_colored: false,
                base_offset: layout::UNIFORM_SCALE_OFFSET,
                drag: DragOperationKind::UniformScale,
            },
            HandleKind::Stretch => KindTraits {
                gizmo_type: GizmoType::Scale,
                universal: true,
                supports_world_space: false,
                faces_viewer: false,
                axis_colored: false,
                base_offset: 0.0,
                drag: DragOperationKind::Stretch,
            },
        }
    }

    /// Gizmo type this kind belongs to.
    pub fn gizmo_type(self) -> GizmoType {
        self.traits().gizmo_type
    }

    /// Whether the kind shows when the gizmo type is [`GizmoType::All`].
    pub fn is_universal(self) -> bool {
        self.traits().universal
    }

    /// Whether the kind can be used in `space`.
    pub fn supports_space(self, space: CoordinateSpace) -> bool {
        space == CoordinateSpace::Local || self.traits().supports_world_space
    }

    /// Drag operation bound to handles of this kind.
    pub fn drag_operation_kind(self) -> DragOperationKind {
        self.traits().drag
    }

    /// Placements this kind materialises.
    pub fn placements(self) -> Vec<HandlePlacement> {
        match self {
            HandleKind::Translate
            | HandleKind::PlaneTranslate
            | HandleKind::Rotate
            | HandleKind::Scale => (0..3)
                .map(|axis| HandlePlacement::on_axis(axis, HandleDirection::Positive))
                .collect(),
            HandleKind::UniformScale => {
                vec![HandlePlacement::on_axis(2, HandleDirection::Positive)]
            }
            HandleKind::Stretch => HandlePlacement::all()
                .filter(|placement| placement.center_handle_count() <= 1)
                .collect(),
        }
    }

    /// Whether a handle of this kind shows under the given gizmo settings,
    /// ignoring drag state.
    pub fn is_shown_for(
        self,
        gizmo_type: GizmoType,
        space: CoordinateSpace,
        allow_rotation_and_scale: bool,
    ) -> bool {
        let traits = self.traits();
        let type_matches = traits.gizmo_type == gizmo_type
            || (gizmo_type == GizmoType::All && traits.universal);
        let permitted = allow_rotation_and_scale || traits.gizmo_type == GizmoType::Translate;
        type_matches && permitted && self.supports_space(space)
    }
}

/// Per-frame input for updating a group's handles.
#[derive(Debug, Clone)]
pub struct GroupUpdateContext<'a> {
    /// Gizmo pose (unscaled)
    pub gizmo_pose: Pose,
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
    /// Overall gizmo scale
    pub gizmo_scale: f32,
    /// Selection-appear animation progress (0..1)
    pub animation_alpha: f32,
    /// Seconds since the last update
    pub delta_time: f32,
    /// Appearance settings
    pub config: &'a GizmoConfig,
}

/// Handles of one editing kind.
#[derive(Debug, Clone)]
pub struct HandleGroup {
    kind: HandleKind,
    handles: [Option<GizmoHandle>; NUM_PLACEMENTS],
    /// Appearance used for opaque handles
    pub opaque_material: RenderableId,
    /// Appearance used for translucent handles
    pub translucent_material: RenderableId,
}

impl HandleGroup {
    /// Creates a group with one hidden handle per placement of `kind`.
    ///
    /// Renderable ids are allocated from `first_renderable` upward.
    pub fn new(kind: HandleKind, first_renderable: u64) -> Self {
        let mut handles: [Option<GizmoHandle>; NUM_PLACEMENTS] = std::array::from_fn(|_| None);
        for placement in kind.placements() {
            let slot = placement.index();
            handles[slot] = Some(GizmoHandle::new(
                placement,
                RenderableId(first_renderable + slot as u64),
            ));
        }
        Self {
            kind,
            handles,
            opaque_material: RenderableId::default(),
            translucent_material: RenderableId::default(),
        }
    }

    /// Editing kind of this group.
    pub fn kind(&self) -> HandleKind {
        self.kind
    }

    /// Handle in `slot`, if the group materialises one there.
    pub fn handle(&self, slot: usize) -> Option<&GizmoHandle> {
        self.handles.get(slot).and_then(Option::as_ref)
    }

    /// Materialised handles with their slots.
    pub fn handles(&self) -> impl Iterator<Item = (usize, &GizmoHandle)> {
        self.handles
            .iter()
            .enumerate()
            .filter_map(|(slot, handle)| handle.as_ref().map(|handle| (slot, handle)))
    }

    /// Refreshes visibility, hover, color and pose of every handle.
    pub fn update(&mut self, group_index: usize, ctx: &GroupUpdateContext<'_>) {
        let kind = self.kind;
        let traits = kind.traits();
        let shown_for_settings =
            kind.is_shown_for(ctx.gizmo_type, ctx.space, ctx.allow_rotation_and_scale);
        let viewer_local = ctx
            .gizmo_pose
            .without_scale()
            .inverse_transform_point_no_scale(ctx.viewer_position);

        for (slot, entry) in self.handles.iter_mut().enumerate() {
            let Some(handle) = entry.as_mut() else {
                continue;
            };
            let id = HandleId::new(group_index, slot);
            let dragged = ctx.dragging_handle == Some(id);
            let hovered = ctx.hovered_handles.contains(&id);

            let shown = dragged || (ctx.all_handles_visible && shown_for_settings);
            handle.visible = shown;
            handle.collision_enabled = shown;

            handle.update_hover_alpha(
                hovered || dragged,
                ctx.delta_time,
                ctx.config.hover_duration,
            );
            handle.color = handle_color(handle, traits.axis_colored, dragged, ctx.config);

            let hover_scale = 1.0 + (ctx.config.hover_scale - 1.0) * handle.hover_alpha;
            let handle_scale = ctx.gizmo_scale * hover_scale * ctx.animation_alpha;

            if kind == HandleKind::Stretch {
                handle.flipped = false;
                handle.local_pose = stretch_handle_pose(
                    &handle.placement,
                    &ctx.local_bounds,
                    ctx.gizmo_scale,
                    handle_scale,
                );
                handle.pick_radius = picking::STRETCH_HANDLE_RADIUS * ctx.gizmo_scale;
                continue;
            }

            let Some(axis) = handle.placement.facing_axis_index() else {
                continue;
            };
            let mut direction = handle.placement.axis_vector(axis);
            handle.flipped =
                traits.faces_viewer && viewer_local[axis] * handle.placement.axes[axis].sign() < 0.0;
            if handle.flipped {
                direction = -direction;
            }

            let offset = traits.base_offset
                * (1.0 + (1.0 - ctx.animation_alpha) * layout::APPEAR_OFFSET_MULTIPLIER)
                * ctx.gizmo_scale;
            let rotation = Quat::from_rotation_arc(Vec3::X, direction);

            if kind == HandleKind::Rotate {
                handle.local_pose = Pose::new(Vec3::ZERO, rotation, Vec3::splat(handle_scale));
                handle.pick_radius = offset;
            } else {
                handle.local_pose =
                    Pose::new(direction * offset, rotation, Vec3::splat(handle_scale));
                handle.pick_radius = picking::HANDLE_RADIUS * handle_scale;
            }
        }
    }
}

fn handle_color(
    handle: &GizmoHandle,
    axis_colored: bool,
    dragged: bool,
    config: &GizmoConfig,
) -> LinearColor {
    let colors = &config.colors;
    if dragged {
        return colors.dragging;
    }
    let base = match handle.placement.facing_axis_index() {
        Some(axis) if axis_colored => colors.axis(axis),
        _ => colors.default,
    };
    // Tint follows the fade, so it decays after hover ends.
    if handle.hover_alpha > 0.0 {
        LinearColor::lerp_using_hsv(base, colors.hover, handle.hover_alpha)
    } else {
        base
    }
}

/// Pose of a corner or edge handle on the bounding box.
fn stretch_handle_pose(
    placement: &HandlePlacement,
    bounds: &BoundingBox,
    gizmo_scale: f32,
    handle_scale: f32,
) -> Pose {
    let outward = layout::STRETCH_OUTWARD_OFFSET * gizmo_scale;
    let center = bounds.center();
    let mut position = Vec3::ZERO;
    for axis in 0..3 {
        position[axis] = match placement.axes[axis] {
            HandleDirection::Negative => bounds.min[axis] - outward,
            HandleDirection::Center => center[axis],
            HandleDirection::Positive => bounds.max[axis] + outward,
        };
    }
    Pose::new(position, stretch_handle_rotation(placement), Vec3::splat(handle_scale))
}

/// Rotation taking the canonical stretch handle to `placement`.
///
/// The canonical corner handle sits at the `(+X, +Y, +Z)` corner; the
/// canonical edge handle runs along Z at `(+X, +Y)`.
pub fn stretch_handle_rotation(placement: &HandlePlacement) -> Quat {
    use HandleDirection::{Negative, Positive};
    use std::f32::consts::{FRAC_PI_2, PI};

    let quarter_turns = |first: HandleDirection, second: HandleDirection| match (first, second) {
        (Negative, Positive) => FRAC_PI_2,
        (Negative, Negative) => PI,
        (Positive, Negative) => -FRAC_PI_2,
        _ => 0.0,
    };

    match placement.center_axis_index() {
        None => {
            let [x, y, z] = placement.axes;
            let around_z = Quat::from_rotation_z(quarter_turns(x, y));
            if z == Negative {
                around_z * Quat::from_rotation_x(-FRAC_PI_2)
            } else {
                around_z
            }
        }
        Some(center_axis) => {
            let first = (center_axis + 1) % 3;
            let second = (center_axis + 2) % 3;
            let mut axis = Vec3::ZERO;
            axis[center_axis] = 1.0;
            let mut first_axis = Vec3::ZERO;
            first_axis[first] = 1.0;
            let mut second_axis = Vec3::ZERO;
            second_axis[second] = 1.0;
            let to_center_axis = Quat::from_mat3(&Mat3::from_cols(first_axis, second_axis, axis));
            let turn = quarter_turns(placement.axes[first], placement.axes[second]);
            Quat::from_axis_angle(axis, turn) * to_center_axis
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use HandleDirection::*;

    fn context<'a>(
        config: &'a GizmoConfig,
        hovered: &'a [HandleId],
        gizmo_type: GizmoType,
        space: CoordinateSpace,
    ) -> GroupUpdateContext<'a> {
        GroupUpdateContext {
            gizmo_pose: Pose::IDENTITY,
            local_bounds: BoundingBox::unit_cube(1.0),
            viewer_position: Vec3::new(5.0, 5.0, 5.0),
            gizmo_type,
            space,
            all_handles_visible: true,
            allow_rotation_and_scale: true,
            dragging_handle: None,
            hovered_handles: hovered,
            gizmo_scale: 1.0,
            animation_alpha: 1.0,
            delta_time: 1.0 / 60.0,
            config,
        }
    }

    #[test]
    fn test_placement_counts() {
        assert_eq!(HandleKind::Translate.placements().len(), 3);
        assert_eq!(HandleKind::UniformScale.placements().len(), 1);
        let stretch = HandleKind::Stretch.placements();
        assert_eq!(stretch.iter().filter(|p| p.center_handle_count() == 0).count(), 8);
        assert_eq!(stretch.iter().filter(|p| p.center_handle_count() == 1).count(), 12);
    }

    #[test]
    fn test_universal_display() {
        let universal: Vec<_> = HandleKind::ALL
            .into_iter()
            .filter(|kind| kind.is_shown_for(GizmoType::All, CoordinateSpace::Local, true))
            .collect();
        assert_eq!(
            universal,
            vec![
                HandleKind::Translate,
                HandleKind::Rotate,
                HandleKind::UniformScale,
                HandleKind::Stretch
            ]
        );
    }

    #[test]
    fn test_stretch_hidden_in_world_space() {
        assert!(!HandleKind::Stretch.is_shown_for(GizmoType::Scale, CoordinateSpace::World, true));
        assert!(HandleKind::Stretch.is_shown_for(GizmoType::Scale, CoordinateSpace::Local, true));
    }

    #[test]
    fn test_rotation_and_scale_need_permission() {
        assert!(!HandleKind::Rotate.is_shown_for(GizmoType::Rotate, CoordinateSpace::World, false));
        assert!(!HandleKind::Scale.is_shown_for(GizmoType::Scale, CoordinateSpace::World, false));
        assert!(HandleKind::Translate.is_shown_for(
            GizmoType::Translate,
            CoordinateSpace::World,
            false
        ));
    }

    #[test]
    fn test_dragged_handle_overrides_visibility() {
        let config = GizmoConfig::default();
        for kind in HandleKind::ALL {
            for space in [CoordinateSpace::World, CoordinateSpace::Local] {
                for gizmo_type in [GizmoType::All, GizmoType::Translate, GizmoType::Rotate] {
                    let mut group = HandleGroup::new(kind, 0);
                    let dragged_slot = kind.placements()[0].index();
                    let dragged = HandleId::new(3, dragged_slot);
                    let mut ctx = context(&config, &[], gizmo_type, space);
                    ctx.all_handles_visible = false;
                    ctx.allow_rotation_and_scale = false;
                    ctx.dragging_handle = Some(dragged);
                    group.update(3, &ctx);
                    for (slot, handle) in group.handles() {
                        let is_dragged = slot == dragged_slot;
                        assert_eq!(handle.visible, is_dragged);
                        assert_eq!(handle.collision_enabled, is_dragged);
                    }
                }
            }
        }
    }

    #[test]
    fn test_handles_face_viewer() {
        let config = GizmoConfig::default();
        let mut group = HandleGroup::new(HandleKind::Translate, 0);
        let mut ctx = context(&config, &[], GizmoType::Translate, CoordinateSpace::World);
        ctx.viewer_position = Vec3::new(-5.0, 5.0, 5.0);
        group.update(0, &ctx);

        let x_slot = HandlePlacement::on_axis(0, Positive).index();
        let x_handle = group.handle(x_slot).unwrap();
        assert!(x_handle.flipped);
        assert!(x_handle.local_pose.position.x < 0.0);

        let y_handle = group.handle(HandlePlacement::on_axis(1, Positive).index()).unwrap();
        assert!(!y_handle.flipped);
        assert!(y_handle.local_pose.position.y > 0.0);
    }

    #[test]
    fn test_uniform_scale_never_flips() {
        let config = GizmoConfig::default();
        let mut group = HandleGroup::new(HandleKind::UniformScale, 0);
        let mut ctx = context(&config, &[], GizmoType::Scale, CoordinateSpace::World);
        ctx.viewer_position = Vec3::new(0.0, 0.0, -5.0);
        group.update(0, &ctx);
        let (_, handle) = group.handles().next().unwrap();
        assert!(!handle.flipped);
    }

    #[test]
    fn test_appear_animation_pushes_handles_out() {
        let config = GizmoConfig::default();
        let mut group = HandleGroup::new(HandleKind::Translate, 0);
        let mut ctx = context(&config, &[], GizmoType::Translate, CoordinateSpace::World);
        ctx.animation_alpha = 0.0;
        group.update(0, &ctx);
        let slot = HandlePlacement::on_axis(0, Positive).index();
        let handle = group.handle(slot).unwrap();
        let expected = layout::TRANSLATE_OFFSET * (1.0 + layout::APPEAR_OFFSET_MULTIPLIER);
        assert!((handle.local_pose.position.x - expected).abs() < 1e-5);
        assert_eq!(handle.local_pose.scale, Vec3::ZERO);
    }

    #[test]
    fn test_colors() {
        let config = GizmoConfig::default();
        let slot = HandlePlacement::on_axis(1, Positive).index();
        let hovered = [HandleId::new(0, slot)];

        let mut group = HandleGroup::new(HandleKind::Translate, 0);
        group.update(0, &context(&config, &[], GizmoType::Translate, CoordinateSpace::World));
        assert_eq!(group.handle(slot).unwrap().color, config.colors.y_axis);

        let ctx = context(&config, &hovered, GizmoType::Translate, CoordinateSpace::World);
        for _ in 0..30 {
            group.update(0, &ctx);
        }
        let hovered_color = group.handle(slot).unwrap().color;
        let expected_hover = config.colors.hover;
        for (a, b) in hovered_color.to_array().into_iter().zip(expected_hover.to_array()) {
            assert!((a - b).abs() < 1e-3);
        }

        let mut ctx = context(&config, &[], GizmoType::Translate, CoordinateSpace::World);
        ctx.dragging_handle = Some(HandleId::new(0, slot));
        group.update(0, &ctx);
        assert_eq!(group.handle(slot).unwrap().color, config.colors.dragging);
    }

    #[test]
    fn test_hover_tint_fades_out() {
        let config = GizmoConfig::default();
        let slot = HandlePlacement::on_axis(0, Positive).index();
        let hovered = [HandleId::new(0, slot)];
        let mut group = HandleGroup::new(HandleKind::Translate, 0);

        let ctx = context(&config, &hovered, GizmoType::Translate, CoordinateSpace::World);
        for _ in 0..30 {
            group.update(0, &ctx);
        }

        let ctx = context(&config, &[], GizmoType::Translate, CoordinateSpace::World);
        group.update(0, &ctx);
        let handle = group.handle(slot).unwrap();
        assert!(handle.hover_alpha > 0.0 && handle.hover_alpha < 1.0);
        let fading =
            LinearColor::lerp_using_hsv(config.colors.x_axis, config.colors.hover, handle.hover_alpha);
        assert_eq!(handle.color, fading);
        assert_ne!(handle.color, config.colors.x_axis);

        for _ in 0..30 {
            group.update(0, &ctx);
        }
        assert_eq!(group.handle(slot).unwrap().color, config.colors.x_axis);
    }

    #[test]
    fn test_stretch_handles_sit_on_bounds() {
        let config = GizmoConfig::default();
        let mut group = HandleGroup::new(HandleKind::Stretch, 0);
        group.update(0, &context(&config, &[], GizmoType::Scale, CoordinateSpace::Local));
        let corner = HandlePlacement::new(Positive, Negative, Positive);
        let handle = group.handle(corner.index()).unwrap();
        let outward = layout::STRETCH_OUTWARD_OFFSET;
        let expected = Vec3::new(0.5 + outward, -0.5 - outward, 0.5 + outward);
        assert!(handle.local_pose.position.abs_diff_eq(expected, 1e-6));

        let edge = HandlePlacement::new(Negative, Center, Positive);
        let handle = group.handle(edge.index()).unwrap();
        assert_eq!(handle.local_pose.position.y, 0.0);
    }

    #[test]
    fn test_stretch_rotation_table() {
        for placement in HandleKind::Stretch.placements() {
            let rotation = stretch_handle_rotation(&placement);
            match placement.center_axis_index() {
                None => {
                    let mapped = rotation * Vec3::ONE;
                    assert!(mapped.abs_diff_eq(placement.direction_vector(), 1e-5));
                }
                Some(center_axis) => {
                    let mut axis = Vec3::ZERO;
                    axis[center_axis] = 1.0;
                    assert!((rotation * Vec3::Z).abs_diff_eq(axis, 1e-5));
                    let mapped = rotation * Vec3::new(1.0, 1.0, 0.0);
                    assert!(mapped.abs_diff_eq(placement.direction_vector(), 1e-5));
                }
            }
        }
    }
}
