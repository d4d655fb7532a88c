//! Transform gizmo
//!
//! Handle layout, visibility, hover and color rules for a translate /
//! rotate / scale gizmo, plus the drag operations that turn pointer motion
//! into a candidate gizmo pose. Nothing here draws; a renderer consumes
//! [`HandleInstance`] records.
//!
//! # Module Structure
//!
//! ```text
//! manip-gizmo/
//! ├── placement.rs   # 27-slot handle placement encoding
//! ├── handle.rs      # Single handle state and hover fade
//! ├── group.rs       # Kind-tagged handle groups and their trait table
//! ├── gizmo.rs       # TransformGizmo aggregate, picking, appear animation
//! ├── drag.rs        # Drag operations
//! ├── instance.rs    # Pod records for renderers
//! └── constants.rs   # Layout and picking distances
//! ```

pub mod constants;
pub mod drag;
pub mod gizmo;
pub mod group;
pub mod handle;
pub mod instance;
pub mod placement;

pub use drag::{AngleTracker, DragOperation, DragOperationKind, DraggingTransformableData};
pub use gizmo::{GizmoUpdateParams, TransformGizmo};
pub use group::{GizmoType, GroupUpdateContext, HandleGroup, HandleKind};
pub use handle::{GizmoHandle, HandleId, RenderableId};
pub use instance::HandleInstance;
pub use placement::{CenterAxisInfo, HandleDirection, HandlePlacement, NUM_PLACEMENTS};
