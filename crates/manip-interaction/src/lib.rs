//! World interaction
//!
//! Device-agnostic interactors and the per-frame loop that lets them hover,
//! grab and drag the transform gizmo. The host supplies the selection, the
//! scene raycaster and the snapping policy through small traits; this crate
//! never renders, polls devices or records undo history.
//!
//! # Module Structure
//!
//! ```text
//! manip-interaction/
//! ├── interactor.rs  # Interactor, dragging modes, laser and hover queries
//! ├── world.rs       # WorldInteraction: hover, drag, snap, gizmo refresh
//! ├── constraint.rs  # Axis / plane drag constraint solver
//! ├── selection.rs   # SelectionHost trait and TransformableSet
//! ├── snapping.rs    # Snapper trait, NoSnap and GridSnapper
//! ├── hit.rs         # Hit results and the scene raycast trait
//! └── error.rs       # InteractionError
//! ```

pub mod constraint;
pub mod error;
pub mod hit;
pub mod interactor;
pub mod selection;
pub mod snapping;
pub mod world;

pub use constraint::{
    ConstrainedDrag, ConstraintInput, ConstraintOffsets, compute_constrained_drag_delta,
};
pub use error::{InteractionError, Result};
pub use hit::{EmptyScene, HitResult, HitTarget, ObjectId, SceneRaycaster};
pub use interactor::{DraggingMode, Interactor, InteractorData, InteractorId, InteractorKind};
pub use selection::{SelectionHost, Transformable, TransformableSet};
pub use snapping::{GridSnapper, NoSnap, SnapRequest, Snapper};
pub use world::{FrameContext, WorldInteraction};
