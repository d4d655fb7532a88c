//! Interaction errors

/// Result type for interaction calls
pub type Result<T> = std::result::Result<T, InteractionError>;

/// Errors returned by [`crate::WorldInteraction`] calls that name something
/// it does not own.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InteractionError {
    /// No interactor is registered under this index
    #[error("Unknown interactor: {0}")]
    UnknownInteractor(usize),
    /// The gizmo has no handle at this group and slot
    #[error("Unknown gizmo handle: group {0}, slot {1}")]
    UnknownHandle(usize, usize),
    /// The device reported no usable pose
    #[error("Interactor {0} has no valid pose this frame")]
    NoValidPose(usize),
    /// Another interactor already drives the selection
    #[error("Interactor {0} cannot start a drag while interactor {1} is dragging")]
    AlreadyDragging(usize, usize),
    /// An interactor was named as its own pair
    #[error("Interactor cannot be paired with itself: {0}")]
    SelfPairing(usize),
}
