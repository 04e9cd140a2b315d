//! Bridge error types.

use taffy::NodeId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BridgeError {
    /// The engine could not allocate a node or config.
    #[error("allocation failure: {0}")]
    AllocationFailure(String),

    /// Handle table and engine disagree (missing handle, double destroy,
    /// use of a freed node, ...). Never retried.
    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    /// A host measure function produced a size the engine cannot use.
    #[error("measure function for node {node:?} returned an invalid size: {reason}")]
    MeasurementError { node: NodeId, reason: String },

    /// The engine was used from inside one of its own callbacks.
    #[error("layout engine is busy: re-entrant call from inside a layout callback")]
    Reentrant,

    /// The wrapper outlived the host context that created it.
    #[error("host context has been dropped")]
    ContextDropped,

    #[error("child index {index} out of bounds (child count {count})")]
    ChildIndexOutOfBounds { index: usize, count: usize },

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Engine(#[from] taffy::TaffyError),
}

pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }

    pub(crate) fn freed(node: NodeId) -> Self {
        Self::InvariantViolation(format!("node {node:?} has already been freed"))
    }

    /// True for the error class that signals a broken ownership invariant.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, Self::InvariantViolation(_))
    }
}
