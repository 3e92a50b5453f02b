use thiserror::Error;

use crate::document::NodeId;

/// Structural misuse of the [`Document`](crate::document::Document) API.
///
/// The label synchronizer never produces these; they only surface when a page
/// is being built or edited by hand.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    #[error("node {0:?} is not an element")]
    NotAnElement(NodeId),
    #[error("node {0:?} already has a parent")]
    AlreadyAttached(NodeId),
    #[error("appending {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
    #[error("document is full")]
    Full,
}

/// Failure to load a page fixture or a config file.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[cfg(feature = "serde")]
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Document(#[from] DocumentError),
}
