use thiserror::Error;

use crate::ids::NodeId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ModelError {
    #[error("invalid field path: {0:?}")]
    InvalidPath(String),
    #[error("invalid field name: {0:?}")]
    InvalidFieldName(String),
    #[error("invalid identifier: {0:?}")]
    InvalidId(String),
    #[error("node {0} does not exist in this tree")]
    NodeNotFound(NodeId),
    #[error("node {parent} cannot hold children (kind {kind})")]
    NotAContainer { parent: NodeId, kind: String },
    #[error("duplicate field name {name:?} under {parent}")]
    DuplicateSibling { parent: NodeId, name: String },
}

pub type Result<T> = std::result::Result<T, ModelError>;
