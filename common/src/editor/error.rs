use thiserror::Error;

use crate::editor::document::NodeId;

pub type EditorResult<T> = Result<T, EditorError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error("Failed to load template '{path}': {reason}")]
    TemplateFetch { path: String, reason: String },

    #[error("Could not read image file '{name}': {reason}")]
    FileRead { name: String, reason: String },

    #[error("Node {0} is not part of the document")]
    UnknownNode(NodeId),

    #[error("Node {node} cannot be modified: {reason}")]
    Protected { node: NodeId, reason: &'static str },

    #[error("Node {0} is not an image")]
    NotAnImage(NodeId),

    #[error("Node {0} is not inside a link")]
    NotALink(NodeId),

    #[error("Invalid node reference '{0}'")]
    InvalidNodeId(String),

    #[error("Nothing to {0}")]
    EmptyHistory(&'static str),

    #[error("Serialization failed: {0}")]
    Serialize(String),
}
