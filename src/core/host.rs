/*
 * The contract between the asset manager and the scene-graph host that owns
 * the nodes. The engine never holds on to host nodes; it addresses them by
 * `NodeId` for the duration of a single operation. Every call that names a
 * node may find it gone, so lookups return `Option` and writes report
 * `HostError::NodeNotFound`.
 */
use super::models::{FrameRange, NodeId, NodeRole};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;

pub const FILE_ATTRIBUTE: &str = "file";
pub const FIRST_FRAME_ATTRIBUTE: &str = "first";
pub const LAST_FRAME_ATTRIBUTE: &str = "last";
pub const COLORSPACE_ATTRIBUTE: &str = "colorspace";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Integer(i64),
    Text(String),
}

impl AttributeValue {
    pub fn as_text(&self) -> String {
        match self {
            AttributeValue::Integer(i) => i.to_string(),
            AttributeValue::Text(s) => s.clone(),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            AttributeValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Integer(value)
    }
}

#[derive(Debug)]
pub enum HostError {
    NodeNotFound(NodeId),
    AttributeRejected {
        node_id: NodeId,
        attribute: String,
        reason: String,
    },
    Io(io::Error),
    Serde(serde_json::Error),
}

impl From<io::Error> for HostError {
    fn from(err: io::Error) -> Self {
        HostError::Io(err)
    }
}

impl From<serde_json::Error> for HostError {
    fn from(err: serde_json::Error) -> Self {
        HostError::Serde(err)
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostError::NodeNotFound(id) => write!(f, "Could not find node: {id}"),
            HostError::AttributeRejected {
                node_id,
                attribute,
                reason,
            } => write!(
                f,
                "Node {node_id} rejected a value for '{attribute}': {reason}"
            ),
            HostError::Io(e) => write!(f, "Scene I/O error: {e}"),
            HostError::Serde(e) => write!(f, "Scene format error: {e}"),
        }
    }
}

impl std::error::Error for HostError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            HostError::Io(e) => Some(e),
            HostError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HostError>;

pub trait SceneHostOperations {
    /* All node identities, in the host's enumeration order. */
    fn all_nodes(&self) -> Vec<NodeId>;
    fn class_of(&self, node_id: &NodeId) -> Option<String>;
    fn attribute(&self, node_id: &NodeId, name: &str) -> Option<AttributeValue>;
    fn has_error(&self, node_id: &NodeId) -> bool;
    fn set_attribute(&mut self, node_id: &NodeId, name: &str, value: AttributeValue)
    -> Result<()>;
    /* Deselects every node, selects `node_id` and brings it into view. */
    fn focus_node(&mut self, node_id: &NodeId) -> Result<()>;

    fn contains_node(&self, node_id: &NodeId) -> bool {
        self.class_of(node_id).is_some()
    }

    fn node_role(&self, node_id: &NodeId) -> Option<NodeRole> {
        self.class_of(node_id).map(|class| NodeRole::from_class(&class))
    }

    fn file_path(&self, node_id: &NodeId) -> Option<String> {
        self.attribute(node_id, FILE_ATTRIBUTE).map(|v| v.as_text())
    }

    fn colorspace(&self, node_id: &NodeId) -> Option<String> {
        self.attribute(node_id, COLORSPACE_ATTRIBUTE)
            .map(|v| v.as_text())
    }

    fn frame_range(&self, node_id: &NodeId) -> Option<FrameRange> {
        let first = self.attribute(node_id, FIRST_FRAME_ATTRIBUTE)?.as_integer()?;
        let last = self.attribute(node_id, LAST_FRAME_ATTRIBUTE)?.as_integer()?;
        Some(FrameRange::new(first, last))
    }
}
