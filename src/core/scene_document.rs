/*
 * A scene graph persisted as a JSON document. It stands in for a live
 * compositing host: the binary edits scenes through it, and tests use it as
 * an in-memory host with full control over node classes, attributes and
 * error flags.
 */
use super::host::{
    AttributeValue, FIRST_FRAME_ATTRIBUTE, HostError, LAST_FRAME_ATTRIBUTE, Result,
    SceneHostOperations,
};
use super::models::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneNode {
    pub name: NodeId,
    pub class: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeValue>,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub selected: bool,
    #[serde(default)]
    pub position: (i64, i64),
}

impl SceneNode {
    pub fn new(name: &str, class: &str) -> Self {
        SceneNode {
            name: NodeId::new(name),
            class: class.to_string(),
            attributes: BTreeMap::new(),
            error: false,
            selected: false,
            position: (0, 0),
        }
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_error(mut self, error: bool) -> Self {
        self.error = error;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneDocument {
    pub nodes: Vec<SceneNode>,
    /* Position the viewer was last zoomed to by `focus_node`. */
    #[serde(skip)]
    pub zoom_target: Option<(i64, i64)>,
}

impl SceneDocument {
    pub fn new(nodes: Vec<SceneNode>) -> Self {
        SceneDocument {
            nodes,
            zoom_target: None,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        log::debug!("SceneDocument: Loading scene from {path:?}");
        let file = File::open(path)?;
        let document: SceneDocument = serde_json::from_reader(BufReader::new(file))?;
        log::info!(
            "SceneDocument: Loaded {} nodes from {path:?}",
            document.nodes.len()
        );
        Ok(document)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self)?;
        writer.flush()?;
        log::info!("SceneDocument: Saved {} nodes to {path:?}", self.nodes.len());
        Ok(())
    }

    pub fn node(&self, node_id: &NodeId) -> Option<&SceneNode> {
        self.nodes.iter().find(|n| &n.name == node_id)
    }

    fn node_mut(&mut self, node_id: &NodeId) -> Result<&mut SceneNode> {
        self.nodes
            .iter_mut()
            .find(|n| &n.name == node_id)
            .ok_or_else(|| HostError::NodeNotFound(node_id.clone()))
    }

    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<SceneNode> {
        let index = self.nodes.iter().position(|n| &n.name == node_id)?;
        Some(self.nodes.remove(index))
    }

    #[cfg(test)]
    pub fn selected_nodes(&self) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|n| n.selected)
            .map(|n| n.name.clone())
            .collect()
    }
}

impl SceneHostOperations for SceneDocument {
    fn all_nodes(&self) -> Vec<NodeId> {
        self.nodes.iter().map(|n| n.name.clone()).collect()
    }

    fn class_of(&self, node_id: &NodeId) -> Option<String> {
        self.node(node_id).map(|n| n.class.clone())
    }

    fn attribute(&self, node_id: &NodeId, name: &str) -> Option<AttributeValue> {
        self.node(node_id)?.attributes.get(name).cloned()
    }

    fn has_error(&self, node_id: &NodeId) -> bool {
        self.node(node_id).is_some_and(|n| n.error)
    }

    fn set_attribute(
        &mut self,
        node_id: &NodeId,
        name: &str,
        value: AttributeValue,
    ) -> Result<()> {
        let node = self.node_mut(node_id)?;
        let is_frame_attribute = name == FIRST_FRAME_ATTRIBUTE || name == LAST_FRAME_ATTRIBUTE;
        if is_frame_attribute && value.as_integer().is_none() {
            return Err(HostError::AttributeRejected {
                node_id: node_id.clone(),
                attribute: name.to_string(),
                reason: format!("expected a frame number, got {:?}", value.as_text()),
            });
        }
        log::trace!("SceneDocument: {node_id}.{name} = {value:?}");
        node.attributes.insert(name.to_string(), value);
        Ok(())
    }

    fn focus_node(&mut self, node_id: &NodeId) -> Result<()> {
        let position = self.node_mut(node_id)?.position;
        for node in self.nodes.iter_mut() {
            node.selected = &node.name == node_id;
        }
        self.zoom_target = Some(position);
        Ok(())
    }
}
