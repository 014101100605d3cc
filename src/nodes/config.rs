//! Configuration snapshots: serializable descriptions of nodes, their
//! values and link topology, able to rebuild an equivalent graph.

use super::graph::NodeGraph;
use super::link::Link;
use super::node::{Node, NodeId};
use super::pin::PinDirection;
use super::registry::NodeRegistry;
use super::value::Value;
use egui::Pos2;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Failure while restoring a graph from its configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown node type '{0}'")]
    UnknownType(String),
    #[error("malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Stable reference id for a node inside a configuration: the type name
/// plus the node's session id. Unique within one snapshot, and meaningless
/// outside it.
fn node_ref_id(node: &Node) -> String {
    format!("{}#{}", node.behavior.spec().type_name, node.id)
}

/// One half of a saved link, from the point of view of one endpoint node.
///
/// Both endpoint nodes record the link; whichever side is restored last is
/// the one that actually re-creates it, since the other ref is only then
/// present in the refs table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PinLinkConfig {
    pub direction: PinDirection,
    pub pin_name: String,
    pub other_ref_id: String,
    pub other_pin_name: String,
}

impl PinLinkConfig {
    /// Describes `link` from the side of `node_id`.
    fn from_link(link: &Link, node_id: NodeId, graph: &NodeGraph) -> Option<Self> {
        let (this_pin, other_node, other_pin) = if link.start_node == node_id {
            (link.start_pin, link.end_node, link.end_pin)
        } else {
            (link.end_pin, link.start_node, link.start_pin)
        };
        let direction = if link.start_node == node_id {
            PinDirection::Output
        } else {
            PinDirection::Input
        };
        let pin_name = graph.find_pin(this_pin)?.1.name.clone();
        let other = graph.node(other_node)?;
        let other_pin_name = other.pin(other_pin)?.name.clone();
        Some(Self {
            direction,
            pin_name,
            other_ref_id: node_ref_id(other),
            other_pin_name,
        })
    }

    /// Re-creates this link half on the restored graph. Silently skipped
    /// when the other node is not in the refs table yet (its own half will
    /// fire once both sides exist).
    fn instantiate(&self, node_id: NodeId, graph: &mut NodeGraph, refs: &BTreeMap<String, NodeId>) {
        let Some(&other_id) = refs.get(&self.other_ref_id) else {
            return;
        };
        let this_pin = graph
            .node(node_id)
            .and_then(|n| n.pins().find(|p| p.name == self.pin_name))
            .map(|p| p.id);
        let other_pin = graph
            .node(other_id)
            .and_then(|n| n.pins().find(|p| p.name == self.other_pin_name))
            .map(|p| p.id);
        let (Some(this_pin), Some(other_pin)) = (this_pin, other_pin) else {
            warn!(
                "saved link {} -> {} names a pin that no longer exists",
                self.pin_name, self.other_pin_name
            );
            return;
        };
        if graph.links.iter().any(|l| l.connects(this_pin, other_pin)) {
            return;
        }
        if let Err(err) = graph.link(this_pin, other_pin) {
            warn!(
                "could not restore link {} -> {}: {}",
                self.pin_name, self.other_pin_name, err
            );
        }
    }
}

/// Saved dynamic sub-pin: which property it belongs to and its name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DynamicPinConfig {
    pub property: String,
    pub pin_name: String,
}

/// Everything needed to rebuild one node: type, placement, stored pin
/// values, dynamic pins, behavior data and both halves of its links.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    pub type_name: String,
    pub ref_id: String,
    #[serde(with = "pos2_serde")]
    pub position: Pos2,
    /// Stored values of data pins, keyed by pin name. Computed pins are
    /// skipped since their value is re-derived.
    pub prop_values: BTreeMap<String, Value>,
    #[serde(default)]
    pub dynamic_pins: Vec<DynamicPinConfig>,
    #[serde(default)]
    pub custom_data: serde_json::Value,
    #[serde(default)]
    pub links: Vec<PinLinkConfig>,
}

impl NodeConfig {
    pub fn from_node(node: &Node, graph: &NodeGraph) -> Self {
        let mut prop_values = BTreeMap::new();
        let mut dynamic_pins = Vec::new();
        for pin in node.pins() {
            if let Some(data) = pin.as_data() {
                if !data.use_prop_value {
                    prop_values.insert(pin.name.clone(), data.value.clone());
                }
                if pin.dynamic {
                    if let Some(property) = &data.property {
                        dynamic_pins.push(DynamicPinConfig {
                            property: property.clone(),
                            pin_name: pin.name.clone(),
                        });
                    }
                }
            }
        }
        let links = graph
            .links_for_node(node.id)
            .into_iter()
            .filter_map(|l| PinLinkConfig::from_link(l, node.id, graph))
            .collect();
        Self {
            type_name: node.behavior.spec().type_name.to_string(),
            ref_id: node_ref_id(node),
            position: node.position,
            prop_values,
            dynamic_pins,
            custom_data: node.behavior.custom_data(),
            links,
        }
    }

    /// Rebuilds this node in `graph`.
    ///
    /// Idempotent per refs table: if this config's ref id is already in
    /// `refs`, the existing node is returned instead of creating a second
    /// one. Each restored node is entered into `refs` before its links are
    /// replayed, so shared snapshots restore each node and link exactly
    /// once.
    pub fn instantiate(
        &self,
        graph: &mut NodeGraph,
        registry: &NodeRegistry,
        refs: &mut BTreeMap<String, NodeId>,
    ) -> Result<NodeId, ConfigError> {
        if let Some(&existing) = refs.get(&self.ref_id) {
            return Ok(existing);
        }
        let mut behavior = registry
            .instantiate(&self.type_name)
            .ok_or_else(|| ConfigError::UnknownType(self.type_name.clone()))?;
        if !self.custom_data.is_null() {
            behavior.restore_custom_data(&self.custom_data);
        }
        let node_id = graph.spawn(behavior, self.position);
        for dynamic in &self.dynamic_pins {
            if graph
                .add_named_dynamic_pin(node_id, &dynamic.property, Some(&dynamic.pin_name))
                .is_none()
            {
                warn!(
                    "node type '{}' no longer has dynamic property '{}'",
                    self.type_name, dynamic.property
                );
            }
        }
        for (pin_name, value) in &self.prop_values {
            if !graph.set_named_value(node_id, pin_name, value.clone()) {
                warn!(
                    "node type '{}' no longer has a pin named '{}'",
                    self.type_name, pin_name
                );
            }
        }
        refs.insert(self.ref_id.clone(), node_id);
        for link in &self.links {
            link.instantiate(node_id, graph, refs);
        }
        Ok(node_id)
    }
}

/// A full graph snapshot: every node config, in creation order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    pub name: String,
    pub nodes: Vec<NodeConfig>,
}

impl SystemConfig {
    /// Snapshots the given graph.
    pub fn from_graph(name: &str, graph: &NodeGraph) -> Self {
        Self {
            name: name.to_string(),
            nodes: graph
                .nodes
                .iter()
                .map(|n| NodeConfig::from_node(n, graph))
                .collect(),
        }
    }

    /// Rebuilds a graph equivalent to the snapshotted one.
    pub fn instantiate(&self, registry: &NodeRegistry) -> Result<NodeGraph, ConfigError> {
        let mut graph = NodeGraph::new();
        let mut refs = BTreeMap::new();
        for node in &self.nodes {
            node.instantiate(&mut graph, registry, &mut refs)?;
        }
        Ok(graph)
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

mod pos2_serde {
    use egui::Pos2;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(pos: &Pos2, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        [pos.x, pos.y].serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Pos2, D::Error>
    where
        D: Deserializer<'de>,
    {
        let [x, y] = <[f32; 2]>::deserialize(deserializer)?;
        Ok(Pos2::new(x, y))
    }
}
