//! The node graph: owns nodes and links, enforces linking rules and
//! resolves pin values across links.

use super::link::{Link, LinkId};
use super::node::{Node, NodeBehavior, NodeId, PinValues};
use super::pin::{Pin, PinId, PinKind, PinPayload};
use super::value::Value;
use crate::id::IdRegistry;
use egui::{Pos2, Vec2};
use log::debug;
use std::collections::HashSet;
use thiserror::Error;

const LEVEL_SPACING: f32 = 60.0;
const NODE_SPACING: f32 = 20.0;

/// Why a pin pair cannot be linked.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LinkRejection {
    #[error("pins are of the same kind (need one input and one output)")]
    SameDirection,
    #[error("pins belong to the same node")]
    SameNode,
    #[error("pins are already linked to each other")]
    AlreadyLinked,
    #[error("cannot mix flow and data pins")]
    KindMismatch,
    #[error("output type {from} is not accepted here (expects {to})")]
    TypeMismatch { from: &'static str, to: String },
    #[error("no pin with id {0}")]
    UnknownPin(PinId),
}

/// Container and arbiter for a set of nodes and the links between their
/// pins. All link topology changes go through here so the single-link rule
/// for inputs and type compatibility hold at all times.
#[derive(Debug, Default)]
pub struct NodeGraph {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub ids: IdRegistry,
}

impl NodeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a node from the given behavior and places it on the canvas.
    pub fn spawn(&mut self, behavior: Box<dyn NodeBehavior>, position: Pos2) -> NodeId {
        let id = self.ids.namespace("node").create(None);
        let mut node = Node::new(id, behavior, &mut self.ids);
        node.position = position;
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    /// Finds a pin anywhere in the graph, with its owning node.
    pub fn find_pin(&self, pin: PinId) -> Option<(&Node, &Pin)> {
        self.nodes
            .iter()
            .find_map(|n| n.pin(pin).map(|p| (n, p)))
    }

    /// Adds a dynamic sub-pin with an auto-counted name.
    pub fn add_dynamic_pin(&mut self, node: NodeId, property: &str) -> Option<PinId> {
        self.add_named_dynamic_pin(node, property, None)
    }

    /// Adds a dynamic sub-pin, optionally with an explicit pin name.
    pub fn add_named_dynamic_pin(
        &mut self,
        node: NodeId,
        property: &str,
        name: Option<&str>,
    ) -> Option<PinId> {
        let ids = &mut self.ids;
        let node = self.nodes.iter_mut().find(|n| n.id == node)?;
        node.add_dynamic_pin(property, name, ids)
    }

    /// Removes a dynamic pin, severing any links on it first.
    pub fn remove_dynamic_pin(&mut self, node: NodeId, pin: PinId) -> bool {
        let stale: Vec<LinkId> = self
            .links
            .iter()
            .filter(|l| l.has_pin(pin))
            .map(|l| l.id)
            .collect();
        for link in stale {
            self.remove_link(link);
        }
        let ids = &mut self.ids;
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node) else {
            return false;
        };
        match node.remove_dynamic_pin(pin) {
            Some(removed) => {
                ids.namespace("pin").recycle(removed.id);
                true
            }
            None => false,
        }
    }

    /// Checks whether the two pins could be linked right now, and if not,
    /// why. Either pin may be given first.
    pub fn can_link(&self, a: PinId, b: PinId) -> Result<(), LinkRejection> {
        let (node_a, pin_a) = self.find_pin(a).ok_or(LinkRejection::UnknownPin(a))?;
        let (node_b, pin_b) = self.find_pin(b).ok_or(LinkRejection::UnknownPin(b))?;
        if pin_a.direction == pin_b.direction {
            return Err(LinkRejection::SameDirection);
        }
        if node_a.id == node_b.id {
            return Err(LinkRejection::SameNode);
        }
        if self.links.iter().any(|l| l.connects(a, b)) {
            return Err(LinkRejection::AlreadyLinked);
        }
        let (out_pin, in_pin) = if pin_a.is_output() {
            (pin_a, pin_b)
        } else {
            (pin_b, pin_a)
        };
        match (&out_pin.payload, &in_pin.payload) {
            (PinPayload::Flow, PinPayload::Flow) => Ok(()),
            (PinPayload::Data(out), PinPayload::Data(input)) => {
                if input.accepts(out.value_type) {
                    Ok(())
                } else {
                    Err(LinkRejection::TypeMismatch {
                        from: out.value_type.name(),
                        to: input
                            .accepted_input_types()
                            .iter()
                            .map(|t| t.name())
                            .collect::<Vec<_>>()
                            .join(" or "),
                    })
                }
            }
            _ => Err(LinkRejection::KindMismatch),
        }
    }

    /// Links two pins. Either pin may be given first; the link is stored
    /// output to input. An input pin holds at most one link, so any
    /// existing link into the input side is removed first.
    pub fn link(&mut self, a: PinId, b: PinId) -> Result<LinkId, LinkRejection> {
        self.can_link(a, b)?;
        let (start, end) = {
            let (_, pin_a) = self.find_pin(a).ok_or(LinkRejection::UnknownPin(a))?;
            if pin_a.is_output() {
                (a, b)
            } else {
                (b, a)
            }
        };
        let stale: Vec<LinkId> = self
            .links
            .iter()
            .filter(|l| l.end_pin == end)
            .map(|l| l.id)
            .collect();
        for link in stale {
            self.remove_link(link);
        }
        let (start_node, color, thickness) = {
            let (node, pin) = self
                .find_pin(start)
                .ok_or(LinkRejection::UnknownPin(start))?;
            (node.id, pin.link_color, pin.link_thickness)
        };
        let (end_node, _) = self.find_pin(end).ok_or(LinkRejection::UnknownPin(end))?;
        let end_node = end_node.id;
        let id = self.ids.namespace("link").create(None);
        self.links.push(Link {
            id,
            start_node,
            start_pin: start,
            end_node,
            end_pin: end,
            color,
            thickness,
        });
        Ok(id)
    }

    /// Removes a link by id, recycling its id for reuse.
    pub fn remove_link(&mut self, link: LinkId) -> bool {
        match self.links.iter().position(|l| l.id == link) {
            Some(idx) => {
                let removed = self.links.remove(idx);
                self.ids.namespace("link").recycle(removed.id);
                true
            }
            None => false,
        }
    }

    /// Removes the link between the given pin pair, if one exists.
    pub fn unlink(&mut self, a: PinId, b: PinId) -> bool {
        match self.links.iter().find(|l| l.connects(a, b)).map(|l| l.id) {
            Some(id) => self.remove_link(id),
            None => false,
        }
    }

    /// Removes a node and every link touching it, recycling all their ids.
    pub fn remove_node(&mut self, node: NodeId) -> bool {
        let Some(idx) = self.nodes.iter().position(|n| n.id == node) else {
            return false;
        };
        let stale: Vec<LinkId> = self
            .links
            .iter()
            .filter(|l| l.has_node(node))
            .map(|l| l.id)
            .collect();
        for link in stale {
            self.remove_link(link);
        }
        let removed = self.nodes.remove(idx);
        for pin in removed.pins() {
            self.ids.namespace("pin").recycle(pin.id);
        }
        self.ids.namespace("node").recycle(removed.id);
        true
    }

    /// The single link into the given input pin, if any.
    pub fn input_link(&self, pin: PinId) -> Option<&Link> {
        self.links.iter().find(|l| l.end_pin == pin)
    }

    /// All links touching the given node.
    pub fn links_for_node(&self, node: NodeId) -> Vec<&Link> {
        self.links.iter().filter(|l| l.has_node(node)).collect()
    }

    /// The effective value of a data pin.
    ///
    /// For a linked input pin the value comes from the upstream output pin,
    /// coerced to this pin's declared type. Unlinked input pins and output
    /// pins resolve locally (or through the bound property for computed
    /// outputs). A data-link cycle breaks at the pin that closes it, which
    /// resolves to its stored value instead of recursing.
    pub fn pin_value(&self, pin: PinId) -> Option<Value> {
        let mut resolving = HashSet::new();
        self.pin_value_inner(pin, &mut resolving)
    }

    fn pin_value_inner(&self, pin: PinId, resolving: &mut HashSet<PinId>) -> Option<Value> {
        let (node, p) = self.find_pin(pin)?;
        let data = p.as_data()?;
        if !resolving.insert(pin) {
            debug!("data link cycle at pin {}, using its stored value", pin);
            return Some(data.value.clone());
        }
        let value = if p.is_input() {
            match self
                .input_link(pin)
                .and_then(|link| self.output_value_inner(link.start_pin, resolving))
            {
                Some(upstream) => upstream.coerced_to(data.value_type),
                None => data.value.clone(),
            }
        } else {
            self.output_value_of(node, p, resolving)
                .unwrap_or_else(|| data.value.clone())
        };
        resolving.remove(&pin);
        Some(value)
    }

    /// The value an output pin currently emits.
    pub fn output_value(&self, pin: PinId) -> Option<Value> {
        let mut resolving = HashSet::new();
        self.output_value_inner(pin, &mut resolving)
    }

    fn output_value_inner(&self, pin: PinId, resolving: &mut HashSet<PinId>) -> Option<Value> {
        let (node, p) = self.find_pin(pin)?;
        let data = p.as_data()?;
        if !resolving.insert(pin) {
            debug!("data link cycle at pin {}, using its stored value", pin);
            return Some(data.value.clone());
        }
        let value = self.output_value_of(node, p, resolving);
        resolving.remove(&pin);
        value
    }

    fn output_value_of(
        &self,
        node: &Node,
        pin: &Pin,
        resolving: &mut HashSet<PinId>,
    ) -> Option<Value> {
        let data = pin.as_data()?;
        if data.use_prop_value {
            if let Some(prop) = &data.property {
                let inputs = self.input_values_inner(node.id, resolving);
                if let Some(value) = node.behavior.compute(prop, &inputs) {
                    return Some(value);
                }
            }
        }
        Some(data.value.clone())
    }

    /// Resolves every input data pin of a node into a [`PinValues`] batch.
    pub fn input_values(&self, node: NodeId) -> PinValues {
        let mut resolving = HashSet::new();
        self.input_values_inner(node, &mut resolving)
    }

    fn input_values_inner(&self, node: NodeId, resolving: &mut HashSet<PinId>) -> PinValues {
        let mut values = PinValues::default();
        let Some(node) = self.node(node) else {
            return values;
        };
        for pin in &node.inputs {
            let Some(data) = pin.as_data() else { continue };
            let value = self
                .pin_value_inner(pin.id, resolving)
                .unwrap_or_else(|| data.value.clone());
            values.push(&pin.name, data.property.as_deref(), value);
        }
        values
    }

    /// Sets the local value of a node's pin, looked up by pin name.
    pub fn set_named_value(&mut self, node: NodeId, pin_name: &str, value: Value) -> bool {
        let Some(node) = self.nodes.iter_mut().find(|n| n.id == node) else {
            return false;
        };
        let Some(pin) = node
            .pins()
            .find(|p| p.name == pin_name)
            .map(|p| p.id)
        else {
            return false;
        };
        node.set_pin_value(pin, value)
    }

    /// Walks the graph downstream from `start`, following links out of
    /// output pins whose kind is in `allowed`. The callback receives each
    /// reached node with its depth from the start; returning false stops
    /// descent below that node. Each node is visited at most once.
    pub fn walk_graph<F>(&self, start: NodeId, allowed: &[PinKind], mut callback: F)
    where
        F: FnMut(&Node, usize) -> bool,
    {
        let mut visited = HashSet::new();
        self.walk_inner(start, allowed, 0, &mut visited, &mut callback);
    }

    fn walk_inner<F>(
        &self,
        node_id: NodeId,
        allowed: &[PinKind],
        depth: usize,
        visited: &mut HashSet<NodeId>,
        callback: &mut F,
    ) where
        F: FnMut(&Node, usize) -> bool,
    {
        if !visited.insert(node_id) {
            return;
        }
        let Some(node) = self.node(node_id) else { return };
        if !callback(node, depth) {
            return;
        }
        for pin in &node.outputs {
            if !allowed.contains(&pin.kind()) {
                continue;
            }
            let targets: Vec<NodeId> = self
                .links
                .iter()
                .filter(|l| l.start_pin == pin.id)
                .map(|l| l.end_node)
                .collect();
            for target in targets {
                self.walk_inner(target, allowed, depth + 1, visited, callback);
            }
        }
    }

    /// Lays out the subgraph reachable from `start` in columns by depth.
    ///
    /// The start node anchors the layout; each deeper level is placed one
    /// column to the right, nodes stacked top to bottom in visit order.
    pub fn reposition_from(&mut self, start: NodeId, allowed: &[PinKind]) {
        let Some(anchor) = self.node(start).map(|n| n.position) else {
            return;
        };
        // First pass: per-level extents.
        let mut level_sizes: Vec<Vec2> = Vec::new();
        self.walk_graph(start, allowed, |node, depth| {
            if level_sizes.len() <= depth {
                level_sizes.resize(depth + 1, Vec2::ZERO);
            }
            let slot = &mut level_sizes[depth];
            slot.x = slot.x.max(node.size.x);
            slot.y += node.size.y + NODE_SPACING;
            true
        });
        // Second pass: assign positions.
        let mut cursor_y = vec![0.0_f32; level_sizes.len()];
        let mut moves: Vec<(NodeId, Pos2)> = Vec::new();
        self.walk_graph(start, allowed, |node, depth| {
            let x = anchor.x
                + level_sizes[..depth]
                    .iter()
                    .map(|s| s.x + LEVEL_SPACING)
                    .sum::<f32>();
            let y = anchor.y + cursor_y[depth];
            cursor_y[depth] += node.size.y + NODE_SPACING;
            moves.push((node.id, Pos2::new(x, y)));
            true
        });
        for (id, pos) in moves {
            if let Some(node) = self.node_mut(id) {
                node.position = pos;
            }
        }
    }
}
