//! Editor gesture state: link queries during drag, context menu targets,
//! the background creation menu and deletion handling.

use super::graph::{LinkRejection, NodeGraph};
use super::link::LinkId;
use super::node::{NodeBehavior, NodeId};
use super::pin::{PinDirection, PinId};
use egui::Pos2;
use log::debug;

/// Callback opening the node creation menu. Receives the pin a link drag
/// started from (if any) and returns the behavior for the chosen node type,
/// or `None` when the user dismissed the menu.
pub type BackgroundMenu = Box<dyn FnMut(Option<PinId>) -> Option<Box<dyn NodeBehavior>>>;

/// Interaction layer over a [`NodeGraph`].
///
/// A rendering backend drives this during its frame loop: it reports drag
/// and click gestures here, and reads back selection and menu state to
/// draw. The editor never renders anything itself.
#[derive(Default)]
pub struct NodeEditor {
    pub graph: NodeGraph,
    background_menu: Option<BackgroundMenu>,
    /// Pin a pending node creation should auto-link to, captured when the
    /// creation menu was opened from a link drag.
    create_to_pin: Option<PinId>,
    selected_node: Option<NodeId>,
    selected_pin: Option<PinId>,
    selected_link: Option<LinkId>,
}

impl NodeEditor {
    pub fn new(graph: NodeGraph) -> Self {
        Self {
            graph,
            ..Self::default()
        }
    }

    /// Installs the node creation menu callback.
    pub fn set_background_menu(&mut self, menu: BackgroundMenu) {
        self.background_menu = Some(menu);
    }

    /// Checks a link drag hovering over a target pin. `Ok` means the drop
    /// would create the link; `Err` carries the reason to show as feedback
    /// (its `to_string()` is the user-facing message).
    pub fn query_link(&self, from: PinId, to: PinId) -> Result<(), LinkRejection> {
        self.graph.can_link(from, to)
    }

    /// Completes a link drag dropped on a target pin.
    pub fn accept_link(&mut self, from: PinId, to: PinId) -> Result<LinkId, LinkRejection> {
        self.graph.link(from, to)
    }

    /// Opens the background creation menu. When `from_pin` is given (link
    /// drag released on empty canvas), the node created from the menu is
    /// auto-linked back to that pin.
    pub fn open_background_menu(&mut self, from_pin: Option<PinId>) {
        self.create_to_pin = from_pin;
    }

    /// Runs the creation menu callback and, if the user picked a type,
    /// spawns the node at `position` and auto-links it to the originating
    /// pin when there is one.
    pub fn confirm_background_menu(&mut self, position: Pos2) -> Option<NodeId> {
        let from_pin = self.create_to_pin.take();
        let behavior = self.background_menu.as_mut()?(from_pin)?;
        let node = self.graph.spawn(behavior, position);
        if let Some(pin) = from_pin {
            self.try_link_node_to_pin(node, pin);
        }
        Some(node)
    }

    /// Links the first compatible pin of `node` to `pin`. Candidate pins
    /// are taken from the side opposite to `pin`'s direction, in order;
    /// the first pair the graph accepts wins.
    pub fn try_link_node_to_pin(&mut self, node: NodeId, pin: PinId) -> Option<LinkId> {
        let direction = self.graph.find_pin(pin).map(|(_, p)| p.direction)?;
        let candidates: Vec<PinId> = {
            let node = self.graph.node(node)?;
            let side = match direction {
                PinDirection::Output => &node.inputs,
                PinDirection::Input => &node.outputs,
            };
            side.iter().map(|p| p.id).collect()
        };
        for candidate in candidates {
            match self.graph.link(pin, candidate) {
                Ok(id) => return Some(id),
                Err(err) => debug!("auto-link candidate rejected: {}", err),
            }
        }
        None
    }

    /// Deletes the given nodes and links, skipping anything marked
    /// undeletable. Returns how many nodes were actually removed.
    pub fn apply_deletions(&mut self, nodes: &[NodeId], links: &[LinkId]) -> usize {
        for link in links {
            self.graph.remove_link(*link);
        }
        let mut removed = 0;
        for node in nodes {
            let deletable = self
                .graph
                .node(*node)
                .is_some_and(|n| n.can_be_deleted);
            if deletable && self.graph.remove_node(*node) {
                removed += 1;
            }
        }
        self.clear_context();
        removed
    }

    pub fn open_node_context_menu(&mut self, node: NodeId) {
        self.clear_context();
        self.selected_node = Some(node);
    }

    pub fn open_pin_context_menu(&mut self, pin: PinId) {
        self.clear_context();
        self.selected_pin = Some(pin);
        self.selected_node = self.graph.find_pin(pin).map(|(n, _)| n.id);
    }

    pub fn open_link_context_menu(&mut self, link: LinkId) {
        self.clear_context();
        self.selected_link = Some(link);
    }

    pub fn context_node(&self) -> Option<NodeId> {
        self.selected_node
    }

    pub fn context_pin(&self) -> Option<PinId> {
        self.selected_pin
    }

    pub fn context_link(&self) -> Option<LinkId> {
        self.selected_link
    }

    pub fn clear_context(&mut self) {
        self.selected_node = None;
        self.selected_pin = None;
        self.selected_link = None;
    }
}
