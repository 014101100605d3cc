//! Links: the connection between an output pin and an input pin on two
//! different nodes.

use super::node::NodeId;
use super::pin::PinId;
use egui::Color32;

/// Unique identifier for a link (session-wide).
pub type LinkId = u64;

/// The association between one output pin (start) and one input pin (end).
///
/// Endpoints never change after creation; presentation data is inherited
/// from the start pin's defaults when the link is made. Lifecycle is driven
/// by the graph: links die with an explicit unlink, with either endpoint
/// pin, or with either parent node.
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: LinkId,
    pub start_node: NodeId,
    pub start_pin: PinId,
    pub end_node: NodeId,
    pub end_pin: PinId,
    pub color: Color32,
    pub thickness: f32,
}

impl Link {
    /// Checks if the given pin is the start or end point of this link.
    pub fn has_pin(&self, pin: PinId) -> bool {
        self.start_pin == pin || self.end_pin == pin
    }

    /// Checks if this link touches the given node on either side.
    pub fn has_node(&self, node: NodeId) -> bool {
        self.start_node == node || self.end_node == node
    }

    /// Checks if this link connects exactly the given pin pair, in either
    /// order.
    pub fn connects(&self, a: PinId, b: PinId) -> bool {
        (self.start_pin == a && self.end_pin == b) || (self.start_pin == b && self.end_pin == a)
    }
}
