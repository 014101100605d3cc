//! Pin types: the connection points on a node.

use super::value::{Value, ValueType};
use egui::Color32;
use serde::{Deserialize, Serialize};

/// Unique identifier for a pin (session-wide).
pub type PinId = u64;

/// Whether a pin receives or emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
}

/// The two families of pins: flow pins carry execution, data pins carry a
/// typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinKind {
    Flow,
    Data,
}

/// Metadata describing how a data pin's value should be edited.
///
/// Attached to the pin so a generic "render all pins for editing" routine
/// can pick an appropriate control without per-type special-casing by the
/// node author.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EditorMeta {
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Drag speed for numeric controls; `None` means a plain field.
    pub speed: Option<f64>,
    pub multiline: bool,
    /// Option names for `Enum`-typed pins.
    pub options: Vec<String>,
    /// Extra value types an input pin accepts besides its own declared type.
    pub extra_accepted: Vec<ValueType>,
    /// Tooltip/help text, usually the bound property's documentation.
    pub doc: Option<String>,
}

/// The data payload of a data pin.
#[derive(Debug, Clone)]
pub struct DataPin {
    pub value_type: ValueType,
    /// Locally stored value. For input pins this is the default used when
    /// no link is present; the effective value may come from an upstream
    /// link instead.
    pub value: Value,
    /// Name of the node property this pin is bound to, if any.
    pub property: Option<String>,
    /// When set, the bound property is the source of truth: reading this
    /// output pin recomputes the property instead of using `value`.
    pub use_prop_value: bool,
    pub meta: EditorMeta,
}

impl DataPin {
    /// The set of types this input pin accepts from an upstream output.
    pub fn accepted_input_types(&self) -> Vec<ValueType> {
        let mut types = vec![self.value_type];
        types.extend(self.meta.extra_accepted.iter().copied());
        types
    }

    /// Checks if an upstream value of `out_type` may link into this pin.
    pub fn accepts(&self, out_type: ValueType) -> bool {
        self.accepted_input_types()
            .iter()
            .any(|t| out_type.can_connect_to(t))
    }
}

/// Flow- or data-specific part of a pin.
#[derive(Debug, Clone)]
pub enum PinPayload {
    Flow,
    Data(DataPin),
}

/// A connection point on a node.
#[derive(Debug, Clone)]
pub struct Pin {
    pub id: PinId,
    pub name: String,
    pub direction: PinDirection,
    pub payload: PinPayload,
    /// Default color for links created from this pin (used when this is an
    /// output pin).
    pub link_color: Color32,
    /// Default thickness for link lines created from this pin.
    pub link_thickness: f32,
    pub tooltip: Option<String>,
    pub can_be_deleted: bool,
    /// True for sub-pins added after construction (dynamic properties).
    pub dynamic: bool,
}

impl Pin {
    /// Creates a flow pin.
    pub fn flow(id: PinId, name: impl Into<String>, direction: PinDirection) -> Self {
        Self {
            id,
            name: name.into(),
            direction,
            payload: PinPayload::Flow,
            link_color: Color32::WHITE,
            link_thickness: 1.0,
            tooltip: None,
            can_be_deleted: false,
            dynamic: false,
        }
    }

    /// Creates a data pin. The link color defaults to the value type's
    /// display color.
    pub fn data(id: PinId, name: impl Into<String>, direction: PinDirection, data: DataPin) -> Self {
        let color = data.value_type.color();
        let tooltip = data.meta.doc.clone();
        Self {
            id,
            name: name.into(),
            direction,
            payload: PinPayload::Data(data),
            link_color: color,
            link_thickness: 1.0,
            tooltip,
            can_be_deleted: false,
            dynamic: false,
        }
    }

    pub fn is_input(&self) -> bool {
        self.direction == PinDirection::Input
    }

    pub fn is_output(&self) -> bool {
        self.direction == PinDirection::Output
    }

    pub fn kind(&self) -> PinKind {
        match self.payload {
            PinPayload::Flow => PinKind::Flow,
            PinPayload::Data(_) => PinKind::Data,
        }
    }

    pub fn as_data(&self) -> Option<&DataPin> {
        match &self.payload {
            PinPayload::Data(data) => Some(data),
            PinPayload::Flow => None,
        }
    }

    pub fn as_data_mut(&mut self) -> Option<&mut DataPin> {
        match &mut self.payload {
            PinPayload::Data(data) => Some(data),
            PinPayload::Flow => None,
        }
    }
}
