//! Node types: graph vertices, their per-class property registry, and the
//! behavior seam node kinds implement.

use super::execution::ExecutionError;
use super::pin::{DataPin, EditorMeta, Pin, PinDirection, PinId, PinPayload};
use super::value::{Value, ValueType};
use crate::id::IdRegistry;
use egui::{Color32, Pos2, Vec2};
use std::fmt;

/// Unique identifier for a node (session-wide).
pub type NodeId = u64;

/// Declaration of one data property of a node class.
///
/// Each non-dynamic property materializes exactly one data pin per node
/// instance at construction time; `allow_multiple` properties instead grow
/// dynamically named sub-pins on demand.
#[derive(Debug, Clone)]
pub struct PropertySpec {
    pub name: &'static str,
    pub direction: PinDirection,
    pub value_type: ValueType,
    pub default: Value,
    /// The property getter is the source of truth: the pin mirrors the
    /// behavior's `compute()` on every read instead of storing a value.
    pub use_prop_value: bool,
    /// The node may carry any number of dynamically-added pins for this
    /// property (e.g. the value list of a Sum node).
    pub allow_multiple: bool,
    pub meta: EditorMeta,
}

impl PropertySpec {
    pub fn input(name: &'static str, value_type: ValueType, default: Value) -> Self {
        Self {
            name,
            direction: PinDirection::Input,
            value_type,
            default,
            use_prop_value: false,
            allow_multiple: false,
            meta: EditorMeta::default(),
        }
    }

    pub fn output(name: &'static str, value_type: ValueType, default: Value) -> Self {
        Self {
            direction: PinDirection::Output,
            ..Self::input(name, value_type, default)
        }
    }

    /// Marks the property as computed: reads always go through the
    /// behavior's `compute()`.
    pub fn computed(mut self) -> Self {
        self.use_prop_value = true;
        self
    }

    /// Marks the property as a dynamic multi-pin property.
    pub fn dynamic(mut self) -> Self {
        self.allow_multiple = true;
        self
    }

    pub fn with_range(mut self, min: f64, max: f64) -> Self {
        self.meta.min = Some(min);
        self.meta.max = Some(max);
        self
    }

    pub fn multiline(mut self) -> Self {
        self.meta.multiline = true;
        self
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.meta.options = options.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_extra_accepted(mut self, types: &[ValueType]) -> Self {
        self.meta.extra_accepted = types.to_vec();
        self
    }

    pub fn with_doc(mut self, doc: &str) -> Self {
        self.meta.doc = Some(doc.to_string());
        self
    }
}

/// Once-per-class registry describing a node kind: identity, flow pins and
/// data properties. Built once (usually in a lazy static) and shared by all
/// instances of the kind.
#[derive(Debug, Clone)]
pub struct NodeSpec {
    pub type_name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    pub color: Color32,
    pub flow_inputs: Vec<&'static str>,
    pub flow_outputs: Vec<&'static str>,
    pub properties: Vec<PropertySpec>,
}

impl NodeSpec {
    pub fn new(type_name: &'static str, display_name: &'static str, description: &'static str) -> Self {
        Self {
            type_name,
            display_name,
            description,
            color: Color32::from_rgb(60, 60, 60),
            flow_inputs: vec![],
            flow_outputs: vec![],
            properties: vec![],
        }
    }

    pub fn with_color(mut self, color: Color32) -> Self {
        self.color = color;
        self
    }

    /// Adds the default action flow pins: an `Execute` input and a
    /// `Trigger` output.
    pub fn with_flow(self) -> Self {
        self.with_flow_pins(&["Execute"], &["Trigger"])
    }

    pub fn with_flow_pins(mut self, inputs: &[&'static str], outputs: &[&'static str]) -> Self {
        self.flow_inputs = inputs.to_vec();
        self.flow_outputs = outputs.to_vec();
        self
    }

    pub fn with_property(mut self, property: PropertySpec) -> Self {
        self.properties.push(property);
        self
    }

    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|p| p.name == name)
    }
}

/// Resolved input values handed to a behavior, keyed by pin name and
/// grouped by bound property.
#[derive(Debug, Clone, Default)]
pub struct PinValues {
    entries: Vec<(String, Option<String>, Value)>,
}

impl PinValues {
    pub fn push(&mut self, pin_name: &str, property: Option<&str>, value: Value) {
        self.entries
            .push((pin_name.to_string(), property.map(str::to_string), value));
    }

    /// Value of the pin with the given name.
    pub fn get(&self, pin_name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _, _)| name == pin_name)
            .map(|(_, _, value)| value)
    }

    /// Values of every pin bound to the given property, in pin order.
    pub fn for_property<'a>(&'a self, property: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.entries
            .iter()
            .filter(move |(_, prop, _)| prop.as_deref() == Some(property))
            .map(|(_, _, value)| value)
    }

    /// All entries as (pin name, bound property, value).
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>, &Value)> {
        self.entries
            .iter()
            .map(|(name, prop, value)| (name.as_str(), prop.as_deref(), value))
    }

    pub fn f64_of(&self, pin_name: &str) -> f64 {
        self.get(pin_name).and_then(Value::as_f64).unwrap_or(0.0)
    }

    pub fn bool_of(&self, pin_name: &str) -> bool {
        self.get(pin_name).and_then(Value::as_bool).unwrap_or(false)
    }

    pub fn str_of(&self, pin_name: &str) -> String {
        self.get(pin_name).map(Value::to_string).unwrap_or_default()
    }
}

/// What a behavior's `execute()` produced: output values to store on the
/// node's output pins, and names of output flow pins to trigger next, in
/// order.
#[derive(Debug, Clone, Default)]
pub struct ExecOutcome {
    pub outputs: Vec<(String, Value)>,
    pub triggers: Vec<String>,
}

impl ExecOutcome {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_output(mut self, pin_name: &str, value: Value) -> Self {
        self.outputs.push((pin_name.to_string(), value));
        self
    }

    pub fn with_trigger(mut self, flow_pin: &str) -> Self {
        self.triggers.push(flow_pin.to_string());
        self
    }
}

/// Per-kind node logic.
///
/// A node kind provides its [`NodeSpec`] and, depending on the kind, an
/// `execute()` for flow-triggered actions and/or a `compute()` for
/// computed output properties. The default implementations make a plain
/// data node with no logic.
pub trait NodeBehavior {
    /// The class registry for this node kind.
    fn spec(&self) -> &NodeSpec;

    /// Runs this node's action logic with its resolved input values.
    ///
    /// Called when an input flow pin is triggered. The returned outcome
    /// carries output values and follow-up flow triggers; errors are
    /// logged and contained by the caller.
    fn execute(&mut self, inputs: &PinValues) -> Result<ExecOutcome, ExecutionError> {
        let _ = inputs;
        Err(ExecutionError::NotExecutable(
            self.spec().type_name.to_string(),
        ))
    }

    /// Recomputes the value of a `use_prop_value` output property.
    fn compute(&self, property: &str, inputs: &PinValues) -> Option<Value> {
        let _ = (property, inputs);
        None
    }

    /// Write-through hook invoked whenever a bound pin's value is set.
    fn on_property_set(&mut self, property: &str, value: &Value) {
        let _ = (property, value);
    }

    /// Free-form per-kind data to persist in a node configuration.
    fn custom_data(&self) -> serde_json::Value {
        serde_json::Value::Null
    }

    /// Restores data previously produced by `custom_data()`.
    fn restore_custom_data(&mut self, data: &serde_json::Value) {
        let _ = data;
    }
}

/// A vertex in the graph: owns its pins, carries presentation state, and
/// delegates kind-specific logic to its behavior.
pub struct Node {
    pub id: NodeId,
    pub title: String,
    pub position: Pos2,
    pub size: Vec2,
    pub color: Color32,
    pub inputs: Vec<Pin>,
    pub outputs: Vec<Pin>,
    /// If this node can be deleted by user interaction.
    pub can_be_deleted: bool,
    pub behavior: Box<dyn NodeBehavior>,
}

impl Node {
    /// Builds a node from its behavior's spec: flow pins first, then one
    /// data pin per non-dynamic property, in declaration order. Pin ids
    /// come from the `pin` namespace of the given registry.
    pub fn new(id: NodeId, behavior: Box<dyn NodeBehavior>, ids: &mut IdRegistry) -> Self {
        let (title, color, inputs, outputs) = {
            let spec = behavior.spec();
            let pins = ids.namespace("pin");
            let mut inputs = Vec::new();
            let mut outputs = Vec::new();
            for name in &spec.flow_inputs {
                inputs.push(Pin::flow(pins.create(None), *name, PinDirection::Input));
            }
            for name in &spec.flow_outputs {
                outputs.push(Pin::flow(pins.create(None), *name, PinDirection::Output));
            }
            for prop in &spec.properties {
                if prop.allow_multiple {
                    continue;
                }
                let pin = Pin::data(
                    pins.create(None),
                    prop.name,
                    prop.direction,
                    DataPin {
                        value_type: prop.value_type,
                        value: prop.default.clone(),
                        property: Some(prop.name.to_string()),
                        use_prop_value: prop.use_prop_value,
                        meta: prop.meta.clone(),
                    },
                );
                match prop.direction {
                    PinDirection::Input => inputs.push(pin),
                    PinDirection::Output => outputs.push(pin),
                }
            }
            (spec.display_name.to_string(), spec.color, inputs, outputs)
        };
        Self {
            id,
            title,
            position: Pos2::ZERO,
            size: Vec2::new(150.0, 30.0),
            color,
            inputs,
            outputs,
            can_be_deleted: true,
            behavior,
        }
    }

    /// All pins, inputs first.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    pub fn pin(&self, id: PinId) -> Option<&Pin> {
        self.pins().find(|p| p.id == id)
    }

    pub fn pin_mut(&mut self, id: PinId) -> Option<&mut Pin> {
        self.inputs
            .iter_mut()
            .chain(self.outputs.iter_mut())
            .find(|p| p.id == id)
    }

    pub fn get_input_pin(&self, name: &str) -> Option<&Pin> {
        self.inputs.iter().find(|p| p.name == name)
    }

    pub fn get_output_pin(&self, name: &str) -> Option<&Pin> {
        self.outputs.iter().find(|p| p.name == name)
    }

    /// Adds a dynamically named sub-pin for an `allow_multiple` property.
    ///
    /// The pin is named `name` when given, else "<property> N" with N
    /// counting from 1. Returns `None` when the property doesn't exist or
    /// doesn't allow multiple pins.
    pub fn add_dynamic_pin(
        &mut self,
        property: &str,
        name: Option<&str>,
        ids: &mut IdRegistry,
    ) -> Option<PinId> {
        let prop = self
            .behavior
            .spec()
            .properties
            .iter()
            .find(|p| p.name == property && p.allow_multiple)
            .cloned()?;
        let count = self
            .pins()
            .filter(|p| {
                p.as_data()
                    .is_some_and(|d| d.property.as_deref() == Some(property))
            })
            .count();
        let pin_name = match name {
            Some(name) => name.to_string(),
            None => format!("{} {}", prop.name, count + 1),
        };
        let mut pin = Pin::data(
            ids.namespace("pin").create(None),
            pin_name,
            prop.direction,
            DataPin {
                value_type: prop.value_type,
                value: prop.default.clone(),
                property: Some(prop.name.to_string()),
                use_prop_value: prop.use_prop_value,
                meta: prop.meta.clone(),
            },
        );
        pin.dynamic = true;
        pin.can_be_deleted = true;
        let id = pin.id;
        match prop.direction {
            PinDirection::Input => self.inputs.push(pin),
            PinDirection::Output => self.outputs.push(pin),
        }
        Some(id)
    }

    /// Removes a dynamic pin from this node. Links must already have been
    /// severed by the graph. Returns the removed pin.
    pub fn remove_dynamic_pin(&mut self, pin: PinId) -> Option<Pin> {
        let lists = [&mut self.inputs, &mut self.outputs];
        for list in lists {
            if let Some(idx) = list.iter().position(|p| p.id == pin && p.dynamic) {
                return Some(list.remove(idx));
            }
        }
        None
    }

    /// Writes a data pin's local value and forwards it to the behavior's
    /// write-through hook when the pin is property-bound. Returns false
    /// for unknown or flow pins.
    pub fn set_pin_value(&mut self, pin: PinId, value: Value) -> bool {
        let property = {
            let Some(slot) = self
                .inputs
                .iter_mut()
                .chain(self.outputs.iter_mut())
                .find(|p| p.id == pin)
            else {
                return false;
            };
            match &mut slot.payload {
                PinPayload::Data(data) => {
                    data.value = value.clone();
                    data.property.clone()
                }
                PinPayload::Flow => return false,
            }
        };
        if let Some(property) = property {
            self.behavior.on_property_set(&property, &value);
        }
        true
    }

    /// The local (default/stored) value of a data pin, ignoring links.
    pub fn local_value(&self, pin: PinId) -> Option<&Value> {
        self.pin(pin).and_then(|p| p.as_data()).map(|d| &d.value)
    }

    /// Bounding rectangle of this node on the canvas.
    pub fn rect(&self) -> egui::Rect {
        egui::Rect::from_min_size(self.position, self.size)
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("type", &self.behavior.spec().type_name)
            .field("inputs", &self.inputs.len())
            .field("outputs", &self.outputs.len())
            .finish()
    }
}
