//! Value construction and conversion nodes.

use super::colors;
use crate::nodes::node::{NodeBehavior, NodeSpec, PinValues, PropertySpec};
use crate::nodes::value::{Value, ValueType};
use egui::{Color32, Vec2};
use once_cell::sync::Lazy;

static CREATE_FLOAT_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new("CreateFloat", "Create Float", "A constant float value.")
        .with_color(colors::CONVERSION)
        .with_property(PropertySpec::output("value", ValueType::Float, Value::Float(0.0)))
});

/// Emits a user-edited constant float.
#[derive(Debug, Default)]
pub struct CreateFloat;

impl NodeBehavior for CreateFloat {
    fn spec(&self) -> &NodeSpec {
        &CREATE_FLOAT_SPEC
    }
}

static CREATE_TEXT_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new("CreateText", "Create Text", "A constant text value.")
        .with_color(colors::CONVERSION)
        .with_property(
            PropertySpec::output("text", ValueType::Str, Value::Str(String::new())).multiline(),
        )
});

/// Emits a user-edited constant text.
#[derive(Debug, Default)]
pub struct CreateText;

impl NodeBehavior for CreateText {
    fn spec(&self) -> &NodeSpec {
        &CREATE_TEXT_SPEC
    }
}

static ASSEMBLE_VECTOR2_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new(
        "AssembleVector2",
        "Assemble Vector2",
        "Builds a 2D vector from its X and Y components.",
    )
    .with_color(colors::CONVERSION)
    .with_property(PropertySpec::input("x", ValueType::Float, Value::Float(0.0)))
    .with_property(PropertySpec::input("y", ValueType::Float, Value::Float(0.0)))
    .with_property(
        PropertySpec::output("vector", ValueType::Vec2, Value::Vec2(Vec2::ZERO)).computed(),
    )
});

#[derive(Debug, Default)]
pub struct AssembleVector2;

impl NodeBehavior for AssembleVector2 {
    fn spec(&self) -> &NodeSpec {
        &ASSEMBLE_VECTOR2_SPEC
    }

    fn compute(&self, property: &str, inputs: &PinValues) -> Option<Value> {
        match property {
            "vector" => Some(Value::Vec2(Vec2::new(
                inputs.f64_of("x") as f32,
                inputs.f64_of("y") as f32,
            ))),
            _ => None,
        }
    }
}

static BREAK_VECTOR2_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new(
        "BreakVector2",
        "Break Vector2",
        "Splits a 2D vector into its X and Y components.",
    )
    .with_color(colors::CONVERSION)
    .with_property(PropertySpec::input(
        "vector",
        ValueType::Vec2,
        Value::Vec2(Vec2::ZERO),
    ))
    .with_property(PropertySpec::output("x", ValueType::Float, Value::Float(0.0)).computed())
    .with_property(PropertySpec::output("y", ValueType::Float, Value::Float(0.0)).computed())
});

#[derive(Debug, Default)]
pub struct BreakVector2;

impl NodeBehavior for BreakVector2 {
    fn spec(&self) -> &NodeSpec {
        &BREAK_VECTOR2_SPEC
    }

    fn compute(&self, property: &str, inputs: &PinValues) -> Option<Value> {
        let vector = match inputs.get("vector") {
            Some(Value::Vec2(v)) => *v,
            _ => Vec2::ZERO,
        };
        match property {
            "x" => Some(Value::Float(vector.x as f64)),
            "y" => Some(Value::Float(vector.y as f64)),
            _ => None,
        }
    }
}

static ASSEMBLE_COLOR_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new(
        "AssembleColor",
        "Assemble Color",
        "Builds a color from its R, G, B, A components in the [0, 1] range.",
    )
    .with_color(colors::CONVERSION)
    .with_property(
        PropertySpec::input("r", ValueType::Float, Value::Float(1.0)).with_range(0.0, 1.0),
    )
    .with_property(
        PropertySpec::input("g", ValueType::Float, Value::Float(1.0)).with_range(0.0, 1.0),
    )
    .with_property(
        PropertySpec::input("b", ValueType::Float, Value::Float(1.0)).with_range(0.0, 1.0),
    )
    .with_property(
        PropertySpec::input("a", ValueType::Float, Value::Float(1.0)).with_range(0.0, 1.0),
    )
    .with_property(
        PropertySpec::output("color", ValueType::Color, Value::Color(Color32::WHITE)).computed(),
    )
});

fn channel(component: f64) -> u8 {
    (component.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Debug, Default)]
pub struct AssembleColor;

impl NodeBehavior for AssembleColor {
    fn spec(&self) -> &NodeSpec {
        &ASSEMBLE_COLOR_SPEC
    }

    fn compute(&self, property: &str, inputs: &PinValues) -> Option<Value> {
        match property {
            "color" => Some(Value::Color(Color32::from_rgba_unmultiplied(
                channel(inputs.f64_of("r")),
                channel(inputs.f64_of("g")),
                channel(inputs.f64_of("b")),
                channel(inputs.f64_of("a")),
            ))),
            _ => None,
        }
    }
}

static BREAK_COLOR_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new(
        "BreakColor",
        "Break Color",
        "Splits a color into its R, G, B, A components in the [0, 1] range.",
    )
    .with_color(colors::CONVERSION)
    .with_property(PropertySpec::input(
        "color",
        ValueType::Color,
        Value::Color(Color32::WHITE),
    ))
    .with_property(PropertySpec::output("r", ValueType::Float, Value::Float(0.0)).computed())
    .with_property(PropertySpec::output("g", ValueType::Float, Value::Float(0.0)).computed())
    .with_property(PropertySpec::output("b", ValueType::Float, Value::Float(0.0)).computed())
    .with_property(PropertySpec::output("a", ValueType::Float, Value::Float(0.0)).computed())
});

#[derive(Debug, Default)]
pub struct BreakColor;

impl NodeBehavior for BreakColor {
    fn spec(&self) -> &NodeSpec {
        &BREAK_COLOR_SPEC
    }

    fn compute(&self, property: &str, inputs: &PinValues) -> Option<Value> {
        let color = match inputs.get("color") {
            Some(Value::Color(c)) => *c,
            _ => Color32::WHITE,
        };
        let component = match property {
            "r" => color.r(),
            "g" => color.g(),
            "b" => color.b(),
            "a" => color.a(),
            _ => return None,
        };
        Some(Value::Float(component as f64 / 255.0))
    }
}

static FORMAT_TEXT_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new(
        "FormatText",
        "Format Text",
        "Substitutes {pin name} placeholders in a template with pin values.",
    )
    .with_color(colors::CONVERSION)
    .with_property(
        PropertySpec::input("template", ValueType::Str, Value::Str(String::new())).multiline(),
    )
    .with_property(
        PropertySpec::input("args", ValueType::Str, Value::Str(String::new()))
            .dynamic()
            .with_extra_accepted(&[ValueType::Float, ValueType::Int, ValueType::Bool])
            .with_doc("Named values referenced from the template as {pin name}."),
    )
    .with_property(
        PropertySpec::output("result", ValueType::Str, Value::Str(String::new())).computed(),
    )
});

/// String interpolation over named dynamic pins.
#[derive(Debug, Default)]
pub struct FormatText;

impl NodeBehavior for FormatText {
    fn spec(&self) -> &NodeSpec {
        &FORMAT_TEXT_SPEC
    }

    fn compute(&self, property: &str, inputs: &PinValues) -> Option<Value> {
        match property {
            "result" => {
                let mut text = inputs.str_of("template");
                for (pin_name, bound, value) in inputs.iter() {
                    if bound == Some("args") {
                        text = text.replace(&format!("{{{}}}", pin_name), &value.to_string());
                    }
                }
                Some(Value::Str(text))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::graph::NodeGraph;
    use crate::nodes::pin::PinId;
    use egui::Pos2;

    fn pin_of(graph: &NodeGraph, node: u64, name: &str) -> PinId {
        graph
            .node(node)
            .and_then(|n| n.pins().find(|p| p.name == name))
            .map(|p| p.id)
            .unwrap()
    }

    #[test]
    fn assemble_then_break_preserves_components() {
        let mut graph = NodeGraph::new();
        let assemble = graph.spawn(Box::new(AssembleVector2), Pos2::ZERO);
        let break_node = graph.spawn(Box::new(BreakVector2), Pos2::ZERO);
        graph.set_named_value(assemble, "x", Value::Float(3.0));
        graph.set_named_value(assemble, "y", Value::Float(4.0));
        graph
            .link(
                pin_of(&graph, assemble, "vector"),
                pin_of(&graph, break_node, "vector"),
            )
            .unwrap();

        assert_eq!(
            graph.pin_value(pin_of(&graph, break_node, "x")),
            Some(Value::Float(3.0))
        );
        assert_eq!(
            graph.pin_value(pin_of(&graph, break_node, "y")),
            Some(Value::Float(4.0))
        );
    }

    #[test]
    fn assemble_then_break_color_preserves_exact_channels() {
        let mut graph = NodeGraph::new();
        let assemble = graph.spawn(Box::new(AssembleColor), Pos2::ZERO);
        let break_node = graph.spawn(Box::new(BreakColor), Pos2::ZERO);
        graph.set_named_value(assemble, "r", Value::Float(1.0));
        graph.set_named_value(assemble, "g", Value::Float(0.0));
        graph.set_named_value(assemble, "b", Value::Float(1.0));
        graph.set_named_value(assemble, "a", Value::Float(1.0));
        graph
            .link(
                pin_of(&graph, assemble, "color"),
                pin_of(&graph, break_node, "color"),
            )
            .unwrap();

        assert_eq!(
            graph.pin_value(pin_of(&graph, assemble, "color")),
            Some(Value::Color(Color32::from_rgba_unmultiplied(255, 0, 255, 255)))
        );
        assert_eq!(
            graph.pin_value(pin_of(&graph, break_node, "r")),
            Some(Value::Float(1.0))
        );
        assert_eq!(
            graph.pin_value(pin_of(&graph, break_node, "g")),
            Some(Value::Float(0.0))
        );
    }

    #[test]
    fn assemble_color_clamps_out_of_range_components() {
        let mut graph = NodeGraph::new();
        let assemble = graph.spawn(Box::new(AssembleColor), Pos2::ZERO);
        graph.set_named_value(assemble, "r", Value::Float(2.5));
        graph.set_named_value(assemble, "g", Value::Float(-1.0));
        assert_eq!(
            graph.pin_value(pin_of(&graph, assemble, "color")),
            Some(Value::Color(Color32::from_rgba_unmultiplied(255, 0, 255, 255)))
        );
    }

    #[test]
    fn assemble_break_cycle_resolves_without_recursing() {
        let mut graph = NodeGraph::new();
        let assemble = graph.spawn(Box::new(AssembleVector2), Pos2::ZERO);
        let break_node = graph.spawn(Box::new(BreakVector2), Pos2::ZERO);
        graph.set_named_value(assemble, "y", Value::Float(4.0));
        graph
            .link(
                pin_of(&graph, assemble, "vector"),
                pin_of(&graph, break_node, "vector"),
            )
            .unwrap();
        // Feeding a component back into the assembler closes a data cycle;
        // both links pass the per-pair checks.
        graph
            .link(
                pin_of(&graph, break_node, "x"),
                pin_of(&graph, assemble, "x"),
            )
            .unwrap();

        // The cycle breaks at the stored value (the vector default), so x
        // settles to zero while y still flows through.
        assert_eq!(
            graph.pin_value(pin_of(&graph, break_node, "x")),
            Some(Value::Float(0.0))
        );
        assert_eq!(
            graph.pin_value(pin_of(&graph, break_node, "y")),
            Some(Value::Float(4.0))
        );
    }

    #[test]
    fn format_text_substitutes_named_pins() {
        let mut graph = NodeGraph::new();
        let fmt = graph.spawn(Box::new(FormatText), Pos2::ZERO);
        let name = graph
            .add_named_dynamic_pin(fmt, "args", Some("name"))
            .unwrap();
        let count = graph
            .add_named_dynamic_pin(fmt, "args", Some("count"))
            .unwrap();
        let node = graph.node_mut(fmt).unwrap();
        node.set_pin_value(name, Value::Str("widget".into()));
        node.set_pin_value(count, Value::Int(3));
        graph.set_named_value(
            fmt,
            "template",
            Value::Str("{count} copies of {name}".into()),
        );

        assert_eq!(
            graph.pin_value(pin_of(&graph, fmt, "result")),
            Some(Value::Str("3 copies of widget".into()))
        );
    }

    #[test]
    fn format_args_accept_numeric_links() {
        let mut graph = NodeGraph::new();
        let fmt = graph.spawn(Box::new(FormatText), Pos2::ZERO);
        let float = graph.spawn(Box::new(CreateFloat), Pos2::ZERO);
        let arg = graph.add_named_dynamic_pin(fmt, "args", Some("n")).unwrap();
        assert!(graph
            .can_link(pin_of(&graph, float, "value"), arg)
            .is_ok());
    }
}
