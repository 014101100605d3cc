//! Value operation nodes.

use super::colors;
use crate::nodes::node::{NodeBehavior, NodeSpec, PinValues, PropertySpec};
use crate::nodes::value::{Value, ValueType};
use once_cell::sync::Lazy;

static SUM_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new("Sum", "Sum", "Adds any number of values together.")
        .with_color(colors::OPERATIONS)
        .with_property(
            PropertySpec::input("values", ValueType::Float, Value::Float(0.0))
                .dynamic()
                .with_doc("Values to add. Add as many pins as needed."),
        )
        .with_property(
            PropertySpec::output("result", ValueType::Float, Value::Float(0.0)).computed(),
        )
});

/// Sums its dynamic input pins into a computed `result` output.
#[derive(Debug, Default)]
pub struct Sum;

impl NodeBehavior for Sum {
    fn spec(&self) -> &NodeSpec {
        &SUM_SPEC
    }

    fn compute(&self, property: &str, inputs: &PinValues) -> Option<Value> {
        match property {
            "result" => {
                let total: f64 = inputs
                    .for_property("values")
                    .filter_map(Value::as_f64)
                    .sum();
                Some(Value::Float(total))
            }
            _ => None,
        }
    }
}

static CONCATENATE_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new(
        "Concatenate",
        "Concatenate",
        "Joins any number of texts with a separator.",
    )
    .with_color(colors::OPERATIONS)
    .with_property(
        PropertySpec::input("strings", ValueType::Str, Value::Str(String::new())).dynamic(),
    )
    .with_property(PropertySpec::input(
        "separator",
        ValueType::Str,
        Value::Str(String::new()),
    ))
    .with_property(
        PropertySpec::output("result", ValueType::Str, Value::Str(String::new())).computed(),
    )
});

/// Joins its dynamic string pins with a separator.
#[derive(Debug, Default)]
pub struct Concatenate;

impl NodeBehavior for Concatenate {
    fn spec(&self) -> &NodeSpec {
        &CONCATENATE_SPEC
    }

    fn compute(&self, property: &str, inputs: &PinValues) -> Option<Value> {
        match property {
            "result" => {
                let separator = inputs.str_of("separator");
                let joined = inputs
                    .for_property("strings")
                    .map(Value::to_string)
                    .collect::<Vec<_>>()
                    .join(&separator);
                Some(Value::Str(joined))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::graph::NodeGraph;
    use egui::Pos2;

    #[test]
    fn sum_adds_dynamic_inputs() {
        let mut graph = NodeGraph::new();
        let sum = graph.spawn(Box::new(Sum), Pos2::ZERO);
        let a = graph.add_dynamic_pin(sum, "values").unwrap();
        let b = graph.add_dynamic_pin(sum, "values").unwrap();
        let node = graph.node_mut(sum).unwrap();
        node.set_pin_value(a, Value::Float(2.0));
        node.set_pin_value(b, Value::Float(3.5));
        let result = graph.node(sum).unwrap().get_output_pin("result").unwrap().id;
        assert_eq!(graph.pin_value(result), Some(Value::Float(5.5)));
    }

    #[test]
    fn sum_without_pins_is_zero() {
        let mut graph = NodeGraph::new();
        let sum = graph.spawn(Box::new(Sum), Pos2::ZERO);
        let result = graph.node(sum).unwrap().get_output_pin("result").unwrap().id;
        assert_eq!(graph.pin_value(result), Some(Value::Float(0.0)));
    }

    #[test]
    fn sum_rejects_incompatible_upstream_types() {
        use crate::nodes::library::convert::AssembleVector2;

        let mut graph = NodeGraph::new();
        let sum = graph.spawn(Box::new(Sum), Pos2::ZERO);
        let vec = graph.spawn(Box::new(AssembleVector2), Pos2::ZERO);
        let a = graph.add_dynamic_pin(sum, "values").unwrap();
        graph.node_mut(sum).unwrap().set_pin_value(a, Value::Float(5.0));
        let vector_out = graph.node(vec).unwrap().get_output_pin("vector").unwrap().id;

        assert!(graph.link(vector_out, a).is_err());
        // The failed link leaves the stored value untouched.
        let result = graph.node(sum).unwrap().get_output_pin("result").unwrap().id;
        assert_eq!(graph.pin_value(result), Some(Value::Float(5.0)));
    }

    #[test]
    fn concatenate_joins_with_separator() {
        let mut graph = NodeGraph::new();
        let concat = graph.spawn(Box::new(Concatenate), Pos2::ZERO);
        let a = graph.add_dynamic_pin(concat, "strings").unwrap();
        let b = graph.add_dynamic_pin(concat, "strings").unwrap();
        let node = graph.node_mut(concat).unwrap();
        node.set_pin_value(a, Value::Str("left".into()));
        node.set_pin_value(b, Value::Str("right".into()));
        graph.set_named_value(concat, "separator", Value::Str(", ".into()));
        let result = graph
            .node(concat)
            .unwrap()
            .get_output_pin("result")
            .unwrap()
            .id;
        assert_eq!(graph.pin_value(result), Some(Value::Str("left, right".into())));
    }
}
