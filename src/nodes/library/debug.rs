//! Diagnostic nodes.

use super::colors;
use crate::nodes::execution::ExecutionError;
use crate::nodes::node::{ExecOutcome, NodeBehavior, NodeSpec, PinValues, PropertySpec};
use crate::nodes::value::{Value, ValueType};
use log::info;
use once_cell::sync::Lazy;

static PRINT_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new("Print", "Print", "Logs its text input when triggered.")
        .with_color(colors::DEBUG)
        .with_flow()
        .with_property(
            PropertySpec::input("text", ValueType::Str, Value::Str(String::new())).multiline(),
        )
});

/// Logs a message, then continues the flow.
#[derive(Debug, Default)]
pub struct Print;

impl NodeBehavior for Print {
    fn spec(&self) -> &NodeSpec {
        &PRINT_SPEC
    }

    fn execute(&mut self, inputs: &PinValues) -> Result<ExecOutcome, ExecutionError> {
        info!("{}", inputs.str_of("text"));
        Ok(ExecOutcome::new().with_trigger("Trigger"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::graph::NodeGraph;
    use egui::Pos2;

    #[test]
    fn print_continues_the_flow() {
        let mut graph = NodeGraph::new();
        let print = graph.spawn(Box::new(Print), Pos2::ZERO);
        graph.set_named_value(print, "text", Value::Str("hello".into()));
        let inputs = graph.input_values(print);
        let outcome = Print.execute(&inputs).unwrap();
        assert_eq!(outcome.triggers, vec!["Trigger".to_string()]);
    }
}
