//! Control-flow nodes.

use super::colors;
use crate::nodes::execution::ExecutionError;
use crate::nodes::node::{ExecOutcome, NodeBehavior, NodeSpec, PinValues, PropertySpec};
use crate::nodes::value::{Value, ValueType};
use once_cell::sync::Lazy;

static BRANCH_SPEC: Lazy<NodeSpec> = Lazy::new(|| {
    NodeSpec::new(
        "Branch",
        "Branch",
        "Continues along the True or False flow pin depending on its condition.",
    )
    .with_color(colors::LOGIC)
    .with_flow_pins(&["Execute"], &["True", "False"])
    .with_property(PropertySpec::input(
        "condition",
        ValueType::Bool,
        Value::Bool(false),
    ))
});

/// If/else for action flow.
#[derive(Debug, Default)]
pub struct Branch;

impl NodeBehavior for Branch {
    fn spec(&self) -> &NodeSpec {
        &BRANCH_SPEC
    }

    fn execute(&mut self, inputs: &PinValues) -> Result<ExecOutcome, ExecutionError> {
        let pin = if inputs.bool_of("condition") {
            "True"
        } else {
            "False"
        };
        Ok(ExecOutcome::new().with_trigger(pin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::graph::NodeGraph;
    use egui::Pos2;
    use std::cell::RefCell;
    use std::rc::Rc;

    static RECORDER_SPEC: Lazy<NodeSpec> =
        Lazy::new(|| NodeSpec::new("Recorder", "Recorder", "Records that it ran.").with_flow());

    struct Recorder {
        label: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl NodeBehavior for Recorder {
        fn spec(&self) -> &NodeSpec {
            &RECORDER_SPEC
        }

        fn execute(&mut self, _inputs: &PinValues) -> Result<ExecOutcome, ExecutionError> {
            self.log.borrow_mut().push(self.label);
            Ok(ExecOutcome::new())
        }
    }

    #[test]
    fn branch_picks_the_matching_flow_pin() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = NodeGraph::new();
        let branch = graph.spawn(Box::new(Branch), Pos2::ZERO);
        let yes = graph.spawn(Box::new(Recorder { label: "yes", log: log.clone() }), Pos2::ZERO);
        let no = graph.spawn(Box::new(Recorder { label: "no", log: log.clone() }), Pos2::ZERO);
        let pin = |graph: &NodeGraph, node, name: &str| {
            graph
                .node(node)
                .and_then(|n| n.pins().find(|p| p.name == name))
                .map(|p| p.id)
                .unwrap()
        };
        graph
            .link(pin(&graph, branch, "True"), pin(&graph, yes, "Execute"))
            .unwrap();
        graph
            .link(pin(&graph, branch, "False"), pin(&graph, no, "Execute"))
            .unwrap();

        graph.set_named_value(branch, "condition", Value::Bool(true));
        graph.trigger_pin(pin(&graph, branch, "Execute"));
        assert_eq!(*log.borrow(), vec!["yes"]);

        graph.set_named_value(branch, "condition", Value::Bool(false));
        graph.trigger_pin(pin(&graph, branch, "Execute"));
        assert_eq!(*log.borrow(), vec!["yes", "no"]);
    }
}
