//! Flow-pin execution: triggering input flow pins runs node actions and
//! propagates through output flow links.

use super::graph::NodeGraph;
use super::node::NodeId;
use super::pin::{PinDirection, PinId, PinKind};
use log::{debug, error, warn};
use std::collections::HashSet;
use thiserror::Error;

/// Failure produced by a node's `execute()`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExecutionError {
    #[error("node type '{0}' is not executable")]
    NotExecutable(String),
    #[error("missing required input '{0}'")]
    MissingInput(String),
    #[error("{0}")]
    Failed(String),
}

impl NodeGraph {
    /// Triggers a flow pin.
    ///
    /// Triggering an input flow pin executes its node; triggering an output
    /// flow pin propagates to every linked input flow pin downstream. A
    /// node that fails logs the error and stops its own branch without
    /// aborting siblings, and each node executes at most once per trigger
    /// pass even if flow links form a cycle.
    pub fn trigger_pin(&mut self, pin: PinId) {
        let mut executed = HashSet::new();
        self.trigger_inner(pin, &mut executed);
    }

    /// Triggers a node's output flow pin by name.
    pub fn trigger_flow(&mut self, node: NodeId, flow_pin: &str) {
        let Some(pin) = self
            .node(node)
            .and_then(|n| n.get_output_pin(flow_pin))
            .map(|p| p.id)
        else {
            warn!("node {} has no output flow pin '{}'", node, flow_pin);
            return;
        };
        self.trigger_pin(pin);
    }

    fn trigger_inner(&mut self, pin: PinId, executed: &mut HashSet<NodeId>) {
        let Some((node_id, direction, kind)) = self
            .find_pin(pin)
            .map(|(n, p)| (n.id, p.direction, p.kind()))
        else {
            warn!("triggered unknown pin {}", pin);
            return;
        };
        if kind != PinKind::Flow {
            warn!("pin {} is a data pin and cannot be triggered", pin);
            return;
        }
        match direction {
            PinDirection::Input => self.execute_node(node_id, executed),
            PinDirection::Output => {
                let targets: Vec<PinId> = self
                    .links
                    .iter()
                    .filter(|l| l.start_pin == pin)
                    .map(|l| l.end_pin)
                    .collect();
                for target in targets {
                    self.trigger_inner(target, executed);
                }
            }
        }
    }

    fn execute_node(&mut self, node_id: NodeId, executed: &mut HashSet<NodeId>) {
        if !executed.insert(node_id) {
            debug!("node {} already executed this pass, skipping", node_id);
            return;
        }
        let inputs = self.input_values(node_id);
        let outcome = {
            let Some(node) = self.node_mut(node_id) else { return };
            match node.behavior.execute(&inputs) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!(
                        "error while executing node '{}' ({}): {}",
                        node.title, node_id, err
                    );
                    return;
                }
            }
        };
        for (pin_name, value) in outcome.outputs {
            if !self.set_named_value(node_id, &pin_name, value) {
                warn!("node {} has no output pin '{}'", node_id, pin_name);
            }
        }
        for flow_name in outcome.triggers {
            let Some(pin) = self
                .node(node_id)
                .and_then(|n| n.get_output_pin(&flow_name))
                .map(|p| p.id)
            else {
                warn!("node {} has no output flow pin '{}'", node_id, flow_name);
                continue;
            };
            self.trigger_inner(pin, executed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nodes::node::{ExecOutcome, NodeBehavior, NodeSpec, PinValues};
    use egui::Pos2;
    use once_cell::sync::Lazy;
    use std::cell::RefCell;
    use std::rc::Rc;

    static STEP_SPEC: Lazy<NodeSpec> =
        Lazy::new(|| NodeSpec::new("Step", "Step", "Records that it ran.").with_flow());

    struct Step {
        label: &'static str,
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl NodeBehavior for Step {
        fn spec(&self) -> &NodeSpec {
            &STEP_SPEC
        }

        fn execute(&mut self, _inputs: &PinValues) -> Result<ExecOutcome, ExecutionError> {
            self.log.borrow_mut().push(self.label);
            Ok(ExecOutcome::new().with_trigger("Trigger"))
        }
    }

    struct Failing {
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl NodeBehavior for Failing {
        fn spec(&self) -> &NodeSpec {
            &STEP_SPEC
        }

        fn execute(&mut self, _inputs: &PinValues) -> Result<ExecOutcome, ExecutionError> {
            self.log.borrow_mut().push("failing");
            Err(ExecutionError::Failed("deliberate failure".into()))
        }
    }

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn flow_pin(graph: &NodeGraph, node: u64, name: &str) -> u64 {
        graph
            .node(node)
            .and_then(|n| n.pins().find(|p| p.name == name))
            .map(|p| p.id)
            .unwrap()
    }

    #[test]
    fn trigger_propagates_in_link_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = NodeGraph::new();
        let a = graph.spawn(Box::new(Step { label: "a", log: log.clone() }), Pos2::ZERO);
        let b = graph.spawn(Box::new(Step { label: "b", log: log.clone() }), Pos2::ZERO);
        let c = graph.spawn(Box::new(Step { label: "c", log: log.clone() }), Pos2::ZERO);
        graph
            .link(flow_pin(&graph, a, "Trigger"), flow_pin(&graph, b, "Execute"))
            .unwrap();
        graph
            .link(flow_pin(&graph, b, "Trigger"), flow_pin(&graph, c, "Execute"))
            .unwrap();

        graph.trigger_pin(flow_pin(&graph, a, "Execute"));
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn failure_stops_its_branch_but_not_siblings() {
        init_logs();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = NodeGraph::new();
        let a = graph.spawn(Box::new(Step { label: "a", log: log.clone() }), Pos2::ZERO);
        let bad = graph.spawn(Box::new(Failing { log: log.clone() }), Pos2::ZERO);
        let after_bad = graph.spawn(Box::new(Step { label: "after-bad", log: log.clone() }), Pos2::ZERO);
        let sibling = graph.spawn(Box::new(Step { label: "sibling", log: log.clone() }), Pos2::ZERO);
        graph
            .link(flow_pin(&graph, a, "Trigger"), flow_pin(&graph, bad, "Execute"))
            .unwrap();
        graph
            .link(flow_pin(&graph, bad, "Trigger"), flow_pin(&graph, after_bad, "Execute"))
            .unwrap();
        graph
            .link(flow_pin(&graph, a, "Trigger"), flow_pin(&graph, sibling, "Execute"))
            .unwrap();

        graph.trigger_pin(flow_pin(&graph, a, "Execute"));
        let ran = log.borrow();
        assert!(ran.contains(&"failing"));
        assert!(!ran.contains(&"after-bad"));
        assert!(ran.contains(&"sibling"));
    }

    #[test]
    fn flow_cycles_execute_each_node_once_per_pass() {
        init_logs();
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut graph = NodeGraph::new();
        let a = graph.spawn(Box::new(Step { label: "a", log: log.clone() }), Pos2::ZERO);
        let b = graph.spawn(Box::new(Step { label: "b", log: log.clone() }), Pos2::ZERO);
        graph
            .link(flow_pin(&graph, a, "Trigger"), flow_pin(&graph, b, "Execute"))
            .unwrap();
        graph
            .link(flow_pin(&graph, b, "Trigger"), flow_pin(&graph, a, "Execute"))
            .unwrap();

        graph.trigger_pin(flow_pin(&graph, a, "Execute"));
        assert_eq!(*log.borrow(), vec!["a", "b"]);
        // A fresh pass runs everything again.
        graph.trigger_pin(flow_pin(&graph, a, "Execute"));
        assert_eq!(*log.borrow(), vec!["a", "b", "a", "b"]);
    }
}
