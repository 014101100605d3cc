//! Registry of available node types, keyed by type name.

use super::graph::NodeGraph;
use super::node::{NodeBehavior, NodeId};
use egui::Pos2;
use std::collections::BTreeMap;

type BehaviorCtor = fn() -> Box<dyn NodeBehavior>;

/// Maps node type names to behavior constructors.
///
/// Node creation paths (editor menus, config restoration) go through here
/// so a type name written in a saved config resolves to the same kind of
/// node later. Kept in a `BTreeMap` so menus list types in stable order.
#[derive(Default)]
pub struct NodeRegistry {
    ctors: BTreeMap<String, BehaviorCtor>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry preloaded with every built-in node type.
    pub fn with_builtin_nodes() -> Self {
        let mut registry = Self::new();
        super::library::register_all(&mut registry);
        registry
    }

    pub fn register(&mut self, type_name: &str, ctor: BehaviorCtor) {
        self.ctors.insert(type_name.to_string(), ctor);
    }

    /// Registers a behavior type constructible via `Default`.
    pub fn register_type<T: NodeBehavior + Default + 'static>(&mut self, type_name: &str) {
        let ctor: BehaviorCtor = || Box::<T>::default();
        self.register(type_name, ctor);
    }

    /// Creates a fresh behavior instance for the given type name.
    pub fn instantiate(&self, type_name: &str) -> Option<Box<dyn NodeBehavior>> {
        self.ctors.get(type_name).map(|ctor| ctor())
    }

    /// All registered type names, sorted.
    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.ctors.keys().map(String::as_str)
    }

    /// Instantiates a type and spawns it into the graph in one step.
    pub fn spawn_into(
        &self,
        graph: &mut NodeGraph,
        type_name: &str,
        position: Pos2,
    ) -> Option<NodeId> {
        let behavior = self.instantiate(type_name)?;
        Some(graph.spawn(behavior, position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_knows_the_standard_nodes() {
        let registry = NodeRegistry::with_builtin_nodes();
        for name in ["Sum", "Branch", "Print", "Concatenate"] {
            assert!(
                registry.instantiate(name).is_some(),
                "missing builtin {name}"
            );
        }
        assert!(registry.instantiate("NoSuchNode").is_none());
    }

    #[test]
    fn spawn_into_places_a_working_node() {
        let registry = NodeRegistry::with_builtin_nodes();
        let mut graph = NodeGraph::new();
        let id = registry
            .spawn_into(&mut graph, "Sum", Pos2::new(10.0, 20.0))
            .unwrap();
        let node = graph.node(id).unwrap();
        assert_eq!(node.behavior.spec().type_name, "Sum");
        assert_eq!(node.position, Pos2::new(10.0, 20.0));
    }

    #[test]
    fn type_names_are_sorted() {
        let registry = NodeRegistry::with_builtin_nodes();
        let names: Vec<_> = registry.type_names().collect();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
