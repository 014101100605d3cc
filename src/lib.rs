//! Wirebench - node-based visual programming core
//!
//! This library provides the data model behind a node-graph editor for
//! building "widget + action" systems: nodes exposing typed input/output
//! pins, links formed under type-compatibility rules, property-to-pin
//! binding, flow-pin execution, and configuration snapshots that can
//! rebuild a whole graph including its link topology.
//!
//! Rendering backends, hardware sensors and file storage are collaborators:
//! the model exposes everything they need (positions, colors, edit
//! metadata, serialized configs) without calling into them.

pub mod id;
pub mod nodes;

// Re-export commonly used types
pub use id::{IdNamespace, IdRegistry};
pub use nodes::{
    ConfigError, DataPin, EditorMeta, ExecOutcome, ExecutionError, Link, LinkId, LinkRejection,
    Node, NodeBehavior, NodeConfig, NodeEditor, NodeGraph, NodeId, NodeRegistry, NodeSpec, Pin,
    PinDirection, PinId, PinKind, PinLinkConfig, PinValues, PropertySpec, SystemConfig, Value,
    ValueType,
};
