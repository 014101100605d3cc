//! Node system - core data structures for the node/pin/link graph model

pub mod config;
pub mod editor;
pub mod execution;
pub mod graph;
pub mod library;
pub mod link;
pub mod node;
pub mod pin;
pub mod registry;
pub mod value;

// Re-export core types
pub use config::{ConfigError, NodeConfig, PinLinkConfig, SystemConfig};
pub use editor::NodeEditor;
pub use execution::ExecutionError;
pub use graph::{LinkRejection, NodeGraph};
pub use link::{Link, LinkId};
pub use node::{ExecOutcome, Node, NodeBehavior, NodeId, NodeSpec, PinValues, PropertySpec};
pub use pin::{DataPin, EditorMeta, Pin, PinDirection, PinId, PinKind};
pub use registry::NodeRegistry;
pub use value::{Value, ValueType};
