//! Built-in node types.

pub mod convert;
pub mod debug;
pub mod logic;
pub mod math;

pub use convert::{
    AssembleColor, AssembleVector2, BreakColor, BreakVector2, CreateFloat, CreateText, FormatText,
};
pub use debug::Print;
pub use logic::Branch;
pub use math::{Concatenate, Sum};

use super::registry::NodeRegistry;

/// Header colors shared by each node family.
pub(crate) mod colors {
    use egui::Color32;

    pub const OPERATIONS: Color32 = Color32::from_rgb(45, 80, 120);
    pub const LOGIC: Color32 = Color32::from_rgb(120, 80, 45);
    pub const CONVERSION: Color32 = Color32::from_rgb(60, 100, 60);
    pub const DEBUG: Color32 = Color32::from_rgb(100, 60, 100);
}

/// Registers every built-in node type.
pub fn register_all(registry: &mut NodeRegistry) {
    registry.register_type::<Sum>("Sum");
    registry.register_type::<Concatenate>("Concatenate");
    registry.register_type::<Branch>("Branch");
    registry.register_type::<Print>("Print");
    registry.register_type::<AssembleVector2>("AssembleVector2");
    registry.register_type::<BreakVector2>("BreakVector2");
    registry.register_type::<AssembleColor>("AssembleColor");
    registry.register_type::<BreakColor>("BreakColor");
    registry.register_type::<FormatText>("FormatText");
    registry.register_type::<CreateFloat>("CreateFloat");
    registry.register_type::<CreateText>("CreateText");
}
