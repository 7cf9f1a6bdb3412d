// SPDX-License-Identifier: MIT OR Apache-2.0
//! Flow chart node kinds.
//!
//! Flow chart steps are linked through execution pins; a decision step
//! splits the flow on a boolean condition.

use super::{KindRegistry, NodeCategory, NodeKind};
use crate::pin::{PinTemplate, PinType};

const STEP_PROPERTIES: &[&str] = &["title", "content", "size", "label"];

/// Create the flow chart node kind registry
pub fn create_flow_registry() -> KindRegistry {
    let mut registry = KindRegistry::new();

    registry.register(
        NodeKind::new("start", "Start", NodeCategory::Flow)
            .with_pin(PinTemplate::output("Next", PinType::Exec))
            .with_properties(STEP_PROPERTIES),
    );

    registry.register(
        NodeKind::new("end", "End", NodeCategory::Flow)
            .with_pin(PinTemplate::input("Prev", PinType::Exec))
            .with_properties(STEP_PROPERTIES),
    );

    registry.register(
        NodeKind::new("process", "Process", NodeCategory::Flow)
            .with_pin(PinTemplate::input("Prev", PinType::Exec))
            .with_pin(PinTemplate::output("Next", PinType::Exec))
            .with_properties(STEP_PROPERTIES),
    );

    registry.register(
        NodeKind::new("decision", "Decision", NodeCategory::Flow)
            .with_pin(PinTemplate::input("Prev", PinType::Exec))
            .with_pin(PinTemplate::input("Condition", PinType::Bool))
            .with_pin(PinTemplate::output("Yes", PinType::Exec))
            .with_pin(PinTemplate::output("No", PinType::Exec))
            .with_properties(STEP_PROPERTIES),
    );

    registry.register(
        NodeKind::new("input", "Input", NodeCategory::Flow)
            .with_description("Reads a value from the player")
            .with_pin(PinTemplate::input("Prev", PinType::Exec))
            .with_pin(PinTemplate::output("Next", PinType::Exec))
            .with_pin(PinTemplate::output("Value", PinType::String))
            .with_properties(STEP_PROPERTIES),
    );

    registry.register(
        NodeKind::new("output", "Output", NodeCategory::Flow)
            .with_description("Shows a value to the player")
            .with_pin(PinTemplate::input("Prev", PinType::Exec))
            .with_pin(PinTemplate::input("Value", PinType::String))
            .with_pin(PinTemplate::output("Next", PinType::Exec))
            .with_properties(STEP_PROPERTIES),
    );

    registry.register(NodeKind::new("custom", "Custom", NodeCategory::Custom));

    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flow_kinds() {
        let registry = create_flow_registry();
        assert_eq!(registry.len(), 7);
        assert!(registry.get("decision").unwrap().allows_property("title"));
        assert!(!registry.get("decision").unwrap().allows_property("colour"));
        assert!(registry.get("custom").unwrap().allows_property("colour"));
    }
}
