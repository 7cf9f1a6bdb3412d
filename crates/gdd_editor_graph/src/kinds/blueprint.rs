// SPDX-License-Identifier: MIT OR Apache-2.0
//! Blueprint node kinds for visual scripting.
//!
//! Supports execution flow and data flow.

use super::{KindRegistry, NodeCategory, NodeKind};
use crate::pin::{PinTemplate, PinType};

/// Create the blueprint node kind registry
pub fn create_blueprint_registry() -> KindRegistry {
    let mut registry = KindRegistry::new();

    // Event nodes
    registry.register(
        NodeKind::new("event_begin_play", "Event Begin Play", NodeCategory::Event)
            .with_description("Triggered when gameplay starts")
            .with_pin(PinTemplate::output("Exec", PinType::Exec))
            .with_properties(&[]),
    );

    registry.register(
        NodeKind::new("event_tick", "Event Tick", NodeCategory::Event)
            .with_description("Triggered every frame")
            .with_pin(PinTemplate::output("Exec", PinType::Exec))
            .with_pin(PinTemplate::output("Delta Time", PinType::Float))
            .with_properties(&[]),
    );

    // Flow control
    registry.register(
        NodeKind::new("branch", "Branch", NodeCategory::Logic)
            .with_description("If/else branching")
            .with_pin(PinTemplate::input("Exec", PinType::Exec))
            .with_pin(PinTemplate::input("Condition", PinType::Bool))
            .with_pin(PinTemplate::output("True", PinType::Exec))
            .with_pin(PinTemplate::output("False", PinType::Exec))
            .with_properties(&[]),
    );

    registry.register(
        NodeKind::new("compare_int", "Compare Int", NodeCategory::Math)
            .with_description("True when A is greater than B")
            .with_pin(PinTemplate::input("A", PinType::Int))
            .with_pin(PinTemplate::input("B", PinType::Int))
            .with_pin(PinTemplate::output("Result", PinType::Bool))
            .with_properties(&["operator"]),
    );

    registry.register(
        NodeKind::new("add_float", "Add Float", NodeCategory::Math)
            .with_pin(PinTemplate::input("A", PinType::Float))
            .with_pin(PinTemplate::input("B", PinType::Float))
            .with_pin(PinTemplate::output("Sum", PinType::Float))
            .with_properties(&[]),
    );

    // Variables
    registry.register(
        NodeKind::new("get_variable", "Get Variable", NodeCategory::Variable)
            .with_pin(PinTemplate::input("Target", PinType::Object))
            .with_pin(PinTemplate::output("Value", PinType::Int))
            .with_properties(&["variable"]),
    );

    registry.register(
        NodeKind::new("set_variable", "Set Variable", NodeCategory::Variable)
            .with_pin(PinTemplate::input("Exec", PinType::Exec))
            .with_pin(PinTemplate::input("Target", PinType::Object))
            .with_pin(PinTemplate::input("Value", PinType::Int))
            .with_pin(PinTemplate::output("Then", PinType::Exec))
            .with_properties(&["variable"]),
    );

    // Print string (for debugging)
    registry.register(
        NodeKind::new("print_string", "Print String", NodeCategory::Utility)
            .with_description("Print a string to the console")
            .with_pin(PinTemplate::input("Exec", PinType::Exec))
            .with_pin(PinTemplate::input("String", PinType::String))
            .with_pin(PinTemplate::output("Then", PinType::Exec))
            .with_properties(&["duration"]),
    );

    registry
}
