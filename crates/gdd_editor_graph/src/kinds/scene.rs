// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene tree node kinds. Scene nodes carry no pins.

use super::{KindRegistry, NodeCategory, NodeKind};

/// Kind given to the root of a new scene tree
pub const ROOT_KIND: &str = "container";

const LAYOUT: &[&str] = &["position", "size", "visible"];

fn with_layout(kind: NodeKind, extra: &[&str]) -> NodeKind {
    let keys: Vec<&str> = LAYOUT.iter().chain(extra).copied().collect();
    kind.with_properties(&keys)
}

/// Create the scene node kind registry
pub fn create_scene_registry() -> KindRegistry {
    let mut registry = KindRegistry::new();

    registry.register(with_layout(
        NodeKind::new(ROOT_KIND, "Container", NodeCategory::Scene)
            .with_description("Groups child elements"),
        &["background_color", "grid_size", "snap_to_grid"],
    ));
    registry.register(with_layout(
        NodeKind::new("sprite", "Sprite", NodeCategory::Scene),
        &["image", "tint"],
    ));
    registry.register(with_layout(
        NodeKind::new("text", "Text", NodeCategory::Scene),
        &["text", "font_size", "color"],
    ));
    registry.register(with_layout(
        NodeKind::new("button", "Button", NodeCategory::Scene),
        &["text", "on_click", "blueprint"],
    ));
    registry.register(with_layout(
        NodeKind::new("input", "Input Box", NodeCategory::Scene),
        &["text", "placeholder"],
    ));
    registry.register(NodeKind::new("custom", "Custom", NodeCategory::Custom));

    registry
}
