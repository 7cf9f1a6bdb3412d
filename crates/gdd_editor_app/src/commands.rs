// SPDX-License-Identifier: MIT OR Apache-2.0
//! Subcommand handlers.
//!
//! Each handler returns the text to print on success. Opened and written
//! documents are pushed onto the recent documents list.

use crate::cli::{Commands, KindSet, Template};
use crate::document::{Content, Document, DocumentKind};
use crate::error::{AppError, AppResult};
use crate::settings::EditorSettings;
use gdd_editor_graph::kinds::blueprint::create_blueprint_registry;
use gdd_editor_graph::kinds::flow::create_flow_registry;
use gdd_editor_graph::{Graph, PinRef, SceneNode, SceneTree};
use std::path::Path;

/// Run a subcommand
pub fn run(command: Commands, settings: &mut EditorSettings) -> AppResult<String> {
    match command {
        Commands::New { kind, path, template } => new_document(kind, &path, template, settings),
        Commands::Inspect { path } => inspect(&path, settings),
        Commands::Validate { path, kinds } => validate(&path, kinds, settings),
        Commands::Convert { input, output } => convert(&input, &output, settings),
    }
}

fn new_document(
    kind: DocumentKind,
    path: &Path,
    template: Option<Template>,
    settings: &mut EditorSettings,
) -> AppResult<String> {
    if path.exists() {
        return Err(AppError::io(
            path,
            std::io::Error::new(std::io::ErrorKind::AlreadyExists, "document already exists"),
        ));
    }

    let content = match kind {
        DocumentKind::Graph => Content::Graph(Graph::new()),
        DocumentKind::Scene => {
            let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("Scene");
            Content::Scene(SceneTree::new(name))
        }
    };
    let mut document = Document::new(path, settings.format_for(path), content);

    if let Some(template) = template {
        match document.content_mut() {
            Content::Graph(graph) => seed(graph, template)?,
            Content::Scene(_) => tracing::warn!("templates only apply to graphs, ignoring"),
        }
    }

    tracing::debug!(dirty = document.is_dirty(), "writing new document");
    document.save(settings.pretty)?;
    settings.add_recent(path);
    Ok(format!("created {} {}", kind.as_str(), path.display()))
}

/// Add the starter nodes of a template
fn seed(graph: &mut Graph, template: Template) -> AppResult<()> {
    let (kinds, from, to, output, input) = match template {
        Template::Blueprint => (
            create_blueprint_registry(),
            "event_begin_play",
            "print_string",
            "Exec",
            "Exec",
        ),
        Template::Flow => (create_flow_registry(), "start", "end", "Next", "Prev"),
    };

    let first = graph.create_node_from_kind(&kinds, from, [0.0, 0.0])?.id;
    let second = graph.create_node_from_kind(&kinds, to, [250.0, 0.0])?.id;
    graph.connect(&PinRef::new(first, output), &PinRef::new(second, input))?;
    Ok(())
}

fn inspect(path: &Path, settings: &mut EditorSettings) -> AppResult<String> {
    let document = Document::open(path, settings.default_format, None)?;
    settings.add_recent(path);

    let mut lines = vec![format!(
        "{} {} ({})",
        document.content().kind().as_str(),
        document.path().display(),
        document.format().extension()
    )];
    match document.content() {
        Content::Graph(graph) => describe_graph(graph, &mut lines),
        Content::Scene(scene) => {
            lines.push(format!("  scene '{}', {} nodes", scene.name(), scene.len()));
            outline(scene.root(), 1, &mut lines);
        }
    }
    Ok(lines.join("\n"))
}

fn describe_graph(graph: &Graph, lines: &mut Vec<String>) {
    lines.push(format!(
        "  {} nodes, {} connections",
        graph.node_count(),
        graph.connection_count()
    ));
    for node in graph.nodes() {
        lines.push(format!(
            "  node {} '{}' [{}] at ({}, {})",
            node.id, node.name, node.kind, node.position[0], node.position[1]
        ));
        for pin in node.pins() {
            lines.push(format!(
                "    {} {}: {} ({} connections)",
                pin.direction,
                pin.name,
                pin.pin_type,
                pin.connections.len()
            ));
        }
        for (key, value) in &node.properties {
            lines.push(format!("    {key} = {value}"));
        }
    }
    for connection in graph.connections() {
        lines.push(format!(
            "  connection {}: {} -> {}",
            connection.id, connection.output, connection.input
        ));
    }
}

fn outline(node: &SceneNode, depth: usize, lines: &mut Vec<String>) {
    lines.push(format!("{}{} [{}]", "  ".repeat(depth), node.name, node.kind));
    for child in &node.children {
        outline(child, depth + 1, lines);
    }
}

fn validate(path: &Path, kinds: Option<KindSet>, settings: &mut EditorSettings) -> AppResult<String> {
    let registry = kinds.map(KindSet::registry);
    let document = Document::open(path, settings.default_format, registry.as_ref())?;
    settings.add_recent(path);

    let summary = match document.content() {
        Content::Graph(graph) => {
            if graph.has_cycle() {
                tracing::warn!(path = %path.display(), "graph contains a cycle");
            }
            format!(
                "valid graph: {} nodes, {} connections",
                graph.node_count(),
                graph.connection_count()
            )
        }
        Content::Scene(scene) => format!("valid scene: {} nodes", scene.len()),
    };
    Ok(summary)
}

fn convert(input: &Path, output: &Path, settings: &mut EditorSettings) -> AppResult<String> {
    let mut document = Document::open(input, settings.default_format, None)?;
    document.save_as(output, settings.pretty)?;
    settings.add_recent(output);
    Ok(format!(
        "converted {} -> {} ({})",
        input.display(),
        output.display(),
        document.format().extension()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdd_editor_graph::{DocumentFormat, GraphError};
    use std::path::PathBuf;

    fn new_graph(path: &Path, template: Option<Template>, settings: &mut EditorSettings) {
        let command = Commands::New {
            kind: DocumentKind::Graph,
            path: path.to_path_buf(),
            template,
        };
        run(command, settings).unwrap();
    }

    #[test]
    fn test_new_graph_from_template() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quest.json");
        let mut settings = EditorSettings::default();

        new_graph(&path, Some(Template::Flow), &mut settings);
        assert_eq!(settings.recent_documents, vec![path.clone()]);

        let document = Document::open(&path, DocumentFormat::Json, None).unwrap();
        let Content::Graph(graph) = document.content() else {
            panic!("expected a graph");
        };
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.connection_count(), 1);
        assert!(graph.nodes().any(|n| n.kind == "start"));
    }

    #[test]
    fn test_new_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quest.json");
        let mut settings = EditorSettings::default();
        new_graph(&path, None, &mut settings);

        let again = Commands::New {
            kind: DocumentKind::Scene,
            path: path.clone(),
            template: None,
        };
        assert!(matches!(run(again, &mut settings), Err(AppError::Io { .. })));
    }

    #[test]
    fn test_new_scene_uses_default_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("menu.scene");
        let mut settings = EditorSettings {
            default_format: DocumentFormat::Ron,
            ..EditorSettings::default()
        };

        let command = Commands::New {
            kind: DocumentKind::Scene,
            path: path.clone(),
            template: Some(Template::Blueprint),
        };
        run(command, &mut settings).unwrap();

        let output = inspect(&path, &mut settings).unwrap();
        assert!(output.starts_with("scene"));
        assert!(output.contains("(ron)"));
        assert!(output.contains("scene 'menu', 1 nodes"));
        assert!(output.contains("Root [container]"));
    }

    #[test]
    fn test_inspect_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("player.ron");
        let mut settings = EditorSettings::default();
        new_graph(&path, Some(Template::Blueprint), &mut settings);

        let output = inspect(&path, &mut settings).unwrap();
        assert!(output.contains("2 nodes, 1 connections"));
        assert!(output.contains("[event_begin_play]"));
        assert!(output.contains("output Exec: exec (1 connections)"));
        assert!(output.contains("connection "));
    }

    #[test]
    fn test_validate_with_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quest.json");
        let mut settings = EditorSettings::default();
        new_graph(&path, Some(Template::Flow), &mut settings);

        let summary = validate(&path, Some(KindSet::Flow), &mut settings).unwrap();
        assert_eq!(summary, "valid graph: 2 nodes, 1 connections");
        assert!(validate(&path, None, &mut settings).is_ok());
        assert!(matches!(
            validate(&path, Some(KindSet::Blueprint), &mut settings),
            Err(AppError::Graph(GraphError::Schema(_)))
        ));
    }

    #[test]
    fn test_validate_rejects_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, r#"{"nodes": [{"id": 7}]}"#).unwrap();
        let mut settings = EditorSettings::default();

        assert!(matches!(
            validate(&path, None, &mut settings),
            Err(AppError::Graph(GraphError::Schema(_)))
        ));
        assert!(settings.recent_documents.is_empty());
    }

    #[test]
    fn test_convert_json_to_ron() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("quest.json");
        let output = dir.path().join("quest.ron");
        let mut settings = EditorSettings::default();
        new_graph(&input, Some(Template::Flow), &mut settings);

        let message = convert(&input, &output, &mut settings).unwrap();
        assert!(message.ends_with("(ron)"));
        assert_eq!(settings.recent_documents[0], PathBuf::from(&output));

        let before = Document::open(&input, DocumentFormat::Json, None).unwrap();
        let after = Document::open(&output, DocumentFormat::Json, None).unwrap();
        match (before.content(), after.content()) {
            (Content::Graph(a), Content::Graph(b)) => assert_eq!(a, b),
            _ => panic!("expected graphs"),
        }
    }
}
