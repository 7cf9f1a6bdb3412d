// SPDX-License-Identifier: MIT OR Apache-2.0
//! Path-bound documents.
//!
//! A [`Document`] owns a graph or a scene tree together with the file it
//! was loaded from. The store's change notifications drive the dirty flag;
//! saving clears it.

use crate::error::{AppError, AppResult};
use gdd_editor_graph::{DocumentCodec, DocumentFormat, Graph, GraphError, KindRegistry, SceneTree};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// What a document holds
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum DocumentKind {
    /// Node graph (blueprint or flow chart)
    Graph,
    /// Scene tree
    Scene,
}

impl DocumentKind {
    /// Human-readable name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Graph => "graph",
            Self::Scene => "scene",
        }
    }

    /// Tell graphs and scenes apart by the presence of a `nodes` field
    pub fn detect(format: DocumentFormat, text: &str) -> AppResult<Self> {
        let probe: Probe = match format {
            DocumentFormat::Json => serde_json::from_str(text).map_err(GraphError::from)?,
            DocumentFormat::Ron => ron::from_str(text).map_err(GraphError::from)?,
        };
        Ok(if probe.nodes { Self::Graph } else { Self::Scene })
    }
}

#[derive(Deserialize)]
struct Probe {
    #[serde(default, deserialize_with = "present")]
    nodes: bool,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    IgnoredAny::deserialize(deserializer).map(|_| true)
}

/// Document contents
#[derive(Debug)]
pub enum Content {
    /// A node graph
    Graph(Graph),
    /// A scene tree
    Scene(SceneTree),
}

impl Content {
    /// Kind of the contents
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Graph(_) => DocumentKind::Graph,
            Self::Scene(_) => DocumentKind::Scene,
        }
    }
}

/// A graph or scene bound to a file path
#[derive(Debug)]
pub struct Document {
    path: PathBuf,
    format: DocumentFormat,
    content: Content,
    dirty: Rc<Cell<bool>>,
}

impl Document {
    /// Create an unsaved document; it starts out dirty
    pub fn new(path: impl Into<PathBuf>, format: DocumentFormat, content: Content) -> Self {
        let mut document = Self {
            path: path.into(),
            format,
            content,
            dirty: Rc::new(Cell::new(true)),
        };
        document.track_changes();
        document
    }

    /// Load a document, detecting graph or scene from its contents.
    ///
    /// `format` is used when the path has no recognized extension. With
    /// `kinds`, node kinds and properties outside the registry are rejected.
    pub fn open(
        path: impl AsRef<Path>,
        format: DocumentFormat,
        kinds: Option<&KindRegistry>,
    ) -> AppResult<Self> {
        let path = path.as_ref();
        let format = DocumentFormat::from_path(path).unwrap_or(format);
        let text = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;

        let mut codec = DocumentCodec::new(format);
        if let Some(kinds) = kinds {
            codec = codec.with_kinds(kinds);
        }

        let content = match DocumentKind::detect(format, &text)? {
            DocumentKind::Graph => Content::Graph(codec.deserialize_graph(&text)?),
            DocumentKind::Scene => Content::Scene(codec.deserialize_scene(&text)?),
        };
        tracing::info!(path = %path.display(), kind = content.kind().as_str(), "opened document");

        let mut document = Self::new(path, format, content);
        document.dirty.set(false);
        Ok(document)
    }

    /// Write the document to its path
    pub fn save(&mut self, pretty: bool) -> AppResult<()> {
        let codec = DocumentCodec::new(self.format).with_pretty(pretty);
        let text = match &self.content {
            Content::Graph(graph) => codec.serialize_graph(graph)?,
            Content::Scene(scene) => codec.serialize_scene(scene)?,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
        }
        std::fs::write(&self.path, text).map_err(|e| AppError::io(&self.path, e))?;
        self.dirty.set(false);
        tracing::info!(path = %self.path.display(), format = self.format.extension(), "saved document");
        Ok(())
    }

    /// Rebind to a new path, taking the format from its extension, and save
    pub fn save_as(&mut self, path: impl Into<PathBuf>, pretty: bool) -> AppResult<()> {
        self.path = path.into();
        if let Some(format) = DocumentFormat::from_path(&self.path) {
            self.format = format;
        }
        self.save(pretty)
    }

    /// File path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Encoding used on save
    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Contents
    pub fn content(&self) -> &Content {
        &self.content
    }

    /// Mutable contents; changes made through the stores mark the document dirty
    pub fn content_mut(&mut self) -> &mut Content {
        &mut self.content
    }

    /// Whether there are changes not yet written
    pub fn is_dirty(&self) -> bool {
        self.dirty.get()
    }

    fn track_changes(&mut self) {
        let dirty = Rc::clone(&self.dirty);
        match &mut self.content {
            Content::Graph(graph) => {
                graph.subscribe(move |_, _| dirty.set(true));
            }
            Content::Scene(scene) => {
                scene.subscribe(move |_, _| dirty.set(true));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdd_editor_graph::kinds::flow::create_flow_registry;
    use gdd_editor_graph::{PinDirection, PinRef, PinType, SceneNodeData};

    fn sample_graph() -> Graph {
        let mut graph = Graph::new();
        let a = graph.create_node("start", [0.0, 0.0]).id;
        let b = graph.create_node("end", [200.0, 0.0]).id;
        graph.add_pin(a, "Next", PinType::Exec, PinDirection::Output).unwrap();
        graph.add_pin(b, "Prev", PinType::Exec, PinDirection::Input).unwrap();
        graph.connect(&PinRef::new(a, "Next"), &PinRef::new(b, "Prev")).unwrap();
        graph
    }

    #[test]
    fn test_detect_kind() {
        let graph = DocumentCodec::new(DocumentFormat::Ron)
            .serialize_graph(&sample_graph())
            .unwrap();
        assert_eq!(DocumentKind::detect(DocumentFormat::Ron, &graph).unwrap(), DocumentKind::Graph);

        let scene = DocumentCodec::new(DocumentFormat::Json)
            .serialize_scene(&SceneTree::new("Level"))
            .unwrap();
        assert_eq!(DocumentKind::detect(DocumentFormat::Json, &scene).unwrap(), DocumentKind::Scene);

        assert!(DocumentKind::detect(DocumentFormat::Json, "not json").is_err());
    }

    #[test]
    fn test_save_and_open_graph() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");

        let original = sample_graph();
        let mut document = Document::new(&path, DocumentFormat::Json, Content::Graph(sample_graph()));
        assert!(document.is_dirty());
        document.save(true).unwrap();
        assert!(!document.is_dirty());

        let opened = Document::open(&path, DocumentFormat::Ron, None).unwrap();
        assert_eq!(opened.format(), DocumentFormat::Json);
        assert!(!opened.is_dirty());
        match opened.content() {
            Content::Graph(graph) => assert_eq!(graph.node_count(), original.node_count()),
            Content::Scene(_) => panic!("expected a graph"),
        }
    }

    #[test]
    fn test_mutation_marks_dirty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.ron");

        let mut document = Document::new(&path, DocumentFormat::Ron, Content::Scene(SceneTree::new("Level")));
        document.save(false).unwrap();

        let mut document = Document::open(&path, DocumentFormat::Json, None).unwrap();
        assert!(!document.is_dirty());

        let Content::Scene(scene) = document.content_mut() else {
            panic!("expected a scene");
        };
        let root = scene.root().id;
        scene.add_child(root, SceneNodeData::new("Title", "text")).unwrap();
        assert!(document.is_dirty());

        document.save(false).unwrap();
        assert!(!document.is_dirty());
    }

    #[test]
    fn test_failed_mutation_keeps_clean() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");
        Document::new(&path, DocumentFormat::Json, Content::Graph(sample_graph()))
            .save(false)
            .unwrap();

        let mut document = Document::open(&path, DocumentFormat::Json, None).unwrap();
        let Content::Graph(graph) = document.content_mut() else {
            panic!("expected a graph");
        };
        let node = graph.node_ids().next().unwrap();
        assert!(graph.add_pin(node, "Next", PinType::Exec, PinDirection::Output).is_err());
        assert!(!document.is_dirty());
    }

    #[test]
    fn test_save_as_changes_format() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("flow.json");
        let ron_path = dir.path().join("nested").join("flow.ron");

        let mut document = Document::new(&json, DocumentFormat::Json, Content::Graph(sample_graph()));
        document.save_as(&ron_path, true).unwrap();
        assert_eq!(document.format(), DocumentFormat::Ron);
        assert_eq!(document.path(), ron_path.as_path());

        let reopened = Document::open(&ron_path, DocumentFormat::Json, None).unwrap();
        assert_eq!(reopened.content().kind(), DocumentKind::Graph);
    }

    #[test]
    fn test_open_with_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");
        let kinds = create_flow_registry();

        let mut graph = Graph::new();
        graph.create_node_from_kind(&kinds, "start", [0.0, 0.0]).unwrap();
        graph.create_node("teleport", [10.0, 0.0]);
        Document::new(&path, DocumentFormat::Json, Content::Graph(graph))
            .save(false)
            .unwrap();

        assert!(Document::open(&path, DocumentFormat::Json, None).is_ok());
        assert!(matches!(
            Document::open(&path, DocumentFormat::Json, Some(&kinds)),
            Err(AppError::Graph(GraphError::Schema(_)))
        ));
    }

    #[test]
    fn test_open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Document::open(dir.path().join("absent.json"), DocumentFormat::Json, None);
        assert!(matches!(result, Err(AppError::Io { .. })));
    }
}
