// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line definition.

use crate::document::DocumentKind;
use clap::{Args, Parser, Subcommand, ValueEnum};
use gdd_editor_graph::kinds::blueprint::create_blueprint_registry;
use gdd_editor_graph::kinds::flow::create_flow_registry;
use gdd_editor_graph::kinds::scene::create_scene_registry;
use gdd_editor_graph::KindRegistry;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "gdd_editor")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Create, inspect, validate and convert game design documents")]
#[command(long_about = r#"
Works on node graph documents (blueprints, flow charts) and scene tree
documents stored as JSON or RON. The format is taken from the file
extension; other extensions use the default format from the settings.

EXAMPLES:
  # Start a flow chart from the flow template
  gdd_editor new graph quest.json --template flow

  # Check a blueprint against the blueprint node kinds
  gdd_editor validate player.ron --kinds blueprint

  # Re-encode a scene as RON
  gdd_editor convert menu.json menu.ron

ENVIRONMENT VARIABLES:
  RUST_LOG             Log filter, overrides the settings file
  GDD_EDITOR_SETTINGS  Settings file path
"#)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every subcommand
#[derive(Args, Debug, Clone)]
pub struct GlobalOptions {
    /// Settings file (RON); created on first save
    #[arg(short, long, env = "GDD_EDITOR_SETTINGS", global = true)]
    pub settings: Option<PathBuf>,
}

/// Node kind sets a graph can be seeded from
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Template {
    /// Visual scripting
    Blueprint,
    /// Flow chart
    Flow,
}

/// Closed node kind schemas for validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindSet {
    /// Blueprint node kinds
    Blueprint,
    /// Flow chart node kinds
    Flow,
    /// Scene element kinds
    Scene,
}

impl KindSet {
    /// Build the registry for this set
    pub fn registry(self) -> KindRegistry {
        match self {
            Self::Blueprint => create_blueprint_registry(),
            Self::Flow => create_flow_registry(),
            Self::Scene => create_scene_registry(),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Write a new, empty document
    New {
        /// Graph or scene
        #[arg(value_enum)]
        kind: DocumentKind,

        /// Output path
        path: PathBuf,

        /// Seed a graph with starter nodes
        #[arg(short, long, value_enum)]
        template: Option<Template>,
    },

    /// Print a summary of a document
    Inspect {
        /// Document path
        path: PathBuf,
    },

    /// Load a document and report whether it is valid
    Validate {
        /// Document path
        path: PathBuf,

        /// Reject node kinds and properties outside this set
        #[arg(short, long, value_enum)]
        kinds: Option<KindSet>,
    },

    /// Re-save a document in the format implied by the output extension
    Convert {
        /// Source document
        input: PathBuf,

        /// Destination path
        output: PathBuf,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_new_with_template() {
        let cli = Cli::try_parse_from(["gdd_editor", "new", "graph", "quest.json", "--template", "flow"])
            .unwrap();
        match cli.command {
            Commands::New { kind, path, template } => {
                assert_eq!(kind, DocumentKind::Graph);
                assert_eq!(path, PathBuf::from("quest.json"));
                assert_eq!(template, Some(Template::Flow));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_validate_kinds() {
        let cli = Cli::try_parse_from(["gdd_editor", "validate", "menu.ron", "--kinds", "scene"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Validate {
                kinds: Some(KindSet::Scene),
                ..
            }
        ));
        assert!(Cli::try_parse_from(["gdd_editor", "validate", "a.json", "--kinds", "shader"]).is_err());
    }
}
