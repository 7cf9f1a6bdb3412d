// SPDX-License-Identifier: MIT OR Apache-2.0
//! Game design document editor, command line front end.
//!
//! Creates, inspects, validates and converts the documents edited by the
//! graph and scene editors:
//! - Blueprint graphs (visual scripting)
//! - Flow charts
//! - Scene trees
//!
//! ## Architecture
//!
//! The document model lives in `gdd_editor_graph`. This binary binds
//! documents to files, keeps editor settings, and dispatches subcommands.

mod cli;
mod commands;
mod document;
mod error;
mod settings;

use clap::Parser;
use cli::Cli;
use settings::{EditorSettings, DEFAULT_LOG_FILTER};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    let settings_path = cli.global.settings.clone();
    let settings = EditorSettings::load_or_default(settings_path.as_deref());

    // RUST_LOG wins over the filter stored in the settings
    let directive = settings
        .as_ref()
        .map_or(DEFAULT_LOG_FILTER, |s| s.log_filter.as_str());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Starting GDD editor v{}", env!("CARGO_PKG_VERSION"));

    let mut settings = match settings {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("Failed to load settings: {e}");
            std::process::exit(1);
        }
    };

    match commands::run(cli.command, &mut settings) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(1);
        }
    }

    if let Some(path) = settings_path {
        if let Err(e) = settings.save(&path) {
            tracing::warn!("Failed to save settings: {e}");
        }
    }
}
