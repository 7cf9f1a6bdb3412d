// SPDX-License-Identifier: MIT OR Apache-2.0
//! Editor settings.
//!
//! Persisted as RON. Missing fields fall back to their defaults so older
//! settings files keep loading.

use crate::error::{AppError, AppResult};
use gdd_editor_graph::DocumentFormat;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current settings format version
pub const SETTINGS_FORMAT_VERSION: u32 = 1;

/// Length of the recent documents list
pub const MAX_RECENT_DOCUMENTS: usize = 10;

/// Log filter used when neither `RUST_LOG` nor the settings provide one
pub const DEFAULT_LOG_FILTER: &str = "info,gdd_editor_graph=warn";

/// Editor-wide settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    /// Settings format version
    pub version: u32,
    /// Format used for new documents whose path has no known extension
    pub default_format: DocumentFormat,
    /// Pretty-print saved documents
    pub pretty: bool,
    /// `tracing` filter directive
    pub log_filter: String,
    /// Most recently opened or saved documents, newest first
    pub recent_documents: Vec<PathBuf>,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_FORMAT_VERSION,
            default_format: DocumentFormat::Json,
            pretty: true,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
            recent_documents: Vec::new(),
        }
    }
}

impl EditorSettings {
    /// Load settings from a file
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::io(path, e))?;
        let settings: EditorSettings = ron::from_str(&content)?;

        if settings.version > SETTINGS_FORMAT_VERSION {
            return Err(AppError::UnsupportedVersion {
                found: settings.version,
                supported: SETTINGS_FORMAT_VERSION,
            });
        }

        tracing::info!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from `path` when it names an existing file, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> AppResult<Self> {
        match path {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Save settings to a file
    pub fn save(&self, path: &Path) -> AppResult<()> {
        let config = ron::ser::PrettyConfig::default()
            .struct_names(true)
            .enumerate_arrays(false);
        let content = ron::ser::to_string_pretty(self, config)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| AppError::io(parent, e))?;
        }
        std::fs::write(path, content).map_err(|e| AppError::io(path, e))?;
        tracing::debug!(path = %path.display(), "saved settings");
        Ok(())
    }

    /// Move `path` to the front of the recent documents list
    pub fn add_recent(&mut self, path: &Path) {
        self.recent_documents.retain(|p| p != path);
        self.recent_documents.insert(0, path.to_path_buf());
        self.recent_documents.truncate(MAX_RECENT_DOCUMENTS);
    }

    /// Format for a document path: its extension, else the configured default
    pub fn format_for(&self, path: &Path) -> DocumentFormat {
        DocumentFormat::from_path(path).unwrap_or(self.default_format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = EditorSettings::default();
        assert_eq!(settings.version, SETTINGS_FORMAT_VERSION);
        assert_eq!(settings.default_format, DocumentFormat::Json);
        assert!(settings.recent_documents.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config").join("editor.ron");

        let mut settings = EditorSettings {
            default_format: DocumentFormat::Ron,
            pretty: false,
            ..EditorSettings::default()
        };
        settings.add_recent(Path::new("quest.json"));
        settings.save(&path).unwrap();

        let loaded = EditorSettings::load(&path).unwrap();
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        std::fs::write(&path, "(pretty: false)").unwrap();

        let loaded = EditorSettings::load(&path).unwrap();
        assert!(!loaded.pretty);
        assert_eq!(loaded.log_filter, DEFAULT_LOG_FILTER);
        assert_eq!(loaded.version, SETTINGS_FORMAT_VERSION);
    }

    #[test]
    fn test_newer_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("editor.ron");
        std::fs::write(&path, "(version: 99)").unwrap();

        assert!(matches!(
            EditorSettings::load(&path),
            Err(AppError::UnsupportedVersion { found: 99, .. })
        ));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.ron");
        assert_eq!(
            EditorSettings::load_or_default(Some(&missing)).unwrap(),
            EditorSettings::default()
        );
        assert_eq!(EditorSettings::load_or_default(None).unwrap(), EditorSettings::default());
    }

    #[test]
    fn test_recent_documents() {
        let mut settings = EditorSettings::default();
        for i in 0..12 {
            settings.add_recent(Path::new(&format!("doc{i}.json")));
        }
        assert_eq!(settings.recent_documents.len(), MAX_RECENT_DOCUMENTS);
        assert_eq!(settings.recent_documents[0], PathBuf::from("doc11.json"));

        // Reopening moves the entry to the front without duplicating it
        settings.add_recent(Path::new("doc5.json"));
        assert_eq!(settings.recent_documents.len(), MAX_RECENT_DOCUMENTS);
        assert_eq!(settings.recent_documents[0], PathBuf::from("doc5.json"));
        assert_eq!(
            settings
                .recent_documents
                .iter()
                .filter(|p| **p == PathBuf::from("doc5.json"))
                .count(),
            1
        );
    }

    #[test]
    fn test_format_for_path() {
        let settings = EditorSettings {
            default_format: DocumentFormat::Ron,
            ..EditorSettings::default()
        };
        assert_eq!(settings.format_for(Path::new("a.JSON")), DocumentFormat::Json);
        assert_eq!(settings.format_for(Path::new("a.graph")), DocumentFormat::Ron);
    }
}
