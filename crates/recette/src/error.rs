//! Error types for the recette engine.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading templates, records or configuration.
///
/// Population, annotation and extraction themselves never fail: missing
/// markers, unknown values and zero denominators all have defined results.
#[derive(Debug, Error)]
pub enum RecetteError {
    /// The named template could not be fetched. Population must not proceed.
    #[error("template \"{name}\" is unavailable: {reason}")]
    TemplateUnavailable { name: String, reason: String },

    /// A template directory passed to the store does not exist.
    #[error("template directory not found: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    /// A persisted record is not a JSON object.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Configuration is present but unusable.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RecetteError {
    pub(crate) fn unavailable(name: &str, reason: impl Into<String>) -> Self {
        RecetteError::TemplateUnavailable {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type for recette operations.
pub type Result<T> = std::result::Result<T, RecetteError>;
