//! Error types for the layout orchestrator

use thiserror::Error;

use crate::error::DocumentError;

/// Errors that stop a build, refresh or reload as a whole
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LayoutError {
    /// The document text could not be read
    #[error("layout document unreadable: {0}")]
    Document(#[from] DocumentError),

    /// The document has no root view to build
    #[error("layout document '{}' has no root view", name.as_deref().unwrap_or("<unnamed>"))]
    MissingRoot { name: Option<String> },

    /// An operation that needs a previous build was called before any build
    #[error("layout has not been built on a target yet")]
    NotBuilt,
}

impl LayoutError {
    pub fn missing_root(name: Option<&str>) -> Self {
        Self::MissingRoot {
            name: name.map(str::to_string),
        }
    }
}
