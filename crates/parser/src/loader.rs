//! Document loader

use crate::DocumentFormat;
use openapi_expand_common::{ExpandError, Node, Result};
use std::fs;
use std::path::Path;

/// Reads JSON or YAML API descriptions into a [`Node`] tree
pub struct DocumentLoader;

impl DocumentLoader {
    /// Load a document from file path
    ///
    /// # Example
    /// ```rust,ignore
    /// let doc = DocumentLoader::from_file("management-plane.yaml")?;
    /// ```
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Node> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ExpandError::Parse(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let format = DocumentFormat::for_input(path, &content);
        tracing::debug!(path = %path.display(), %format, bytes = content.len(), "loading document");

        Self::from_str(&content, format).map_err(|e| match e {
            ExpandError::Parse(reason) => {
                ExpandError::Parse(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    /// Parse a document from a string in the given format
    pub fn from_str(content: &str, format: DocumentFormat) -> Result<Node> {
        match format {
            DocumentFormat::Json => serde_json::from_str(content)
                .map_err(|e| ExpandError::Parse(format!("Failed to parse JSON: {}", e))),
            DocumentFormat::Yaml => serde_yaml::from_str(content)
                .map_err(|e| ExpandError::Parse(format!("Failed to parse YAML: {}", e))),
        }
    }
}
