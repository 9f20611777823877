//! Serialized document formats

use std::fmt;
use std::path::Path;

/// Serialization format of a document on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format for a path from its extension
    ///
    /// Anything that is not `.json` is treated as YAML, which also covers
    /// JSON content since YAML is a superset.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }

    /// Pick the format for an input path, sniffing the content when the path
    /// has no extension
    pub fn for_input(path: &Path, content: &str) -> Self {
        if path.extension().is_none() {
            Self::detect(content)
        } else {
            Self::from_path(path)
        }
    }

    /// Sniff the format from document content
    pub fn detect(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('{') | Some('[') => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentFormat::Json => write!(f, "JSON"),
            DocumentFormat::Yaml => write!(f, "YAML"),
        }
    }
}
