//! Document writer

use crate::yaml::to_yaml;
use crate::DocumentFormat;
use openapi_expand_common::{ExpandError, Node, Result};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Serializes a [`Node`] tree as JSON or YAML
pub struct DocumentWriter {
    format: DocumentFormat,
}

impl DocumentWriter {
    pub fn new(format: DocumentFormat) -> Self {
        Self { format }
    }

    /// Writer for the format implied by an output path
    pub fn for_path(path: &Path) -> Self {
        Self::new(DocumentFormat::from_path(path))
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Serialize a document to a string
    ///
    /// JSON is pretty-printed with a two space indent. YAML is written in
    /// block style, double-quoting any string a YAML 1.1 or 1.2 reader would
    /// load as another type. Both keep mapping order and end with a newline.
    pub fn to_string(&self, doc: &Node) -> Result<String> {
        match self.format {
            DocumentFormat::Json => {
                let mut out = serde_json::to_string_pretty(doc).map_err(|e| {
                    ExpandError::Serialize(format!("Failed to serialize JSON: {}", e))
                })?;
                out.push('\n');
                Ok(out)
            }
            DocumentFormat::Yaml => Ok(to_yaml(doc)),
        }
    }

    /// Serialize a document and write it to `path`
    ///
    /// The content goes to a temporary file next to `path` which is then
    /// renamed over it, so `path` is either fully written or untouched.
    pub fn write_to_file<P: AsRef<Path>>(&self, doc: &Node, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_string(doc)?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;

        tracing::debug!(
            path = %path.display(),
            format = %self.format,
            bytes = content.len(),
            "wrote document"
        );

        Ok(())
    }
}
