//! Document loading and writing for openapi-expand
//!
//! This crate turns serialized API descriptions into the [`Node`] tree used
//! by the expander, and writes expanded trees back out.
//!
//! ## Formats
//! - **JSON**: `.json` files, or extensionless files whose content opens
//!   with `{` or `[`
//! - **YAML**: `.yaml`/`.yml` and every other extension
//!
//! ## Usage
//! ```rust,ignore
//! use openapi_expand_parser::{DocumentFormat, DocumentLoader, DocumentWriter};
//!
//! let doc = DocumentLoader::from_file("control-plane.yaml")?;
//! DocumentWriter::new(DocumentFormat::Json).write_to_file(&doc, "control-plane.json")?;
//! ```
//!
//! [`Node`]: openapi_expand_common::Node

mod format;
mod loader;
mod writer;
mod yaml;

pub use format::DocumentFormat;
pub use loader::DocumentLoader;
pub use writer::DocumentWriter;
