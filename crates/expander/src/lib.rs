//! `$ref` expansion for API description documents
//!
//! Every internal reference node (`{"$ref": "#/components/schemas/Pet"}`) is
//! replaced by a deep copy of the subtree it points at. References inside the
//! target are expanded too, so chains are followed to a fixed point.
//!
//! ## Guarantees
//! - The input document is never modified
//! - Mapping key order and sequence order are preserved
//! - Two references to the same target produce independent copies
//! - A reference chain that revisits a pointer still being expanded fails
//!   with [`ExpandError::Cycle`] instead of recursing forever
//!
//! ## Usage
//! ```rust,ignore
//! use openapi_expand_expander::{expand, ExpandOptions, RefExpander};
//!
//! let flat = expand(&doc)?;
//!
//! let expansion = RefExpander::new(&doc)
//!     .with_options(ExpandOptions::default().with_prune_components(true))
//!     .expand()?;
//! ```
//!
//! [`ExpandError::Cycle`]: openapi_expand_common::ExpandError::Cycle

mod expander;
mod options;
mod pointer;

pub use expander::{prune_components, Expansion, ExpansionStats, RefExpander};
pub use options::{ExpandOptions, SiblingPolicy, DEFAULT_MAX_DEPTH};
pub use pointer::{format_pointer, PointerError, RefPointer};

use openapi_expand_common::{Node, Result};

/// Expand all internal references in `document` with default options
pub fn expand(document: &Node) -> Result<Node> {
    expand_with_options(document, ExpandOptions::default())
}

/// Expand all internal references in `document`
pub fn expand_with_options(document: &Node, options: ExpandOptions) -> Result<Node> {
    RefExpander::new(document)
        .with_options(options)
        .expand()
        .map(|expansion| expansion.document)
}
