//! Common types for openapi-expand
//!
//! This crate contains the document tree and the error types shared by the
//! parser, expander and CLI components.

mod node;

pub use node::{Mapping, Node, Scalar};

use thiserror::Error;

/// Mapping key that marks a reference node
pub const REF_KEY: &str = "$ref";

/// Errors that can occur while loading, expanding or writing a document
#[derive(Error, Debug)]
pub enum ExpandError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unresolved reference {reference} at {location}: {reason}")]
    Resolution {
        reference: String,
        location: String,
        reason: String,
    },

    #[error("Cyclic reference {reference} at {location} (chain: {})", .chain.join(" -> "))]
    Cycle {
        reference: String,
        location: String,
        chain: Vec<String>,
    },

    #[error("Reference chain exceeded maximum depth of {limit} while resolving {reference} at {location}")]
    DepthLimit {
        reference: String,
        location: String,
        limit: usize,
    },

    #[error("Serialization error: {0}")]
    Serialize(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for expansion operations
pub type Result<T> = std::result::Result<T, ExpandError>;
