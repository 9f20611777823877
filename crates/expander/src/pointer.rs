//! Internal reference pointers
//!
//! A reference such as `#/components/schemas/Pet` is a URI fragment holding a
//! JSON Pointer. Segments are unescaped on parse (`~1` is `/`, `~0` is `~`)
//! and escaped again when the pointer is printed, so the printed form is
//! canonical and can be used as an identity for cycle detection.

use openapi_expand_common::Node;
use std::fmt;
use thiserror::Error;

/// Reasons a reference cannot be parsed or resolved
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PointerError {
    #[error("external references are not supported")]
    External,

    #[error("reference must be `#` or start with `#/`")]
    Malformed,

    #[error("key `{segment}` not found under {parent}")]
    MissingKey { segment: String, parent: String },

    #[error("`{segment}` is not a valid index into the sequence at {parent}")]
    InvalidIndex { segment: String, parent: String },

    #[error("index {index} out of range for the sequence of length {len} at {parent}")]
    IndexOutOfRange {
        index: usize,
        len: usize,
        parent: String,
    },

    #[error("cannot look up `{segment}` in the scalar at {parent}")]
    ScalarTraversal { segment: String, parent: String },
}

/// Parsed internal reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefPointer {
    segments: Vec<String>,
}

impl RefPointer {
    /// Parse a `$ref` value
    pub fn parse(reference: &str) -> Result<Self, PointerError> {
        if reference == "#" {
            return Ok(Self {
                segments: Vec::new(),
            });
        }

        match reference.strip_prefix("#/") {
            Some(path) => Ok(Self {
                segments: path.split('/').map(unescape).collect(),
            }),
            None if reference.starts_with('#') => Err(PointerError::Malformed),
            None => Err(PointerError::External),
        }
    }

    /// Unescaped path segments, outermost first
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Walk `root` one segment at a time
    pub fn resolve<'a>(&self, root: &'a Node) -> Result<&'a Node, PointerError> {
        let mut current = root;

        for (depth, segment) in self.segments.iter().enumerate() {
            current = match current {
                Node::Mapping(entries) => {
                    entries
                        .get(segment)
                        .ok_or_else(|| PointerError::MissingKey {
                            segment: segment.clone(),
                            parent: format_pointer(&self.segments[..depth]),
                        })?
                }
                Node::Sequence(items) => {
                    let index = parse_index(segment).ok_or_else(|| PointerError::InvalidIndex {
                        segment: segment.clone(),
                        parent: format_pointer(&self.segments[..depth]),
                    })?;
                    items
                        .get(index)
                        .ok_or_else(|| PointerError::IndexOutOfRange {
                            index,
                            len: items.len(),
                            parent: format_pointer(&self.segments[..depth]),
                        })?
                }
                Node::Scalar(_) => {
                    return Err(PointerError::ScalarTraversal {
                        segment: segment.clone(),
                        parent: format_pointer(&self.segments[..depth]),
                    })
                }
            };
        }

        Ok(current)
    }
}

impl fmt::Display for RefPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_pointer(&self.segments))
    }
}

/// Format unescaped segments as a `#/...` pointer
pub fn format_pointer(segments: &[String]) -> String {
    let mut out = String::from("#");
    for segment in segments {
        out.push('/');
        out.push_str(&escape(segment));
    }
    out
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Array index per JSON Pointer: decimal digits, no leading zeros
fn parse_index(segment: &str) -> Option<usize> {
    let digits_only = !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit());
    if !digits_only || (segment.len() > 1 && segment.starts_with('0')) {
        return None;
    }
    segment.parse().ok()
}
