//! Block-style YAML emitter
//!
//! `serde_yaml` only quotes strings that YAML 1.2 would read as something
//! else. Generators built on YAML 1.1 readers (PyYAML, SnakeYAML) also turn
//! `yes`, `off` or `2024-01-01` into booleans and dates, so strings are
//! quoted here whenever either schema would mistype them.

use openapi_expand_common::{Mapping, Node, Scalar};
use serde_yaml::Value;

const INDENT: usize = 2;

/// Words YAML 1.1 resolves to booleans or null, compared case-insensitively
const YAML11_WORDS: &[&str] = &[
    "y", "n", "yes", "no", "on", "off", "true", "false", "null", "~",
];

/// Render a document as block-style YAML ending with a newline
pub(crate) fn to_yaml(doc: &Node) -> String {
    let mut out = String::new();
    match doc {
        Node::Mapping(entries) if !entries.is_empty() => {
            write_mapping(&mut out, entries, 0, false)
        }
        Node::Sequence(items) if !items.is_empty() => write_sequence(&mut out, items, 0, false),
        other => {
            out.push_str(&inline(other));
            out.push('\n');
        }
    }
    out
}

fn write_mapping(out: &mut String, entries: &Mapping, indent: usize, continues_line: bool) {
    for (i, (key, value)) in entries.iter().enumerate() {
        if i > 0 || !continues_line {
            pad(out, indent);
        }
        out.push_str(&scalar_string(key));
        out.push(':');
        write_value(out, value, indent);
    }
}

fn write_sequence(out: &mut String, items: &[Node], indent: usize, continues_line: bool) {
    for (i, item) in items.iter().enumerate() {
        if i > 0 || !continues_line {
            pad(out, indent);
        }
        out.push('-');
        match item {
            Node::Mapping(entries) if !entries.is_empty() => {
                out.push(' ');
                write_mapping(out, entries, indent + INDENT, true);
            }
            Node::Sequence(nested) if !nested.is_empty() => {
                out.push(' ');
                write_sequence(out, nested, indent + INDENT, true);
            }
            other => {
                out.push(' ');
                out.push_str(&inline(other));
                out.push('\n');
            }
        }
    }
}

/// Value after `key:`; collections open a nested block
fn write_value(out: &mut String, value: &Node, indent: usize) {
    match value {
        Node::Mapping(entries) if !entries.is_empty() => {
            out.push('\n');
            write_mapping(out, entries, indent + INDENT, false);
        }
        Node::Sequence(items) if !items.is_empty() => {
            out.push('\n');
            write_sequence(out, items, indent + INDENT, false);
        }
        other => {
            out.push(' ');
            out.push_str(&inline(other));
            out.push('\n');
        }
    }
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

/// Scalars and empty collections
fn inline(node: &Node) -> String {
    match node {
        Node::Mapping(_) => "{}".to_string(),
        Node::Sequence(_) => "[]".to_string(),
        Node::Scalar(Scalar::Null) => "null".to_string(),
        Node::Scalar(Scalar::Bool(value)) => value.to_string(),
        Node::Scalar(Scalar::Number(value)) => value.to_string(),
        Node::Scalar(Scalar::String(value)) => scalar_string(value),
    }
}

/// Plain when unambiguous, otherwise double-quoted
fn scalar_string(value: &str) -> String {
    if needs_quotes(value) {
        // A JSON string literal is a valid YAML double-quoted scalar
        serde_json::Value::String(value.to_string()).to_string()
    } else {
        value.to_string()
    }
}

fn needs_quotes(value: &str) -> bool {
    if value.is_empty() || value.chars().any(char::is_control) || is_yaml11_typed(value) {
        return true;
    }
    // Anything a YAML 1.2 reader would not read back as this exact string
    !matches!(serde_yaml::from_str::<Value>(value), Ok(Value::String(parsed)) if parsed == value)
}

/// Plain scalars YAML 1.1 resolves to booleans, null, numbers or timestamps
fn is_yaml11_typed(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    if YAML11_WORDS.contains(&lower.as_str()) {
        return true;
    }

    let bytes = value.as_bytes();
    let date_like = bytes.len() >= 6
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5].is_ascii_digit();
    if date_like {
        return true;
    }

    // Integers and floats with `_` separators, sexagesimal `1:30`
    let unsigned = value.trim_start_matches(['+', '-']);
    unsigned.bytes().any(|b| b.is_ascii_digit())
        && unsigned
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'_' | b'.' | b':'))
        && unsigned.bytes().filter(|b| *b == b'.').count() <= 1
}
