//! Integration tests for loading and writing documents on disk

use openapi_expand_common::{ExpandError, Node};
use openapi_expand_parser::{DocumentFormat, DocumentLoader, DocumentWriter};
use std::fs;
use tempfile::TempDir;

const MANAGEMENT_PLANE_JSON: &str = r##"{
    "openapi": "3.0.0",
    "info": {"title": "Management Plane API", "version": "2.0.0"},
    "paths": {
        "/projects/{id}": {
            "delete": {
                "operationId": "deleteProject",
                "responses": {"204": {"description": "Deleted"}}
            }
        }
    }
}"##;

#[test]
fn test_extensionless_json_is_sniffed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("management-plane");
    fs::write(&path, MANAGEMENT_PLANE_JSON).unwrap();

    let doc = DocumentLoader::from_file(&path).unwrap();
    assert_eq!(
        doc.get("info")
            .and_then(|info| info.get("title"))
            .and_then(Node::as_str),
        Some("Management Plane API")
    );
}

#[test]
fn test_json_content_in_yaml_file_loads() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("management-plane.yaml");
    fs::write(&path, MANAGEMENT_PLANE_JSON).unwrap();

    let from_yaml = DocumentLoader::from_file(&path).unwrap();
    let from_json = DocumentLoader::from_str(MANAGEMENT_PLANE_JSON, DocumentFormat::Json).unwrap();
    assert_eq!(from_yaml, from_json);
}

#[test]
fn test_parse_error_names_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{\"openapi\": }").unwrap();

    match DocumentLoader::from_file(&path) {
        Err(ExpandError::Parse(message)) => {
            assert!(message.contains("broken.json"), "{message}");
            assert!(message.contains("JSON"), "{message}");
        }
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_yaml_to_json_conversion_keeps_order() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("spec.yml");
    let output = dir.path().join("spec.json");
    fs::write(&input, "zeta: 1\nalpha:\n  - b\n  - a\nmid: null\n").unwrap();

    let doc = DocumentLoader::from_file(&input).unwrap();
    DocumentWriter::for_path(&output)
        .write_to_file(&doc, &output)
        .unwrap();

    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        "{\n  \"zeta\": 1,\n  \"alpha\": [\n    \"b\",\n    \"a\"\n  ],\n  \"mid\": null\n}\n"
    );
}

#[test]
fn test_overwrites_existing_output() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.yaml");
    fs::write(&output, "stale: true\n").unwrap();

    let doc = DocumentLoader::from_str("fresh: true\n", DocumentFormat::Yaml).unwrap();
    DocumentWriter::for_path(&output)
        .write_to_file(&doc, &output)
        .unwrap();

    assert_eq!(DocumentLoader::from_file(&output).unwrap(), doc);
}
