//! Recursive `$ref` expansion

use crate::options::{ExpandOptions, SiblingPolicy};
use crate::pointer::{format_pointer, PointerError, RefPointer};
use openapi_expand_common::{ExpandError, Mapping, Node, Result, REF_KEY};
use std::collections::HashMap;

/// Counters collected during one expansion run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpansionStats {
    /// Reference nodes replaced, including those served from the cache
    pub references_resolved: usize,

    /// Reference nodes served from the memo cache
    pub cache_hits: usize,

    /// Longest reference chain followed
    pub deepest_chain: usize,

    /// Whether a top-level `components` mapping was removed
    pub components_pruned: bool,
}

/// Result of a successful expansion
#[derive(Debug, Clone)]
pub struct Expansion {
    pub document: Node,
    pub stats: ExpansionStats,
}

/// Replaces every internal reference in a document with a deep copy of the
/// subtree it designates
///
/// The root document is also the resolution base. It is borrowed and never
/// modified; the expanded tree is built fresh.
///
/// # Example
/// ```rust,ignore
/// let expansion = RefExpander::new(&doc)
///     .with_options(ExpandOptions::default().with_memoize(true))
///     .expand()?;
/// println!("{} references resolved", expansion.stats.references_resolved);
/// ```
pub struct RefExpander<'a> {
    root: &'a Node,
    options: ExpandOptions,

    /// Canonical pointers currently being expanded, outermost first
    in_progress: Vec<String>,

    /// Expanded targets by canonical pointer, when memoizing, with the
    /// length of the longest reference chain starting at that pointer
    cache: HashMap<String, (Node, usize)>,

    /// Deepest stack length reached inside the reference being expanded
    chain_high_water: usize,

    stats: ExpansionStats,
}

impl<'a> RefExpander<'a> {
    pub fn new(root: &'a Node) -> Self {
        Self {
            root,
            options: ExpandOptions::default(),
            in_progress: Vec::new(),
            cache: HashMap::new(),
            chain_high_water: 0,
            stats: ExpansionStats::default(),
        }
    }

    pub fn with_options(mut self, options: ExpandOptions) -> Self {
        self.options = options;
        self
    }

    /// Expand the whole document
    pub fn expand(mut self) -> Result<Expansion> {
        let root = self.root;
        let mut location = Vec::new();
        let mut document = self.expand_node(root, &mut location)?;

        if self.options.prune_components {
            self.stats.components_pruned = prune_components(&mut document);
        }

        tracing::debug!(
            resolved = self.stats.references_resolved,
            cache_hits = self.stats.cache_hits,
            deepest_chain = self.stats.deepest_chain,
            "expansion complete"
        );

        Ok(Expansion {
            document,
            stats: self.stats,
        })
    }

    fn expand_node(&mut self, node: &'a Node, location: &mut Vec<String>) -> Result<Node> {
        match node {
            Node::Scalar(_) => Ok(node.clone()),
            Node::Sequence(items) => {
                let mut expanded = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    location.push(index.to_string());
                    let result = self.expand_node(item, location);
                    location.pop();
                    expanded.push(result?);
                }
                Ok(Node::Sequence(expanded))
            }
            Node::Mapping(entries) => {
                if let Some(reference) = node.reference() {
                    if entries.len() == 1 {
                        return self.expand_reference(reference, location);
                    }
                    if self.options.siblings == SiblingPolicy::Merge {
                        return self.expand_with_siblings(reference, entries, location);
                    }
                }
                self.expand_entries(entries, location, |_| true)
                    .map(Node::Mapping)
            }
        }
    }

    fn expand_entries(
        &mut self,
        entries: &'a Mapping,
        location: &mut Vec<String>,
        keep: impl Fn(&str) -> bool,
    ) -> Result<Mapping> {
        let mut expanded = Mapping::with_capacity(entries.len());
        for (key, value) in entries.iter().filter(|(key, _)| keep(key)) {
            location.push(key.clone());
            let result = self.expand_node(value, location);
            location.pop();
            expanded.insert(key.clone(), result?);
        }
        Ok(expanded)
    }

    /// Resolve `reference` and expand its target to a fixed point
    fn expand_reference(&mut self, reference: &str, location: &[String]) -> Result<Node> {
        let at = format_pointer(location);
        let pointer =
            RefPointer::parse(reference).map_err(|e| resolution_error(reference, &at, e))?;
        let key = pointer.to_string();

        if let Some(start) = self.in_progress.iter().position(|p| *p == key) {
            let mut chain = self.in_progress[start..].to_vec();
            chain.push(key.clone());
            return Err(ExpandError::Cycle {
                reference: key,
                location: at,
                chain,
            });
        }

        if self.in_progress.len() >= self.options.max_depth {
            return Err(ExpandError::DepthLimit {
                reference: key,
                location: at,
                limit: self.options.max_depth,
            });
        }

        if self.options.memoize {
            if let Some((cached, chain_len)) = self.cache.get(&key) {
                let reached = self.in_progress.len() + chain_len;
                if reached > self.options.max_depth {
                    return Err(ExpandError::DepthLimit {
                        reference: key,
                        location: at,
                        limit: self.options.max_depth,
                    });
                }
                let expanded = cached.clone();
                self.record_chain(reached);
                self.stats.cache_hits += 1;
                self.stats.references_resolved += 1;
                return Ok(expanded);
            }
        }

        let target = pointer
            .resolve(self.root)
            .map_err(|e| resolution_error(reference, &at, e))?;

        tracing::debug!(
            reference = %key,
            location = %at,
            depth = self.in_progress.len() + 1,
            "resolving reference"
        );

        let base = self.in_progress.len();
        let outer_high_water = self.chain_high_water;
        self.in_progress.push(key.clone());
        self.chain_high_water = 0;
        self.record_chain(self.in_progress.len());

        let mut target_location = pointer.segments().to_vec();
        let result = self.expand_node(target, &mut target_location);
        self.in_progress.pop();
        let chain_len = self.chain_high_water - base;
        self.chain_high_water = self.chain_high_water.max(outer_high_water);
        let expanded = result?;

        self.stats.references_resolved += 1;
        if self.options.memoize {
            self.cache.insert(key, (expanded.clone(), chain_len));
        }

        Ok(expanded)
    }

    fn record_chain(&mut self, depth: usize) {
        self.chain_high_water = self.chain_high_water.max(depth);
        self.stats.deepest_chain = self.stats.deepest_chain.max(depth);
    }

    /// Resolve a `$ref` that has sibling keys and overlay the siblings
    ///
    /// The target is expanded first; the siblings are expanded afterwards,
    /// outside the target's resolution chain.
    fn expand_with_siblings(
        &mut self,
        reference: &str,
        entries: &'a Mapping,
        location: &mut Vec<String>,
    ) -> Result<Node> {
        let target = self.expand_reference(reference, location)?;
        let siblings = self.expand_entries(entries, location, |key| key != REF_KEY)?;

        match target {
            Node::Mapping(mut merged) => {
                merged.extend(siblings);
                Ok(Node::Mapping(merged))
            }
            other => {
                tracing::warn!(
                    reference,
                    location = %format_pointer(location),
                    target = other.kind(),
                    dropped = siblings.len(),
                    "reference target is not a mapping, dropping sibling keys"
                );
                Ok(other)
            }
        }
    }
}

/// Remove the top-level `components` mapping, keeping the order of the
/// remaining keys. Returns whether anything was removed.
pub fn prune_components(document: &mut Node) -> bool {
    document
        .as_mapping_mut()
        .is_some_and(|entries| entries.shift_remove("components").is_some())
}

fn resolution_error(reference: &str, location: &str, err: PointerError) -> ExpandError {
    ExpandError::Resolution {
        reference: reference.to_string(),
        location: location.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Node {
        serde_json::from_str(json).unwrap()
    }

    fn run(doc: &Node, options: ExpandOptions) -> Result<Expansion> {
        RefExpander::new(doc).with_options(options).expand()
    }

    #[test]
    fn test_fan_out_example() {
        let doc = parse(r##"{"defs": {"x": 1}, "a": {"$ref": "#/defs"}, "b": {"$ref": "#/defs"}}"##);
        let expansion = run(&doc, ExpandOptions::default()).unwrap();
        assert_eq!(
            expansion.document,
            parse(r#"{"defs": {"x": 1}, "a": {"x": 1}, "b": {"x": 1}}"#)
        );
        assert_eq!(expansion.stats.references_resolved, 2);
        assert_eq!(expansion.stats.deepest_chain, 1);
    }

    #[test]
    fn test_chain_followed_to_fixed_point() {
        let doc = parse(
            r##"{
                "a": {"$ref": "#/b"},
                "b": {"$ref": "#/c"},
                "c": {"value": {"$ref": "#/d"}},
                "d": "leaf"
            }"##,
        );
        let expansion = run(&doc, ExpandOptions::default()).unwrap();
        assert_eq!(expansion.document.get("a"), Some(&parse(r#"{"value": "leaf"}"#)));
        assert_eq!(expansion.document.count_references(), 0);
        assert_eq!(expansion.stats.deepest_chain, 3);
    }

    #[test]
    fn test_mutual_cycle() {
        let doc = parse(r##"{"A": {"$ref": "#/B"}, "B": {"$ref": "#/A"}}"##);
        match run(&doc, ExpandOptions::default()) {
            Err(ExpandError::Cycle { reference, chain, .. }) => {
                assert_eq!(reference, "#/B");
                assert_eq!(chain, vec!["#/B", "#/A", "#/B"]);
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_self_containing_schema_is_cycle() {
        let doc = parse(
            r##"{"Node": {"type": "object", "properties": {"next": {"$ref": "#/Node"}}}}"##,
        );
        let err = run(&doc, ExpandOptions::default()).unwrap_err();
        match err {
            ExpandError::Cycle { location, .. } => {
                assert_eq!(location, "#/Node/properties/next")
            }
            other => panic!("expected cycle, got {other:?}"),
        }
    }

    #[test]
    fn test_root_reference_is_cycle() {
        let doc = parse(r##"{"a": {"$ref": "#"}}"##);
        assert!(matches!(
            run(&doc, ExpandOptions::default()),
            Err(ExpandError::Cycle { .. })
        ));
    }

    #[test]
    fn test_diamond_is_not_cycle() {
        let doc = parse(
            r##"{
                "shared": {"type": "string"},
                "left": {"inner": {"$ref": "#/shared"}},
                "right": {"inner": {"$ref": "#/shared"}},
                "top": {"l": {"$ref": "#/left"}, "r": {"$ref": "#/right"}}
            }"##,
        );
        let expansion = run(&doc, ExpandOptions::default()).unwrap();
        let top = expansion.document.get("top").unwrap();
        assert_eq!(top.get("l"), top.get("r"));
        assert_eq!(expansion.document.count_references(), 0);
    }

    #[test]
    fn test_dangling_reference_names_paths() {
        let doc = parse(r##"{"paths": {"/pets": {"schema": {"$ref": "#/components/schemas/Pet"}}}}"##);
        match run(&doc, ExpandOptions::default()) {
            Err(ExpandError::Resolution {
                reference,
                location,
                reason,
            }) => {
                assert_eq!(reference, "#/components/schemas/Pet");
                assert_eq!(location, "#/paths/~1pets/schema");
                assert!(reason.contains("`components`"), "{reason}");
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[test]
    fn test_external_reference_rejected() {
        let doc = parse(r##"{"a": {"$ref": "common.yaml#/Error"}}"##);
        match run(&doc, ExpandOptions::default()) {
            Err(ExpandError::Resolution { reason, .. }) => {
                assert!(reason.contains("external"))
            }
            other => panic!("expected resolution error, got {other:?}"),
        }
    }

    #[test]
    fn test_depth_limit() {
        let doc = parse(
            r##"{"a": {"$ref": "#/b"}, "b": {"$ref": "#/c"}, "c": {"$ref": "#/d"}, "d": 1}"##,
        );
        assert!(matches!(
            run(&doc, ExpandOptions::default().with_max_depth(2)),
            Err(ExpandError::DepthLimit { limit: 2, .. })
        ));
        assert!(run(&doc, ExpandOptions::default().with_max_depth(3)).is_ok());
    }

    #[test]
    fn test_sibling_merge() {
        let doc = parse(
            r##"{
                "Base": {"type": "object", "description": "base"},
                "use": {"$ref": "#/Base", "description": "override", "nullable": true}
            }"##,
        );
        let expansion = run(&doc, ExpandOptions::default()).unwrap();
        assert_eq!(
            expansion.document.get("use"),
            Some(&parse(
                r#"{"type": "object", "description": "override", "nullable": true}"#
            ))
        );
    }

    #[test]
    fn test_sibling_merge_drops_siblings_for_scalar_target() {
        let doc = parse(r##"{"name": "pet", "use": {"$ref": "#/name", "extra": 1}}"##);
        let expansion = run(&doc, ExpandOptions::default()).unwrap();
        assert_eq!(expansion.document.get("use"), Some(&Node::from("pet")));
    }

    #[test]
    fn test_sibling_preserve() {
        let doc = parse(
            r##"{
                "Base": {"type": "object"},
                "use": {"$ref": "#/Base", "items": {"$ref": "#/Base"}}
            }"##,
        );
        let options = ExpandOptions::default().with_siblings(SiblingPolicy::Preserve);
        let expansion = run(&doc, options).unwrap();
        assert_eq!(
            expansion.document.get("use"),
            Some(&parse(r##"{"$ref": "#/Base", "items": {"type": "object"}}"##))
        );
    }

    #[test]
    fn test_memoized_output_matches() {
        let doc = parse(
            r##"{
                "Id": {"type": "string"},
                "Pet": {"properties": {"id": {"$ref": "#/Id"}, "owner": {"$ref": "#/Id"}}},
                "list": [{"$ref": "#/Pet"}, {"$ref": "#/Pet"}, {"$ref": "#/Id"}]
            }"##,
        );
        let plain = run(&doc, ExpandOptions::default()).unwrap();
        let memo = run(&doc, ExpandOptions::default().with_memoize(true)).unwrap();

        assert_eq!(plain.document, memo.document);
        assert_eq!(plain.stats.cache_hits, 0);
        assert!(memo.stats.cache_hits > 0);
    }

    #[test]
    fn test_memoized_depth_limit_matches_plain() {
        // `#/c` is first cached from a one-deep stack, then reused from `#/b`
        let doc = parse(
            r##"{"x": {"$ref": "#/c"}, "a": {"$ref": "#/b"}, "b": {"$ref": "#/c"}, "c": {"$ref": "#/d"}, "d": 1}"##,
        );

        for max_depth in 1..=4 {
            let options = ExpandOptions::default().with_max_depth(max_depth);
            let plain = run(&doc, options.clone());
            let memo = run(&doc, options.with_memoize(true));
            match (&plain, &memo) {
                (Ok(plain), Ok(memo)) => {
                    assert_eq!(plain.document, memo.document);
                    assert_eq!(plain.stats.deepest_chain, memo.stats.deepest_chain);
                }
                (
                    Err(ExpandError::DepthLimit { limit: a, .. }),
                    Err(ExpandError::DepthLimit { limit: b, .. }),
                ) => assert_eq!(a, b),
                _ => panic!("max_depth {max_depth}: plain {plain:?}, memo {memo:?}"),
            }
        }

        assert!(matches!(
            run(&doc, ExpandOptions::default().with_max_depth(2).with_memoize(true)),
            Err(ExpandError::DepthLimit { limit: 2, .. })
        ));
    }

    #[test]
    fn test_prune_components() {
        let doc = parse(
            r##"{
                "openapi": "3.0.0",
                "components": {"schemas": {"Pet": {"type": "object"}}},
                "paths": {"/pets": {"$ref": "#/components/schemas/Pet"}}
            }"##,
        );
        let expansion = run(&doc, ExpandOptions::default().with_prune_components(true)).unwrap();
        assert!(expansion.stats.components_pruned);
        let keys: Vec<&String> = expansion.document.as_mapping().unwrap().keys().collect();
        assert_eq!(keys, vec!["openapi", "paths"]);
        assert_eq!(
            expansion.document.get("paths"),
            Some(&parse(r#"{"/pets": {"type": "object"}}"#))
        );
    }

    #[test]
    fn test_prune_components_without_components() {
        let mut doc = parse(r#"{"openapi": "3.0.0"}"#);
        assert!(!prune_components(&mut doc));
        let mut scalar = Node::from("x");
        assert!(!prune_components(&mut scalar));
    }

    #[test]
    fn test_input_not_modified() {
        let doc = parse(r##"{"defs": {"x": 1}, "a": {"$ref": "#/defs"}}"##);
        let before = doc.clone();
        run(&doc, ExpandOptions::default()).unwrap();
        assert_eq!(doc, before);
    }
}
