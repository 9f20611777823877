//! Expansion options

/// Longest reference chain followed before giving up
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// How to treat a mapping that holds `$ref` alongside other keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SiblingPolicy {
    /// Resolve the reference and overlay the sibling keys onto the result
    #[default]
    Merge,

    /// Leave the mapping as is; only its values are expanded
    Preserve,
}

/// Options controlling a [`RefExpander`](crate::RefExpander) run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOptions {
    /// Maximum number of references on the resolution stack at once
    pub max_depth: usize,

    /// Cache each expanded reference target and clone it on reuse
    pub memoize: bool,

    /// Treatment of `$ref` mappings with sibling keys
    pub siblings: SiblingPolicy,

    /// Drop the top-level `components` mapping after expansion
    pub prune_components: bool,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            memoize: false,
            siblings: SiblingPolicy::default(),
            prune_components: false,
        }
    }
}

impl ExpandOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_memoize(mut self, memoize: bool) -> Self {
        self.memoize = memoize;
        self
    }

    pub fn with_siblings(mut self, siblings: SiblingPolicy) -> Self {
        self.siblings = siblings;
        self
    }

    pub fn with_prune_components(mut self, prune_components: bool) -> Self {
        self.prune_components = prune_components;
        self
    }
}
