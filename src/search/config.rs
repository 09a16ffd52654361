//! Query Configuration

/// Neighbor count used when the caller does not pick one
pub const DEFAULT_NEIGHBORS_COUNT: usize = 40;

/// How search terms are resolved to vocabulary ranks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lookup {
    /// Scan the vocabulary in order
    #[default]
    Linear,
    /// Use the model's cached [`WordIndex`](crate::WordIndex)
    Mapped,
}

/// Query configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryConfig {
    /// Maximum number of neighbors returned
    pub neighbors_count: usize,

    /// Term resolution strategy
    pub lookup: Lookup,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            neighbors_count: DEFAULT_NEIGHBORS_COUNT,
            lookup: Lookup::Linear,
        }
    }
}

impl QueryConfig {
    pub fn with_neighbors_count(mut self, neighbors_count: usize) -> Self {
        self.neighbors_count = neighbors_count;
        self
    }

    pub fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }
}
