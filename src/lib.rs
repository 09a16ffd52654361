//! word2vec - Embedding Lookup Engine
//!
//! Loads trained word vectors from the word2vec binary format and answers
//! exact cosine-similarity nearest-neighbor queries against them.
//!
//! ```no_run
//! use word2vec::{EmbeddingModel, ParseConfig, QueryConfig};
//!
//! # fn main() -> word2vec::Result<()> {
//! let model = EmbeddingModel::parse_file("vectors.bin", &ParseConfig::default())?;
//! let neighbors = model.nearest_neighbors(&["cat"], &QueryConfig::default().with_neighbors_count(10))?;
//! for neighbor in &neighbors {
//!     println!("{} {}", neighbor.word_lossy(), neighbor.score);
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod model;
pub mod search;
pub mod vector;

pub use error::{Error, ParseError, QueryError, Result};
pub use model::{EmbeddingModel, ModelParser, ParseConfig, WordIndex};
pub use search::{
    Lookup, NearestNeighborEngine, Neighbor, NeighborResult, QueryConfig, DEFAULT_NEIGHBORS_COUNT,
};
