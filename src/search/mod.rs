//! Search Module
//!
//! Exact nearest-neighbor queries over a loaded [`EmbeddingModel`](crate::EmbeddingModel).

mod config;
mod engine;
mod ranking;
mod result;

pub use config::{Lookup, QueryConfig, DEFAULT_NEIGHBORS_COUNT};
pub use engine::NearestNeighborEngine;
pub use result::{Neighbor, NeighborResult};
