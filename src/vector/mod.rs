//! Vector Module
//!
//! Shared vector math used by the loader and the search engine.

mod similarity;

pub use similarity::{accumulate, dot_product, normalize, squared_magnitude};
