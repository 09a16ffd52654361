//! Model Module
//!
//! Loading of word2vec binary files into an immutable [`EmbeddingModel`].

mod config;
mod embedding;
mod index;
mod parser;

#[cfg(test)]
pub(crate) mod fixture;

pub use config::ParseConfig;
pub use embedding::EmbeddingModel;
pub use index::WordIndex;
pub use parser::ModelParser;
