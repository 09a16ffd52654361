//! Embedding Model
//!
//! Immutable vocabulary and unit-vector tables produced by [`ModelParser`].

use bytes::Bytes;
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

use super::config::ParseConfig;
use super::index::WordIndex;
use super::parser::ModelParser;
use crate::error::ParseError;

/// A loaded word2vec model.
///
/// Invariants, established by the parser before a model is handed out:
///
/// 1. vocabulary length and vector dimensionality are both non-zero;
/// 2. every word has at least one byte;
/// 3. every stored vector has unit Euclidean norm;
/// 4. nothing is mutated after construction, so a model can be shared
///    freely between threads.
///
/// Word order is the training corpus frequency rank, most frequent first.
/// Duplicate words are legal; lookups by name always find the first one.
pub struct EmbeddingModel {
    vocabulary: Vec<Bytes>,
    vector_dimensionality: usize,
    /// Row-major `vocabulary.len() x vector_dimensionality`
    vectors: Vec<f32>,

    // Memoized views
    vocabulary_strings: OnceLock<Vec<String>>,
    vector_rows: OnceLock<Vec<Vec<f32>>>,
    word_index: OnceLock<WordIndex>,
}

impl EmbeddingModel {
    pub(crate) fn from_parts(
        vocabulary: Vec<Bytes>,
        vector_dimensionality: usize,
        vectors: Vec<f32>,
    ) -> Self {
        debug_assert!(!vocabulary.is_empty());
        debug_assert!(vector_dimensionality > 0);
        debug_assert_eq!(vectors.len(), vocabulary.len() * vector_dimensionality);

        Self {
            vocabulary,
            vector_dimensionality,
            vectors,
            vocabulary_strings: OnceLock::new(),
            vector_rows: OnceLock::new(),
            word_index: OnceLock::new(),
        }
    }

    /// Parse a model from an open stream (see [`ModelParser::parse`])
    pub fn parse<R: std::io::BufRead>(reader: R, config: &ParseConfig) -> Result<Self, ParseError> {
        ModelParser::new(*config).parse(reader)
    }

    /// Open `path` read-only and parse it. The file is closed before returning.
    pub fn parse_file(path: impl AsRef<Path>, config: &ParseConfig) -> Result<Self, ParseError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Opening model file");

        let file = File::open(path)?;
        Self::parse(BufReader::new(file), config)
    }

    pub fn vocabulary_length(&self) -> usize {
        self.vocabulary.len()
    }

    pub fn vector_dimensionality(&self) -> usize {
        self.vector_dimensionality
    }

    /// Raw vocabulary words, in rank order
    pub fn vocabulary(&self) -> &[Bytes] {
        &self.vocabulary
    }

    pub fn word(&self, index: usize) -> Option<&Bytes> {
        self.vocabulary.get(index)
    }

    /// Vocabulary decoded as (lossy) UTF-8. Computed on first call.
    pub fn vocabulary_strings(&self) -> &[String] {
        self.vocabulary_strings.get_or_init(|| {
            self.vocabulary
                .iter()
                .map(|word| String::from_utf8_lossy(word).into_owned())
                .collect()
        })
    }

    /// One owned vector per word. Computed on first call; prefer
    /// [`vector`](Self::vector) or [`rows`](Self::rows) on hot paths.
    pub fn vectors(&self) -> &[Vec<f32>] {
        self.vector_rows
            .get_or_init(|| self.rows().map(<[f32]>::to_vec).collect())
    }

    /// Stored vectors in vocabulary order
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[f32]> + '_ {
        self.vectors.chunks_exact(self.vector_dimensionality)
    }

    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        if index >= self.vocabulary.len() {
            return None;
        }
        let start = index * self.vector_dimensionality;
        Some(&self.vectors[start..start + self.vector_dimensionality])
    }

    pub fn vector_of(&self, word: impl AsRef<[u8]>) -> Option<&[f32]> {
        self.index_of(word).and_then(|index| self.vector(index))
    }

    /// Rank of `word` in the vocabulary by linear scan; first match wins.
    pub fn index_of(&self, word: impl AsRef<[u8]>) -> Option<usize> {
        let word = word.as_ref();
        self.vocabulary
            .iter()
            .position(|candidate| candidate.as_ref() == word)
    }

    /// Hashed word lookup, built on first call
    pub fn word_index(&self) -> &WordIndex {
        self.word_index.get_or_init(|| WordIndex::build(self))
    }
}

impl fmt::Debug for EmbeddingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingModel")
            .field("vocabulary_length", &self.vocabulary_length())
            .field("vector_dimensionality", &self.vector_dimensionality)
            .finish_non_exhaustive()
    }
}
