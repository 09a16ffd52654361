//! Hashed Word Index
//!
//! Constant-time alternative to [`EmbeddingModel::index_of`] with the same
//! first-match semantics for duplicate words.

use bytes::Bytes;
use hashbrown::HashMap;

use super::embedding::EmbeddingModel;

/// Word -> vocabulary rank
#[derive(Debug, Clone, Default)]
pub struct WordIndex {
    map: HashMap<Bytes, usize>,
}

impl WordIndex {
    pub fn build(model: &EmbeddingModel) -> Self {
        let mut map = HashMap::with_capacity(model.vocabulary_length());
        for (index, word) in model.vocabulary().iter().enumerate() {
            // Later duplicates stay unreachable, as with the linear scan.
            map.entry(word.clone()).or_insert(index);
        }
        Self { map }
    }

    pub fn index_of(&self, word: impl AsRef<[u8]>) -> Option<usize> {
        self.map.get(word.as_ref()).copied()
    }

    /// Number of distinct words
    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}
