//! Query Results

use bytes::Bytes;
use std::fmt;

/// One ranked neighbor
#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    /// The neighbor word
    pub word: Bytes,
    /// Vocabulary rank of the word
    pub index: usize,
    /// Cosine similarity to the query, in (0, 1]
    pub score: f32,
}

impl Neighbor {
    /// Word decoded as (lossy) UTF-8
    pub fn word_lossy(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.word)
    }
}

/// Neighbors of a query, best first, without duplicates
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NeighborResult {
    neighbors: Vec<Neighbor>,
}

impl NeighborResult {
    pub(crate) fn new(neighbors: Vec<Neighbor>) -> Self {
        Self { neighbors }
    }

    pub fn len(&self) -> usize {
        self.neighbors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.neighbors.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Neighbor> {
        self.neighbors.iter()
    }

    pub fn as_slice(&self) -> &[Neighbor] {
        &self.neighbors
    }

    /// Score of `word`, if it is among the neighbors
    pub fn get(&self, word: impl AsRef<[u8]>) -> Option<f32> {
        let word = word.as_ref();
        self.neighbors
            .iter()
            .find(|n| n.word.as_ref() == word)
            .map(|n| n.score)
    }

    pub fn words(&self) -> impl Iterator<Item = &Bytes> + '_ {
        self.neighbors.iter().map(|n| &n.word)
    }

    pub fn scores(&self) -> impl Iterator<Item = f32> + '_ {
        self.neighbors.iter().map(|n| n.score)
    }

    pub fn into_vec(self) -> Vec<Neighbor> {
        self.neighbors
    }
}

impl IntoIterator for NeighborResult {
    type Item = Neighbor;
    type IntoIter = std::vec::IntoIter<Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.neighbors.into_iter()
    }
}

impl<'a> IntoIterator for &'a NeighborResult {
    type Item = &'a Neighbor;
    type IntoIter = std::slice::Iter<'a, Neighbor>;

    fn into_iter(self) -> Self::IntoIter {
        self.neighbors.iter()
    }
}

impl fmt::Display for NeighborResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for neighbor in &self.neighbors {
            writeln!(f, "{}\t{}", neighbor.word_lossy(), neighbor.score)?;
        }
        Ok(())
    }
}
