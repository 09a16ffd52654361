//! Nearest Neighbor Engine
//!
//! Exact brute-force cosine search. Stored vectors are unit length, so the
//! score of each candidate is a plain dot product with the normalized
//! composite query vector.

use bytes::Bytes;
use std::time::Instant;
use tracing::debug;

use super::config::{Lookup, QueryConfig};
use super::ranking::TopK;
use super::result::{Neighbor, NeighborResult};
use crate::error::{Error, QueryError, Result};
use crate::model::EmbeddingModel;
use crate::vector::{accumulate, dot_product, normalize};

/// Read-only query engine over a borrowed model
#[derive(Debug, Clone, Copy)]
pub struct NearestNeighborEngine<'a> {
    model: &'a EmbeddingModel,
}

impl<'a> NearestNeighborEngine<'a> {
    pub fn new(model: &'a EmbeddingModel) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &'a EmbeddingModel {
        self.model
    }

    /// Find up to `neighbors_count` words closest to the sum of `search_terms`.
    ///
    /// `index_resolver` maps a term to its vocabulary rank; pass
    /// `|w| model.index_of(w)` for the linear scan or any faster lookup with
    /// the same first-match semantics. Search terms themselves are never
    /// part of the result, nor is any other copy of their words, and each
    /// word appears at most once. The call either succeeds fully or returns an
    /// error; no partial result is produced.
    pub fn nearest_neighbors<T, F>(
        &self,
        search_terms: &[T],
        neighbors_count: usize,
        mut index_resolver: F,
    ) -> Result<NeighborResult>
    where
        T: AsRef<[u8]>,
        F: FnMut(&[u8]) -> Option<usize>,
    {
        if search_terms.is_empty() {
            return Err(Error::InvalidArgument(
                "search terms must not be empty".to_string(),
            ));
        }
        if neighbors_count == 0 {
            return Err(Error::InvalidArgument(
                "neighbors count must be positive".to_string(),
            ));
        }

        let start = Instant::now();

        let term_indices = self.resolve(search_terms, &mut index_resolver)?;
        let query = self.query_vector(&term_indices)?;

        let vocabulary = self.model.vocabulary();
        let term_words: Vec<&Bytes> = term_indices.iter().map(|&i| &vocabulary[i]).collect();

        // Later copies of a duplicated word are unreachable by name, so only
        // the first occurrence of each word is ranked.
        let word_index = self.model.word_index();
        let has_duplicates = word_index.len() < vocabulary.len();

        // At most vocabulary_length - 1 candidates are eligible.
        let mut ranking = TopK::new(neighbors_count.min(vocabulary.len()));
        for (index, vector) in self.model.rows().enumerate() {
            let word = &vocabulary[index];
            if term_words.contains(&word) {
                continue;
            }
            if has_duplicates && word_index.index_of(word) != Some(index) {
                continue;
            }
            ranking.offer(index, dot_product(&query, vector));
        }

        let neighbors = ranking
            .into_ranked()
            .filter_map(|(index, score)| {
                self.model.word(index).map(|word| Neighbor {
                    word: word.clone(),
                    index,
                    score,
                })
            })
            .collect();
        let result = NeighborResult::new(neighbors);

        debug!(
            terms = search_terms.len(),
            neighbors_count,
            found = result.len(),
            latency = ?start.elapsed(),
            "Nearest neighbors query"
        );

        Ok(result)
    }

    fn resolve<T, F>(&self, search_terms: &[T], index_resolver: &mut F) -> Result<Vec<usize>>
    where
        T: AsRef<[u8]>,
        F: FnMut(&[u8]) -> Option<usize>,
    {
        let vocabulary_length = self.model.vocabulary_length();

        search_terms
            .iter()
            .map(|term| -> Result<usize> {
                let term = term.as_ref();
                let index = index_resolver(term).ok_or_else(|| {
                    QueryError::UnknownTerm(String::from_utf8_lossy(term).into_owned())
                })?;
                if index >= vocabulary_length {
                    return Err(QueryError::IndexOutOfRange {
                        index,
                        vocabulary_length,
                    }
                    .into());
                }
                Ok(index)
            })
            .collect()
    }

    /// Normalized sum of the vectors at `term_indices`
    fn query_vector(&self, term_indices: &[usize]) -> Result<Vec<f32>> {
        let mut query = vec![0.0f32; self.model.vector_dimensionality()];
        for &index in term_indices {
            if let Some(vector) = self.model.vector(index) {
                accumulate(&mut query, vector);
            }
        }

        if !normalize(&mut query) {
            return Err(QueryError::DegenerateQuery.into());
        }
        Ok(query)
    }
}

impl EmbeddingModel {
    /// Rank of `word` using the given lookup strategy
    pub fn resolve_index(&self, word: impl AsRef<[u8]>, lookup: Lookup) -> Option<usize> {
        match lookup {
            Lookup::Linear => self.index_of(word),
            Lookup::Mapped => self.word_index().index_of(word),
        }
    }

    /// Query with the lookup strategy and neighbor count from `config`
    pub fn nearest_neighbors<T: AsRef<[u8]>>(
        &self,
        search_terms: &[T],
        config: &QueryConfig,
    ) -> Result<NeighborResult> {
        NearestNeighborEngine::new(self).nearest_neighbors(
            search_terms,
            config.neighbors_count,
            |w| self.resolve_index(w, config.lookup),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixture::load;
    use crate::model::WordIndex;

    fn scenario() -> EmbeddingModel {
        load(2, &[("the", &[1.0, 0.0]), ("cat", &[0.0, 1.0]), ("dog", &[0.0, 0.99])])
    }

    fn sample() -> EmbeddingModel {
        load(
            3,
            &[
                ("king", &[0.9, 0.8, 0.1]),
                ("queen", &[0.85, 0.9, 0.15]),
                ("man", &[0.7, 0.1, 0.05]),
                ("woman", &[0.6, 0.3, 0.1]),
                ("apple", &[0.05, 0.1, 0.95]),
                ("pear", &[0.1, 0.05, 0.9]),
                ("anti", &[-0.9, -0.8, -0.1]),
            ],
        )
    }

    fn linear<'m>(model: &'m EmbeddingModel) -> impl FnMut(&[u8]) -> Option<usize> + 'm {
        move |w: &[u8]| model.index_of(w)
    }

    #[test]
    fn test_scenario_query() {
        let model = scenario();
        let engine = NearestNeighborEngine::new(&model);

        let result = engine.nearest_neighbors(&["cat"], 2, linear(&model)).unwrap();

        // `the` is orthogonal (score 0) and never beats an empty slot.
        assert_eq!(result.len(), 1);
        let top = &result.as_slice()[0];
        assert_eq!(top.word.as_ref(), b"dog");
        assert_eq!(top.index, 2);
        assert!((top.score - 1.0).abs() < 1e-6);
        assert_eq!(result.get("cat"), None);
        assert_eq!(result.get("the"), None);
    }

    #[test]
    fn test_excludes_search_terms() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        let result = engine
            .nearest_neighbors(&["king", "queen"], 10, linear(&model))
            .unwrap();

        assert!(result.get("king").is_none());
        assert!(result.get("queen").is_none());
        assert_eq!(result.as_slice()[0].word.as_ref(), b"woman");
    }

    #[test]
    fn test_self_similarity_bound() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        for word in model.vocabulary_strings() {
            let result = engine.nearest_neighbors(&[word], 3, linear(&model)).unwrap();
            assert!(result.get(word).is_none());
            for score in result.scores() {
                assert!(score <= 1.0 + 1e-6);
            }
        }
    }

    #[test]
    fn test_results_are_true_top_k_descending() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        let result = engine.nearest_neighbors(&["man"], 3, linear(&model)).unwrap();
        let scores: Vec<f32> = result.scores().collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));

        // Brute-force every other candidate and compare with the cut-off.
        let query = model.vector_of("man").unwrap();
        let min_kept = scores.last().copied().unwrap();
        for (index, vector) in model.rows().enumerate() {
            let kept = result.iter().any(|n| n.index == index);
            if index == 2 || kept {
                continue;
            }
            assert!(dot_product(query, vector) <= min_kept);
        }
    }

    #[test]
    fn test_composite_query_sums_terms() {
        let model = load(
            2,
            &[("x", &[1.0, 0.0]), ("y", &[0.0, 1.0]), ("diag", &[1.0, 1.0]), ("xish", &[1.0, 0.2])],
        );
        let engine = NearestNeighborEngine::new(&model);

        let result = engine.nearest_neighbors(&["x", "y"], 2, linear(&model)).unwrap();

        assert_eq!(result.as_slice()[0].word.as_ref(), b"diag");
        assert!((result.as_slice()[0].score - 1.0).abs() < 1e-6);
        assert_eq!(result.as_slice()[1].word.as_ref(), b"xish");
    }

    #[test]
    fn test_negative_scores_dropped() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        let result = engine.nearest_neighbors(&["king"], 40, linear(&model)).unwrap();

        assert!(result.get("anti").is_none());
        assert!(result.len() < model.vocabulary_length() - 1);
        assert!(result.scores().all(|s| s > 0.0));
    }

    #[test]
    fn test_more_neighbors_than_candidates() {
        let model = load(1, &[("a", &[1.0]), ("b", &[2.0]), ("c", &[3.0])]);
        let engine = NearestNeighborEngine::new(&model);

        let result = engine.nearest_neighbors(&["a"], 100, linear(&model)).unwrap();

        assert_eq!(result.len(), 2);
        // All scores tie at 1.0; scan order is kept.
        assert_eq!(result.iter().map(|n| n.index).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn test_huge_neighbors_count() {
        let model = load(1, &[("a", &[1.0]), ("b", &[2.0]), ("c", &[3.0])]);
        let engine = NearestNeighborEngine::new(&model);

        let result = engine
            .nearest_neighbors(&["a"], usize::MAX, linear(&model))
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(
            model
                .nearest_neighbors(&["b"], &QueryConfig::default().with_neighbors_count(usize::MAX))
                .unwrap()
                .len(),
            2
        );
    }

    #[test]
    fn test_duplicate_words_ranked_once() {
        let model = load(1, &[("q", &[1.0]), ("dup", &[1.0]), ("dup", &[2.0])]);
        let engine = NearestNeighborEngine::new(&model);

        let result = engine.nearest_neighbors(&["q"], 5, linear(&model)).unwrap();

        assert_eq!(result.words().collect::<Vec<_>>(), vec![&Bytes::from_static(b"dup")]);
        assert_eq!(result.as_slice()[0].index, 1);
    }

    #[test]
    fn test_duplicate_of_search_term_excluded() {
        let model = load(1, &[("a", &[1.0]), ("b", &[1.0]), ("a", &[3.0])]);
        let engine = NearestNeighborEngine::new(&model);

        let result = engine.nearest_neighbors(&["a"], 5, linear(&model)).unwrap();
        assert_eq!(result.iter().map(|n| n.index).collect::<Vec<_>>(), vec![1]);

        // A resolver pointing at the later copy still excludes the first.
        let result = engine.nearest_neighbors(&["a"], 5, |_| Some(2)).unwrap();
        assert_eq!(result.iter().map(|n| n.index).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_duplicates_same_for_both_lookups() {
        let model = load(
            2,
            &[("x", &[1.0, 0.1]), ("y", &[0.9, 0.2]), ("x", &[1.0, 0.0]), ("z", &[0.5, 0.5]), ("y", &[1.0, 0.1])],
        );
        let linear = model
            .nearest_neighbors(&["z"], &QueryConfig::default())
            .unwrap();
        let mapped = model
            .nearest_neighbors(&["z"], &QueryConfig::default().with_lookup(Lookup::Mapped))
            .unwrap();

        assert_eq!(linear, mapped);
        assert_eq!(linear.len(), 2);
        assert!(linear.iter().all(|n| n.index < 2));
    }

    #[test]
    fn test_resolve_index() {
        let model = load(1, &[("a", &[1.0]), ("b", &[1.0]), ("a", &[1.0])]);

        for lookup in [Lookup::Linear, Lookup::Mapped] {
            assert_eq!(model.resolve_index("a", lookup), Some(0));
            assert_eq!(model.resolve_index("b", lookup), Some(1));
            assert_eq!(model.resolve_index("c", lookup), None);
        }
    }

    #[test]
    fn test_unknown_term() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        let err = engine
            .nearest_neighbors(&["king", "zebra"], 5, linear(&model))
            .unwrap_err();
        assert!(matches!(err, Error::Query(QueryError::UnknownTerm(ref t)) if t == "zebra"));
    }

    #[test]
    fn test_resolver_out_of_range() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        let err = engine.nearest_neighbors(&["king"], 5, |_| Some(99)).unwrap_err();
        assert!(matches!(
            err,
            Error::Query(QueryError::IndexOutOfRange {
                index: 99,
                vocabulary_length: 7
            })
        ));
    }

    #[test]
    fn test_degenerate_query() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        // `king` and `anti` are exact opposites and cancel out.
        let err = engine
            .nearest_neighbors(&["king", "anti"], 5, linear(&model))
            .unwrap_err();
        assert!(matches!(err, Error::Query(QueryError::DegenerateQuery)));
    }

    #[test]
    fn test_invalid_arguments() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        let empty: [&str; 0] = [];
        assert!(matches!(
            engine.nearest_neighbors(&empty, 5, linear(&model)),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            engine.nearest_neighbors(&["king"], 0, linear(&model)),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_duplicate_terms() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        let once = engine.nearest_neighbors(&["pear"], 3, linear(&model)).unwrap();
        let twice = engine
            .nearest_neighbors(&["pear", "pear"], 3, linear(&model))
            .unwrap();

        assert_eq!(
            once.words().collect::<Vec<_>>(),
            twice.words().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_deterministic() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);

        let first = engine.nearest_neighbors(&["woman"], 4, linear(&model)).unwrap();
        for _ in 0..5 {
            let again = engine.nearest_neighbors(&["woman"], 4, linear(&model)).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_external_index_matches_linear() {
        let model = sample();
        let engine = NearestNeighborEngine::new(&model);
        let index = WordIndex::build(&model);

        let linear_result = engine.nearest_neighbors(&["apple"], 3, linear(&model)).unwrap();
        let mapped_result = engine
            .nearest_neighbors(&["apple"], 3, |w| index.index_of(w))
            .unwrap();
        assert_eq!(linear_result, mapped_result);
    }

    #[test]
    fn test_model_query_with_config() {
        let model = sample();

        let linear = model
            .nearest_neighbors(&["queen"], &QueryConfig::default().with_neighbors_count(2))
            .unwrap();
        let mapped = model
            .nearest_neighbors(
                &["queen"],
                &QueryConfig::default()
                    .with_neighbors_count(2)
                    .with_lookup(Lookup::Mapped),
            )
            .unwrap();

        assert_eq!(linear.len(), 2);
        assert_eq!(linear, mapped);
        assert_eq!(linear.as_slice()[0].word.as_ref(), b"king");
    }

    #[test]
    fn test_query_leaves_model_untouched() {
        let model = sample();
        let before: Vec<Vec<f32>> = model.rows().map(<[f32]>::to_vec).collect();

        let _ = model.nearest_neighbors(&["zebra"], &QueryConfig::default());
        let _ = model.nearest_neighbors(&["king"], &QueryConfig::default());

        let after: Vec<Vec<f32>> = model.rows().map(<[f32]>::to_vec).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_concurrent_readers() {
        let model = sample();
        let expected = model
            .nearest_neighbors(&["apple"], &QueryConfig::default())
            .unwrap();

        std::thread::scope(|s| {
            for _ in 0..4 {
                s.spawn(|| {
                    let result = model
                        .nearest_neighbors(&["apple"], &QueryConfig::default())
                        .unwrap();
                    assert_eq!(result, expected);
                });
            }
        });
    }
}
