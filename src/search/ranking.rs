//! Top-K Ranking Table
//!
//! Fixed-capacity table kept sorted by descending score. Every slot starts
//! empty with score 0, so only strictly positive scores are ever retained.

#[derive(Debug, Clone, Copy)]
struct Slot {
    index: Option<usize>,
    score: f32,
}

impl Slot {
    const EMPTY: Slot = Slot {
        index: None,
        score: 0.0,
    };
}

#[derive(Debug, Clone)]
pub(crate) struct TopK {
    slots: Vec<Slot>,
}

impl TopK {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Slot::EMPTY; capacity],
        }
    }

    /// Insert a candidate if it beats some slot. A candidate equal to an
    /// existing score ranks after it, so earlier candidates win ties.
    pub(crate) fn offer(&mut self, index: usize, score: f32) -> bool {
        let Some(rank) = self.slots.iter().position(|slot| score > slot.score) else {
            return false;
        };

        // Shift lower entries down one, dropping the last.
        self.slots.pop();
        self.slots.insert(
            rank,
            Slot {
                index: Some(index),
                score,
            },
        );
        true
    }

    /// Filled slots as `(index, score)`, best first
    pub(crate) fn into_ranked(self) -> impl Iterator<Item = (usize, f32)> {
        self.slots
            .into_iter()
            .filter_map(|slot| slot.index.map(|index| (index, slot.score)))
    }
}
