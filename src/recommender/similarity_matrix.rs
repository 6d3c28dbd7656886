use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::models::ItemId;

use super::similarity::{cosine, ItemVector};

/// Persisted form of a [`SimilarityMatrix`]: one entry per unordered pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilaritySnapshot {
    pub pairs: Vec<(ItemId, ItemId, f64)>,
}

impl SimilaritySnapshot {
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// Sparse, symmetric item-to-item similarity table
///
/// Items are interned into an arena of rows; a row maps neighbour slots to
/// similarity. [`SimilarityMatrix::set`] is the only mutator and keeps three
/// invariants after every call:
///
/// * `get(a, b) == get(b, a)` bit for bit
/// * no item is linked to itself
/// * every stored similarity is strictly positive
#[derive(Debug, Clone, Default)]
pub struct SimilarityMatrix {
    index: HashMap<ItemId, usize>,
    items: Vec<ItemId>,
    rows: Vec<HashMap<usize, f64>>,
}

impl SimilarityMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `value` in both directions, or unlinks the pair when
    /// `value <= 0` (NaN included)
    pub fn set(&mut self, a: ItemId, b: ItemId, value: f64) {
        if a == b {
            return;
        }

        if value > 0.0 {
            let slot_a = self.intern(a);
            let slot_b = self.intern(b);
            self.rows[slot_a].insert(slot_b, value);
            self.rows[slot_b].insert(slot_a, value);
        } else if let (Some(&slot_a), Some(&slot_b)) = (self.index.get(&a), self.index.get(&b)) {
            self.rows[slot_a].remove(&slot_b);
            self.rows[slot_b].remove(&slot_a);
        }
    }

    pub fn get(&self, a: ItemId, b: ItemId) -> Option<f64> {
        let slot_a = self.index.get(&a)?;
        let slot_b = self.index.get(&b)?;
        self.rows[*slot_a].get(slot_b).copied()
    }

    /// Positive-similarity neighbours of `item`; empty for unknown items
    pub fn neighbors_of(&self, item: ItemId) -> impl Iterator<Item = (ItemId, f64)> + '_ {
        self.index
            .get(&item)
            .map(|&slot| &self.rows[slot])
            .into_iter()
            .flat_map(move |row| row.iter().map(move |(&n, &s)| (self.items[n], s)))
    }

    /// Recomputes every pair of distinct items in `item_ids` from scratch
    ///
    /// Items without a vector have no raters and therefore no neighbours.
    pub fn rebuild_from(&mut self, item_ids: &[ItemId], vectors: &HashMap<ItemId, ItemVector>) {
        self.clear();

        let mut seen = HashSet::with_capacity(item_ids.len());
        let rated: Vec<(ItemId, &ItemVector)> = item_ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| vectors.get(id).map(|v| (*id, v)))
            .collect();

        for (i, (item1, vector1)) in rated.iter().enumerate() {
            for (item2, vector2) in &rated[i + 1..] {
                self.set(*item1, *item2, cosine(vector1, vector2));
            }
        }
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.items.clear();
        self.rows.clear();
    }

    /// Number of unordered pairs with a positive similarity
    pub fn pair_count(&self) -> usize {
        self.rows.iter().map(HashMap::len).sum::<usize>() / 2
    }

    /// Number of items with at least one neighbour
    pub fn item_count(&self) -> usize {
        self.rows.iter().filter(|row| !row.is_empty()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.pair_count() == 0
    }

    pub fn to_snapshot(&self) -> SimilaritySnapshot {
        let mut pairs: Vec<(ItemId, ItemId, f64)> = self
            .rows
            .iter()
            .enumerate()
            .flat_map(|(slot, row)| {
                let item = self.items[slot];
                row.iter()
                    .map(move |(&n, &s)| (item, self.items[n], s))
                    .filter(|(a, b, _)| a < b)
            })
            .collect();
        pairs.sort_by(|x, y| (x.0, x.1).cmp(&(y.0, y.1)));

        SimilaritySnapshot { pairs }
    }

    /// Replays every snapshot pair through [`SimilarityMatrix::set`], so self
    /// links and non-positive values in a damaged snapshot are dropped
    pub fn from_snapshot(snapshot: &SimilaritySnapshot) -> Self {
        let mut matrix = Self::new();
        for &(a, b, value) in &snapshot.pairs {
            matrix.set(a, b, value);
        }
        matrix
    }

    fn intern(&mut self, item: ItemId) -> usize {
        if let Some(&slot) = self.index.get(&item) {
            return slot;
        }
        let slot = self.items.len();
        self.items.push(item);
        self.rows.push(HashMap::new());
        self.index.insert(item, slot);
        slot
    }
}
