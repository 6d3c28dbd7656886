use std::collections::BTreeMap;

use crate::models::{Score, UserId};

/// Column view of the rating store: every user's score for one item
pub type ItemVector = BTreeMap<UserId, Score>;

/// Cosine similarity of two item vectors over their common raters
///
/// The dot product runs over users present in both vectors, but each norm is
/// taken over the whole vector. Items that share only a few raters therefore
/// score lower than a plain cosine over the overlap would give them.
///
/// Returns 0 when the vectors have no rater in common or either norm is 0.
/// Ratings are non-negative, so in practice the result lies in `[0, 1]`.
pub fn cosine(vector1: &ItemVector, vector2: &ItemVector) -> f64 {
    let (smaller, larger) = if vector1.len() <= vector2.len() {
        (vector1, vector2)
    } else {
        (vector2, vector1)
    };

    let mut overlap = false;
    let mut dot = 0.0;
    // Ascending user order keeps the sum identical for (a, b) and (b, a)
    for (user, score) in smaller {
        if let Some(other) = larger.get(user) {
            overlap = true;
            dot += score * other;
        }
    }

    if !overlap {
        return 0.0;
    }

    let norm1 = norm(vector1);
    let norm2 = norm(vector2);

    if norm1 == 0.0 || norm2 == 0.0 {
        return 0.0;
    }

    dot / (norm1 * norm2)
}

fn norm(vector: &ItemVector) -> f64 {
    vector.values().map(|v| v * v).sum::<f64>().sqrt()
}
