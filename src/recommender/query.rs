use std::collections::HashMap;

use crate::models::{ItemId, UserId};

use super::{rating_store::RatingStore, similarity_matrix::SimilarityMatrix};

/// Default number of recommendations returned when the caller gives none
pub const DEFAULT_TOP_N: usize = 10;

#[derive(Debug, Default, Clone, Copy)]
struct Accumulator {
    score_sum: f64,
    weight_sum: f64,
}

/// Ranks items the user has not rated by similarity-weighted average rating
///
/// Each rated item contributes `similarity * score` to every unrated
/// neighbour, normalised by the summed absolute similarities. Candidates are
/// ordered by predicted rating, highest first, with ties broken by ascending
/// item id. Unknown users get an empty list.
pub fn recommend(
    ratings: &RatingStore,
    similarities: &SimilarityMatrix,
    user: UserId,
    top_n: usize,
) -> Vec<ItemId> {
    predict(ratings, similarities, user)
        .into_iter()
        .take(top_n)
        .map(|(item, _)| item)
        .collect()
}

/// Predicted ratings for every candidate item, in ranking order
pub fn predict(
    ratings: &RatingStore,
    similarities: &SimilarityMatrix,
    user: UserId,
) -> Vec<(ItemId, f64)> {
    let rated = ratings.scores_of_user(user);
    if rated.is_empty() {
        return Vec::new();
    }

    let mut candidates: HashMap<ItemId, Accumulator> = HashMap::new();
    for (item, score) in rated {
        for (neighbor, similarity) in similarities.neighbors_of(*item) {
            if rated.contains_key(&neighbor) {
                continue;
            }
            let acc = candidates.entry(neighbor).or_default();
            acc.score_sum += similarity * score;
            acc.weight_sum += similarity.abs();
        }
    }

    let mut predictions: Vec<(ItemId, f64)> = candidates
        .into_iter()
        .filter(|(_, acc)| acc.weight_sum > 0.0)
        .map(|(item, acc)| (item, acc.score_sum / acc.weight_sum))
        .collect();

    predictions.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    predictions
}
