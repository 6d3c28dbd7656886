use crate::models::{ItemId, Rating};

use super::{rating_store::RatingStore, similarity::cosine, similarity_matrix::SimilarityMatrix};

/// Records `rating` and re-derives only the pairs it can have changed
///
/// After the upsert, the rated item is compared with every other item the
/// same user has rated, using fresh columns from the store. Pairs whose
/// similarity drops to zero are unlinked. No other pair is touched.
///
/// Returns the number of pairs recomputed.
pub fn apply_rating(
    ratings: &mut RatingStore,
    similarities: &mut SimilarityMatrix,
    rating: &Rating,
) -> usize {
    let item = rating.item_id;
    ratings.upsert(rating.user_id, item, rating.score);

    let others: Vec<ItemId> = ratings
        .scores_of_user(rating.user_id)
        .keys()
        .copied()
        .filter(|other| *other != item)
        .collect();

    let rated_vector = ratings.vector_of_item(item);
    for other in &others {
        let similarity = cosine(&rated_vector, &ratings.vector_of_item(*other));
        similarities.set(item, *other, similarity);
    }

    others.len()
}
