use std::collections::{BTreeMap, HashMap};

use crate::models::{ItemId, Rating, Score, UserId};

use super::similarity::ItemVector;

/// Every item a user has rated, keyed by item
pub type UserRatings = BTreeMap<ItemId, Score>;

static NO_RATINGS: UserRatings = BTreeMap::new();

/// Current rating of every (user, item) pair seen so far
///
/// Writes are upserts: a later score for the same pair replaces the earlier
/// one, so each pair holds at most one score.
#[derive(Debug, Clone, Default)]
pub struct RatingStore {
    by_user: HashMap<UserId, UserRatings>,
}

impl RatingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from a bulk load, later entries overriding earlier ones
    pub fn from_ratings<'a>(ratings: impl IntoIterator<Item = &'a Rating>) -> Self {
        let mut store = Self::new();
        for rating in ratings {
            store.upsert(rating.user_id, rating.item_id, rating.score);
        }
        store
    }

    pub fn upsert(&mut self, user: UserId, item: ItemId, score: Score) {
        self.by_user.entry(user).or_default().insert(item, score);
    }

    /// Ratings of `user`, empty when the user is unknown
    pub fn scores_of_user(&self, user: UserId) -> &UserRatings {
        self.by_user.get(&user).unwrap_or(&NO_RATINGS)
    }

    pub fn get(&self, user: UserId, item: ItemId) -> Option<Score> {
        self.by_user.get(&user)?.get(&item).copied()
    }

    /// Every user's score for `item`
    ///
    /// Scans all users, so callers that need many columns in one pass should
    /// use [`RatingStore::item_vectors`] instead.
    pub fn vector_of_item(&self, item: ItemId) -> ItemVector {
        self.by_user
            .iter()
            .filter_map(|(user, ratings)| ratings.get(&item).map(|score| (*user, *score)))
            .collect()
    }

    /// All item columns at once, for a full rebuild
    ///
    /// The result is a snapshot and goes stale on the next upsert.
    pub fn item_vectors(&self) -> HashMap<ItemId, ItemVector> {
        let mut vectors: HashMap<ItemId, ItemVector> = HashMap::new();
        for (user, ratings) in &self.by_user {
            for (item, score) in ratings {
                vectors.entry(*item).or_default().insert(*user, *score);
            }
        }
        vectors
    }

    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    pub fn rating_count(&self) -> usize {
        self.by_user.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_overwrites_same_pair() {
        let mut store = RatingStore::new();
        store.upsert(UserId(1), ItemId(10), 2.0);
        store.upsert(UserId(1), ItemId(10), 5.0);

        assert_eq!(store.get(UserId(1), ItemId(10)), Some(5.0));
        assert_eq!(store.rating_count(), 1);
    }

    #[test]
    fn test_unknown_user_has_no_scores() {
        let store = RatingStore::new();
        assert!(store.scores_of_user(UserId(99)).is_empty());
    }

    #[test]
    fn test_from_ratings_last_duplicate_wins() {
        let ratings = vec![
            Rating::new(1, 10, 1.0),
            Rating::new(2, 10, 3.0),
            Rating::new(1, 10, 4.0),
        ];
        let store = RatingStore::from_ratings(&ratings);

        assert_eq!(store.get(UserId(1), ItemId(10)), Some(4.0));
        assert_eq!(store.user_count(), 2);
        assert_eq!(store.rating_count(), 2);
    }

    #[test]
    fn test_vector_of_item_collects_column() {
        let store = RatingStore::from_ratings(&[
            Rating::new(1, 10, 5.0),
            Rating::new(2, 10, 3.0),
            Rating::new(2, 11, 4.0),
        ]);

        let column = store.vector_of_item(ItemId(10));
        assert_eq!(column.len(), 2);
        assert_eq!(column[&UserId(1)], 5.0);
        assert_eq!(column[&UserId(2)], 3.0);
        assert!(store.vector_of_item(ItemId(12)).is_empty());
    }

    #[test]
    fn test_vector_of_item_sees_latest_upsert() {
        let mut store = RatingStore::from_ratings(&[Rating::new(1, 10, 5.0)]);
        assert_eq!(store.vector_of_item(ItemId(10))[&UserId(1)], 5.0);

        store.upsert(UserId(1), ItemId(10), 1.0);
        assert_eq!(store.vector_of_item(ItemId(10))[&UserId(1)], 1.0);
    }

    #[test]
    fn test_item_vectors_match_single_columns() {
        let store = RatingStore::from_ratings(&[
            Rating::new(1, 10, 5.0),
            Rating::new(1, 11, 2.0),
            Rating::new(2, 11, 4.0),
            Rating::new(3, 12, 1.0),
        ]);

        let vectors = store.item_vectors();
        assert_eq!(vectors.len(), 3);
        for (item, vector) in &vectors {
            assert_eq!(vector, &store.vector_of_item(*item));
        }
    }
}
