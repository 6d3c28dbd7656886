mod movie;
mod rating;

pub use movie::Movie;
pub use rating::{ItemId, Rating, Score, UserId};

use serde::{Deserialize, Serialize};

/// Query string of the recommendations endpoint
#[derive(Debug, Default, Deserialize)]
pub struct RecommendationQuery {
    pub top_n: Option<usize>,
}

/// Body of the rating write endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RatingRequest {
    pub user_id: i64,
    pub item_id: i64,
    pub score: Score,
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl From<RatingRequest> for Rating {
    fn from(request: RatingRequest) -> Self {
        Rating {
            user_id: UserId(request.user_id),
            item_id: ItemId(request.item_id),
            score: request.score,
            timestamp: request.timestamp,
        }
    }
}

/// Size of the in-memory model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelStats {
    pub users: usize,
    pub ratings: usize,
    /// Items with at least one positive similarity link
    pub items_with_neighbors: usize,
    /// Unordered item pairs with a positive similarity
    pub similarity_pairs: usize,
}
