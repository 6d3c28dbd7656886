use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Numeric rating value. MovieLens scores are integers on a 1-5 scale but the
/// model works on reals throughout.
pub type Score = f64;

/// Identifier of a user who rates items
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

/// Identifier of a rateable item (a movie)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub i64);

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single observed rating
///
/// A later rating for the same `(user_id, item_id)` pair replaces the earlier
/// one wherever ratings are stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    pub user_id: UserId,
    pub item_id: ItemId,
    pub score: Score,
    /// Unix timestamp (seconds) of when the rating was made
    #[serde(default)]
    pub timestamp: Option<i64>,
}

impl Rating {
    pub fn new(user_id: i64, item_id: i64, score: Score) -> Self {
        Self {
            user_id: UserId(user_id),
            item_id: ItemId(item_id),
            score,
            timestamp: None,
        }
    }

    pub fn at(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
