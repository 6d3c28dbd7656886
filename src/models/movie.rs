use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ItemId;

/// A movie from the catalogue
///
/// Only `id` feeds the similarity model; the rest is carried for the
/// catalogue listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: ItemId,
    pub title: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub imdb_url: Option<String>,
}

impl Movie {
    pub fn new(id: i64, title: impl Into<String>) -> Self {
        Self {
            id: ItemId(id),
            title: title.into(),
            release_date: None,
            imdb_url: None,
        }
    }
}
