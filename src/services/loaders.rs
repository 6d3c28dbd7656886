//! Bulk data sources the model is built from
//!
//! The model builder only needs the full rating corpus and the list of item
//! ids. Where they come from (Postgres, fixtures, an import job) is up to the
//! implementor.

use crate::{
    error::AppResult,
    models::{Movie, Rating},
};

/// Provides every known rating in one call
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait RatingsLoader: Send + Sync {
    /// Loads the complete rating corpus
    ///
    /// When the same (user, item) pair appears more than once, the later entry
    /// wins, so implementors should return ratings oldest first.
    async fn load_ratings(&self) -> AppResult<Vec<Rating>>;
}

/// Provides the item catalogue in one call
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ItemsLoader: Send + Sync {
    async fn load_items(&self) -> AppResult<Vec<Movie>>;
}

/// Fixed corpus held in memory
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    ratings: Vec<Rating>,
    movies: Vec<Movie>,
}

impl InMemoryCatalog {
    pub fn new(ratings: Vec<Rating>, movies: Vec<Movie>) -> Self {
        Self { ratings, movies }
    }

    /// Catalogue whose movies are exactly the items referenced by `ratings`
    pub fn from_ratings(ratings: Vec<Rating>) -> Self {
        let mut ids: Vec<i64> = ratings.iter().map(|r| r.item_id.0).collect();
        ids.sort_unstable();
        ids.dedup();
        let movies = ids
            .into_iter()
            .map(|id| Movie::new(id, format!("Movie {}", id)))
            .collect();
        Self { ratings, movies }
    }
}

#[async_trait::async_trait]
impl RatingsLoader for InMemoryCatalog {
    async fn load_ratings(&self) -> AppResult<Vec<Rating>> {
        Ok(self.ratings.clone())
    }
}

#[async_trait::async_trait]
impl ItemsLoader for InMemoryCatalog {
    async fn load_items(&self) -> AppResult<Vec<Movie>> {
        Ok(self.movies.clone())
    }
}
