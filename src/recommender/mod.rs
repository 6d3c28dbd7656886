//! Item-based collaborative filtering
//!
//! The model is a [`RatingStore`] plus the [`SimilarityMatrix`] derived from
//! it. It is built once from the full corpus (or a cached matrix), then
//! patched in place one rating at a time.

pub mod builder;
pub mod query;
pub mod rating_store;
pub mod similarity;
pub mod similarity_matrix;
pub mod updater;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::{
    error::AppResult,
    models::{ItemId, ModelStats, Rating, UserId},
    services::{ItemsLoader, RatingsLoader, SimilarityCache},
};

pub use builder::{BuildReport, BuildSource, ModelBuilder};
pub use query::DEFAULT_TOP_N;
pub use rating_store::{RatingStore, UserRatings};
pub use similarity::{cosine, ItemVector};
pub use similarity_matrix::{SimilarityMatrix, SimilaritySnapshot};

/// Ratings and the similarities derived from them
#[derive(Debug, Clone, Default)]
pub struct Model {
    pub ratings: RatingStore,
    pub similarities: SimilarityMatrix,
}

impl Model {
    pub fn recommend(&self, user: UserId, top_n: usize) -> Vec<ItemId> {
        query::recommend(&self.ratings, &self.similarities, user, top_n)
    }

    pub fn apply_rating(&mut self, rating: &Rating) -> usize {
        updater::apply_rating(&mut self.ratings, &mut self.similarities, rating)
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            users: self.ratings.user_count(),
            ratings: self.ratings.rating_count(),
            items_with_neighbors: self.similarities.item_count(),
            similarity_pairs: self.similarities.pair_count(),
        }
    }
}

/// Live model plus the ratings applied while a rebuild is in flight
#[derive(Debug, Default)]
struct LiveModel {
    model: Model,
    // Some while a build runs; replayed onto the new model before the swap
    pending: Option<Vec<Rating>>,
}

/// Shared handle to the live model
///
/// Readers run concurrently; [`build`](Self::build) and
/// [`apply_rating`](Self::apply_rating) hold the write lock while they
/// mutate, so no reader sees one half of a symmetric pair.
pub struct ItemBasedRecommender {
    live: RwLock<LiveModel>,
    build_lock: Mutex<()>,
    cache: Option<Arc<dyn SimilarityCache>>,
}

impl Default for ItemBasedRecommender {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemBasedRecommender {
    /// Creates a recommender with an empty model and no similarity cache
    pub fn new() -> Self {
        Self {
            live: RwLock::new(LiveModel::default()),
            build_lock: Mutex::new(()),
            cache: None,
        }
    }

    pub fn with_cache(cache: Arc<dyn SimilarityCache>) -> Self {
        Self {
            cache: Some(cache),
            ..Self::new()
        }
    }

    /// Builds a fresh model and swaps it in
    ///
    /// Loading and the pairwise pass run without holding the model lock, so
    /// reads and rating writes keep being served. Every rating applied in the
    /// meantime is journalled and replayed onto the new model under the write
    /// lock, right before it is installed. On error the current model stays
    /// in place, including those ratings. Concurrent builds run one at a time.
    #[tracing::instrument(skip_all)]
    pub async fn build(
        &self,
        ratings_loader: &dyn RatingsLoader,
        items_loader: &dyn ItemsLoader,
    ) -> AppResult<BuildReport> {
        let _building = self.build_lock.lock().await;

        self.live.write().await.pending = Some(Vec::new());

        let built = ModelBuilder::new(ratings_loader, items_loader)
            .with_cache(self.cache.as_deref())
            .build()
            .await;

        let mut live = self.live.write().await;
        let pending = live.pending.take().unwrap_or_default();
        let (mut model, source) = built?;

        for rating in &pending {
            model.apply_rating(rating);
        }

        let report = BuildReport {
            source,
            stats: model.stats(),
        };
        live.model = model;
        drop(live);

        tracing::info!(
            source = ?report.source,
            users = report.stats.users,
            ratings = report.stats.ratings,
            pairs = report.stats.similarity_pairs,
            replayed = pending.len(),
            "Recommendation model installed"
        );

        Ok(report)
    }

    /// Top `top_n` unrated items for `user`, best first
    pub async fn recommend(&self, user: UserId, top_n: usize) -> Vec<ItemId> {
        self.live.read().await.model.recommend(user, top_n)
    }

    /// Records one new or changed rating and patches the affected pairs
    #[tracing::instrument(skip_all, fields(user = %rating.user_id, item = %rating.item_id))]
    pub async fn apply_rating(&self, rating: &Rating) {
        let mut live = self.live.write().await;
        let touched = live.model.apply_rating(rating);
        if let Some(pending) = live.pending.as_mut() {
            pending.push(rating.clone());
        }
        drop(live);

        tracing::debug!(pairs = touched, "Similarity pairs recomputed");
    }

    pub async fn stats(&self) -> ModelStats {
        self.live.read().await.model.stats()
    }
}
