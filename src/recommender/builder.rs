use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{ItemId, ModelStats},
    services::{ItemsLoader, RatingsLoader, SimilarityCache},
};

use super::{Model, RatingStore, SimilarityMatrix};

/// Where a built model's similarities came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildSource {
    /// Similarities restored from a cached snapshot
    Cache,
    /// Similarities computed pairwise from the rating corpus
    Cold,
}

/// Outcome of a successful build
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    pub source: BuildSource,
    pub stats: ModelStats,
}

/// Produces a complete [`Model`] from the loaders, or from a cached matrix
///
/// A usable cached snapshot skips the items load and the pairwise pass. The
/// rating store is still filled from the ratings loader so that queries and
/// later incremental updates see the user history.
///
/// Loader failures abort the build. Cache read failures fall back to a cold
/// build and cache write failures are only logged.
pub struct ModelBuilder<'a> {
    ratings_loader: &'a dyn RatingsLoader,
    items_loader: &'a dyn ItemsLoader,
    cache: Option<&'a dyn SimilarityCache>,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(ratings_loader: &'a dyn RatingsLoader, items_loader: &'a dyn ItemsLoader) -> Self {
        Self {
            ratings_loader,
            items_loader,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: Option<&'a dyn SimilarityCache>) -> Self {
        self.cache = cache;
        self
    }

    pub async fn build(&self) -> AppResult<(Model, BuildSource)> {
        if let Some(similarities) = self.load_cached().await {
            let ratings = self.ratings_loader.load_ratings().await?;
            tracing::info!(
                ratings = ratings.len(),
                pairs = similarities.pair_count(),
                "Building model from cached similarity matrix"
            );

            let model = Model {
                ratings: RatingStore::from_ratings(&ratings),
                similarities,
            };
            return Ok((model, BuildSource::Cache));
        }

        let model = self.cold_build().await?;

        if let Some(cache) = self.cache {
            if let Err(e) = cache.save(&model.similarities.to_snapshot()).await {
                tracing::warn!(
                    error = %e,
                    cache = cache.name(),
                    "Failed to persist similarity matrix, continuing without cache"
                );
            }
        }

        Ok((model, BuildSource::Cold))
    }

    async fn load_cached(&self) -> Option<SimilarityMatrix> {
        let cache = self.cache?;

        match cache.load().await {
            Ok(Some(snapshot)) if !snapshot.is_empty() => {
                Some(SimilarityMatrix::from_snapshot(&snapshot))
            }
            Ok(Some(_)) => {
                tracing::info!(cache = cache.name(), "Cached similarity matrix is empty");
                None
            }
            Ok(None) => {
                tracing::info!(cache = cache.name(), "No cached similarity matrix");
                None
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    cache = cache.name(),
                    "Unreadable similarity cache, rebuilding from ratings"
                );
                None
            }
        }
    }

    async fn cold_build(&self) -> AppResult<Model> {
        let ratings = self.ratings_loader.load_ratings().await?;
        let items = self.items_loader.load_items().await?;

        tracing::info!(
            ratings = ratings.len(),
            items = items.len(),
            "Building similarity matrix"
        );

        let ratings = RatingStore::from_ratings(&ratings);
        let item_ids: Vec<ItemId> = items.iter().map(|m| m.id).collect();

        // The pairwise pass is quadratic in item count; keep it off the runtime
        let model = tokio::task::spawn_blocking(move || {
            let mut similarities = SimilarityMatrix::new();
            similarities.rebuild_from(&item_ids, &ratings.item_vectors());
            Model {
                ratings,
                similarities,
            }
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?;

        tracing::info!(pairs = model.similarities.pair_count(), "Similarity matrix built");

        Ok(model)
    }
}
