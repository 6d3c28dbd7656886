use std::sync::Arc;

use cinematch_api::error::AppResult;
use cinematch_api::models::{ItemId, Movie, Rating, UserId};
use cinematch_api::recommender::{
    cosine, BuildSource, ItemBasedRecommender, ItemVector, Model, ModelBuilder, SimilarityMatrix,
};
use cinematch_api::services::{
    FileSimilarityCache, InMemoryCatalog, RatingsLoader, SimilarityCache,
};

/// Deterministic pseudo-random corpus: `users` users each rating a spread of
/// `items` items on a 1-5 scale
fn synthetic_ratings(users: i64, items: i64) -> Vec<Rating> {
    let mut state: u64 = 0x2545_f491_4f6c_dd1d;
    let mut next = move || {
        state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        state >> 33
    };

    let mut ratings = Vec::new();
    for user in 1..=users {
        for item in 1..=items {
            if next() % 3 == 0 {
                let score = (next() % 5 + 1) as f64;
                ratings.push(Rating::new(user, item, score));
            }
        }
    }
    ratings
}

async fn cold_model(ratings: Vec<Rating>) -> Model {
    let catalog = InMemoryCatalog::from_ratings(ratings);
    let (model, source) = ModelBuilder::new(&catalog, &catalog).build().await.unwrap();
    assert_eq!(source, BuildSource::Cold);
    model
}

fn assert_matrix_invariants(matrix: &SimilarityMatrix) {
    for (a, b, value) in matrix.to_snapshot().pairs {
        assert_ne!(a, b);
        assert!(value > 0.0, "({}, {}) stored {}", a, b, value);
        assert_eq!(
            matrix.get(a, b).map(f64::to_bits),
            matrix.get(b, a).map(f64::to_bits),
            "asymmetric pair ({}, {})",
            a,
            b
        );
        assert!(matrix.neighbors_of(a).any(|(n, _)| n == b));
        assert!(matrix.neighbors_of(b).any(|(n, _)| n == a));
    }
}

#[test]
fn test_cosine_identical_and_disjoint_vectors() {
    let v: ItemVector = [(UserId(1), 4.0), (UserId(2), 2.0)].into_iter().collect();
    let w: ItemVector = [(UserId(3), 4.0)].into_iter().collect();

    assert!((cosine(&v, &v) - 1.0).abs() < 1e-12);
    assert_eq!(cosine(&v, &w), 0.0);
}

#[tokio::test]
async fn test_perfect_co_rating_scenario() {
    let model = cold_model(vec![
        Rating::new(1, 1, 5.0),
        Rating::new(1, 2, 4.0),
        Rating::new(2, 1, 5.0),
        Rating::new(2, 2, 4.0),
    ])
    .await;

    let similarity = model.similarities.get(ItemId(1), ItemId(2)).unwrap();
    assert!((similarity - 1.0).abs() < 1e-12);
    assert_matrix_invariants(&model.similarities);
}

#[tokio::test]
async fn test_incremental_rating_links_new_item_only() {
    let mut model = cold_model(vec![
        Rating::new(1, 1, 5.0),
        Rating::new(1, 2, 4.0),
        Rating::new(2, 1, 5.0),
        Rating::new(2, 2, 4.0),
    ])
    .await;
    let before = model.similarities.get(ItemId(1), ItemId(2)).map(f64::to_bits);

    model.apply_rating(&Rating::new(1, 3, 1.0));

    assert!(model.similarities.get(ItemId(3), ItemId(1)).is_some());
    assert!(model.similarities.get(ItemId(3), ItemId(2)).is_some());
    assert_eq!(
        model.similarities.get(ItemId(1), ItemId(2)).map(f64::to_bits),
        before
    );
    assert_matrix_invariants(&model.similarities);
}

#[tokio::test]
async fn test_empty_corpus_builds_empty_model() {
    let model = cold_model(vec![]).await;

    assert!(model.ratings.is_empty());
    assert!(model.similarities.is_empty());
    for user in 1..5 {
        assert!(model.recommend(UserId(user), 10).is_empty());
    }
}

#[tokio::test]
async fn test_invariants_hold_after_build_and_updates() {
    let ratings = synthetic_ratings(30, 25);
    let mut model = cold_model(ratings).await;
    assert_matrix_invariants(&model.similarities);

    for (i, rating) in synthetic_ratings(10, 25).into_iter().enumerate() {
        // Shift users so some updates hit existing histories and some create new ones
        let rating = Rating::new(rating.user_id.0 + 25, rating.item_id.0, rating.score)
            .at(i as i64);
        model.apply_rating(&rating);
    }

    assert_matrix_invariants(&model.similarities);
}

#[tokio::test]
async fn test_recommendations_bounded_sorted_and_unrated() {
    let model = cold_model(synthetic_ratings(40, 30)).await;

    for user in 1..=40 {
        let user = UserId(user);
        let items = model.recommend(user, 5);
        assert!(items.len() <= 5);

        let rated = model.ratings.scores_of_user(user);
        assert!(items.iter().all(|item| !rated.contains_key(item)));

        let predictions = cinematch_api::recommender::query::predict(
            &model.ratings,
            &model.similarities,
            user,
        );
        let ranked: Vec<ItemId> = predictions.iter().take(5).map(|(i, _)| *i).collect();
        assert_eq!(items, ranked);
        assert!(predictions.windows(2).all(|w| w[0].1 >= w[1].1));
    }

    assert!(model.recommend(UserId(10_000), 5).is_empty());
}

#[tokio::test]
async fn test_apply_rating_is_idempotent() {
    let mut model = cold_model(synthetic_ratings(20, 15)).await;
    let rating = Rating::new(3, 7, 4.0);

    model.apply_rating(&rating);
    let once = model.similarities.to_snapshot();
    model.apply_rating(&rating);

    assert_eq!(model.similarities.to_snapshot(), once);
}

#[tokio::test]
async fn test_file_cache_round_trip_between_builds() {
    let dir = tempfile::tempdir().unwrap();
    let cache: Arc<dyn SimilarityCache> =
        Arc::new(FileSimilarityCache::new(dir.path().join("similarity.json")));
    let catalog = InMemoryCatalog::from_ratings(synthetic_ratings(25, 20));

    let first = ItemBasedRecommender::with_cache(cache.clone());
    let report = first.build(&catalog, &catalog).await.unwrap();
    assert_eq!(report.source, BuildSource::Cold);

    let second = ItemBasedRecommender::with_cache(cache);
    let cached = second.build(&catalog, &catalog).await.unwrap();
    assert_eq!(cached.source, BuildSource::Cache);
    assert_eq!(cached.stats, report.stats);

    for user in 1..=25 {
        assert_eq!(
            first.recommend(UserId(user), 10).await,
            second.recommend(UserId(user), 10).await
        );
    }
}

#[tokio::test]
async fn test_corrupt_file_cache_falls_back_to_cold_build() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("similarity.json");
    std::fs::write(&path, "not a snapshot").unwrap();

    let recommender = ItemBasedRecommender::with_cache(Arc::new(FileSimilarityCache::new(&path)));
    let catalog = InMemoryCatalog::new(
        vec![Rating::new(1, 1, 5.0), Rating::new(1, 2, 3.0)],
        vec![Movie::new(1, "Toy Story"), Movie::new(2, "GoldenEye")],
    );

    let report = recommender.build(&catalog, &catalog).await.unwrap();

    assert_eq!(report.source, BuildSource::Cold);
    assert_eq!(report.stats.similarity_pairs, 1);
    // The rebuilt matrix replaced the corrupt file
    let reloaded = FileSimilarityCache::new(&path).load().await.unwrap().unwrap();
    assert_eq!(reloaded.pairs.len(), 1);
}

/// Ratings source that submits a live rating while the corpus is being read
struct WriteDuringLoad {
    recommender: Arc<ItemBasedRecommender>,
    catalog: InMemoryCatalog,
    rating: Rating,
}

#[async_trait::async_trait]
impl RatingsLoader for WriteDuringLoad {
    async fn load_ratings(&self) -> AppResult<Vec<Rating>> {
        let corpus = self.catalog.load_ratings().await?;
        self.recommender.apply_rating(&self.rating).await;
        Ok(corpus)
    }
}

#[tokio::test]
async fn test_rating_applied_during_build_survives_swap() {
    let recommender = Arc::new(ItemBasedRecommender::new());
    let catalog =
        InMemoryCatalog::from_ratings(vec![Rating::new(1, 1, 5.0), Rating::new(1, 2, 4.0)]);
    let loader = WriteDuringLoad {
        recommender: recommender.clone(),
        catalog: catalog.clone(),
        rating: Rating::new(9, 1, 5.0),
    };

    let report = recommender.build(&loader, &catalog).await.unwrap();

    // The corpus held two ratings; the third arrived mid-build
    assert_eq!(report.stats.ratings, 3);
    assert_eq!(report.stats.users, 2);
    let stats = recommender.stats().await;
    assert_eq!(stats.ratings, 3);
    assert_eq!(recommender.recommend(UserId(9), 10).await, vec![ItemId(2)]);
}
