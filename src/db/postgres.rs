use chrono::NaiveDate;
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

use crate::{
    error::AppResult,
    models::{ItemId, Movie, Rating, UserId},
    services::{ItemsLoader, RatingsLoader},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

#[derive(Debug, FromRow)]
struct RatingRow {
    user_id: i64,
    movie_id: i64,
    rating: i16,
    rated_at: Option<i64>,
}

impl From<RatingRow> for Rating {
    fn from(row: RatingRow) -> Self {
        Rating {
            user_id: UserId(row.user_id),
            item_id: ItemId(row.movie_id),
            score: f64::from(row.rating),
            timestamp: row.rated_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct MovieRow {
    id: i64,
    title: String,
    release_date: Option<NaiveDate>,
    imdb_url: Option<String>,
}

impl From<MovieRow> for Movie {
    fn from(row: MovieRow) -> Self {
        Movie {
            id: ItemId(row.id),
            title: row.title,
            release_date: row.release_date,
            imdb_url: row.imdb_url,
        }
    }
}

/// Ratings and movies read from the `ratings` / `movies` tables
#[derive(Clone)]
pub struct PgCatalog {
    pool: PgPool,
}

impl PgCatalog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl RatingsLoader for PgCatalog {
    async fn load_ratings(&self) -> AppResult<Vec<Rating>> {
        // Oldest first so a duplicated pair resolves to its latest rating
        let rows: Vec<RatingRow> = sqlx::query_as(
            "SELECT user_id, movie_id, rating, rated_at FROM ratings \
             ORDER BY rated_at ASC NULLS FIRST, user_id, movie_id",
        )
        .fetch_all(&self.pool)
        .await?;

        tracing::debug!(rows = rows.len(), "Loaded ratings from Postgres");
        Ok(rows.into_iter().map(Rating::from).collect())
    }
}

#[async_trait::async_trait]
impl ItemsLoader for PgCatalog {
    async fn load_items(&self) -> AppResult<Vec<Movie>> {
        let rows: Vec<MovieRow> =
            sqlx::query_as("SELECT id, title, release_date, imdb_url FROM movies ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        tracing::debug!(rows = rows.len(), "Loaded movies from Postgres");
        Ok(rows.into_iter().map(Movie::from).collect())
    }
}
