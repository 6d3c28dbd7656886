use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::error::AppResult;
use crate::recommender::SimilaritySnapshot;
use crate::services::SimilarityCache;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Whole similarity matrix, under a deployment-chosen namespace
    SimilarityMatrix(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::SimilarityMatrix(namespace) => write!(f, "{}:matrix", namespace),
        }
    }
}

/// Creates a Redis client for caching
///
/// Connections are multiplexed per call; no connection is made until the
/// first load or save.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Similarity matrix snapshot stored as one JSON value in Redis
#[derive(Clone)]
pub struct RedisSimilarityCache {
    redis_client: Client,
    key: CacheKey,
    ttl_secs: Option<u64>,
}

impl RedisSimilarityCache {
    pub fn new(redis_client: Client, namespace: impl Into<String>, ttl_secs: Option<u64>) -> Self {
        Self {
            redis_client,
            key: CacheKey::SimilarityMatrix(namespace.into()),
            ttl_secs,
        }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }
}

#[async_trait::async_trait]
impl SimilarityCache for RedisSimilarityCache {
    async fn load(&self) -> AppResult<Option<SimilaritySnapshot>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(self.key.to_string()).await.map_err(|e| {
            tracing::warn!(error = %e, "Redis get failed");
            e
        })?;

        match cached {
            Some(json) => {
                tracing::info!(key = %self.key, bytes = json.len(), "Similarity matrix cache hit");
                Ok(Some(decode_snapshot(&json)?))
            }
            None => {
                tracing::debug!(key = %self.key, "Similarity matrix cache miss");
                Ok(None)
            }
        }
    }

    async fn save(&self, snapshot: &SimilaritySnapshot) -> AppResult<()> {
        let json = serde_json::to_string(snapshot)?;
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;

        match self.ttl_secs {
            Some(ttl) => {
                let _: () = conn.set_ex(self.key.to_string(), json, ttl).await?;
            }
            None => {
                let _: () = conn.set(self.key.to_string(), json).await?;
            }
        }

        tracing::debug!(
            key = %self.key,
            pairs = snapshot.pairs.len(),
            ttl = ?self.ttl_secs,
            "Similarity matrix written to Redis"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

fn decode_snapshot(json: &str) -> AppResult<SimilaritySnapshot> {
    Ok(serde_json::from_str(json)?)
}
