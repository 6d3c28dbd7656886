use std::path::{Path, PathBuf};

use crate::{error::AppResult, recommender::SimilaritySnapshot};

/// Persisted copy of the similarity matrix
///
/// A snapshot carries no version, so whoever configures a cache is
/// responsible for discarding it when the rating corpus changes underneath.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait SimilarityCache: Send + Sync {
    /// Returns `Ok(None)` when nothing has been cached yet
    async fn load(&self) -> AppResult<Option<SimilaritySnapshot>>;

    async fn save(&self, snapshot: &SimilaritySnapshot) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

/// Snapshot stored as a JSON file on local disk
#[derive(Debug, Clone)]
pub struct FileSimilarityCache {
    path: PathBuf,
}

impl FileSimilarityCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl SimilarityCache for FileSimilarityCache {
    async fn load(&self) -> AppResult<Option<SimilaritySnapshot>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        tracing::info!(path = %self.path.display(), "Loading similarity matrix from file cache");
        let snapshot = serde_json::from_slice(&bytes)?;
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &SimilaritySnapshot) -> AppResult<()> {
        let json = serde_json::to_vec(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Readers never see a half-written snapshot
        let staging = self.staging_path();
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &self.path).await?;

        tracing::debug!(
            path = %self.path.display(),
            pairs = snapshot.pairs.len(),
            "Similarity matrix written to file cache"
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "file"
    }
}
