use std::sync::Arc;

use crate::config::Config;
use crate::recommender::{ItemBasedRecommender, DEFAULT_TOP_N};
use crate::services::ItemsLoader;

/// Bounds applied to incoming requests
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestLimits {
    pub default_top_n: usize,
    pub max_top_n: usize,
    pub min_score: f64,
    pub max_score: f64,
}

impl Default for RequestLimits {
    fn default() -> Self {
        Self {
            default_top_n: DEFAULT_TOP_N,
            max_top_n: 100,
            min_score: 1.0,
            max_score: 5.0,
        }
    }
}

impl From<&Config> for RequestLimits {
    fn from(config: &Config) -> Self {
        Self {
            default_top_n: config.default_top_n,
            max_top_n: config.max_top_n,
            min_score: config.min_score,
            max_score: config.max_score,
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub recommender: Arc<ItemBasedRecommender>,
    pub catalog: Arc<dyn ItemsLoader>,
    pub limits: RequestLimits,
}

impl AppState {
    pub fn new(recommender: Arc<ItemBasedRecommender>, catalog: Arc<dyn ItemsLoader>) -> Self {
        Self {
            recommender,
            catalog,
            limits: RequestLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: RequestLimits) -> Self {
        self.limits = limits;
        self
    }
}
