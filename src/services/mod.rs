pub mod loaders;
pub mod similarity_cache;

pub use loaders::{InMemoryCatalog, ItemsLoader, RatingsLoader};
pub use similarity_cache::{FileSimilarityCache, SimilarityCache};
