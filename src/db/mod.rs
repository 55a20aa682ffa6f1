pub mod cache;
pub mod snapshot;

pub use cache::DatasetCache;
pub use snapshot::Dataset;
pub use snapshot::SimilarityMatrix;
