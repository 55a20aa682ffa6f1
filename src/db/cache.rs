use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::db::Dataset;
use crate::error::{AppError, AppResult};

/// Loads the snapshot once and hands out the same shared dataset afterwards
///
/// Concurrent first callers wait on a single load; later callers never touch
/// the filesystem. A failed load is not cached, so the next call retries it.
#[derive(Debug)]
pub struct DatasetCache {
    path: PathBuf,
    dataset: OnceCell<Arc<Dataset>>,
}

impl DatasetCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            dataset: OnceCell::new(),
        }
    }

    /// Returns the cached dataset, loading it on first use
    pub async fn get(&self) -> AppResult<Arc<Dataset>> {
        let dataset = self
            .dataset
            .get_or_try_init(|| async {
                let path = self.path.clone();
                let dataset = tokio::task::spawn_blocking(move || Dataset::load(path))
                    .await
                    .map_err(|e| AppError::Internal(e.to_string()))??;
                Ok::<_, AppError>(Arc::new(dataset))
            })
            .await?;

        Ok(Arc::clone(dataset))
    }

    pub fn is_loaded(&self) -> bool {
        self.dataset.initialized()
    }
}
