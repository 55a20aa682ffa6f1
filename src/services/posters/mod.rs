/// Poster lookup
///
/// Posters are decoration: a recommendation response must never fail or lose
/// entries because an image could not be fetched. Resolvers report failures as
/// errors, and `PosterService` turns every failure (error, missing poster, timeout,
/// panicked task) into the configured fallback URL.
use crate::{error::AppResult, models::ItemId};
use std::sync::Arc;
use std::time::Duration;

pub mod tmdb;

pub use tmdb::TmdbPosterResolver;

/// Source of poster image URLs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait PosterResolver: Send + Sync {
    /// Fetch the poster URL for an item
    ///
    /// Returns `Ok(None)` when the upstream has no poster for the item.
    async fn fetch_poster(&self, id: ItemId) -> AppResult<Option<String>>;

    /// Resolver name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Resolver used when no poster API is configured
#[derive(Debug, Clone, Default)]
pub struct PlaceholderPosterResolver;

#[async_trait::async_trait]
impl PosterResolver for PlaceholderPosterResolver {
    async fn fetch_poster(&self, _id: ItemId) -> AppResult<Option<String>> {
        Ok(None)
    }

    fn name(&self) -> &'static str {
        "placeholder"
    }
}

const LOOKUP_SLACK: Duration = Duration::from_millis(250);

/// Time allowed for one lookup including its retry
///
/// Each attempt is bounded by `attempt_timeout` on its own; the overall budget must
/// leave the retry a full attempt window.
pub fn lookup_budget(attempt_timeout: Duration, retries: u8) -> Duration {
    attempt_timeout * (u32::from(retries.min(1)) + 1) + LOOKUP_SLACK
}

/// Infallible poster lookup bounded by an overall budget, with fallback
#[derive(Clone)]
pub struct PosterService {
    resolver: Arc<dyn PosterResolver>,
    fallback_url: Arc<str>,
    timeout: Duration,
}

impl PosterService {
    pub fn new(resolver: Arc<dyn PosterResolver>, fallback_url: &str, timeout: Duration) -> Self {
        Self {
            resolver,
            fallback_url: Arc::from(fallback_url),
            timeout,
        }
    }

    pub fn fallback_url(&self) -> &str {
        &self.fallback_url
    }

    /// Poster URL for `id`, or the fallback URL if it cannot be resolved
    pub async fn resolve_poster(&self, id: ItemId) -> String {
        let outcome = tokio::time::timeout(self.timeout, self.resolver.fetch_poster(id)).await;

        match outcome {
            Ok(Ok(Some(url))) => url,
            Ok(Ok(None)) => {
                tracing::debug!(item_id = %id, resolver = self.resolver.name(), "No poster available");
                self.fallback_url.to_string()
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    item_id = %id,
                    resolver = self.resolver.name(),
                    error = %e,
                    "Poster lookup failed, using fallback"
                );
                self.fallback_url.to_string()
            }
            Err(_) => {
                tracing::warn!(
                    item_id = %id,
                    resolver = self.resolver.name(),
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Poster lookup timed out, using fallback"
                );
                self.fallback_url.to_string()
            }
        }
    }

    /// Resolves posters for all ids in parallel, returning URLs in input order
    pub async fn resolve_batch(&self, ids: Vec<ItemId>) -> Vec<String> {
        let mut tasks = Vec::with_capacity(ids.len());

        for id in ids {
            let service = self.clone();
            let task = tokio::spawn(async move { service.resolve_poster(id).await });
            tasks.push((id, task));
        }

        let mut urls = Vec::with_capacity(tasks.len());
        let mut fallbacks = 0;

        for (id, task) in tasks {
            match task.await {
                Ok(url) => {
                    if url == self.fallback_url() {
                        fallbacks += 1;
                    }
                    urls.push(url);
                }
                Err(e) => {
                    tracing::error!(item_id = %id, error = %e, "Poster task join error");
                    fallbacks += 1;
                    urls.push(self.fallback_url.to_string());
                }
            }
        }

        if fallbacks > 0 {
            tracing::info!(
                total = urls.len(),
                fallbacks = fallbacks,
                "Some posters replaced by fallback"
            );
        }

        urls
    }
}
