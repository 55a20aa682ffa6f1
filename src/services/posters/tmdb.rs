/// TMDb poster resolver
///
/// Looks up `GET {api_url}/movie/{id}` and builds the image URL from the
/// returned `poster_path`. A failed attempt is retried at most once.
use crate::{
    error::{AppError, AppResult},
    models::{ItemId, TmdbMovieDetails},
    services::posters::PosterResolver,
};
use reqwest::Client as HttpClient;
use std::time::Duration;

const LANGUAGE: &str = "en-US";

#[derive(Clone)]
pub struct TmdbPosterResolver {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    poster_base_url: String,
    retries: u8,
}

impl TmdbPosterResolver {
    pub fn new(
        api_key: String,
        api_url: String,
        poster_base_url: String,
        timeout: Duration,
        retries: u8,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            poster_base_url,
            retries: retries.min(1),
        })
    }

    async fn fetch_once(&self, id: ItemId) -> AppResult<Option<String>> {
        let url = format!("{}/movie/{}", self.api_url, id);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("language", LANGUAGE)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(AppError::ExternalApi(format!(
                "TMDb API returned status {} for movie {}",
                status, id
            )));
        }

        let details: TmdbMovieDetails = response.json().await?;

        Ok(details.poster_url(&self.poster_base_url))
    }
}

#[async_trait::async_trait]
impl PosterResolver for TmdbPosterResolver {
    async fn fetch_poster(&self, id: ItemId) -> AppResult<Option<String>> {
        let mut attempt = 0;
        loop {
            match self.fetch_once(id).await {
                Err(e) if attempt < self.retries => {
                    attempt += 1;
                    tracing::debug!(item_id = %id, error = %e, attempt, "Retrying poster lookup");
                }
                result => return result,
            }
        }
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::posters::{lookup_budget, PosterService};
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        response::IntoResponse,
        routing::get,
        Json, Router,
    };
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const BASE: &str = "https://image.tmdb.org/t/p/w500";

    /// Fake TMDb: 1 has a poster, 2 has none, 3 errors, 4 returns garbage,
    /// 5 fails on the first call only, 6 stalls on the first call only
    async fn movie(
        State(calls): State<Arc<AtomicUsize>>,
        Path(id): Path<u64>,
        Query(params): Query<HashMap<String, String>>,
    ) -> axum::response::Response {
        let call = calls.fetch_add(1, Ordering::SeqCst);

        if params.get("api_key").map(String::as_str) != Some("test_key") {
            return StatusCode::UNAUTHORIZED.into_response();
        }

        match id {
            1 => Json(json!({"id": 1, "poster_path": "/one.jpg"})).into_response(),
            2 => Json(json!({"id": 2, "poster_path": null})).into_response(),
            3 => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
            4 => "not json".into_response(),
            5 if call == 0 => StatusCode::SERVICE_UNAVAILABLE.into_response(),
            5 => Json(json!({"id": 5, "poster_path": "/five.jpg"})).into_response(),
            6 if call == 0 => {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({"id": 6, "poster_path": "/late.jpg"})).into_response()
            }
            6 => Json(json!({"id": 6, "poster_path": "/six.jpg"})).into_response(),
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    async fn spawn_fake_tmdb() -> (String, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let app = Router::new()
            .route("/3/movie/:id", get(movie))
            .with_state(Arc::clone(&calls));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}/3", addr), calls)
    }

    fn resolver(api_url: String, api_key: &str, retries: u8) -> TmdbPosterResolver {
        resolver_with_timeout(api_url, api_key, retries, Duration::from_secs(2))
    }

    fn resolver_with_timeout(
        api_url: String,
        api_key: &str,
        retries: u8,
        timeout: Duration,
    ) -> TmdbPosterResolver {
        TmdbPosterResolver::new(api_key.to_string(), api_url, BASE.to_string(), timeout, retries)
            .unwrap()
    }

    #[tokio::test]
    async fn test_poster_found() {
        let (url, calls) = spawn_fake_tmdb().await;
        let result = resolver(url, "test_key", 1).fetch_poster(ItemId(1)).await;
        assert_eq!(
            result.unwrap(),
            Some("https://image.tmdb.org/t/p/w500/one.jpg".to_string())
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_poster_path_is_none() {
        let (url, _) = spawn_fake_tmdb().await;
        let result = resolver(url, "test_key", 1).fetch_poster(ItemId(2)).await;
        assert_eq!(result.unwrap(), None);
    }

    #[tokio::test]
    async fn test_error_status_retried_once_then_fails() {
        let (url, calls) = spawn_fake_tmdb().await;
        let result = resolver(url, "test_key", 1).fetch_poster(ItemId(3)).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_no_retry_when_disabled() {
        let (url, calls) = spawn_fake_tmdb().await;
        let result = resolver(url, "test_key", 0).fetch_poster(ItemId(3)).await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_transient_failure_recovers_on_retry() {
        let (url, calls) = spawn_fake_tmdb().await;
        let result = resolver(url, "test_key", 1).fetch_poster(ItemId(5)).await;
        assert_eq!(
            result.unwrap(),
            Some("https://image.tmdb.org/t/p/w500/five.jpg".to_string())
        );
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stalled_first_attempt_is_retried_within_budget() {
        let (url, calls) = spawn_fake_tmdb().await;
        let attempt_timeout = Duration::from_millis(500);
        let resolver = resolver_with_timeout(url, "test_key", 1, attempt_timeout);
        let service = PosterService::new(
            Arc::new(resolver),
            "https://placehold.test/no-poster",
            lookup_budget(attempt_timeout, 1),
        );

        let poster = service.resolve_poster(ItemId(6)).await;

        assert_eq!(poster, "https://image.tmdb.org/t/p/w500/six.jpg");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalid_body_is_error() {
        let (url, _) = spawn_fake_tmdb().await;
        let result = resolver(url, "test_key", 0).fetch_poster(ItemId(4)).await;
        assert!(matches!(result, Err(AppError::HttpClient(_))));
    }

    #[tokio::test]
    async fn test_bad_api_key_is_error() {
        let (url, _) = spawn_fake_tmdb().await;
        let result = resolver(url, "wrong", 0).fetch_poster(ItemId(1)).await;
        assert!(matches!(result, Err(AppError::ExternalApi(_))));
    }

    #[tokio::test]
    async fn test_unreachable_host_is_error() {
        // Nothing listens on port 9 of the loopback interface
        let result = resolver("http://127.0.0.1:9/3".to_string(), "test_key", 0)
            .fetch_poster(ItemId(1))
            .await;
        assert!(matches!(result, Err(AppError::HttpClient(_))));
    }

    #[test]
    fn test_retries_capped_at_one() {
        let resolver = resolver("http://localhost/3/".to_string(), "k", 7);
        assert_eq!(resolver.retries, 1);
        assert_eq!(resolver.api_url, "http://localhost/3");
    }
}
