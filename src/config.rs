use serde::Deserialize;
use std::time::Duration;

use crate::services::{posters::lookup_budget, recommendations::DEFAULT_MATCH_THRESHOLD};

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Path to the catalog + similarity snapshot
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,

    /// TMDb API key; posters fall back to a placeholder when unset
    #[serde(default)]
    pub tmdb_api_key: Option<String>,

    /// TMDb API base URL
    #[serde(default = "default_tmdb_api_url")]
    pub tmdb_api_url: String,

    /// Base URL poster paths are appended to
    #[serde(default = "default_poster_base_url")]
    pub poster_base_url: String,

    /// Image returned whenever a poster cannot be resolved
    #[serde(default = "default_fallback_poster_url")]
    pub fallback_poster_url: String,

    /// Per-call poster lookup timeout in seconds
    #[serde(default = "default_poster_timeout_secs")]
    pub poster_timeout_secs: u64,

    /// Extra attempts for a failed poster lookup (capped at 1)
    #[serde(default = "default_poster_retries")]
    pub poster_retries: u8,

    /// Minimum fuzzy score (0-100) for a query to resolve to a title
    #[serde(default = "default_match_threshold")]
    pub match_threshold: u8,

    /// Result count used when a request does not specify one
    #[serde(default = "default_recommendations")]
    pub default_recommendations: usize,

    /// Upper bound on the result count a request may ask for
    #[serde(default = "default_max_recommendations")]
    pub max_recommendations: usize,

    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

pub const DEFAULT_FALLBACK_POSTER_URL: &str =
    "https://placehold.co/500x750/2b2b2b/f1faee?text=No+Poster";

fn default_snapshot_path() -> String {
    "data/snapshot.json".to_string()
}

fn default_tmdb_api_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_poster_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_fallback_poster_url() -> String {
    DEFAULT_FALLBACK_POSTER_URL.to_string()
}

fn default_poster_timeout_secs() -> u64 {
    5
}

fn default_poster_retries() -> u8 {
    1
}

fn default_match_threshold() -> u8 {
    DEFAULT_MATCH_THRESHOLD
}

fn default_recommendations() -> usize {
    5
}

fn default_max_recommendations() -> usize {
    50
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let config = envy::from_env::<Config>()
            .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.match_threshold > 100 {
            anyhow::bail!("MATCH_THRESHOLD must be within 0-100, got {}", self.match_threshold);
        }
        if self.poster_timeout_secs == 0 {
            anyhow::bail!("POSTER_TIMEOUT_SECS must be positive");
        }
        if self.default_recommendations == 0 {
            anyhow::bail!("DEFAULT_RECOMMENDATIONS must be positive");
        }
        if self.default_recommendations > self.max_recommendations {
            anyhow::bail!(
                "DEFAULT_RECOMMENDATIONS ({}) exceeds MAX_RECOMMENDATIONS ({})",
                self.default_recommendations,
                self.max_recommendations
            );
        }
        Ok(())
    }

    pub fn poster_timeout(&self) -> Duration {
        Duration::from_secs(self.poster_timeout_secs)
    }

    /// Overall time a poster lookup may take, retry included
    pub fn poster_lookup_budget(&self) -> Duration {
        lookup_budget(self.poster_timeout(), self.poster_retries())
    }

    /// Retry count actually applied; at most one retry per lookup
    pub fn poster_retries(&self) -> u8 {
        self.poster_retries.min(1)
    }

    /// API key, ignoring blank values from `.env` templates
    pub fn tmdb_api_key(&self) -> Option<&str> {
        self.tmdb_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}
