use serde::Deserialize;

// ============================================================================
// TMDb API Types
// ============================================================================

/// Subset of the TMDb `GET /movie/{id}` response used for posters
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetails {
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl TmdbMovieDetails {
    /// Full image URL for the poster, if TMDb returned a usable path
    pub fn poster_url(&self, base_url: &str) -> Option<String> {
        let path = self.poster_path.as_deref()?.trim().trim_start_matches('/');
        if path.is_empty() {
            return None;
        }
        Some(format!("{}/{}", base_url.trim_end_matches('/'), path))
    }
}
