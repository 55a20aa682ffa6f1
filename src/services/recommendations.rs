use std::sync::Arc;

use crate::{
    db::Dataset,
    error::{AppError, AppResult},
    models::{Recommendation, RecommendedTitle},
    services::fuzzy,
};

/// Default minimum fuzzy score for a query to resolve to a catalog title
pub const DEFAULT_MATCH_THRESHOLD: u8 = 75;

/// Content-based recommender over a precomputed similarity matrix
///
/// Resolves free-text input to a catalog title with fuzzy matching, then ranks
/// every other title by its similarity to the match.
#[derive(Debug, Clone)]
pub struct Recommender {
    dataset: Arc<Dataset>,
    threshold: u8,
}

impl Recommender {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_threshold(dataset, DEFAULT_MATCH_THRESHOLD)
    }

    pub fn with_threshold(dataset: Arc<Dataset>, threshold: u8) -> Self {
        Self { dataset, threshold }
    }

    pub fn dataset(&self) -> &Arc<Dataset> {
        &self.dataset
    }

    /// Returns up to `n` titles most similar to the best match for `query`
    ///
    /// The matched item itself is never part of the result, whatever its
    /// self-similarity. Equal scores keep catalog order.
    pub fn recommend(&self, query: &str, n: usize) -> AppResult<Recommendation> {
        if n == 0 {
            return Err(AppError::InvalidInput(
                "Number of recommendations must be positive".to_string(),
            ));
        }
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput("Title cannot be empty".to_string()));
        }

        let best = fuzzy::extract_one(query, self.dataset.titles())
            .ok_or_else(|| AppError::Internal("Catalog is empty".to_string()))?;

        if best.score < self.threshold {
            tracing::info!(
                query = %query,
                closest = %best.choice,
                score = best.score,
                threshold = self.threshold,
                "No confident match"
            );
            return Ok(Recommendation::not_found(query));
        }

        let matched_title = best.choice.to_string();
        let row = self.dataset.row_of(&matched_title).unwrap_or(best.index);

        let recommendations = self.rank_neighbours(row, n);

        tracing::info!(
            query = %query,
            matched = %matched_title,
            score = best.score,
            returned = recommendations.len(),
            "Recommendations computed"
        );

        Ok(Recommendation::Found {
            matched_title,
            recommendations,
        })
    }

    /// Top `n` rows by similarity to `row`, excluding `row` itself
    fn rank_neighbours(&self, row: usize, n: usize) -> Vec<RecommendedTitle> {
        let mut ranked: Vec<(usize, f64)> = self
            .dataset
            .similarity_row(row)
            .iter()
            .copied()
            .enumerate()
            .filter(|&(other, _)| other != row)
            .collect();

        // Stable: equal scores stay in ascending row order
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

        ranked
            .into_iter()
            .take(n)
            .filter_map(|(other, score)| {
                self.dataset.item(other).map(|item| RecommendedTitle {
                    id: item.id,
                    title: item.title.clone(),
                    score,
                })
            })
            .collect()
    }
}
