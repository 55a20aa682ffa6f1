/// Catalog + similarity snapshot
///
/// The snapshot is a single JSON document holding the ordered movie catalog and a
/// square similarity matrix aligned to it by row position:
///
/// ```json
/// { "items": [{ "id": 27205, "title": "Inception" }], "similarity": [[1.0]] }
/// ```
///
/// Row `i` of the matrix (and column `i`) belongs to `items[i]`. The alignment is
/// checked once here and relied upon everywhere else.
use crate::{error::LoadError, models::CatalogItem};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct Snapshot {
    items: Vec<CatalogItem>,
    similarity: Vec<Vec<f64>>,
}

/// Square matrix of similarity scores, stored row-major
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    scores: Vec<f64>,
}

impl SimilarityMatrix {
    /// Builds a matrix from nested rows, rejecting ragged or non-finite input
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, LoadError> {
        let dim = rows.len();
        let mut scores = Vec::with_capacity(dim * dim);

        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != dim {
                return Err(LoadError::Malformed(format!(
                    "similarity row {} has {} entries, expected {}",
                    i,
                    row.len(),
                    dim
                )));
            }
            if let Some(j) = row.iter().position(|score| !score.is_finite()) {
                return Err(LoadError::Malformed(format!(
                    "similarity[{}][{}] is not a finite number",
                    i, j
                )));
            }
            scores.extend(row);
        }

        Ok(Self { dim, scores })
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Scores of `index` against every catalog row
    pub fn row(&self, index: usize) -> &[f64] {
        let start = index * self.dim;
        &self.scores[start..start + self.dim]
    }
}

/// The immutable, aligned catalog and similarity index
#[derive(Debug)]
pub struct Dataset {
    items: Vec<CatalogItem>,
    similarity: SimilarityMatrix,
    /// Title -> first row carrying that title
    title_index: HashMap<String, usize>,
    loaded_at: DateTime<Utc>,
}

impl Dataset {
    /// Reads and validates the snapshot at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let dataset = Self::from_json(&raw)?;

        tracing::info!(
            path = %path.display(),
            items = dataset.len(),
            unique_titles = dataset.title_index.len(),
            "Loaded catalog snapshot"
        );

        Ok(dataset)
    }

    pub fn from_json(raw: &str) -> Result<Self, LoadError> {
        let snapshot: Snapshot = serde_json::from_str(raw)?;
        Self::from_parts(snapshot.items, SimilarityMatrix::from_rows(snapshot.similarity)?)
    }

    /// Assembles a dataset, asserting that the matrix is aligned with the catalog
    pub fn from_parts(
        items: Vec<CatalogItem>,
        similarity: SimilarityMatrix,
    ) -> Result<Self, LoadError> {
        if items.is_empty() {
            return Err(LoadError::Malformed("catalog is empty".to_string()));
        }
        if items.len() != similarity.dim() {
            return Err(LoadError::Malformed(format!(
                "catalog has {} items but similarity matrix is {}x{}",
                items.len(),
                similarity.dim(),
                similarity.dim()
            )));
        }

        let mut title_index = HashMap::with_capacity(items.len());
        for (row, item) in items.iter().enumerate() {
            title_index.entry(item.title.clone()).or_insert(row);
        }

        if title_index.len() < items.len() {
            tracing::warn!(
                duplicates = items.len() - title_index.len(),
                "Catalog contains duplicate titles; lookups resolve to the first occurrence"
            );
        }

        Ok(Self {
            items,
            similarity,
            title_index,
            loaded_at: Utc::now(),
        })
    }

    // Never zero: `from_parts` rejects an empty catalog
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[CatalogItem] {
        &self.items
    }

    pub fn item(&self, row: usize) -> Option<&CatalogItem> {
        self.items.get(row)
    }

    /// Catalog titles in row order
    pub fn titles(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(|item| item.title.as_str())
    }

    /// Row of the first item whose title equals `title` exactly
    pub fn row_of(&self, title: &str) -> Option<usize> {
        self.title_index.get(title).copied()
    }

    pub fn similarity_row(&self, row: usize) -> &[f64] {
        self.similarity.row(row)
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
