use serde::{Deserialize, Serialize};
use std::fmt::Display;

pub mod tmdb;

pub use tmdb::TmdbMovieDetails;

/// External identifier of a catalog item (the TMDb movie id)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single movie in the catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogItem {
    pub id: ItemId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overview: Option<String>,
}

/// One ranked entry of a recommendation list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecommendedTitle {
    pub id: ItemId,
    pub title: String,
    /// Similarity between this item and the matched title
    pub score: f64,
}

/// Outcome of resolving a free-text query and ranking its neighbours
#[derive(Debug, Clone, PartialEq)]
pub enum Recommendation {
    /// The query resolved to `matched_title`; entries ordered by descending score
    Found {
        matched_title: String,
        recommendations: Vec<RecommendedTitle>,
    },
    /// No catalog title scored at or above the confidence threshold
    NotFound { message: String },
}

impl Recommendation {
    pub fn not_found(query: &str) -> Self {
        Recommendation::NotFound {
            message: format!("Sorry, couldn't find a close match for '{}'.", query),
        }
    }
}

/// A recommendation with its poster resolved, as returned to clients
#[derive(Debug, Clone, Serialize)]
pub struct RecommendationCard {
    pub id: ItemId,
    pub title: String,
    pub score: f64,
    pub poster_url: String,
}

impl RecommendationCard {
    pub fn new(title: RecommendedTitle, poster_url: String) -> Self {
        Self {
            id: title.id,
            title: title.title,
            score: title.score,
            poster_url,
        }
    }
}

/// Response body of the recommendations endpoint
#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub matched_title: String,
    pub recommendations: Vec<RecommendationCard>,
}

/// Catalog listing entry
#[derive(Debug, Serialize)]
pub struct TitleSummary {
    pub id: ItemId,
    pub title: String,
}

impl From<&CatalogItem> for TitleSummary {
    fn from(item: &CatalogItem) -> Self {
        Self {
            id: item.id,
            title: item.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display() {
        assert_eq!(format!("{}", ItemId(27205)), "27205");
    }

    #[test]
    fn test_catalog_item_optional_fields() {
        let json = r#"{"id": 27205, "title": "Inception"}"#;
        let item: CatalogItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.id, ItemId(27205));
        assert_eq!(item.title, "Inception");
        assert_eq!(item.release_year, None);

        let out = serde_json::to_string(&item).unwrap();
        assert_eq!(out, r#"{"id":27205,"title":"Inception"}"#);
    }

    #[test]
    fn test_not_found_message_names_query() {
        let rec = Recommendation::not_found("Xyzzy Nonexistent Film");
        assert_eq!(
            rec,
            Recommendation::NotFound {
                message: "Sorry, couldn't find a close match for 'Xyzzy Nonexistent Film'."
                    .to_string()
            }
        );
    }

    #[test]
    fn test_card_keeps_ranked_fields() {
        let card = RecommendationCard::new(
            RecommendedTitle {
                id: ItemId(157336),
                title: "Interstellar".to_string(),
                score: 0.8,
            },
            "https://example.test/p.jpg".to_string(),
        );
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["id"], 157336);
        assert_eq!(json["title"], "Interstellar");
        assert_eq!(json["poster_url"], "https://example.test/p.jpg");
    }
}
