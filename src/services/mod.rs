pub mod fuzzy;
pub mod posters;
pub mod recommendations;

pub use posters::{PlaceholderPosterResolver, PosterResolver, PosterService, TmdbPosterResolver};
pub use recommendations::Recommender;
