mod movie;
mod rating;

pub use movie::{MovieRecord, MovieRow, MovieSummary, ScoredCandidate, GENRE_SEPARATOR};
pub use rating::{MergedRating, RatingRecord};
