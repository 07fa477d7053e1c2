use serde::{Deserialize, Serialize};

/// A single user rating. Columns beyond these three are ignored on read.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RatingRecord {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub rating: f64,
}

impl RatingRecord {
    pub fn new(user_id: i64, movie_id: i64, rating: f64) -> Self {
        Self {
            user_id,
            movie_id,
            rating,
        }
    }
}

/// A rating whose movie is known to the catalog
///
/// `movie_index` points into the catalog's movie list, so the title and
/// genres of the rated movie are one lookup away.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedRating {
    pub user_id: i64,
    pub movie_id: i64,
    pub movie_index: usize,
    pub rating: f64,
}
