use serde::{Deserialize, Serialize};

/// Separator between genre labels in the catalog's genre column
pub const GENRE_SEPARATOR: char = '|';

/// A row of the movie table as read from the source
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MovieRow {
    #[serde(rename = "movieId")]
    pub movie_id: i64,
    pub title: String,
    #[serde(default)]
    pub genres: Option<String>,
}

impl MovieRow {
    pub fn new(movie_id: i64, title: &str, genres: &str) -> Self {
        Self {
            movie_id,
            title: title.to_string(),
            genres: Some(genres.to_string()),
        }
    }
}

/// A catalog movie joined with its rating aggregates
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieRecord {
    pub movie_id: i64,
    pub title: String,
    /// Pipe-delimited genre labels, empty when the source had none
    pub genres: String,
    pub year: Option<i32>,
    pub avg_rating: f64,
    pub rating_count: u64,
}

impl MovieRecord {
    /// Iterates over the movie's genre labels
    pub fn genre_labels(&self) -> impl Iterator<Item = &str> {
        self.genres
            .split(GENRE_SEPARATOR)
            .filter(|label| !label.is_empty())
    }

    /// True when every selected genre is one of the movie's labels
    pub fn has_all_genres<S: AsRef<str>>(&self, selected: &[S]) -> bool {
        selected
            .iter()
            .all(|wanted| self.genre_labels().any(|label| label == wanted.as_ref()))
    }
}

/// Row of the browse listing
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MovieSummary {
    pub title: String,
    pub genres: String,
    pub year: Option<i32>,
    pub avg_rating: f64,
    pub rating_count: u64,
}

impl From<&MovieRecord> for MovieSummary {
    fn from(movie: &MovieRecord) -> Self {
        Self {
            title: movie.title.clone(),
            genres: movie.genres.clone(),
            year: movie.year,
            avg_rating: movie.avg_rating,
            rating_count: movie.rating_count,
        }
    }
}

/// A recommendation candidate with its shrinkage-adjusted score
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub movie: MovieSummary,
    pub bayes_score: f64,
}
