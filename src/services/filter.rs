use serde::{Deserialize, Serialize};

use crate::{models::MovieRecord, services::catalog::Catalog};

/// Movies that satisfy the current filter predicates, in catalog order
pub type CandidateSet<'a> = Vec<&'a MovieRecord>;

/// User-selected filter predicates
///
/// Unset predicates match everything. Ranges are inclusive on both ends.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterCriteria {
    /// Every listed genre must be present on the movie
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub year_range: Option<(i32, i32)>,
    #[serde(default)]
    pub rating_range: Option<(f64, f64)>,
    #[serde(default)]
    pub exact_title: Option<String>,
}

impl FilterCriteria {
    pub fn with_genres<S: Into<String>>(mut self, genres: impl IntoIterator<Item = S>) -> Self {
        self.genres = genres.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_years(mut self, lo: i32, hi: i32) -> Self {
        self.year_range = Some((lo, hi));
        self
    }

    pub fn with_ratings(mut self, lo: f64, hi: f64) -> Self {
        self.rating_range = Some((lo, hi));
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.exact_title = Some(title.into());
        self
    }

    pub fn matches(&self, movie: &MovieRecord) -> bool {
        if let Some((lo, hi)) = self.year_range {
            match movie.year {
                Some(year) if (lo..=hi).contains(&year) => {}
                _ => return false,
            }
        }

        if let Some((lo, hi)) = self.rating_range {
            if movie.avg_rating < lo || movie.avg_rating > hi {
                return false;
            }
        }

        if !self.genres.is_empty() && !movie.has_all_genres(&self.genres) {
            return false;
        }

        match &self.exact_title {
            Some(title) => movie.title == *title,
            None => true,
        }
    }
}

/// Applies the criteria to the catalog
///
/// An empty result is a valid outcome, not an error.
pub fn filter<'a>(catalog: &'a Catalog, criteria: &FilterCriteria) -> CandidateSet<'a> {
    let candidates: CandidateSet<'a> = catalog
        .movies()
        .iter()
        .filter(|movie| criteria.matches(movie))
        .collect();

    tracing::debug!(
        genres = ?criteria.genres,
        year_range = ?criteria.year_range,
        rating_range = ?criteria.rating_range,
        exact_title = ?criteria.exact_title,
        candidates = candidates.len(),
        "Filter applied"
    );

    candidates
}
