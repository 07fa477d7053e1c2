use crate::{
    error::AppResult,
    models::{MovieRow, RatingRecord},
};

use super::CatalogSource;

/// Source backed by rows that are already in memory
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    movies: Vec<MovieRow>,
    ratings: Vec<RatingRecord>,
}

impl InMemorySource {
    pub fn new(movies: Vec<MovieRow>, ratings: Vec<RatingRecord>) -> Self {
        Self { movies, ratings }
    }
}

impl CatalogSource for InMemorySource {
    fn read_movies(&self) -> AppResult<Vec<MovieRow>> {
        Ok(self.movies.clone())
    }

    fn read_ratings(&self) -> AppResult<Vec<RatingRecord>> {
        Ok(self.ratings.clone())
    }

    fn name(&self) -> &'static str {
        "in_memory"
    }
}
