use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;
use std::time::Instant;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;

use crate::{
    error::{AppError, AppResult},
    models::{MergedRating, MovieRecord, MovieRow, RatingRecord},
    services::sources::CatalogSource,
};

static YEAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([0-9]{4})\)").expect("year pattern compiles"));

/// Extracts the release year from a title such as `"Heat (1995)"`
///
/// The first parenthesised four-digit group wins. Titles without one yield `None`.
pub fn parse_year(title: &str) -> Option<i32> {
    YEAR_PATTERN
        .captures(title)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Counts of lenient coercions made while loading
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct LoadReport {
    pub movies: usize,
    pub ratings: usize,
    pub merged_ratings: usize,
    /// Ratings whose movieId is not in the movie table
    pub orphan_ratings: usize,
    pub missing_year: usize,
    pub missing_genres: usize,
}

/// The in-memory movie catalog
///
/// Read-only after construction. Every movieId appears exactly once, in the
/// order of the movie table.
#[derive(Debug)]
pub struct Catalog {
    movies: Vec<MovieRecord>,
    index: HashMap<i64, usize>,
    merged: Vec<MergedRating>,
    report: LoadReport,
    loaded_at: DateTime<Utc>,
}

impl Catalog {
    /// Reads both tables from a source and builds the catalog
    pub fn load(source: &dyn CatalogSource) -> AppResult<Self> {
        let start = Instant::now();
        tracing::info!(source = source.name(), "Loading catalog");

        let movies = source.read_movies()?;
        let ratings = source.read_ratings()?;
        let catalog = Self::from_rows(movies, ratings)?;

        let report = catalog.report();
        tracing::info!(
            source = source.name(),
            movies = report.movies,
            ratings = report.ratings,
            elapsed_ms = start.elapsed().as_millis(),
            "Catalog loaded"
        );

        if report.missing_year > 0 || report.missing_genres > 0 || report.orphan_ratings > 0 {
            tracing::warn!(
                missing_year = report.missing_year,
                missing_genres = report.missing_genres,
                orphan_ratings = report.orphan_ratings,
                "Catalog loaded with coerced values"
            );
        }

        Ok(catalog)
    }

    /// Joins rating aggregates onto movie rows
    pub fn from_rows(rows: Vec<MovieRow>, ratings: Vec<RatingRecord>) -> AppResult<Self> {
        let mut aggregates: HashMap<i64, (f64, u64)> = HashMap::new();
        for rating in &ratings {
            let entry = aggregates.entry(rating.movie_id).or_insert((0.0, 0));
            entry.0 += rating.rating;
            entry.1 += 1;
        }

        let mut report = LoadReport {
            ratings: ratings.len(),
            ..LoadReport::default()
        };

        let mut movies = Vec::with_capacity(rows.len());
        let mut index = HashMap::with_capacity(rows.len());

        for row in rows {
            if index.insert(row.movie_id, movies.len()).is_some() {
                return Err(AppError::Configuration(format!(
                    "duplicate movieId {} in movie table",
                    row.movie_id
                )));
            }

            let year = parse_year(&row.title);
            if year.is_none() {
                report.missing_year += 1;
            }

            let genres = row.genres.unwrap_or_default();
            if genres.is_empty() {
                report.missing_genres += 1;
            }

            let (avg_rating, rating_count) = match aggregates.get(&row.movie_id) {
                Some(&(sum, count)) => (sum / count as f64, count),
                None => (0.0, 0),
            };

            movies.push(MovieRecord {
                movie_id: row.movie_id,
                title: row.title,
                genres,
                year,
                avg_rating,
                rating_count,
            });
        }

        let merged: Vec<MergedRating> = ratings
            .iter()
            .filter_map(|rating| {
                index.get(&rating.movie_id).map(|&movie_index| MergedRating {
                    user_id: rating.user_id,
                    movie_id: rating.movie_id,
                    movie_index,
                    rating: rating.rating,
                })
            })
            .collect();

        report.movies = movies.len();
        report.merged_ratings = merged.len();
        report.orphan_ratings = ratings.len() - merged.len();

        Ok(Self {
            movies,
            index,
            merged,
            report,
            loaded_at: Utc::now(),
        })
    }

    pub fn movies(&self) -> &[MovieRecord] {
        &self.movies
    }

    pub fn get(&self, movie_id: i64) -> Option<&MovieRecord> {
        self.index.get(&movie_id).map(|&i| &self.movies[i])
    }

    pub fn movie_at(&self, movie_index: usize) -> Option<&MovieRecord> {
        self.movies.get(movie_index)
    }

    /// Ratings joined with their movies (ratings for unknown movies dropped)
    pub fn merged_ratings(&self) -> &[MergedRating] {
        &self.merged
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    /// Sorted genre vocabulary
    pub fn genres(&self) -> Vec<String> {
        self.movies
            .iter()
            .flat_map(|movie| movie.genre_labels())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }

    /// Earliest and latest release year among movies that have one
    pub fn year_bounds(&self) -> Option<(i32, i32)> {
        let mut years = self.movies.iter().filter_map(|movie| movie.year);
        let first = years.next()?;
        Some(years.fold((first, first), |(lo, hi), y| (lo.min(y), hi.max(y))))
    }

    /// Lowest and highest average rating across the catalog
    pub fn rating_bounds(&self) -> Option<(f64, f64)> {
        let mut ratings = self.movies.iter().map(|movie| movie.avg_rating);
        let first = ratings.next()?;
        Some(ratings.fold((first, first), |(lo, hi), r| (lo.min(r), hi.max(r))))
    }
}
