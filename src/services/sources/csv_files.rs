use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::{
    error::{AppError, AppResult},
    models::{MovieRow, RatingRecord},
};

use super::CatalogSource;

const MOVIE_COLUMNS: &[&str] = &["movieId", "title"];
const RATING_COLUMNS: &[&str] = &["userId", "movieId", "rating"];

/// Reads the movie and rating tables from CSV files with header rows
#[derive(Debug, Clone)]
pub struct CsvFileSource {
    movies_path: PathBuf,
    ratings_path: PathBuf,
}

impl CsvFileSource {
    pub fn new(movies_path: impl Into<PathBuf>, ratings_path: impl Into<PathBuf>) -> Self {
        Self {
            movies_path: movies_path.into(),
            ratings_path: ratings_path.into(),
        }
    }

    /// Opens a table, checks its header row and deserializes every record
    fn read_table<T: DeserializeOwned>(path: &Path, required: &[&str]) -> AppResult<Vec<T>> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;

        // Cells are kept verbatim so titles match what the file says.
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(file);

        let headers = reader.headers()?.clone();
        for column in required {
            if !headers.iter().any(|header| header == *column) {
                return Err(AppError::Configuration(format!(
                    "{} is missing required column `{}`",
                    path.display(),
                    column
                )));
            }
        }

        let rows = reader
            .deserialize()
            .collect::<Result<Vec<T>, csv::Error>>()?;

        tracing::debug!(path = %path.display(), rows = rows.len(), "Table read");

        Ok(rows)
    }
}

/// A missing input is a configuration problem; any other open failure is plain I/O
fn open_error(path: &Path, err: io::Error) -> AppError {
    match err.kind() {
        io::ErrorKind::NotFound => {
            AppError::Configuration(format!("cannot open {}: {}", path.display(), err))
        }
        _ => AppError::Io(err),
    }
}

impl CatalogSource for CsvFileSource {
    fn read_movies(&self) -> AppResult<Vec<MovieRow>> {
        Self::read_table(&self.movies_path, MOVIE_COLUMNS)
    }

    fn read_ratings(&self) -> AppResult<Vec<RatingRecord>> {
        Self::read_table(&self.ratings_path, RATING_COLUMNS)
    }

    fn name(&self) -> &'static str {
        "csv_files"
    }
}
