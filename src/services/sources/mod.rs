/// Catalog data source abstraction
///
/// The loader only needs the two raw tables. Sources decide where those come
/// from (CSV files on disk, rows already held in memory) and are responsible
/// for reporting missing inputs as configuration errors.
use crate::{
    error::AppResult,
    models::{MovieRow, RatingRecord},
};

pub mod csv_files;
pub mod in_memory;

pub use csv_files::CsvFileSource;
pub use in_memory::InMemorySource;

/// Trait for catalog data sources
#[cfg_attr(test, mockall::automock)]
pub trait CatalogSource: Send + Sync {
    /// Reads every row of the movie table
    fn read_movies(&self) -> AppResult<Vec<MovieRow>>;

    /// Reads every row of the rating table
    fn read_ratings(&self) -> AppResult<Vec<RatingRecord>>;

    /// Source name for logging and debugging
    fn name(&self) -> &'static str;
}
