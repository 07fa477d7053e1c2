pub mod bayesian;
pub mod browse;
pub mod catalog;
pub mod filter;
pub mod recommendations;
pub mod similarity;
pub mod sources;

pub use catalog::Catalog;
pub use filter::FilterCriteria;
