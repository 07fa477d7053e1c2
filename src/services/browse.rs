use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::{MovieRecord, MovieSummary};

/// Ordering of the browse listing
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Highest average rating first
    #[default]
    AvgRating,
    /// Most rated first
    RatingCount,
    /// Newest first, movies without a year last
    Year,
    /// Alphabetical
    Title,
}

impl SortKey {
    fn compare(self, a: &MovieRecord, b: &MovieRecord) -> Ordering {
        match self {
            SortKey::AvgRating => b.avg_rating.total_cmp(&a.avg_rating),
            SortKey::RatingCount => b.rating_count.cmp(&a.rating_count),
            SortKey::Year => match (a.year, b.year) {
                (Some(x), Some(y)) => y.cmp(&x),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
            SortKey::Title => a.title.cmp(&b.title),
        }
    }
}

/// Lists the candidates for display, sorted stably by `sort`
pub fn browse(candidates: &[&MovieRecord], sort: SortKey) -> Vec<MovieSummary> {
    let mut sorted = candidates.to_vec();
    sorted.sort_by(|a, b| sort.compare(a, b));
    sorted.into_iter().map(MovieSummary::from).collect()
}

/// Sorted, de-duplicated titles of a candidate set
pub fn titles(candidates: &[&MovieRecord]) -> Vec<String> {
    candidates
        .iter()
        .map(|movie| movie.title.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Headline numbers for a candidate set
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CandidateStats {
    pub total: usize,
    pub mean_avg_rating: f64,
    pub year_min: Option<i32>,
    pub year_max: Option<i32>,
    pub top_genre: Option<String>,
}

/// Summarizes a candidate set, `None` when it is empty
pub fn summarize(candidates: &[&MovieRecord]) -> Option<CandidateStats> {
    if candidates.is_empty() {
        return None;
    }

    let total = candidates.len();
    let mean_avg_rating = candidates.iter().map(|m| m.avg_rating).sum::<f64>() / total as f64;
    let years = candidates.iter().filter_map(|m| m.year);

    let mut genre_counts: HashMap<&str, usize> = HashMap::new();
    for label in candidates.iter().flat_map(|m| m.genre_labels()) {
        *genre_counts.entry(label).or_default() += 1;
    }

    // Most frequent label; ties go to the alphabetically first one.
    let top_genre = genre_counts
        .into_iter()
        .max_by(|(a_label, a_count), (b_label, b_count)| {
            a_count.cmp(b_count).then_with(|| b_label.cmp(a_label))
        })
        .map(|(label, _)| label.to_string());

    Some(CandidateStats {
        total,
        mean_avg_rating,
        year_min: years.clone().min(),
        year_max: years.max(),
        top_genre,
    })
}
