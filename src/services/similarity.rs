use std::collections::{BTreeSet, HashMap, HashSet};
use std::time::Instant;

use serde::Serialize;

use crate::{models::MovieRecord, services::catalog::Catalog};

/// Users that must have rated both movies before their correlation counts
pub const DEFAULT_MIN_COMMON_RATERS: usize = 5;

/// A movie correlated with the selected one
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SimilarTitle {
    pub title: String,
    pub correlation: f64,
}

/// Result of a similarity lookup
#[derive(Debug, Clone, PartialEq)]
pub enum SimilarityOutcome {
    /// The title has a correlation row. The list may be empty when no pair
    /// met the overlap threshold.
    Found(Vec<SimilarTitle>),
    /// The title has no ratings among the candidates
    UnknownTitle,
}

/// Item-item Pearson correlations between the rated movies of a candidate set
///
/// Columns are movie titles in ascending order. A cell is `None` when fewer
/// than the minimum number of users rated both titles or either side has no
/// variance over those users.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    titles: Vec<String>,
    values: Vec<Option<f64>>,
}

/// Candidate ratings pivoted into one user-sorted column per rated title
struct RatingColumns {
    titles: Vec<String>,
    columns: Vec<Vec<(i64, f64)>>,
    ratings: usize,
}

impl RatingColumns {
    fn pivot(catalog: &Catalog, candidates: &[&MovieRecord]) -> Self {
        let candidate_ids: HashSet<i64> = candidates.iter().map(|m| m.movie_id).collect();

        let rows: Vec<(i64, &str, f64)> = catalog
            .merged_ratings()
            .iter()
            .filter(|r| candidate_ids.contains(&r.movie_id))
            .filter_map(|r| {
                catalog
                    .movie_at(r.movie_index)
                    .map(|movie| (r.user_id, movie.title.as_str(), r.rating))
            })
            .collect();

        let titles: Vec<String> = rows
            .iter()
            .map(|&(_, title, _)| title)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(str::to_string)
            .collect();
        let column_of: HashMap<&str, usize> = titles
            .iter()
            .enumerate()
            .map(|(i, title)| (title.as_str(), i))
            .collect();

        // Repeated (user, title) cells are averaged.
        let mut cells: HashMap<(usize, i64), (f64, u32)> = HashMap::new();
        for &(user_id, title, rating) in &rows {
            let entry = cells.entry((column_of[title], user_id)).or_insert((0.0, 0));
            entry.0 += rating;
            entry.1 += 1;
        }

        let mut columns: Vec<Vec<(i64, f64)>> = vec![Vec::new(); titles.len()];
        for ((column, user_id), (sum, count)) in cells {
            columns[column].push((user_id, sum / f64::from(count)));
        }
        for column in &mut columns {
            column.sort_unstable_by_key(|&(user_id, _)| user_id);
        }

        Self {
            titles,
            columns,
            ratings: rows.len(),
        }
    }

    fn index_of(&self, title: &str) -> Option<usize> {
        self.titles
            .binary_search_by(|candidate| candidate.as_str().cmp(title))
            .ok()
    }
}

impl CorrelationMatrix {
    /// Pivots the candidates' ratings into user x title and correlates every column pair
    pub fn build(catalog: &Catalog, candidates: &[&MovieRecord], min_common_raters: usize) -> Self {
        let start = Instant::now();
        let RatingColumns {
            titles,
            columns,
            ratings,
        } = RatingColumns::pivot(catalog, candidates);

        let n = titles.len();
        let mut values = vec![None; n * n];
        let mut scratch = PairScratch::default();
        for i in 0..n {
            for j in i..n {
                let value = scratch.pearson(&columns[i], &columns[j], min_common_raters);
                values[i * n + j] = value;
                values[j * n + i] = value;
            }
        }

        tracing::debug!(
            candidates = candidates.len(),
            ratings,
            titles = n,
            elapsed_ms = start.elapsed().as_millis(),
            "Correlation matrix built"
        );

        Self { titles, values }
    }

    pub fn titles(&self) -> &[String] {
        &self.titles
    }

    pub fn len(&self) -> usize {
        self.titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.titles.is_empty()
    }

    fn index_of(&self, title: &str) -> Option<usize> {
        self.titles
            .binary_search_by(|candidate| candidate.as_str().cmp(title))
            .ok()
    }

    /// Correlation between two titles, `None` when undefined or unknown
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.index_of(a)?;
        let j = self.index_of(b)?;
        self.values[i * self.len() + j]
    }

    /// Titles most correlated with `title`, strongest first, self excluded
    pub fn similar_to(&self, title: &str, top_n: usize) -> SimilarityOutcome {
        let Some(i) = self.index_of(title) else {
            return SimilarityOutcome::UnknownTitle;
        };

        let n = self.len();
        let row = (0..n)
            .filter(|&j| j != i)
            .filter_map(|j| self.values[i * n + j].map(|value| (j, value)));
        SimilarityOutcome::Found(top_correlated(&self.titles, row, top_n))
    }
}

/// Named, strongest-first correlations from `(column, value)` pairs in column order
fn top_correlated(
    titles: &[String],
    row: impl Iterator<Item = (usize, f64)>,
    top_n: usize,
) -> Vec<SimilarTitle> {
    let mut similar: Vec<SimilarTitle> = row
        .map(|(j, correlation)| SimilarTitle {
            title: titles[j].clone(),
            correlation,
        })
        .collect();

    similar.sort_by(|a, b| b.correlation.total_cmp(&a.correlation));
    similar.truncate(top_n);
    similar
}

/// Overlap buffers reused across column pairs
#[derive(Default)]
struct PairScratch {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl PairScratch {
    /// Pearson coefficient over the users present in both sorted columns
    fn pearson(
        &mut self,
        a: &[(i64, f64)],
        b: &[(i64, f64)],
        min_common_raters: usize,
    ) -> Option<f64> {
        let Self { xs, ys } = self;
        xs.clear();
        ys.clear();

        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].0.cmp(&b[j].0) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    xs.push(a[i].1);
                    ys.push(b[j].1);
                    i += 1;
                    j += 1;
                }
            }
        }

        let count = xs.len();
        if count == 0 || count < min_common_raters {
            return None;
        }

        let mean_x = xs.iter().sum::<f64>() / count as f64;
        let mean_y = ys.iter().sum::<f64>() / count as f64;

        let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
        for (x, y) in xs.iter().zip(ys.iter()) {
            let dx = x - mean_x;
            let dy = y - mean_y;
            cov += dx * dy;
            var_x += dx * dx;
            var_y += dy * dy;
        }

        if var_x == 0.0 || var_y == 0.0 {
            return None;
        }

        Some((cov / (var_x * var_y).sqrt()).clamp(-1.0, 1.0))
    }
}

/// Looks up the titles most similar to `selected_title` within the candidate set
///
/// Only the selected title's column is correlated against the others, so the
/// cost grows linearly with the number of rated candidates.
pub fn similar(
    catalog: &Catalog,
    candidates: &[&MovieRecord],
    selected_title: &str,
    top_n: usize,
    min_common_raters: usize,
) -> SimilarityOutcome {
    let start = Instant::now();
    let pivot = RatingColumns::pivot(catalog, candidates);
    let Some(i) = pivot.index_of(selected_title) else {
        return SimilarityOutcome::UnknownTitle;
    };

    let mut scratch = PairScratch::default();
    let selected = &pivot.columns[i];
    let row = pivot
        .columns
        .iter()
        .enumerate()
        .filter(|&(j, _)| j != i)
        .filter_map(|(j, column)| {
            scratch
                .pearson(selected, column, min_common_raters)
                .map(|value| (j, value))
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        candidates = candidates.len(),
        ratings = pivot.ratings,
        titles = pivot.titles.len(),
        elapsed_ms = start.elapsed().as_millis(),
        "Correlation row computed"
    );

    SimilarityOutcome::Found(top_correlated(&pivot.titles, row.into_iter(), top_n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MovieRow, RatingRecord};

    /// Five users rate A and B in lockstep, C inversely, D only by two users.
    fn catalog() -> Catalog {
        let movies = vec![
            MovieRow::new(1, "A (2000)", "Drama"),
            MovieRow::new(2, "B (2000)", "Drama"),
            MovieRow::new(3, "C (2000)", "Comedy"),
            MovieRow::new(4, "D (2000)", "Comedy"),
            MovieRow::new(5, "E (2000)", "Horror"),
        ];

        let mut ratings = Vec::new();
        for (user, score) in [(1, 1.0), (2, 2.0), (3, 3.0), (4, 4.0), (5, 5.0)] {
            ratings.push(RatingRecord::new(user, 1, score));
            ratings.push(RatingRecord::new(user, 2, score - 0.5));
            ratings.push(RatingRecord::new(user, 3, 6.0 - score));
        }
        ratings.push(RatingRecord::new(1, 4, 5.0));
        ratings.push(RatingRecord::new(2, 4, 1.0));

        Catalog::from_rows(movies, ratings).unwrap()
    }

    #[test]
    fn test_correlation_signs() {
        let catalog = catalog();
        let candidates: Vec<&MovieRecord> = catalog.movies().iter().collect();
        let matrix = CorrelationMatrix::build(&catalog, &candidates, DEFAULT_MIN_COMMON_RATERS);

        assert!((matrix.get("A (2000)", "B (2000)").unwrap() - 1.0).abs() < 1e-9);
        assert!((matrix.get("A (2000)", "C (2000)").unwrap() + 1.0).abs() < 1e-9);
        assert_eq!(matrix.get("A (2000)", "B (2000)"), matrix.get("B (2000)", "A (2000)"));
    }

    #[test]
    fn test_low_overlap_is_undefined() {
        let catalog = catalog();
        let candidates: Vec<&MovieRecord> = catalog.movies().iter().collect();
        let matrix = CorrelationMatrix::build(&catalog, &candidates, DEFAULT_MIN_COMMON_RATERS);

        // Two common raters would give a perfect fit; below the threshold it is undefined.
        assert_eq!(matrix.get("A (2000)", "D (2000)"), None);

        let loose = CorrelationMatrix::build(&catalog, &candidates, 2);
        assert!(loose.get("A (2000)", "D (2000)").is_some());
    }

    #[test]
    fn test_unrated_titles_are_not_in_matrix() {
        let catalog = catalog();
        let candidates: Vec<&MovieRecord> = catalog.movies().iter().collect();
        let matrix = CorrelationMatrix::build(&catalog, &candidates, DEFAULT_MIN_COMMON_RATERS);

        assert_eq!(matrix.titles(), &["A (2000)", "B (2000)", "C (2000)", "D (2000)"]);
        assert_eq!(
            matrix.similar_to("E (2000)", 5),
            SimilarityOutcome::UnknownTitle
        );
    }

    #[test]
    fn test_similar_ranks_and_excludes_self() {
        let catalog = catalog();
        let candidates: Vec<&MovieRecord> = catalog.movies().iter().collect();

        match similar(&catalog, &candidates, "A (2000)", 10, DEFAULT_MIN_COMMON_RATERS) {
            SimilarityOutcome::Found(list) => {
                let titles: Vec<&str> = list.iter().map(|s| s.title.as_str()).collect();
                assert_eq!(titles, vec!["B (2000)", "C (2000)"]);
            }
            other => panic!("expected correlations, got {other:?}"),
        }

        match similar(&catalog, &candidates, "A (2000)", 1, DEFAULT_MIN_COMMON_RATERS) {
            SimilarityOutcome::Found(list) => assert_eq!(list.len(), 1),
            other => panic!("expected correlations, got {other:?}"),
        }
    }

    #[test]
    fn test_found_but_empty_is_distinct_from_unknown() {
        let catalog = catalog();
        let candidates: Vec<&MovieRecord> = catalog.movies().iter().collect();

        assert_eq!(
            similar(&catalog, &candidates, "D (2000)", 5, DEFAULT_MIN_COMMON_RATERS),
            SimilarityOutcome::Found(vec![])
        );
        assert_eq!(
            similar(&catalog, &candidates, "Z (1900)", 5, DEFAULT_MIN_COMMON_RATERS),
            SimilarityOutcome::UnknownTitle
        );
    }

    #[test]
    fn test_restricted_to_candidates() {
        let catalog = catalog();
        let candidates: Vec<&MovieRecord> = catalog
            .movies()
            .iter()
            .filter(|m| m.genres == "Drama")
            .collect();

        match similar(&catalog, &candidates, "A (2000)", 5, DEFAULT_MIN_COMMON_RATERS) {
            SimilarityOutcome::Found(list) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].title, "B (2000)");
            }
            other => panic!("expected correlations, got {other:?}"),
        }

        assert_eq!(
            similar(&catalog, &candidates, "C (2000)", 5, DEFAULT_MIN_COMMON_RATERS),
            SimilarityOutcome::UnknownTitle
        );
    }

    #[test]
    fn test_constant_ratings_are_undefined() {
        let movies = vec![
            MovieRow::new(1, "Flat (2000)", "Drama"),
            MovieRow::new(2, "Varied (2000)", "Drama"),
        ];
        let mut ratings = Vec::new();
        for user in 1..=6 {
            ratings.push(RatingRecord::new(user, 1, 3.0));
            ratings.push(RatingRecord::new(user, 2, user as f64 / 2.0));
        }
        let catalog = Catalog::from_rows(movies, ratings).unwrap();
        let candidates: Vec<&MovieRecord> = catalog.movies().iter().collect();
        let matrix = CorrelationMatrix::build(&catalog, &candidates, DEFAULT_MIN_COMMON_RATERS);

        assert_eq!(matrix.get("Flat (2000)", "Varied (2000)"), None);
    }

    #[test]
    fn test_single_row_matches_full_matrix() {
        let catalog = catalog();
        let candidates: Vec<&MovieRecord> = catalog.movies().iter().collect();

        for min_common_raters in [2, DEFAULT_MIN_COMMON_RATERS] {
            let matrix = CorrelationMatrix::build(&catalog, &candidates, min_common_raters);
            for title in ["A (2000)", "B (2000)", "C (2000)", "D (2000)", "E (2000)"] {
                assert_eq!(
                    similar(&catalog, &candidates, title, 10, min_common_raters),
                    matrix.similar_to(title, 10),
                    "{title} with min_common_raters = {min_common_raters}"
                );
            }
        }
    }
}
