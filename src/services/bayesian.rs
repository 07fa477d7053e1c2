use std::collections::HashMap;

use serde::Serialize;

use crate::models::{MergedRating, MovieRecord, MovieSummary, ScoredCandidate};

/// Pseudo-count used when none can be derived from the rating counts
pub const DEFAULT_M: u32 = 5;

/// Percentile of per-movie rating counts used as the pseudo-count
const M_PERCENTILE: f64 = 0.75;

/// Where the shrinkage pseudo-count came from
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MSource {
    Override,
    Percentile,
    Fallback,
}

/// Shrinkage parameters derived from the full, unfiltered rating table
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct GlobalStats {
    /// Mean of every rating (C)
    pub global_mean: f64,
    /// Shrinkage pseudo-count (m), always positive
    pub m: u32,
    pub m_source: MSource,
}

impl GlobalStats {
    /// Computes C and m
    ///
    /// `m_override` takes precedence over the 75th percentile of per-movie
    /// rating counts. A zero pseudo-count is rejected in favour of [`DEFAULT_M`].
    pub fn from_ratings(ratings: &[MergedRating], m_override: Option<u32>) -> Self {
        let global_mean = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().map(|r| r.rating).sum::<f64>() / ratings.len() as f64
        };

        let (m, m_source) = match m_override {
            Some(m) => (m, MSource::Override),
            None => match count_percentile(ratings, M_PERCENTILE) {
                Some(p) => (p.trunc() as u32, MSource::Percentile),
                None => (DEFAULT_M, MSource::Fallback),
            },
        };

        let (m, m_source) = if m == 0 {
            tracing::warn!(
                requested_source = ?m_source,
                fallback = DEFAULT_M,
                "Shrinkage pseudo-count of zero is invalid, using default"
            );
            (DEFAULT_M, MSource::Fallback)
        } else {
            (m, m_source)
        };

        Self {
            global_mean,
            m,
            m_source,
        }
    }

    /// `(v / (v + m)) * R + (m / (v + m)) * C`
    pub fn score(&self, avg_rating: f64, rating_count: u64) -> f64 {
        let v = rating_count as f64;
        let m = f64::from(self.m);
        (v / (v + m)) * avg_rating + (m / (v + m)) * self.global_mean
    }
}

/// Percentile of per-movie rating counts with linear interpolation between ranks
fn count_percentile(ratings: &[MergedRating], q: f64) -> Option<f64> {
    let mut per_movie: HashMap<i64, u64> = HashMap::new();
    for rating in ratings {
        *per_movie.entry(rating.movie_id).or_default() += 1;
    }

    let mut counts: Vec<u64> = per_movie.into_values().collect();
    if counts.is_empty() {
        return None;
    }
    counts.sort_unstable();

    let position = q * (counts.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;

    let lo = counts[lower] as f64;
    let hi = counts[upper] as f64;
    Some(lo + (hi - lo) * fraction)
}

/// Ranks candidates by shrinkage-adjusted score
///
/// `exclude_title` is removed before ranking. Ties keep candidate order.
/// Returns at most `top_n` entries; `top_n == 0` yields an empty list.
pub fn rank(
    candidates: &[&MovieRecord],
    stats: &GlobalStats,
    exclude_title: Option<&str>,
    top_n: usize,
) -> Vec<ScoredCandidate> {
    let mut scored: Vec<ScoredCandidate> = candidates
        .iter()
        .filter(|movie| exclude_title != Some(movie.title.as_str()))
        .map(|movie| ScoredCandidate {
            movie: MovieSummary::from(*movie),
            bayes_score: stats.score(movie.avg_rating, movie.rating_count),
        })
        .collect();

    scored.sort_by(|a, b| b.bayes_score.total_cmp(&a.bayes_score));
    scored.truncate(top_n);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;

    fn merged(movie_id: i64, rating: f64) -> MergedRating {
        MergedRating {
            user_id: 1,
            movie_id,
            movie_index: 0,
            rating,
        }
    }

    fn movie(movie_id: i64, title: &str, avg_rating: f64, rating_count: u64) -> MovieRecord {
        MovieRecord {
            movie_id,
            title: title.to_string(),
            genres: "Drama".to_string(),
            year: crate::services::catalog::parse_year(title),
            avg_rating,
            rating_count,
        }
    }

    fn fixed(global_mean: f64, m: u32) -> GlobalStats {
        GlobalStats {
            global_mean,
            m,
            m_source: MSource::Override,
        }
    }

    #[test]
    fn test_global_mean_and_percentile() {
        // Per-movie counts: 1, 2, 3, 4 -> 75th percentile = 3.25 -> m = 3
        let mut ratings = vec![merged(1, 1.0)];
        ratings.extend(vec![merged(2, 2.0); 2]);
        ratings.extend(vec![merged(3, 3.0); 3]);
        ratings.extend(vec![merged(4, 4.0); 4]);

        let stats = GlobalStats::from_ratings(&ratings, None);
        assert_eq!(stats.m, 3);
        assert_eq!(stats.m_source, MSource::Percentile);
        assert!((stats.global_mean - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_override_wins() {
        let ratings = vec![merged(1, 4.0), merged(2, 2.0)];
        let stats = GlobalStats::from_ratings(&ratings, Some(10));
        assert_eq!(stats.m, 10);
        assert_eq!(stats.m_source, MSource::Override);
    }

    #[test]
    fn test_empty_ratings_fall_back() {
        let stats = GlobalStats::from_ratings(&[], None);
        assert_eq!(stats.m, DEFAULT_M);
        assert_eq!(stats.m_source, MSource::Fallback);
        assert_eq!(stats.global_mean, 0.0);
    }

    #[test]
    fn test_zero_m_falls_back() {
        let ratings = vec![merged(1, 4.0)];
        let overridden = GlobalStats::from_ratings(&ratings, Some(0));
        assert_eq!(overridden.m, DEFAULT_M);
        assert_eq!(overridden.m_source, MSource::Fallback);
    }

    #[test]
    fn test_unrated_movie_scores_global_mean() {
        let stats = fixed(3.7, 12);
        assert_eq!(stats.score(0.0, 0), 3.7);
        assert_eq!(stats.score(5.0, 0), 3.7);
    }

    #[test]
    fn test_score_is_monotonic() {
        let stats = fixed(3.5, 10);

        let mut previous = f64::MIN;
        for tenths in 0..=50 {
            let score = stats.score(tenths as f64 / 10.0, 20);
            assert!(score >= previous);
            previous = score;
        }

        let mut above = f64::MIN;
        let mut below = f64::MAX;
        for count in 0..200 {
            let high = stats.score(4.5, count);
            let low = stats.score(2.0, count);
            assert!(high >= above);
            assert!(low <= below);
            above = high;
            below = low;
        }
    }

    #[test]
    fn test_small_sample_scenario() {
        let x = movie(1, "X (1999)", 4.0, 100);
        let y = movie(2, "Y (2001)", 5.0, 1);
        let stats = fixed(4.2, 10);

        let ranked = rank(&[&x, &y], &stats, None, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].movie.title, "Y (2001)");
        assert_eq!(ranked[1].movie.title, "X (1999)");
        assert!((ranked[0].bayes_score - (5.0 / 11.0 + 42.0 / 11.0)).abs() < 1e-9);
        assert!((ranked[1].bayes_score - (400.0 / 110.0 + 42.0 / 110.0)).abs() < 1e-9);
        assert!((ranked[0].bayes_score - 4.2727).abs() < 1e-3);
        assert!((ranked[1].bayes_score - 4.0182).abs() < 1e-3);
    }

    #[test]
    fn test_exclude_title() {
        let x = movie(1, "X (1999)", 5.0, 500);
        let y = movie(2, "Y (2001)", 3.0, 10);
        let stats = fixed(3.5, 10);

        let ranked = rank(&[&x, &y], &stats, Some("X (1999)"), 5);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].movie.title, "Y (2001)");
    }

    #[test]
    fn test_top_n_bounds() {
        let a = movie(1, "A (2000)", 4.0, 10);
        let b = movie(2, "B (2000)", 3.0, 10);
        let stats = fixed(3.5, 10);

        assert!(rank(&[&a, &b], &stats, None, 0).is_empty());
        assert_eq!(rank(&[&a, &b], &stats, None, 50).len(), 2);
        assert_eq!(rank(&[&a, &b], &stats, None, 1)[0].movie.title, "A (2000)");
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        let first = movie(1, "First (2000)", 0.0, 0);
        let second = movie(2, "Second (2000)", 0.0, 0);
        let third = movie(3, "Third (2000)", 0.0, 0);
        let stats = fixed(3.0, 5);

        let ranked = rank(&[&first, &second, &third], &stats, None, 3);
        let titles: Vec<&str> = ranked.iter().map(|s| s.movie.title.as_str()).collect();
        assert_eq!(titles, vec!["First (2000)", "Second (2000)", "Third (2000)"]);
    }

    #[test]
    fn test_rank_leaves_candidates_untouched() {
        let a = movie(1, "A (2000)", 4.0, 10);
        let before = a.clone();
        let _ = rank(&[&a], &fixed(3.0, 5), None, 1);
        assert_eq!(a, before);
    }
}
