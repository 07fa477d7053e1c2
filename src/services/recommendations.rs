use serde::Serialize;

use crate::{
    models::ScoredCandidate,
    services::{
        bayesian::{self, GlobalStats},
        catalog::Catalog,
        filter::{self, FilterCriteria},
        similarity::{self, SimilarityOutcome},
    },
};

/// Ranked recommendations plus the parameters they were scored with
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Recommendations {
    #[serde(flatten)]
    pub stats: GlobalStats,
    pub recommendations: Vec<ScoredCandidate>,
}

/// Generates recommendations for the filtered slice of the catalog
///
/// Candidates come from the filters, while C and m always come from the whole
/// catalog's ratings so that shrinkage targets the dataset's own center
/// whichever slice is being viewed.
pub fn get_recommendations(
    catalog: &Catalog,
    filters: &FilterCriteria,
    top_n: usize,
    exclude_title: Option<&str>,
    m_override: Option<u32>,
) -> Recommendations {
    let candidates = filter::filter(catalog, filters);
    let stats = GlobalStats::from_ratings(catalog.merged_ratings(), m_override);
    let recommendations = bayesian::rank(&candidates, &stats, exclude_title, top_n);

    tracing::info!(
        candidates = candidates.len(),
        returned = recommendations.len(),
        global_mean = stats.global_mean,
        m = stats.m,
        "Recommendations ranked"
    );

    Recommendations {
        stats,
        recommendations,
    }
}

/// Finds titles whose ratings move with `title` inside the filtered slice
pub fn get_similar(
    catalog: &Catalog,
    filters: &FilterCriteria,
    title: &str,
    top_n: usize,
    min_common_raters: usize,
) -> SimilarityOutcome {
    let candidates = filter::filter(catalog, filters);
    let outcome = similarity::similar(catalog, &candidates, title, top_n, min_common_raters);

    match &outcome {
        SimilarityOutcome::Found(similar) => tracing::info!(
            title = %title,
            candidates = candidates.len(),
            returned = similar.len(),
            "Similar titles found"
        ),
        SimilarityOutcome::UnknownTitle => tracing::info!(
            title = %title,
            candidates = candidates.len(),
            "Title has no ratings among candidates"
        ),
    }

    outcome
}
