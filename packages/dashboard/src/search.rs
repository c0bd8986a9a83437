//! Free-text entity search narrowed by numeric bounds.

use std::sync::Arc;

use lone_star_ledger_client::DataService;
use lone_star_ledger_models::{EntityRef, SchoolFilters, SchoolSearchParams};

/// Runs searches against the data service.
///
/// A failed search degrades to an empty result set; the failure is logged
/// and never reaches the caller.
pub struct EntitySearch {
    service: Arc<dyn DataService>,
}

impl EntitySearch {
    /// Creates a search bound to `service`.
    #[must_use]
    pub fn new(service: Arc<dyn DataService>) -> Self {
        Self { service }
    }

    /// Entities whose name matches `query` and that satisfy every bound
    /// present in `criteria`. An empty query is passed through unchanged.
    pub async fn search(&self, query: &str, criteria: SchoolFilters) -> Vec<EntityRef> {
        let params = SchoolSearchParams::new(query, criteria);
        match self.service.search_schools(&params).await {
            Ok(results) => {
                log::debug!("Search {query:?} returned {} results", results.len());
                results
            }
            Err(e) => {
                log::error!("Search {query:?} failed: {e}");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterCriteria;
    use crate::test_support::{FakeService, district};

    #[tokio::test]
    async fn austin_with_min_spend() {
        let service = Arc::new(FakeService::sample());
        let search = EntitySearch::new(service.clone());
        let mut filters = FilterCriteria::new();
        filters.set_min_spend("5000").unwrap();

        let results = search.search("Austin", filters.current()).await;

        assert!(!results.is_empty());
        for entity in &results {
            let detail = service.school_detail(&entity.id).await.unwrap();
            assert!(detail.per_pupil_spending >= 5000.0);
            assert!(detail.name.to_lowercase().contains("austin"));
        }
        assert_eq!(results, vec![EntityRef::new("048", "Austin ISD")]);
    }

    #[tokio::test]
    async fn empty_query_is_unconstrained() {
        let search = EntitySearch::new(Arc::new(FakeService::sample()));
        assert_eq!(search.search("", SchoolFilters::default()).await.len(), 3);
    }

    #[tokio::test]
    async fn bounds_combine_with_and() {
        let search = EntitySearch::new(Arc::new(FakeService::sample()));
        let criteria = SchoolFilters {
            min_spend: Some(5000.0),
            max_debt: Some(100.0),
        };
        let results = search.search("", criteria).await;
        assert_eq!(results, vec![EntityRef::new("100", "Dallas ISD")]);

        let unmatched = district("x", "x", 0.0, 0.0);
        assert!(!criteria.admits(&unmatched));
    }

    #[tokio::test]
    async fn failure_degrades_to_empty() {
        let search = EntitySearch::new(Arc::new(FakeService::offline()));
        assert!(search.search("Austin", SchoolFilters::default()).await.is_empty());
    }
}
