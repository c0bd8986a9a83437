//! One-shot fetch of the global aggregate.

use lone_star_ledger_client::DataService;
use lone_star_ledger_models::SummaryStats;

/// Holds the [`SummaryStats`] fetched at startup.
///
/// The fetch happens at most once. On failure the stats stay absent and
/// the error is logged.
#[derive(Debug, Clone, Default)]
pub struct SummaryLoader {
    stats: Option<SummaryStats>,
    attempted: bool,
}

impl SummaryLoader {
    /// Creates a loader that has not fetched yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetches the summary. Calls after the first are no-ops.
    pub async fn load(&mut self, service: &dyn DataService) {
        if self.attempted {
            log::debug!("Summary already fetched, skipping");
            return;
        }
        self.attempted = true;

        match service.summary().await {
            Ok(stats) => {
                log::info!(
                    "Loaded summary: {} districts, total spending {}",
                    stats.district_count,
                    stats.total_spending
                );
                self.stats = Some(stats);
            }
            Err(e) => log::error!("Failed to load summary: {e}"),
        }
    }

    /// The fetched stats, if the fetch succeeded.
    #[must_use]
    pub const fn stats(&self) -> Option<&SummaryStats> {
        self.stats.as_ref()
    }

    /// Whether the startup fetch has not happened yet.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        !self.attempted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeService;

    #[tokio::test]
    async fn loads_once() {
        let mut loader = SummaryLoader::new();
        assert!(loader.is_pending());

        loader.load(&FakeService::sample()).await;
        assert!(!loader.is_pending());
        let stats = loader.stats().cloned().unwrap();
        assert_eq!(stats.district_count, 3);

        // a later fetch against a dead service changes nothing
        loader.load(&FakeService::offline()).await;
        assert_eq!(loader.stats(), Some(&stats));
    }

    #[tokio::test]
    async fn failure_leaves_stats_absent() {
        let mut loader = SummaryLoader::new();
        loader.load(&FakeService::offline()).await;
        assert!(loader.stats().is_none());
        assert!(!loader.is_pending());
    }
}
