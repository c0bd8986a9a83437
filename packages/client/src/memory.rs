//! In-memory [`DataService`] backed by a JSON dataset.
//!
//! The dataset file holds the district records and, optionally, the two
//! map layers:
//!
//! ```json
//! {
//!   "districts": [ { "id": "048", "name": "Austin ISD", ... } ],
//!   "geojson": { "type": "FeatureCollection", "features": [] },
//!   "campus_geojson": { "type": "FeatureCollection", "features": [] }
//! }
//! ```
//!
//! Queries follow the data service's semantics: case-insensitive substring
//! name matching, inclusive numeric bounds, and detail lookup through
//! districts and then their campuses.

use std::path::Path;
use std::sync::Mutex;

use geojson::FeatureCollection;
use lone_star_ledger_models::{
    EntityDetail, EntityId, EntityRef, HealthStatus, NewsletterSignup, SchoolSearchParams,
    SpendingBreakdown, SummaryStats,
};
use serde::{Deserialize, Serialize};

use crate::{ClientError, DataService};

/// Contents of a dataset file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dataset {
    /// District records with their campuses.
    pub districts: Vec<EntityDetail>,
    /// District boundary polygons.
    #[serde(default, rename = "geojson")]
    pub boundaries: Option<FeatureCollection>,
    /// Campus point locations.
    #[serde(default, rename = "campus_geojson")]
    pub campus_points: Option<FeatureCollection>,
}

impl Dataset {
    /// Reads and parses a dataset file.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ClientError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Aggregate statistics over every district.
    #[must_use]
    pub fn summary(&self) -> SummaryStats {
        let total_spending = self.districts.iter().map(|d| d.spending.total()).sum();
        #[allow(clippy::cast_precision_loss)]
        let avg_per_pupil = if self.districts.is_empty() {
            0.0
        } else {
            self.districts
                .iter()
                .map(|d| d.per_pupil_spending)
                .sum::<f64>()
                / self.districts.len() as f64
        };

        SummaryStats {
            total_spending,
            avg_per_pupil,
            district_count: self.districts.len() as u64,
        }
    }

    /// Districts whose name matches the query and that satisfy every
    /// bound.
    #[must_use]
    pub fn search(&self, params: &SchoolSearchParams) -> Vec<EntityRef> {
        let filters = params.filters();
        self.districts
            .iter()
            .filter(|d| params.matches_name(&d.name) && filters.admits(d))
            .map(EntityDetail::entity_ref)
            .collect()
    }

    /// Looks up a district by id, falling back to a campus with that id.
    #[must_use]
    pub fn find(&self, id: &EntityId) -> Option<EntityDetail> {
        if let Some(district) = self.districts.iter().find(|d| &d.id == id) {
            return Some(district.clone());
        }

        self.districts
            .iter()
            .flat_map(|d| d.campuses.iter())
            .find(|c| &c.id == id)
            .map(|campus| EntityDetail {
                id: campus.id.clone(),
                name: campus.name.clone(),
                per_pupil_spending: 0.0,
                total_debt: 0.0,
                avg_teacher_salary: 0.0,
                spending: SpendingBreakdown::default(),
                campuses: Vec::new(),
            })
    }
}

/// A [`DataService`] answering from a [`Dataset`] held in memory.
pub struct InMemoryDataService {
    dataset: Dataset,
    subscribers: Mutex<Vec<String>>,
}

impl InMemoryDataService {
    /// Wraps a dataset.
    #[must_use]
    pub const fn new(dataset: Dataset) -> Self {
        Self {
            dataset,
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Loads a dataset file and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the file cannot be read or parsed.
    pub fn from_path(path: &Path) -> Result<Self, ClientError> {
        let dataset = Dataset::load(path)?;
        log::info!(
            "Loaded dataset with {} districts from {}",
            dataset.districts.len(),
            path.display()
        );
        Ok(Self::new(dataset))
    }

    /// The underlying dataset.
    #[must_use]
    pub const fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Email addresses signed up so far.
    #[must_use]
    pub fn subscribers(&self) -> Vec<String> {
        self.subscribers
            .lock()
            .map(|s| s.clone())
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl DataService for InMemoryDataService {
    async fn health(&self) -> Result<HealthStatus, ClientError> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
        })
    }

    async fn summary(&self) -> Result<SummaryStats, ClientError> {
        Ok(self.dataset.summary())
    }

    async fn district_boundaries(&self) -> Result<FeatureCollection, ClientError> {
        self.dataset
            .boundaries
            .clone()
            .ok_or(ClientError::Unavailable {
                resource: "geojson_districts",
            })
    }

    async fn campus_points(&self) -> Result<FeatureCollection, ClientError> {
        self.dataset
            .campus_points
            .clone()
            .ok_or(ClientError::Unavailable {
                resource: "geojson_campuses",
            })
    }

    async fn search_schools(
        &self,
        params: &SchoolSearchParams,
    ) -> Result<Vec<EntityRef>, ClientError> {
        Ok(self.dataset.search(params))
    }

    async fn school_detail(&self, id: &EntityId) -> Result<EntityDetail, ClientError> {
        self.dataset
            .find(id)
            .ok_or_else(|| ClientError::NotFound { id: id.clone() })
    }

    async fn subscribe_newsletter(&self, signup: &NewsletterSignup) -> Result<(), ClientError> {
        if let Ok(mut subscribers) = self.subscribers.lock() {
            subscribers.push(signup.email.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use lone_star_ledger_models::{CampusSummary, SchoolFilters};

    use super::*;

    fn district(id: &str, name: &str, spend: f64, debt: f64) -> EntityDetail {
        EntityDetail {
            id: EntityId::new(id),
            name: name.to_string(),
            per_pupil_spending: spend,
            total_debt: debt,
            avg_teacher_salary: 50_000.0,
            spending: SpendingBreakdown {
                instruction: 10.0,
                administration: 5.0,
                operations: 3.0,
                other: 2.0,
            },
            campuses: Vec::new(),
        }
    }

    fn service() -> InMemoryDataService {
        let mut austin = district("048", "Austin ISD", 6000.0, 100.0);
        austin.campuses.push(CampusSummary {
            id: EntityId::new("048-001"),
            name: "Travis HS".to_string(),
            reading_on_grade: 60.0,
            math_on_grade: 50.0,
        });
        InMemoryDataService::new(Dataset {
            districts: vec![
                austin,
                district("049", "Austin Prep", 4000.0, 0.0),
                district("100", "Dallas ISD", 7000.0, 50.0),
            ],
            boundaries: None,
            campus_points: None,
        })
    }

    #[tokio::test]
    async fn search_matches_name_case_insensitively() {
        let params = SchoolSearchParams::new("austin", SchoolFilters::default());
        let results = service().search_schools(&params).await.unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["048", "049"]);
    }

    #[tokio::test]
    async fn empty_query_returns_everything() {
        let params = SchoolSearchParams::new("", SchoolFilters::default());
        assert_eq!(service().search_schools(&params).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn max_debt_zero_filters_properly() {
        let params = SchoolSearchParams::new(
            "",
            SchoolFilters {
                min_spend: None,
                max_debt: Some(0.0),
            },
        );
        let results = service().search_schools(&params).await.unwrap();
        assert_eq!(results, vec![EntityRef::new("049", "Austin Prep")]);
    }

    #[tokio::test]
    async fn detail_falls_back_to_campus() {
        let service = service();
        let campus = service
            .school_detail(&EntityId::new("048-001"))
            .await
            .unwrap();
        assert_eq!(campus.name, "Travis HS");
        assert!(campus.campuses.is_empty());

        let err = service
            .school_detail(&EntityId::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NotFound { .. }));
    }

    #[tokio::test]
    async fn summary_aggregates_districts() {
        let stats = service().summary().await.unwrap();
        assert_eq!(stats.district_count, 3);
        assert!((stats.total_spending - 60.0).abs() < 1e-9);
        assert!((stats.avg_per_pupil - 17_000.0 / 3.0).abs() < 1e-9);
        assert_eq!(Dataset::default().summary().avg_per_pupil, 0.0);
    }

    #[tokio::test]
    async fn missing_layers_are_unavailable() {
        let service = service();
        assert!(matches!(
            service.district_boundaries().await,
            Err(ClientError::Unavailable { .. })
        ));
        assert!(service.campus_points().await.is_err());
    }

    #[tokio::test]
    async fn records_newsletter_signups() {
        let service = service();
        service
            .subscribe_newsletter(&NewsletterSignup {
                email: "a@b.org".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(service.subscribers(), vec!["a@b.org".to_string()]);
    }

    #[test]
    fn loads_bundled_sample_dataset() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../data/sample_data.json");
        let dataset = Dataset::load(&path).unwrap();
        assert_eq!(dataset.summary().district_count, 3);
        assert_eq!(
            dataset.boundaries.as_ref().map(|c| c.features.len()),
            Some(3)
        );
        assert!(dataset.find(&EntityId::new("057905001")).is_some());
    }

    #[test]
    fn missing_dataset_is_io_error() {
        let err = Dataset::load(Path::new("/nonexistent/ledger.json")).unwrap_err();
        assert!(matches!(err, ClientError::Io(_)));
    }

    #[test]
    fn parses_dataset_with_layers() {
        let dataset: Dataset = serde_json::from_value(serde_json::json!({
            "districts": [],
            "geojson": {"type": "FeatureCollection", "features": []}
        }))
        .unwrap();
        assert!(dataset.boundaries.is_some());
        assert!(dataset.campus_points.is_none());
    }
}
