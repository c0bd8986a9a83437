//! Scripted [`DataService`] for exercising the dashboard without HTTP.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use geojson::{Feature, FeatureCollection, Geometry, Value};
use lone_star_ledger_client::memory::{Dataset, InMemoryDataService};
use lone_star_ledger_client::{ClientError, DataService};
use lone_star_ledger_models::{
    CampusSummary, EntityDetail, EntityId, EntityRef, HealthStatus, NewsletterSignup,
    SchoolSearchParams, SpendingBreakdown, SummaryStats,
};
use tokio::sync::Notify;

/// A boundary-style feature with optional `id`/`name` properties.
pub fn boundary_feature(id: Option<&str>, name: Option<&str>) -> Feature {
    let mut properties = serde_json::Map::new();
    if let Some(id) = id {
        properties.insert("id".to_string(), serde_json::json!(id));
    }
    if let Some(name) = name {
        properties.insert("name".to_string(), serde_json::json!(name));
    }
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(vec![-97.74, 30.27]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    }
}

pub fn district(id: &str, name: &str, spend: f64, debt: f64) -> EntityDetail {
    EntityDetail {
        id: EntityId::new(id),
        name: name.to_string(),
        per_pupil_spending: spend,
        total_debt: debt,
        avg_teacher_salary: 55_000.0,
        spending: SpendingBreakdown {
            instruction: 600.0,
            administration: 150.0,
            operations: 200.0,
            other: 50.0,
        },
        campuses: Vec::new(),
    }
}

/// Fake service: answers from an in-memory dataset, counts detail
/// fetches, and can hold or fail individual detail requests.
pub struct FakeService {
    inner: InMemoryDataService,
    offline: bool,
    detail_calls: AtomicUsize,
    failing: BTreeSet<String>,
    panicking: BTreeSet<String>,
    gates: Mutex<BTreeMap<String, Arc<Notify>>>,
}

impl FakeService {
    pub fn sample() -> Self {
        let mut austin = district("048", "Austin ISD", 6000.0, 1_000_000.0);
        austin.campuses.push(CampusSummary {
            id: EntityId::new("048-001"),
            name: "Travis HS".to_string(),
            reading_on_grade: 61.0,
            math_on_grade: 55.5,
        });

        let dataset = Dataset {
            districts: vec![
                austin,
                district("049", "Austin Prep", 4000.0, 0.0),
                district("100", "Dallas ISD", 7000.0, 50.0),
            ],
            boundaries: Some(collection(vec![
                boundary_feature(Some("048"), Some("Austin ISD")),
                boundary_feature(Some("100"), Some("Dallas ISD")),
            ])),
            campus_points: Some(collection(vec![boundary_feature(
                Some("048-001"),
                Some("Travis HS"),
            )])),
        };

        Self {
            inner: InMemoryDataService::new(dataset),
            offline: false,
            detail_calls: AtomicUsize::new(0),
            failing: BTreeSet::new(),
            panicking: BTreeSet::new(),
            gates: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn offline() -> Self {
        Self {
            offline: true,
            ..Self::sample()
        }
    }

    /// Detail fetches for `id` fail with a server error.
    pub fn failing(mut self, id: &str) -> Self {
        self.failing.insert(id.to_string());
        self
    }

    /// Detail fetches for `id` panic.
    pub fn panicking(mut self, id: &str) -> Self {
        self.panicking.insert(id.to_string());
        self
    }

    /// Holds detail fetches for `id` until the returned handle is
    /// notified.
    pub fn hold(&self, id: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        if let Ok(mut gates) = self.gates.lock() {
            gates.insert(id.to_string(), Arc::clone(&gate));
        }
        gate
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn signups(&self) -> Vec<String> {
        self.inner.subscribers()
    }

    fn check_online(&self) -> Result<(), ClientError> {
        if self.offline {
            Err(ClientError::Status {
                status: 503,
                url: "http://localhost:8000".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait::async_trait]
impl DataService for FakeService {
    async fn health(&self) -> Result<HealthStatus, ClientError> {
        self.check_online()?;
        self.inner.health().await
    }

    async fn summary(&self) -> Result<SummaryStats, ClientError> {
        self.check_online()?;
        self.inner.summary().await
    }

    async fn district_boundaries(&self) -> Result<FeatureCollection, ClientError> {
        self.check_online()?;
        self.inner.district_boundaries().await
    }

    async fn campus_points(&self) -> Result<FeatureCollection, ClientError> {
        self.check_online()?;
        self.inner.campus_points().await
    }

    async fn search_schools(
        &self,
        params: &SchoolSearchParams,
    ) -> Result<Vec<EntityRef>, ClientError> {
        self.check_online()?;
        self.inner.search_schools(params).await
    }

    async fn school_detail(&self, id: &EntityId) -> Result<EntityDetail, ClientError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self
            .gates
            .lock()
            .ok()
            .and_then(|gates| gates.get(id.as_str()).cloned());
        if let Some(gate) = gate {
            gate.notified().await;
        }

        assert!(
            !self.panicking.contains(id.as_str()),
            "detail fetch for {id} panicked"
        );
        self.check_online()?;
        if self.failing.contains(id.as_str()) {
            return Err(ClientError::Status {
                status: 500,
                url: format!("http://localhost:8000/school/{id}"),
            });
        }
        self.inner.school_detail(id).await
    }

    async fn subscribe_newsletter(&self, signup: &NewsletterSignup) -> Result<(), ClientError> {
        self.check_online()?;
        self.inner.subscribe_newsletter(signup).await
    }
}
