#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! District finance and campus outcome types.
//!
//! These types mirror the JSON contract of the ledger data service and are
//! shared by the HTTP client, the in-memory service, and the dashboard
//! coordination layer. Field names on the wire are `snake_case`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Opaque identifier of a district or campus.
///
/// The service is not consistent about whether ids are JSON strings or
/// numbers, so both deserialize into the same textual id.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates an id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl<'de> Deserialize<'de> for EntityId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => Self(s),
            RawId::Unsigned(n) => Self(n.to_string()),
            RawId::Signed(n) => Self(n.to_string()),
        })
    }
}

/// The one global aggregate shown regardless of selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Sum of every district's spending across all categories.
    pub total_spending: f64,
    /// Mean per-pupil spending across districts.
    pub avg_per_pupil: f64,
    /// Number of districts in the dataset.
    pub district_count: u64,
}

/// A lightweight reference to an entity.
///
/// Search results and resolved map clicks both normalize to this shape
/// before reaching the selection state machine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    /// Entity identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
}

impl EntityRef {
    /// Creates a new reference.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Full detail for one district (or campus) as served by `/school/{id}`.
///
/// Campus records carry no financials; those fields default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDetail {
    /// Entity identifier.
    pub id: EntityId,
    /// Display name.
    pub name: String,
    /// Spending per enrolled pupil.
    #[serde(default)]
    pub per_pupil_spending: f64,
    /// Outstanding debt.
    #[serde(default)]
    pub total_debt: f64,
    /// Average teacher salary.
    #[serde(default)]
    pub avg_teacher_salary: f64,
    /// Spending split into the four reporting categories.
    #[serde(default)]
    pub spending: SpendingBreakdown,
    /// Campuses belonging to this district, in service order.
    #[serde(default)]
    pub campuses: Vec<CampusSummary>,
}

impl EntityDetail {
    /// Returns the [`EntityRef`] naming this entity.
    #[must_use]
    pub fn entity_ref(&self) -> EntityRef {
        EntityRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Reporting categories of district spending, in chart order.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
pub enum SpendingCategory {
    /// Classroom instruction.
    Instruction,
    /// Central and campus administration.
    Administration,
    /// Facilities, transport, food service.
    Operations,
    /// Everything else.
    Other,
}

impl SpendingCategory {
    /// All categories, in the order charts consume them.
    pub const ALL: [Self; 4] = [
        Self::Instruction,
        Self::Administration,
        Self::Operations,
        Self::Other,
    ];
}

/// Spending broken down by [`SpendingCategory`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SpendingBreakdown {
    /// Instruction spending.
    pub instruction: f64,
    /// Administration spending.
    pub administration: f64,
    /// Operations spending.
    pub operations: f64,
    /// Other spending.
    pub other: f64,
}

impl SpendingBreakdown {
    /// Returns the amount spent in `category`.
    #[must_use]
    pub const fn amount(&self, category: SpendingCategory) -> f64 {
        match category {
            SpendingCategory::Instruction => self.instruction,
            SpendingCategory::Administration => self.administration,
            SpendingCategory::Operations => self.operations,
            SpendingCategory::Other => self.other,
        }
    }

    /// Sum of all four categories.
    #[must_use]
    pub fn total(&self) -> f64 {
        SpendingCategory::ALL.iter().map(|c| self.amount(*c)).sum()
    }

    /// The breakdown as chart input: instruction, administration,
    /// operations, other.
    #[must_use]
    pub fn slices(&self) -> [SpendingSlice; 4] {
        SpendingCategory::ALL.map(|category| SpendingSlice {
            category,
            value: self.amount(category),
        })
    }
}

/// One `{category, value}` pair fed to the chart components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpendingSlice {
    /// Category of this slice.
    pub category: SpendingCategory,
    /// Amount spent.
    pub value: f64,
}

impl SpendingSlice {
    /// Fraction of `total` this slice represents, or `0.0` when `total`
    /// is not positive.
    #[must_use]
    pub fn share(&self, total: f64) -> f64 {
        if total > 0.0 { self.value / total } else { 0.0 }
    }
}

/// Academic outcomes for a single campus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampusSummary {
    /// Campus identifier.
    pub id: EntityId,
    /// Campus name.
    pub name: String,
    /// Percentage of students reading on grade level.
    pub reading_on_grade: f64,
    /// Percentage of students on grade level in math.
    pub math_on_grade: f64,
}

/// Numeric bounds narrowing a search.
///
/// Both bounds are optional and inclusive. A bound of zero is a real
/// bound, not "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SchoolFilters {
    /// Minimum per-pupil spending.
    pub min_spend: Option<f64>,
    /// Maximum total debt.
    pub max_debt: Option<f64>,
}

impl SchoolFilters {
    /// Whether no bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.min_spend.is_none() && self.max_debt.is_none()
    }

    /// Whether `detail` satisfies every present bound.
    #[must_use]
    pub fn admits(&self, detail: &EntityDetail) -> bool {
        self.min_spend
            .is_none_or(|min| detail.per_pupil_spending >= min)
            && self.max_debt.is_none_or(|max| detail.total_debt <= max)
    }
}

/// Query parameters for `GET /schools`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchoolSearchParams {
    /// Free-text name query. Always sent, possibly empty.
    pub q: String,
    /// Minimum per-pupil spending.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_spend: Option<f64>,
    /// Maximum total debt.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_debt: Option<f64>,
}

impl SchoolSearchParams {
    /// Combines a free-text query with the current filter bounds.
    #[must_use]
    pub fn new(query: &str, filters: SchoolFilters) -> Self {
        Self {
            q: query.to_string(),
            min_spend: filters.min_spend,
            max_debt: filters.max_debt,
        }
    }

    /// The filter bounds carried by these parameters.
    #[must_use]
    pub const fn filters(&self) -> SchoolFilters {
        SchoolFilters {
            min_spend: self.min_spend,
            max_debt: self.max_debt,
        }
    }

    /// Case-insensitive substring match on `name`. An empty query
    /// matches everything.
    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool {
        let query = self.q.trim();
        query.is_empty() || name.to_lowercase().contains(&query.to_lowercase())
    }
}

/// Request body for `POST /newsletter`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsletterSignup {
    /// Subscriber email address.
    pub email: String,
}

/// Response of `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// `"healthy"` when the service is up.
    pub status: String,
}

impl HealthStatus {
    /// Whether the service reports itself healthy.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
