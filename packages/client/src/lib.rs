#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Read-only client for the ledger data service.
//!
//! The dashboard talks to the service exclusively through the
//! [`DataService`] trait. Two implementations are provided:
//!
//! 1. [`http::HttpDataService`]: `reqwest` against the REST endpoints
//!    (`/summary`, `/geojson_districts`, `/geojson_campuses`, `/schools`,
//!    `/school/{id}`, `/newsletter`, `/health`).
//! 2. [`memory::InMemoryDataService`]: answers the same queries from a
//!    JSON dataset loaded into memory, with the service's filtering and
//!    aggregation semantics.
//!
//! Requests are never retried; callers decide how a failure degrades.

pub mod config;
pub mod http;
pub mod memory;

use geojson::FeatureCollection;
use lone_star_ledger_models::{
    EntityDetail, EntityId, EntityRef, HealthStatus, NewsletterSignup, SchoolSearchParams,
    SummaryStats,
};
use thiserror::Error;

pub use config::ServiceConfig;

/// Errors from data service requests.
///
/// Every variant is transient from the dashboard's point of view: it is
/// logged and degraded, never fatal.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local dataset failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The service answered with a non-success status.
    #[error("Request to {url} failed with status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Requested URL.
        url: String,
    },

    /// No entity exists with the requested id.
    #[error("Entity not found: {id}")]
    NotFound {
        /// The id that was requested.
        id: EntityId,
    },

    /// The request ended without producing a result.
    #[error("Request for {id} ended without a result")]
    Interrupted {
        /// The id that was requested.
        id: EntityId,
    },

    /// The configured service URL cannot be used to build request URLs.
    #[error("Invalid service URL: {url}")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },

    /// The requested resource is not served.
    #[error("Resource unavailable: {resource}")]
    Unavailable {
        /// Name of the missing resource.
        resource: &'static str,
    },
}

/// Read-only queries (plus the newsletter signup) offered by the data
/// service.
#[async_trait::async_trait]
pub trait DataService: Send + Sync {
    /// `GET /health`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or response parsing fails.
    async fn health(&self) -> Result<HealthStatus, ClientError>;

    /// `GET /summary`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or response parsing fails.
    async fn summary(&self) -> Result<SummaryStats, ClientError>;

    /// `GET /geojson_districts`: district boundary polygons.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or response parsing fails.
    async fn district_boundaries(&self) -> Result<FeatureCollection, ClientError>;

    /// `GET /geojson_campuses`: campus point locations.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or response parsing fails.
    async fn campus_points(&self) -> Result<FeatureCollection, ClientError>;

    /// `GET /schools?q=..&min_spend=..&max_debt=..`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request or response parsing fails.
    async fn search_schools(
        &self,
        params: &SchoolSearchParams,
    ) -> Result<Vec<EntityRef>, ClientError>;

    /// `GET /school/{id}`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::NotFound`] if the service does not know the
    /// id, or another [`ClientError`] if the request fails.
    async fn school_detail(&self, id: &EntityId) -> Result<EntityDetail, ClientError>;

    /// `POST /newsletter`
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] if the request fails or is rejected.
    async fn subscribe_newsletter(&self, signup: &NewsletterSignup) -> Result<(), ClientError>;
}
