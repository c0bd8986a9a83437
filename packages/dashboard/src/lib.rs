#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Selection and filter coordination for the ledger dashboard.
//!
//! Three input channels feed one "currently inspected entity":
//!
//! 1. free-text search narrowed by [`filter::FilterCriteria`], run through
//!    [`search::EntitySearch`];
//! 2. clicks on the district boundary layer, resolved by
//!    [`geo::GeoLayerManager`];
//! 3. drawer open/close toggles.
//!
//! Search results and map clicks both normalize to an
//! [`EntityRef`] and go through
//! [`selection::SelectionController::request`], so the drawer cannot tell
//! which channel a selection came from. [`Dashboard`] wires the pieces
//! together and is the handle the rendering layer holds.

pub mod drawer;
pub mod filter;
pub mod geo;
pub mod newsletter;
pub mod search;
pub mod selection;
pub mod summary;

#[cfg(test)]
pub(crate) mod test_support;

use std::sync::Arc;

use lone_star_ledger_client::DataService;
use lone_star_ledger_models::{EntityRef, SummaryStats};
use thiserror::Error;

use crate::drawer::DrawerView;
use crate::filter::FilterCriteria;
use crate::geo::{GeoLayerManager, LayerKind};
use crate::newsletter::NewsletterForm;
use crate::search::EntitySearch;
use crate::selection::SelectionController;
use crate::summary::SummaryLoader;

/// Input refused by a dashboard component.
///
/// Rejections never surface as errors to the user: the component keeps
/// its previous value and logs the rejection.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationRejection {
    /// Filter input is not a number.
    #[error("Not a number: {input:?}")]
    NotANumber {
        /// The raw input.
        input: String,
    },

    /// Filter input is infinite or NaN.
    #[error("Not a finite number: {input:?}")]
    NonFinite {
        /// The raw input.
        input: String,
    },

    /// Filter input is below zero.
    #[error("Negative bound: {value}")]
    Negative {
        /// The parsed value.
        value: f64,
    },

    /// A map feature has no usable `id` property.
    #[error("Feature has no id property")]
    MissingId,

    /// A click landed on a layer that does not accept clicks.
    #[error("Layer {layer} is not interactive")]
    NonInteractiveLayer {
        /// The clicked layer.
        layer: LayerKind,
    },

    /// The newsletter address is not an email address.
    #[error("Invalid email address: {input:?}")]
    InvalidEmail {
        /// The raw input.
        input: String,
    },
}

/// The dashboard's state containers, wired to one data service.
pub struct Dashboard {
    filters: FilterCriteria,
    search: EntitySearch,
    options: Vec<EntityRef>,
    geo: GeoLayerManager,
    selection: SelectionController,
    summary: SummaryLoader,
    newsletter: NewsletterForm,
    service: Arc<dyn DataService>,
}

impl Dashboard {
    /// Builds the dashboard and runs the startup fetches.
    ///
    /// The summary and both map layers are fetched concurrently, once.
    /// Failures leave the corresponding panel empty.
    pub async fn start(service: Arc<dyn DataService>) -> Self {
        let mut summary = SummaryLoader::new();
        let (_, geo) = futures::future::join(
            summary.load(service.as_ref()),
            GeoLayerManager::load(service.as_ref()),
        )
        .await;

        Self {
            filters: FilterCriteria::new(),
            search: EntitySearch::new(Arc::clone(&service)),
            options: Vec::new(),
            geo,
            selection: SelectionController::new(Arc::clone(&service)),
            summary,
            newsletter: NewsletterForm::new(),
            service,
        }
    }

    /// Current filter bounds.
    #[must_use]
    pub const fn filters(&self) -> &FilterCriteria {
        &self.filters
    }

    /// Mutable access to the filter bounds.
    pub const fn filters_mut(&mut self) -> &mut FilterCriteria {
        &mut self.filters
    }

    /// Runs a search with the current filter bounds and stores the result
    /// as the combobox options.
    pub async fn search(&mut self, query: &str) -> &[EntityRef] {
        self.options = self.search.search(query, self.filters.current()).await;
        &self.options
    }

    /// Options produced by the most recent search.
    #[must_use]
    pub fn options(&self) -> &[EntityRef] {
        &self.options
    }

    /// Selects a search result. Returns the request's sequence number.
    pub fn select(&mut self, entity: EntityRef) -> u64 {
        self.selection.request(entity)
    }

    /// Handles a click on a map feature.
    ///
    /// Returns the request's sequence number, or `None` when the click is
    /// not actionable (non-interactive layer or malformed feature).
    pub fn click(&mut self, layer: LayerKind, feature: &geojson::Feature) -> Option<u64> {
        let entity = self.geo.handle_click(layer, feature)?;
        Some(self.selection.request(entity))
    }

    /// The selection state machine.
    #[must_use]
    pub const fn selection(&self) -> &SelectionController {
        &self.selection
    }

    /// Mutable access to the selection state machine.
    pub const fn selection_mut(&mut self) -> &mut SelectionController {
        &mut self.selection
    }

    /// The loaded map layers.
    #[must_use]
    pub const fn geo(&self) -> &GeoLayerManager {
        &self.geo
    }

    /// The global aggregate, if it loaded.
    #[must_use]
    pub const fn summary(&self) -> Option<&SummaryStats> {
        self.summary.stats()
    }

    /// What the detail drawer should show right now.
    #[must_use]
    pub fn drawer(&self) -> DrawerView {
        DrawerView::from_selection(&self.selection.view())
    }

    /// Whether a detail fetch is outstanding. The startup summary is
    /// already settled once [`Dashboard::start`] returns.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.selection.is_loading()
    }

    /// The newsletter form.
    pub const fn newsletter_mut(&mut self) -> &mut NewsletterForm {
        &mut self.newsletter
    }

    /// Submits the newsletter form. Returns whether the signup succeeded.
    pub async fn subscribe(&mut self) -> bool {
        self.newsletter.submit(self.service.as_ref()).await
    }
}
