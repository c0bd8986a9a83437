//! Map layers and click resolution.
//!
//! Two feature collections are fetched once at startup, independently:
//! district boundary polygons and campus point locations. Either may be
//! absent, in which case nothing is drawn for it.
//!
//! Only the boundary layer takes clicks. Its features must carry `id` and
//! `name` properties; a click on a feature without an `id` is dropped
//! before it reaches the selection controller. The campus layer is an
//! informational overlay.

use geojson::{Feature, FeatureCollection};
use lone_star_ledger_client::DataService;
use lone_star_ledger_models::{EntityId, EntityRef};
use strum_macros::{AsRefStr, Display};

use crate::ValidationRejection;

/// Which map layer a feature belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum LayerKind {
    /// District boundary polygons.
    Boundaries,
    /// Campus point locations.
    Points,
}

impl LayerKind {
    /// Layers in draw order.
    pub const ALL: [Self; 2] = [Self::Boundaries, Self::Points];

    /// How the layer is drawn and whether it takes clicks.
    #[must_use]
    pub const fn style(self) -> LayerStyle {
        match self {
            Self::Boundaries => LayerStyle {
                color: None,
                interactive: true,
            },
            Self::Points => LayerStyle {
                color: Some("#FFD700"),
                interactive: false,
            },
        }
    }
}

/// Drawing hints for a layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerStyle {
    /// Stroke/fill color override; `None` uses the map's default.
    pub color: Option<&'static str>,
    /// Whether clicks on this layer select an entity.
    pub interactive: bool,
}

/// Initial map camera and tile source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapViewport {
    /// Center as `(latitude, longitude)`.
    pub center: (f64, f64),
    /// Zoom level.
    pub zoom: u8,
    /// Raster tile URL template.
    pub tile_url: &'static str,
}

/// Centered on Texas.
pub const DEFAULT_VIEWPORT: MapViewport = MapViewport {
    center: (31.9686, -99.9018),
    zoom: 6,
    tile_url: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png",
};

/// The two map layers, each loaded at most once.
#[derive(Debug, Clone, Default)]
pub struct GeoLayerManager {
    boundaries: Option<FeatureCollection>,
    points: Option<FeatureCollection>,
}

impl GeoLayerManager {
    /// Fetches both layers concurrently. A failed layer is logged and left
    /// absent; there is no retry.
    pub async fn load(service: &dyn DataService) -> Self {
        let (boundaries, points) =
            futures::future::join(service.district_boundaries(), service.campus_points()).await;

        let boundaries = match boundaries {
            Ok(collection) => {
                log::info!("Loaded {} district boundaries", collection.features.len());
                Some(collection)
            }
            Err(e) => {
                log::error!("Failed to load district boundaries: {e}");
                None
            }
        };

        let points = match points {
            Ok(collection) => {
                log::info!("Loaded {} campus points", collection.features.len());
                Some(collection)
            }
            Err(e) => {
                log::error!("Failed to load campus points: {e}");
                None
            }
        };

        Self { boundaries, points }
    }

    /// Builds a manager from already-loaded layers.
    #[must_use]
    pub const fn from_layers(
        boundaries: Option<FeatureCollection>,
        points: Option<FeatureCollection>,
    ) -> Self {
        Self { boundaries, points }
    }

    /// District boundary polygons, if loaded.
    #[must_use]
    pub const fn boundaries(&self) -> Option<&FeatureCollection> {
        self.boundaries.as_ref()
    }

    /// Campus point locations, if loaded.
    #[must_use]
    pub const fn points(&self) -> Option<&FeatureCollection> {
        self.points.as_ref()
    }

    /// The collection for `layer`, if loaded.
    #[must_use]
    pub const fn layer(&self, layer: LayerKind) -> Option<&FeatureCollection> {
        match layer {
            LayerKind::Boundaries => self.boundaries(),
            LayerKind::Points => self.points(),
        }
    }

    /// Loaded layers in draw order.
    pub fn layers(&self) -> impl Iterator<Item = (LayerKind, &FeatureCollection)> {
        LayerKind::ALL
            .into_iter()
            .filter_map(|kind| self.layer(kind).map(|collection| (kind, collection)))
    }

    /// Extracts the [`EntityRef`] a boundary feature stands for.
    ///
    /// The `id` property may be a string or a number. A missing `name`
    /// falls back to the id.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationRejection::MissingId`] if the feature has no
    /// non-empty `id` property.
    pub fn resolve_click(feature: &Feature) -> Result<EntityRef, ValidationRejection> {
        let id = match feature.property("id") {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => return Err(ValidationRejection::MissingId),
        };

        let name = feature
            .property("name")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| id.clone(), ToString::to_string);

        Ok(EntityRef {
            id: EntityId::new(id),
            name,
        })
    }

    /// Turns a click on `layer` into a selection request, or `None` if the
    /// click is not actionable.
    #[must_use]
    pub fn handle_click(&self, layer: LayerKind, feature: &Feature) -> Option<EntityRef> {
        if !layer.style().interactive {
            log::debug!(
                "Ignoring click: {}",
                ValidationRejection::NonInteractiveLayer { layer }
            );
            return None;
        }

        match Self::resolve_click(feature) {
            Ok(entity) => Some(entity),
            Err(rejection) => {
                log::debug!("Ignoring click on {layer}: {rejection}");
                None
            }
        }
    }
}
