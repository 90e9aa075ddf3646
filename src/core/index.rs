use crate::core::gpkg::GpkgDataset;
use crate::utils::error::{FloodError, Result};
use chrono::{DateTime, Utc};
use geo::{BoundingRect, Contains, Geometry, Point, Rect};
use std::path::Path;

struct HazardZone {
    geometry: Geometry<f64>,
    bbox: Rect<f64>,
    hazard: Option<String>,
}

impl HazardZone {
    fn covers(&self, point: Point<f64>) -> bool {
        let (x, y) = point.x_y();
        if x < self.bbox.min().x
            || x > self.bbox.max().x
            || y < self.bbox.min().y
            || y > self.bbox.max().y
        {
            return false;
        }
        self.geometry.contains(&point)
    }
}

/// In-memory snapshot of the hazard dataset: one zone per areal feature,
/// with a bounding-box prefilter in front of the exact containment test.
pub struct HazardIndex {
    zones: Vec<HazardZone>,
    loaded_at: DateTime<Utc>,
}

impl HazardIndex {
    /// Load a GeoPackage file into an index. The dataset must be in
    /// WGS 84 (EPSG:4326); an undefined SRS is accepted with a warning,
    /// anything else is rejected since no reprojection is performed.
    pub fn from_gpkg(path: &Path, layer: Option<&str>, hazard_column: &str) -> Result<Self> {
        let dataset = GpkgDataset::open(path)?;
        let layer = dataset.feature_layer(layer)?;

        match layer.srs_id {
            4326 => {}
            0 | -1 => tracing::warn!(
                "layer '{}' declares undefined SRS (id {}), assuming WGS 84",
                layer.table,
                layer.srs_id
            ),
            other => {
                return Err(FloodError::dataset(format!(
                    "layer '{}' uses SRS {} but only EPSG:4326 is supported",
                    layer.table, other
                )))
            }
        }

        let features = dataset.read_features(&layer, hazard_column)?;
        tracing::debug!(
            "Read {} features from layer '{}'",
            features.len(),
            layer.table
        );
        Ok(Self::from_features(features))
    }

    pub(crate) fn from_features(
        features: Vec<(Option<Geometry<f64>>, Option<String>)>,
    ) -> Self {
        let mut zones = Vec::new();
        for (geometry, hazard) in features {
            let Some(geometry) = geometry else {
                continue;
            };
            if !matches!(
                geometry,
                Geometry::Polygon(_) | Geometry::MultiPolygon(_)
            ) {
                tracing::warn!("Skipping non-areal feature in hazard layer");
                continue;
            }
            let Some(bbox) = geometry.bounding_rect() else {
                continue;
            };
            zones.push(HazardZone {
                geometry,
                bbox,
                hazard,
            });
        }

        Self {
            zones,
            loaded_at: Utc::now(),
        }
    }

    /// Hazard label of the first zone containing the point. `None` when
    /// the point falls outside every zone, or inside a zone whose label
    /// attribute is NULL.
    pub fn lookup(&self, point: Point<f64>) -> Option<&str> {
        self.zones
            .iter()
            .find(|zone| zone.covers(point))
            .and_then(|zone| zone.hazard.as_deref())
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
