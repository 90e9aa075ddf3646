use crate::core::dataset::DatasetManager;
use crate::core::{ConfigProvider, Geolocator, HazardReport, Storage};
use crate::utils::error::Result;
use geo::Point;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::Arc;

/// Application service behind every HTTP surface: geolocate the client,
/// make sure the dataset is loaded, run the point lookup.
pub struct HazardService<S: Storage, C: ConfigProvider> {
    dataset: DatasetManager<S, C>,
    geolocator: Arc<dyn Geolocator>,
    map_image: Option<PathBuf>,
}

impl<S: Storage, C: ConfigProvider> HazardService<S, C> {
    pub fn new(storage: S, config: C, geolocator: Arc<dyn Geolocator>) -> Self {
        let map_image = config.map_image().map(PathBuf::from);
        Self {
            dataset: DatasetManager::new(storage, config),
            geolocator,
            map_image,
        }
    }

    /// Force the dataset into memory, returning the zone count. Used at
    /// startup so the first request does not pay the full cold-start cost.
    pub async fn warm_up(&self) -> Result<usize> {
        self.dataset.ensure_loaded().await.map(|index| index.len())
    }

    /// Check the flood hazard for a client. A geolocation failure yields
    /// an unlocated report rather than an error; a dataset failure is a
    /// hard error.
    pub async fn check(&self, ip: Option<IpAddr>) -> Result<HazardReport> {
        let location = match self.geolocator.locate(ip).await {
            Ok(location) => location,
            Err(e) => {
                tracing::warn!("Failed to geolocate client: {}", e);
                return Ok(HazardReport::unlocated());
            }
        };

        let index = self.dataset.ensure_loaded().await?;
        // WKB and geo points are (x, y) = (lon, lat).
        let point = Point::new(location.longitude, location.latitude);
        let hazard = index.lookup(point).map(str::to_string);

        tracing::debug!(
            "Lookup at ({}, {}) -> {:?}",
            location.longitude,
            location.latitude,
            hazard
        );

        Ok(HazardReport {
            location: Some(location),
            hazard,
            map_available: self.map_available(),
        })
    }

    pub fn map_available(&self) -> bool {
        self.map_image
            .as_deref()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Bytes of the configured overview map image, if any.
    pub async fn map_image(&self) -> Result<Option<Vec<u8>>> {
        match &self.map_image {
            Some(path) if path.exists() => Ok(Some(tokio::fs::read(path).await?)),
            _ => Ok(None),
        }
    }

    pub fn dataset(&self) -> &DatasetManager<S, C> {
        &self.dataset
    }
}
