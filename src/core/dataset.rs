use crate::core::index::HazardIndex;
use crate::core::{ConfigProvider, Storage};
use crate::utils::error::{FloodError, Result};
use reqwest::Client;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Owns the dataset lifecycle: download the GeoPackage into the cache on
/// first use, parse it, and keep the parsed index in memory. A failed
/// download or parse is not cached, so the next request retries.
pub struct DatasetManager<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: Client,
    index: OnceCell<Arc<HazardIndex>>,
}

impl<S: Storage, C: ConfigProvider> DatasetManager<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            client: Client::new(),
            index: OnceCell::new(),
        }
    }

    /// The in-memory index, loading the dataset on first call.
    pub async fn ensure_loaded(&self) -> Result<Arc<HazardIndex>> {
        self.index
            .get_or_try_init(|| async {
                let path = self.ensure_cached().await?;
                let layer = self.config.layer().map(str::to_string);
                let hazard_column = self.config.hazard_column().to_string();

                tracing::info!("Loading hazard dataset from {}", path.display());
                let index = tokio::task::spawn_blocking(move || {
                    HazardIndex::from_gpkg(&path, layer.as_deref(), &hazard_column)
                })
                .await
                .map_err(|e| FloodError::dataset(format!("dataset load task failed: {}", e)))??;

                tracing::info!("Hazard dataset loaded with {} zones", index.len());
                Ok(Arc::new(index))
            })
            .await
            .map(Arc::clone)
    }

    /// The index if it has already been loaded; never triggers a load.
    pub fn cached(&self) -> Option<Arc<HazardIndex>> {
        self.index.get().cloned()
    }

    async fn ensure_cached(&self) -> Result<PathBuf> {
        let name = self.config.data_file();
        if self.storage.contains(name).await? {
            tracing::debug!("Dataset file '{}' already cached", name);
        } else {
            self.download(name).await?;
        }
        Ok(self.storage.resolve(name))
    }

    async fn download(&self, name: &str) -> Result<()> {
        let url = self.config.data_url();
        tracing::info!("Downloading dataset from {}", url);

        let response = self
            .client
            .get(url)
            .timeout(DOWNLOAD_TIMEOUT)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FloodError::dataset(format!(
                "dataset download returned {}",
                response.status()
            )));
        }

        let body = response.bytes().await?;
        tracing::info!("Downloaded {} bytes", body.len());
        self.storage.write_file(name, &body).await?;
        Ok(())
    }
}
