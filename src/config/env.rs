use crate::config::{
    ServerSettings, DEFAULT_DATA_FILE, DEFAULT_GEO_ENDPOINT, DEFAULT_HAZARD_COLUMN,
};
use crate::utils::error::{FloodError, Result};
use std::env;

impl ServerSettings {
    /// Configuration for the serverless surface, read purely from the
    /// environment. `/tmp` is the only writable path on the platform, so
    /// it is the default cache directory.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            data_url: env::var("DATA_URL").map_err(|_| FloodError::MissingConfigError {
                field: "DATA_URL".to_string(),
            })?,
            data_dir: env::var("DATA_DIR").unwrap_or_else(|_| "/tmp".to_string()),
            data_file: env::var("DATA_FILE").unwrap_or_else(|_| DEFAULT_DATA_FILE.to_string()),
            layer: env::var("DATA_LAYER").ok(),
            hazard_column: env::var("HAZARD_COLUMN")
                .unwrap_or_else(|_| DEFAULT_HAZARD_COLUMN.to_string()),
            geolocation_endpoint: env::var("GEO_ENDPOINT")
                .unwrap_or_else(|_| DEFAULT_GEO_ENDPOINT.to_string()),
            map_image: env::var("MAP_IMAGE").ok(),
        })
    }
}
