pub mod env;
pub mod file;
pub mod storage;

use crate::core::ConfigProvider;
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_identifier, validate_non_empty_string, validate_path, validate_url, Validate,
};

pub use file::FileConfig;
pub use storage::LocalStorage;

pub const DEFAULT_DATA_FILE: &str = "revised_map_data.gpkg";
pub const DEFAULT_HAZARD_COLUMN: &str = "SOIL_FLOOD_HAZARD";
pub const DEFAULT_GEO_ENDPOINT: &str = "https://get.geojs.io";
pub const DEFAULT_PORT: u16 = 5000;

/// Fully-resolved runtime settings, shared by the CLI and serverless
/// surfaces once their respective sources (flags, TOML file, environment)
/// have been merged.
#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub data_url: String,
    pub data_dir: String,
    pub data_file: String,
    pub layer: Option<String>,
    pub hazard_column: String,
    pub geolocation_endpoint: String,
    pub map_image: Option<String>,
}

impl ConfigProvider for ServerSettings {
    fn data_url(&self) -> &str {
        &self.data_url
    }

    fn data_file(&self) -> &str {
        &self.data_file
    }

    fn layer(&self) -> Option<&str> {
        self.layer.as_deref()
    }

    fn hazard_column(&self) -> &str {
        &self.hazard_column
    }

    fn geolocation_endpoint(&self) -> &str {
        &self.geolocation_endpoint
    }

    fn map_image(&self) -> Option<&str> {
        self.map_image.as_deref()
    }
}

impl Validate for ServerSettings {
    fn validate(&self) -> Result<()> {
        validate_url("data_url", &self.data_url)?;
        validate_url("geolocation_endpoint", &self.geolocation_endpoint)?;
        validate_path("data_dir", &self.data_dir)?;
        validate_non_empty_string("data_file", &self.data_file)?;
        validate_identifier("hazard_column", &self.hazard_column)?;
        if let Some(layer) = &self.layer {
            validate_identifier("layer", layer)?;
        }
        if let Some(map_image) = &self.map_image {
            validate_path("map_image", map_image)?;
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }
}

#[cfg(feature = "cli")]
pub use cli::{CliConfig, RuntimeConfig};

#[cfg(feature = "cli")]
mod cli {
    use super::*;
    use crate::utils::error::FloodError;
    use clap::Parser;
    use std::path::PathBuf;

    /// Settings plus the listen address, which only the CLI surface needs.
    #[derive(Debug, Clone)]
    pub struct RuntimeConfig {
        pub settings: ServerSettings,
        pub host: String,
        pub port: u16,
    }

    #[derive(Debug, Clone, Parser)]
    #[command(name = "floodcheck")]
    #[command(about = "Flood hazard lookup service backed by a GeoPackage dataset")]
    pub struct CliConfig {
        /// Optional TOML configuration file; explicit flags win over it
        #[arg(long)]
        pub config: Option<PathBuf>,

        /// Download URL for the GeoPackage dataset
        #[arg(long, env = "DATA_URL")]
        pub data_url: Option<String>,

        /// Directory the dataset is cached in
        #[arg(long, env = "DATA_DIR")]
        pub data_dir: Option<String>,

        /// File name of the cached dataset
        #[arg(long)]
        pub data_file: Option<String>,

        /// Feature table to read; defaults to the first one in the dataset
        #[arg(long)]
        pub layer: Option<String>,

        /// Attribute column holding the hazard classification
        #[arg(long)]
        pub hazard_column: Option<String>,

        /// Base URL of the IP geolocation service
        #[arg(long, env = "GEO_ENDPOINT")]
        pub geo_endpoint: Option<String>,

        /// Pre-rendered overview map image served at /map
        #[arg(long)]
        pub map_image: Option<String>,

        #[arg(long)]
        pub host: Option<String>,

        #[arg(short, long, env = "PORT")]
        pub port: Option<u16>,

        #[arg(short, long, help = "Enable verbose output")]
        pub verbose: bool,
    }

    impl CliConfig {
        /// Merge flags with the optional config file and apply defaults.
        /// Precedence: explicit flag (or its env var) > file > default.
        pub fn resolve(self) -> Result<RuntimeConfig> {
            let file = match &self.config {
                Some(path) => FileConfig::from_file(path)?,
                None => FileConfig::default(),
            };

            let settings = ServerSettings {
                data_url: self
                    .data_url
                    .or_else(|| file.data_url())
                    .ok_or_else(|| FloodError::MissingConfigError {
                        field: "data_url".to_string(),
                    })?,
                data_dir: self
                    .data_dir
                    .or_else(|| file.data_dir())
                    .unwrap_or_else(|| ".".to_string()),
                data_file: self
                    .data_file
                    .or_else(|| file.data_file())
                    .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string()),
                layer: self.layer.or_else(|| file.layer()),
                hazard_column: self
                    .hazard_column
                    .or_else(|| file.hazard_column())
                    .unwrap_or_else(|| DEFAULT_HAZARD_COLUMN.to_string()),
                geolocation_endpoint: self
                    .geo_endpoint
                    .or_else(|| file.geolocation_endpoint())
                    .unwrap_or_else(|| DEFAULT_GEO_ENDPOINT.to_string()),
                map_image: self.map_image.or_else(|| file.map_image()),
            };

            Ok(RuntimeConfig {
                settings,
                host: self
                    .host
                    .or_else(|| file.host())
                    .unwrap_or_else(|| "0.0.0.0".to_string()),
                port: self.port.or_else(|| file.port()).unwrap_or(DEFAULT_PORT),
            })
        }
    }

}
