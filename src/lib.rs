pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod server;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::{CliConfig, RuntimeConfig};

pub use crate::adapters::GeoJsClient;
pub use crate::config::{FileConfig, LocalStorage, ServerSettings};
pub use crate::core::{dataset::DatasetManager, index::HazardIndex, service::HazardService};
pub use crate::utils::error::{FloodError, Result};
