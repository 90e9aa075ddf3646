use crate::utils::error::{FloodError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Optional TOML configuration file. Every field is optional; missing
/// values fall back to flags, environment, or built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    pub dataset: Option<DatasetSection>,
    pub geolocation: Option<GeolocationSection>,
    pub server: Option<ServerSection>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DatasetSection {
    pub url: Option<String>,
    pub dir: Option<String>,
    pub file: Option<String>,
    pub layer: Option<String>,
    pub hazard_column: Option<String>,
    pub map_image: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeolocationSection {
    pub endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerSection {
    pub host: Option<String>,
    pub port: Option<u16>,
}

impl FileConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| FloodError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    pub fn data_url(&self) -> Option<String> {
        self.dataset.as_ref().and_then(|d| d.url.clone())
    }

    pub fn data_dir(&self) -> Option<String> {
        self.dataset.as_ref().and_then(|d| d.dir.clone())
    }

    pub fn data_file(&self) -> Option<String> {
        self.dataset.as_ref().and_then(|d| d.file.clone())
    }

    pub fn layer(&self) -> Option<String> {
        self.dataset.as_ref().and_then(|d| d.layer.clone())
    }

    pub fn hazard_column(&self) -> Option<String> {
        self.dataset.as_ref().and_then(|d| d.hazard_column.clone())
    }

    pub fn map_image(&self) -> Option<String> {
        self.dataset.as_ref().and_then(|d| d.map_image.clone())
    }

    pub fn geolocation_endpoint(&self) -> Option<String> {
        self.geolocation.as_ref().and_then(|g| g.endpoint.clone())
    }

    pub fn host(&self) -> Option<String> {
        self.server.as_ref().and_then(|s| s.host.clone())
    }

    pub fn port(&self) -> Option<u16> {
        self.server.as_ref().and_then(|s| s.port)
    }
}

/// Expand `${VAR_NAME}` references from the process environment.
/// Unknown variables are left as-is so the TOML error points at them.
fn substitute_env_vars(content: &str) -> String {
    let re = regex::Regex::new(r"\$\{([^}]+)\}").expect("static pattern");
    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
    })
    .into_owned()
}
