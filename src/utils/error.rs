use thiserror::Error;

#[derive(Error, Debug)]
pub enum FloodError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("GeoPackage error: {0}")]
    GpkgError(#[from] rusqlite::Error),

    #[error("Geometry decoding failed: {0}")]
    GeometryError(#[from] geozero::error::GeozeroError),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Dataset error: {message}")]
    DatasetError { message: String },

    #[error("Geolocation failed: {message}")]
    GeolocationError { message: String },
}

impl FloodError {
    pub fn dataset(message: impl Into<String>) -> Self {
        Self::DatasetError {
            message: message.into(),
        }
    }

    pub fn geolocation(message: impl Into<String>) -> Self {
        Self::GeolocationError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FloodError>;
