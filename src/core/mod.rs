pub mod dataset;
pub mod gpkg;
pub mod index;
pub mod service;

pub use crate::domain::model::{GeoLocation, HazardReport};
pub use crate::domain::ports::{ConfigProvider, Geolocator, Storage};
pub use crate::utils::error::Result;
