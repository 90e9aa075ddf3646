pub mod geojs;

pub use geojs::GeoJsClient;
