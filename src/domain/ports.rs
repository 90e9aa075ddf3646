use crate::domain::model::GeoLocation;
use crate::utils::error::Result;
use async_trait::async_trait;
use std::net::IpAddr;
use std::path::PathBuf;

/// Cache-file backend for the downloaded dataset. The dataset is parsed by
/// SQLite, which needs a real filesystem path, so the port resolves names
/// to paths instead of streaming reads.
pub trait Storage: Send + Sync {
    fn contains(&self, name: &str) -> impl std::future::Future<Output = Result<bool>> + Send;
    fn write_file(
        &self,
        name: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
    fn resolve(&self, name: &str) -> PathBuf;
}

pub trait ConfigProvider: Send + Sync {
    fn data_url(&self) -> &str;
    fn data_file(&self) -> &str;
    fn layer(&self) -> Option<&str>;
    fn hazard_column(&self) -> &str;
    fn geolocation_endpoint(&self) -> &str;
    fn map_image(&self) -> Option<&str>;
}

/// Maps a client IP to coordinates. `ip == None` asks the provider to
/// geolocate the caller itself (used when no public client IP is known).
#[async_trait]
pub trait Geolocator: Send + Sync {
    async fn locate(&self, ip: Option<IpAddr>) -> Result<GeoLocation>;
}
