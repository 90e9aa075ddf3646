use crate::domain::model::GeoLocation;
use crate::domain::ports::Geolocator;
use crate::utils::error::{FloodError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::net::IpAddr;
use std::time::Duration;

const LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the geojs.io IP geolocation API.
pub struct GeoJsClient {
    client: Client,
    base_url: String,
}

// geojs.io serves latitude/longitude as JSON strings; tolerate numbers too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CoordinateField {
    Number(f64),
    Text(String),
}

impl CoordinateField {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(raw) => raw.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GeoJsPayload {
    latitude: Option<CoordinateField>,
    longitude: Option<CoordinateField>,
    city: Option<String>,
    country: Option<String>,
}

impl GeoJsClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn lookup_url(&self, ip: Option<IpAddr>) -> String {
        match ip {
            Some(ip) => format!("{}/v1/ip/geo/{}.json", self.base_url, ip),
            // Without a usable client IP the provider geolocates the caller.
            None => format!("{}/v1/ip/geo.json", self.base_url),
        }
    }
}

#[async_trait]
impl Geolocator for GeoJsClient {
    async fn locate(&self, ip: Option<IpAddr>) -> Result<GeoLocation> {
        let url = self.lookup_url(ip);
        tracing::debug!("Geolocation request: {}", url);

        let response = self.client.get(&url).timeout(LOOKUP_TIMEOUT).send().await?;
        if !response.status().is_success() {
            return Err(FloodError::geolocation(format!(
                "geolocation service returned {}",
                response.status()
            )));
        }

        let payload: GeoJsPayload = response.json().await?;
        let latitude = payload.latitude.as_ref().and_then(CoordinateField::as_f64);
        let longitude = payload.longitude.as_ref().and_then(CoordinateField::as_f64);

        match (latitude, longitude) {
            (Some(latitude), Some(longitude)) => Ok(GeoLocation {
                latitude,
                longitude,
                city: payload.city,
                country: payload.country,
            }),
            _ => Err(FloodError::geolocation(
                "response did not include usable coordinates",
            )),
        }
    }
}
