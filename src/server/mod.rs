pub mod routes;

use crate::core::index::HazardIndex;
use crate::core::service::HazardService;
use crate::core::{ConfigProvider, HazardReport, Storage};
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

pub const NO_DATA_MESSAGE: &str = "No flood hazard data for this location";
pub const UNLOCATED_MESSAGE: &str = "Could not determine flood hazard for your location";

/// Wire format of `/check_flood_hazard`, kept stable for the page script.
#[derive(Debug, Serialize)]
pub struct CheckResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub hazard: String,
    pub map_available: bool,
}

impl CheckResponse {
    pub fn from_report(report: &HazardReport) -> Self {
        if report.located() {
            Self {
                error: None,
                hazard: report
                    .hazard
                    .clone()
                    .unwrap_or_else(|| NO_DATA_MESSAGE.to_string()),
                map_available: report.map_available,
            }
        } else {
            Self {
                error: Some(UNLOCATED_MESSAGE.to_string()),
                hazard: "Unknown".to_string(),
                map_available: false,
            }
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub dataset_loaded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub loaded_at: Option<DateTime<Utc>>,
}

impl HealthResponse {
    pub fn from_index(index: Option<&HazardIndex>) -> Self {
        Self {
            status: "ok",
            dataset_loaded: index.is_some(),
            features: index.map(HazardIndex::len),
            loaded_at: index.map(HazardIndex::loaded_at),
        }
    }
}

/// First public address in an `X-Forwarded-For` value, if any.
pub fn forwarded_ip(header: Option<&str>) -> Option<IpAddr> {
    header.and_then(|raw| {
        raw.split(',')
            .filter_map(|part| part.trim().parse::<IpAddr>().ok())
            .find(|ip| is_public(*ip))
    })
}

/// Client address for geolocation: the forwarded header wins, then the
/// socket peer. Loopback and private ranges are useless to the
/// geolocation provider and resolve to `None` (self-lookup).
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<IpAddr> {
    forwarded_ip(
        headers
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok()),
    )
    .or_else(|| peer.map(|addr| addr.ip()).filter(|ip| is_public(*ip)))
}

fn is_public(ip: IpAddr) -> bool {
    match ip {
        IpAddr::V4(v4) => {
            !(v4.is_loopback()
                || v4.is_private()
                || v4.is_link_local()
                || v4.is_unspecified()
                || v4.is_broadcast())
        }
        IpAddr::V6(v6) => {
            !(v6.is_loopback()
                || v6.is_unspecified()
                || (v6.segments()[0] & 0xfe00) == 0xfc00
                || (v6.segments()[0] & 0xffc0) == 0xfe80)
        }
    }
}

pub fn router<S, C>(service: Arc<HazardService<S, C>>) -> Router
where
    S: Storage + 'static,
    C: ConfigProvider + 'static,
{
    Router::new()
        .route("/", get(routes::index))
        .route("/check_flood_hazard", get(routes::check_flood_hazard::<S, C>))
        .route("/map", get(routes::serve_map::<S, C>))
        .route("/health", get(routes::health::<S, C>))
        .with_state(service)
}
