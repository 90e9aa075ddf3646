use crate::core::service::HazardService;
use crate::core::{ConfigProvider, Storage};
use crate::server::{client_ip, CheckResponse, HealthResponse};
use axum::extract::{ConnectInfo, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use std::net::SocketAddr;
use std::sync::Arc;

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../templates/index.html"))
}

pub async fn check_flood_hazard<S, C>(
    State(service): State<Arc<HazardService<S, C>>>,
    connect: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
) -> Response
where
    S: Storage + 'static,
    C: ConfigProvider + 'static,
{
    let ip = client_ip(&headers, connect.map(|ConnectInfo(addr)| addr));
    tracing::info!("Checking flood hazard for IP: {:?}", ip);

    match service.check(ip).await {
        Ok(report) => Json(CheckResponse::from_report(&report)).into_response(),
        Err(e) => {
            tracing::error!("Hazard check failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

pub async fn serve_map<S, C>(State(service): State<Arc<HazardService<S, C>>>) -> Response
where
    S: Storage + 'static,
    C: ConfigProvider + 'static,
{
    match service.map_image().await {
        Ok(Some(bytes)) => ([(header::CONTENT_TYPE, "image/png")], bytes).into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Map not found").into_response(),
        Err(e) => {
            tracing::error!("Failed to read map image: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Map unavailable").into_response()
        }
    }
}

pub async fn health<S, C>(State(service): State<Arc<HazardService<S, C>>>) -> Response
where
    S: Storage + 'static,
    C: ConfigProvider + 'static,
{
    let index = service.dataset().cached();
    Json(HealthResponse::from_index(index.as_deref())).into_response()
}
