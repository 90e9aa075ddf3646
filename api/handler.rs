use floodcheck::config::LocalStorage;
use floodcheck::server::{forwarded_ip, CheckResponse, HealthResponse};
use floodcheck::utils::{logger, validation::Validate};
use floodcheck::{GeoJsClient, HazardService, ServerSettings};
use std::sync::Arc;
use tokio::sync::OnceCell;
use vercel_runtime::{run, Body, Error, Request, Response, StatusCode};

// One service per function instance; warm invocations reuse the dataset
// cached in /tmp and the in-memory index.
static SERVICE: OnceCell<HazardService<LocalStorage, ServerSettings>> = OnceCell::const_new();

async fn service() -> floodcheck::Result<&'static HazardService<LocalStorage, ServerSettings>> {
    SERVICE
        .get_or_try_init(|| async {
            let settings = ServerSettings::from_env()?;
            settings.validate()?;

            let storage = LocalStorage::new(settings.data_dir.clone());
            let geolocator = Arc::new(GeoJsClient::new(settings.geolocation_endpoint.clone()));
            Ok(HazardService::new(storage, settings, geolocator))
        })
        .await
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    logger::init_serverless_logger();
    run(handler).await
}

pub async fn handler(req: Request) -> Result<Response<Body>, Error> {
    match req.uri().path() {
        "/" | "/index.html" => html_response(include_str!("../templates/index.html")),
        "/check_flood_hazard" => check_flood_hazard(&req).await,
        "/map" => serve_map().await,
        "/health" => health().await,
        _ => text_response(StatusCode::NOT_FOUND, "Not found"),
    }
}

async fn check_flood_hazard(req: &Request) -> Result<Response<Body>, Error> {
    let service = service().await?;
    let ip = forwarded_ip(
        req.headers()
            .get("x-forwarded-for")
            .and_then(|value| value.to_str().ok()),
    );
    tracing::info!("Checking flood hazard for IP: {:?}", ip);

    match service.check(ip).await {
        Ok(report) => json_response(StatusCode::OK, &CheckResponse::from_report(&report)),
        Err(e) => {
            tracing::error!("Hazard check failed: {}", e);
            json_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                &serde_json::json!({ "error": e.to_string() }),
            )
        }
    }
}

async fn serve_map() -> Result<Response<Body>, Error> {
    let service = service().await?;
    match service.map_image().await? {
        Some(bytes) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "image/png")
            .body(Body::Binary(bytes))?),
        None => text_response(StatusCode::NOT_FOUND, "Map not found"),
    }
}

async fn health() -> Result<Response<Body>, Error> {
    let service = service().await?;
    let index = service.dataset().cached();
    json_response(StatusCode::OK, &HealthResponse::from_index(index.as_deref()))
}

fn html_response(html: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::OK)
        .header("Content-Type", "text/html; charset=utf-8")
        .body(Body::Text(html.to_string()))?)
}

fn text_response(status: StatusCode, text: &str) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "text/plain; charset=utf-8")
        .body(Body::Text(text.to_string()))?)
}

fn json_response<T: serde::Serialize>(
    status: StatusCode,
    body: &T,
) -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .body(Body::Text(serde_json::to_string(body)?))?)
}
