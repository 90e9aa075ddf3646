use clap::Parser;
use floodcheck::utils::{logger, validation::Validate};
use floodcheck::{server, CliConfig, GeoJsClient, HazardService, LocalStorage};
use std::net::SocketAddr;
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_cli_logger(cli.verbose);

    tracing::info!("Starting floodcheck server");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let runtime = match cli.resolve() {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!("Configuration error: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = runtime.settings.validate() {
        tracing::error!("Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    let storage = LocalStorage::new(runtime.settings.data_dir.clone());
    let geolocator = Arc::new(GeoJsClient::new(
        runtime.settings.geolocation_endpoint.clone(),
    ));
    let service = Arc::new(HazardService::new(storage, runtime.settings, geolocator));

    // Warm the dataset in the background. A failure here is survivable:
    // the first lookup request retries the download and load.
    let warm_service = service.clone();
    tokio::spawn(async move {
        match warm_service.warm_up().await {
            Ok(zones) => tracing::info!("✅ Dataset ready with {} hazard zones", zones),
            Err(e) => tracing::warn!("Dataset warm-up failed, will retry on request: {}", e),
        }
    });

    let app = server::router(service);
    let addr = format!("{}:{}", runtime.host, runtime.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
