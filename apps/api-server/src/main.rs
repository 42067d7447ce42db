//! # Quill API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

use api_server::telemetry::init_telemetry;
use api_server::{AppConfig, AppState, background, handlers};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    init_telemetry(&config.telemetry);

    tracing::info!(
        "Starting Quill API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(&config).await?;

    // Catch up on anything orphaned while the server was down.
    background::reconcile(state.reconciliation.clone()).await;

    #[cfg(feature = "scheduler")]
    let mut scheduler = {
        let scheduler = background::Scheduler::new(config.scheduler.clone()).await?;
        if config.scheduler.enabled {
            background::schedule_reconciliation(&scheduler, state.reconciliation.clone()).await?;
        }
        scheduler.start().await?;
        scheduler
    };

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .configure(handlers::configure_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;

    #[cfg(feature = "scheduler")]
    scheduler.shutdown().await?;

    Ok(())
}
