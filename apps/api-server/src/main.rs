//! # Blogify Server
//!
//! Server-rendered blogging platform on actix-web.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

#[cfg(feature = "scheduler")]
mod background;
mod config;
mod handlers;
mod middleware;
mod observability;
mod state;
mod telemetry;
mod views;

use config::AppConfig;
use middleware::auth::CheckAuthentication;
use observability::RequestIdMiddleware;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    init_telemetry(&TelemetryConfig {
        json_logs: config.json_logs,
        ..TelemetryConfig::default()
    });
    config.log_warnings();

    tracing::info!(host = %config.host, port = config.port, "Starting Blogify server");

    let state = AppState::new(&config).await.map_err(|e| {
        tracing::error!(error = ?e, "Failed to load templates");
        std::io::Error::other(e.to_string())
    })?;

    #[cfg(feature = "scheduler")]
    let scheduler = start_scheduler(&config, &state).await;

    let bind = (config.host.clone(), config.port);
    let result = HttpServer::new(move || {
        App::new()
            .wrap(CheckAuthentication::new(
                state.tokens.clone(),
                &state.site.session_cookie,
            ))
            .wrap(RequestIdMiddleware)
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(state.clone()))
            .app_data(handlers::multipart_config())
            .app_data(handlers::json_config())
            .configure(handlers::configure_routes)
    })
    .bind(bind)?
    .run()
    .await;

    #[cfg(feature = "scheduler")]
    if let Some(mut scheduler) = scheduler {
        if let Err(e) = scheduler.shutdown().await {
            tracing::warn!(error = %e, "Scheduler did not stop cleanly");
        }
    }

    result
}

/// Register the view-record sweep. A scheduler failure is logged, never fatal.
#[cfg(feature = "scheduler")]
async fn start_scheduler(config: &AppConfig, state: &AppState) -> Option<background::Scheduler> {
    use blogify_core::domain::ViewRecord;

    let started = async {
        let scheduler = background::Scheduler::new(background::SchedulerConfig {
            enabled: config.scheduler_enabled,
        })
        .await?;
        scheduler
            .add_view_purge(state.views.clone(), ViewRecord::default_window())
            .await?;
        scheduler.start().await?;
        Ok::<_, tokio_cron_scheduler::JobSchedulerError>(scheduler)
    }
    .await;

    match started {
        Ok(scheduler) => Some(scheduler),
        Err(e) => {
            tracing::error!(error = %e, "Scheduler failed to start; expired view records are only purged on claim");
            None
        }
    }
}
