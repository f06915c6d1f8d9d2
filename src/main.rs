use std::sync::Arc;

use api_rest::{AppState, RestConfig, app, telemetry};
use api_shared::ProblemDetailsMiddleware;
use patients_core::{InMemoryPatientRepository, PatientService};

/// Main entry point for the patients service
///
/// Resolves configuration once, then serves the REST API until Ctrl-C.
///
/// # Environment Variables
/// - `PATIENTS_REST_ADDR`: REST server address (default: "0.0.0.0:3448")
/// - `APP_ENV`: `production`/`prod`, `test`, or anything else for development
/// - `PROBLEM_DETAILS_INCLUDE_EXCEPTION_DETAILS`: override for debug exception details
/// - `PATIENTS_SEED`: add the demo patients on startup (default: true)
/// - `LOG_FORMAT`: `json` for JSON log lines
///
/// # Errors
/// Returns an error if:
/// - the configuration is invalid,
/// - the logging/tracing configuration cannot be initialised,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cfg = RestConfig::from_env()?;
    telemetry::init_tracing(cfg.log_format())?;

    let repository = Arc::new(InMemoryPatientRepository::new());
    if cfg.seed() {
        repository.seed()?;
    }

    let problem_details = Arc::new(ProblemDetailsMiddleware::new(Arc::new(
        cfg.problem_details_config(),
    )));
    let state = AppState::new(PatientService::new(repository), problem_details);

    tracing::info!(
        addr = %cfg.addr(),
        environment = %cfg.environment(),
        exception_details = cfg.include_exception_details(),
        "++ Starting patients REST API"
    );

    let listener = tokio::net::TcpListener::bind(cfg.addr()).await?;
    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- Patients REST API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
