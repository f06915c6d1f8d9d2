//! # API REST
//!
//! REST API implementation for the patients service.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI documentation
//! - translating domain errors into problem details responses
//!
//! Uses `api-shared` for DTOs, the problem details registry and the middleware logic.

#![warn(rust_2018_idioms)]

pub mod config;
pub mod error;
pub mod handlers;
pub mod problem_details;
pub mod telemetry;

use api_shared::dto::{PatientDto, PatientForCreationDto, PatientForUpdateDto};
use api_shared::{HealthRes, ProblemDetailsMiddleware};
use axum::extract::FromRef;
use axum::routing::get;
use axum::Router;
use patients_core::PatientService;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub use config::{ConfigError, LogFormat, RestConfig};
pub use error::{ApiError, ApiJson, ApiResult};

/// Application state for the REST API server
///
/// Shared by every handler. Cloning is cheap.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub patients: PatientService,
    pub problem_details: Arc<ProblemDetailsMiddleware>,
}

impl AppState {
    pub fn new(patients: PatientService, problem_details: Arc<ProblemDetailsMiddleware>) -> Self {
        Self {
            patients,
            problem_details,
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health,
        handlers::list_patients,
        handlers::get_patient,
        handlers::create_patient,
        handlers::update_patient,
        handlers::delete_patient,
    ),
    components(schemas(HealthRes, PatientDto, PatientForCreationDto, PatientForUpdateDto))
)]
pub struct ApiDoc;

/// Builds the REST router.
///
/// Unmatched routes get a problem details 404, and handler errors are translated by the
/// problem details layer.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/patients",
            get(handlers::list_patients).post(handlers::create_patient),
        )
        .route(
            "/api/patients/:id",
            get(handlers::get_patient)
                .put(handlers::update_patient)
                .delete(handlers::delete_patient),
        )
        .route("/api-docs/openapi.json", get(handlers::openapi_json))
        .fallback(problem_details::not_found)
        .layer(axum::middleware::from_fn_with_state(
            state.problem_details.clone(),
            problem_details::problem_details_layer,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
