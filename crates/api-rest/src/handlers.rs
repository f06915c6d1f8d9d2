//! REST handlers. Each one is a thin shim over [`patients_core::PatientService`].

use crate::error::{ApiJson, ApiResult};
use crate::{ApiDoc, AppState};
use api_shared::dto::{PatientDto, PatientForCreationDto, PatientForUpdateDto};
use api_shared::{HealthRes, HealthService};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use utoipa::OpenApi;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub async fn health() -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/patients",
    responses(
        (status = 200, description = "All patients", body = [PatientDto]),
        (status = 500, description = "Internal server error", content_type = "application/problem+json")
    )
)]
#[axum::debug_handler]
pub async fn list_patients(State(state): State<AppState>) -> ApiResult<Json<Vec<PatientDto>>> {
    let patients = state.patients.list_patients()?;
    Ok(Json(patients.iter().map(PatientDto::from).collect()))
}

#[utoipa::path(
    get,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient UUID")),
    responses(
        (status = 200, description = "The patient", body = PatientDto),
        (status = 404, description = "No patient with that id", content_type = "application/problem+json")
    )
)]
#[axum::debug_handler]
pub async fn get_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<PatientDto>> {
    let patient = state.patients.get_patient(&id)?;
    Ok(Json(PatientDto::from(&patient)))
}

#[utoipa::path(
    post,
    path = "/api/patients",
    request_body = PatientForCreationDto,
    responses(
        (status = 201, description = "Patient created", body = PatientDto),
        (status = 400, description = "Malformed body", content_type = "application/problem+json"),
        (status = 422, description = "Validation failed", content_type = "application/problem+json")
    )
)]
/// Create a new patient record
///
/// # Errors
/// Returns `422 Unprocessable Entity` with per-field `errors` if:
/// - a name is missing or blank,
/// - the known age is outside 0 to 120,
/// - the date of birth is not in the past.
#[axum::debug_handler]
pub async fn create_patient(
    State(state): State<AppState>,
    ApiJson(dto): ApiJson<PatientForCreationDto>,
) -> ApiResult<(StatusCode, Json<PatientDto>)> {
    let patient = state.patients.create_patient(dto.into())?;
    Ok((StatusCode::CREATED, Json(PatientDto::from(&patient))))
}

#[utoipa::path(
    put,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient UUID")),
    request_body = PatientForUpdateDto,
    responses(
        (status = 200, description = "Patient updated", body = PatientDto),
        (status = 404, description = "No patient with that id", content_type = "application/problem+json"),
        (status = 422, description = "Validation failed", content_type = "application/problem+json")
    )
)]
#[axum::debug_handler]
pub async fn update_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(dto): ApiJson<PatientForUpdateDto>,
) -> ApiResult<Json<PatientDto>> {
    let patient = state.patients.update_patient(&id, dto.into())?;
    Ok(Json(PatientDto::from(&patient)))
}

#[utoipa::path(
    delete,
    path = "/api/patients/{id}",
    params(("id" = String, Path, description = "Patient UUID")),
    responses(
        (status = 204, description = "Patient deleted"),
        (status = 404, description = "No patient with that id", content_type = "application/problem+json")
    )
)]
#[axum::debug_handler]
pub async fn delete_patient(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.patients.delete_patient(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Serves the OpenAPI document.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
