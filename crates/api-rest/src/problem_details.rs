//! axum adapter for [`ProblemDetailsMiddleware`].

use api_shared::{
    Disposition, ProblemDetails, ProblemDetailsMiddleware, ProblemRequest, ProblemResponse,
    APPLICATION_PROBLEM_JSON,
};
use axum::extract::{Request, State};
use axum::http::{header, HeaderValue, Method, StatusCode, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use patients_core::DomainError;
use std::sync::Arc;

/// Collects at most one problem response.
#[derive(Default)]
struct ProblemWriter {
    response: Option<Response>,
}

impl ProblemResponse for ProblemWriter {
    fn headers_sent(&self) -> bool {
        self.response.is_some()
    }

    fn send_problem(&mut self, status: u16, problem: &ProblemDetails) {
        self.response = Some(problem_response(status, problem));
    }
}

/// Serialises `problem` as an `application/problem+json` response.
pub fn problem_response(status: u16, problem: &ProblemDetails) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    match serde_json::to_vec(problem) {
        Ok(body) => (
            status,
            [(
                header::CONTENT_TYPE,
                HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
            )],
            body,
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "failed to serialise problem details");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

/// Replaces responses that carry a [`DomainError`] with a problem details response.
///
/// Install with `axum::middleware::from_fn_with_state`.
pub async fn problem_details_layer(
    State(middleware): State<Arc<ProblemDetailsMiddleware>>,
    request: Request,
    next: Next,
) -> Response {
    let problem_request = ProblemRequest::new(request.method().as_str(), request.uri().path());

    let mut response = next.run(request).await;
    let Some(error) = response.extensions_mut().remove::<Arc<DomainError>>() else {
        return response;
    };

    let mut writer = ProblemWriter::default();
    match middleware.handle_error(&error, &problem_request, &mut writer) {
        Disposition::Responded(_) => writer.response.unwrap_or(response),
        Disposition::Forwarded => response,
    }
}

/// Router fallback for requests no route matched.
pub async fn not_found(
    State(middleware): State<Arc<ProblemDetailsMiddleware>>,
    method: Method,
    uri: Uri,
) -> Response {
    let problem_request = ProblemRequest::new(method.as_str(), uri.path());
    let mut writer = ProblemWriter::default();

    match middleware.handle_not_found(&problem_request, &mut writer) {
        Disposition::Responded(_) => writer
            .response
            .unwrap_or_else(|| StatusCode::NOT_FOUND.into_response()),
        Disposition::Forwarded => StatusCode::NOT_FOUND.into_response(),
    }
}
