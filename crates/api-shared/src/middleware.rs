//! Problem details middleware.
//!
//! The HTTP-facing half of error translation. It asks a [`ProblemDetailsConfig`] what to do
//! with an error and writes the answer through a [`ProblemResponse`], so the logic is
//! independent of the web framework.

use crate::problem_details::ProblemDetails;
use crate::problem_details_config::{ProblemDetailsConfig, ProblemRequest, Resolution};
use patients_core::{DomainError, NotFoundException};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Response side of the middleware.
pub trait ProblemResponse {
    /// Whether a response has already been committed.
    fn headers_sent(&self) -> bool;

    /// Writes `problem` as the body with `status`.
    fn send_problem(&mut self, status: u16, problem: &ProblemDetails);
}

/// What the middleware did with an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposition {
    /// A problem details response was written with this status.
    Responded(u16),
    /// Nothing was written. Downstream handling owns the error.
    Forwarded,
}

#[derive(Clone, Debug)]
pub struct ProblemDetailsMiddleware {
    config: Arc<ProblemDetailsConfig>,
}

impl ProblemDetailsMiddleware {
    pub fn new(config: Arc<ProblemDetailsConfig>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ProblemDetailsConfig {
        &self.config
    }

    /// Handles an error that escaped a request handler.
    ///
    /// Does nothing if a response is already committed, or if the registry says to ignore or
    /// rethrow. A panic while resolving is logged and the error is forwarded.
    pub fn handle_error<R>(
        &self,
        error: &DomainError,
        request: &ProblemRequest,
        response: &mut R,
    ) -> Disposition
    where
        R: ProblemResponse + ?Sized,
    {
        if response.headers_sent() {
            return Disposition::Forwarded;
        }

        let problem = match self.resolve(error, request) {
            Some(Resolution::Problem(problem)) => problem,
            Some(Resolution::Ignore | Resolution::Rethrow) | None => {
                return Disposition::Forwarded
            }
        };

        let status = problem.status;
        tracing::error!(
            error = %error,
            name = error.name(),
            path = %request.path,
            method = %request.method,
            status,
            "request error"
        );
        response.send_problem(status, &problem);
        Disposition::Responded(status)
    }

    /// Handles a request no route matched. Always responds 404 unless the registry ignores
    /// not-found errors.
    pub fn handle_not_found<R>(&self, request: &ProblemRequest, response: &mut R) -> Disposition
    where
        R: ProblemResponse + ?Sized,
    {
        if response.headers_sent() {
            return Disposition::Forwarded;
        }

        let error = DomainError::from(NotFoundException::with_message(format!(
            "Route '{}' not found",
            request.path
        )));

        let Some(Resolution::Problem(problem)) = self.resolve(&error, request) else {
            return Disposition::Forwarded;
        };

        tracing::warn!(
            path = %request.path,
            method = %request.method,
            status = 404,
            "route not found"
        );
        response.send_problem(404, &problem);
        Disposition::Responded(404)
    }

    fn resolve(&self, error: &DomainError, request: &ProblemRequest) -> Option<Resolution> {
        match catch_unwind(AssertUnwindSafe(|| self.config.resolve(request, error))) {
            Ok(resolution) => Some(resolution),
            Err(panic) => {
                tracing::error!(
                    panic = panic_message(panic.as_ref()),
                    error = %error,
                    "error in problem details middleware"
                );
                None
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&'static str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem_details_config::ErrorMatcher;
    use patients_core::{ErrorKind, ValidationException};

    #[derive(Default)]
    struct RecordingResponse {
        sent: Option<(u16, ProblemDetails)>,
        committed: bool,
    }

    impl ProblemResponse for RecordingResponse {
        fn headers_sent(&self) -> bool {
            self.committed || self.sent.is_some()
        }

        fn send_problem(&mut self, status: u16, problem: &ProblemDetails) {
            self.sent = Some((status, problem.clone()));
        }
    }

    fn middleware(config: ProblemDetailsConfig) -> ProblemDetailsMiddleware {
        ProblemDetailsMiddleware::new(Arc::new(config))
    }

    fn request(path: &str) -> ProblemRequest {
        ProblemRequest::new("GET", path)
    }

    #[test]
    fn writes_resolved_problem() {
        let mw = middleware(ProblemDetailsConfig::default());
        let mut response = RecordingResponse::default();
        let error = DomainError::from(ValidationException::from_field_and_message(
            "Lifespan",
            "Age cannot be more than 120 years.",
        ));

        let disposition = mw.handle_error(&error, &request("/api/patients"), &mut response);

        assert_eq!(disposition, Disposition::Responded(422));
        let (status, problem) = response.sent.expect("problem written");
        assert_eq!(status, 422);
        assert_eq!(problem.instance, "/api/patients");
    }

    #[test]
    fn committed_response_is_left_alone() {
        let mw = middleware(ProblemDetailsConfig::default());
        let mut response = RecordingResponse {
            committed: true,
            ..Default::default()
        };
        let error = DomainError::unclassified("late failure");

        assert_eq!(
            mw.handle_error(&error, &request("/x"), &mut response),
            Disposition::Forwarded
        );
        assert!(response.sent.is_none());
    }

    #[test]
    fn ignored_and_rethrown_errors_are_forwarded() {
        let mw = middleware(
            ProblemDetailsConfig::builder()
                .ignore(ErrorKind::ForbiddenAccess)
                .rethrow(ErrorKind::InvalidType)
                .build(),
        );
        let mut response = RecordingResponse::default();

        let forbidden = DomainError::from(patients_core::ForbiddenAccessException::new());
        assert_eq!(
            mw.handle_error(&forbidden, &request("/x"), &mut response),
            Disposition::Forwarded
        );
        let invalid = DomainError::invalid_type("bad body");
        assert_eq!(
            mw.handle_error(&invalid, &request("/x"), &mut response),
            Disposition::Forwarded
        );
        assert!(response.sent.is_none());
    }

    #[test]
    fn panicking_mapper_is_contained() {
        let mw = middleware(
            ProblemDetailsConfig::builder()
                .map(ErrorMatcher::Any, |_, _| panic!("mapper exploded"))
                .build(),
        );
        let mut response = RecordingResponse::default();
        let error = DomainError::unclassified("boom");

        assert_eq!(
            mw.handle_error(&error, &request("/x"), &mut response),
            Disposition::Forwarded
        );
        assert!(response.sent.is_none());
    }

    #[test]
    fn not_found_route_mentions_path() {
        let mw = middleware(
            ProblemDetailsConfig::builder()
                .include_exception_details(false)
                .build(),
        );
        let mut response = RecordingResponse::default();

        let disposition = mw.handle_not_found(&request("/nope"), &mut response);

        assert_eq!(disposition, Disposition::Responded(404));
        let (status, problem) = response.sent.expect("problem written");
        assert_eq!(status, 404);
        assert_eq!(problem.detail, "Route '/nope' not found");
        assert_eq!(
            problem.type_uri,
            "https://tools.ietf.org/html/rfc7231#section-6.5.4"
        );
    }

    #[test]
    fn not_found_route_can_be_ignored() {
        let mw = middleware(
            ProblemDetailsConfig::builder()
                .ignore(ErrorKind::NotFound)
                .build(),
        );
        let mut response = RecordingResponse::default();
        assert_eq!(
            mw.handle_not_found(&request("/nope"), &mut response),
            Disposition::Forwarded
        );
    }
}
