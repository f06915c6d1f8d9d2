//! Handler error type.
//!
//! Handlers return [`ApiError`]. Turning one into a response yields a bare 500 and parks the
//! domain error in the response extensions, where the problem details layer picks it up and
//! replaces the response. If that layer forwards the error, the bare 500 is what the client
//! sees.

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use patients_core::DomainError;
use std::sync::Arc;

#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl ApiError {
    pub fn into_inner(self) -> DomainError {
        self.0
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self(error)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(DomainError::invalid_type(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response =
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
        response.extensions_mut().insert(Arc::new(self.0));
        response
    }
}

/// `axum::Json` whose rejections become [`DomainError::InvalidType`].
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

pub type ApiResult<T> = std::result::Result<T, ApiError>;
