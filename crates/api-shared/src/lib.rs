//! # API Shared
//!
//! Shared utilities and definitions for the patients APIs.
//!
//! Contains:
//! - RFC 7807 problem details payloads and the status tables behind them
//! - `ProblemDetailsConfig`, the ordered error → problem registry
//! - `ProblemDetailsMiddleware`, independent of any web framework
//! - JSON DTOs and the shared `HealthService`
//!
//! Used by `api-rest`, which adapts the middleware to axum.

pub mod dto;
pub mod health;
pub mod middleware;
pub mod problem_details;
pub mod problem_details_config;

pub use health::{HealthRes, HealthService};
pub use middleware::{Disposition, ProblemDetailsMiddleware, ProblemResponse};
pub use problem_details::{
    status_title, status_type_uri, ProblemDetails, ValidationProblemDetails,
    APPLICATION_PROBLEM_JSON,
};
pub use problem_details_config::{
    Environment, ErrorMatcher, ProblemDetailsConfig, ProblemDetailsConfigBuilder, ProblemMapper,
    ProblemRequest, Resolution,
};
