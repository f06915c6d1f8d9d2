//! Ordered registry translating domain errors into problem details.
//!
//! Rules are matched against an error's [`ErrorKind`] in registration order and the first match
//! wins. Caller rules are registered before the default set, and the default set ends with a
//! catch-all, so specific mappings are never shadowed.
//!
//! The registry is assembled once with [`ProblemDetailsConfigBuilder`] and is immutable
//! afterwards. Share it behind an `Arc`.

use crate::problem_details::{ProblemDetails, ValidationProblemDetails};
use patients_core::{DomainError, ErrorKind};
use std::fmt;
use std::sync::Arc;

/// Status used when no rule matches.
pub const FALLBACK_STATUS: u16 = 500;

// ============================================================================
// Environment
// ============================================================================

/// Deployment environment, used to pick the default for exception details.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Parses an `APP_ENV`-style value. Anything unrecognised, or absent, is development.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("test") => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }

    /// Exception details are exposed everywhere except production.
    pub fn includes_exception_details(self) -> bool {
        !self.is_production()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Test => "test",
            Environment::Production => "production",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Selects the errors a rule applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorMatcher {
    Kind(ErrorKind),
    /// Matches every error.
    Any,
}

impl ErrorMatcher {
    pub fn matches(self, error: &DomainError) -> bool {
        match self {
            ErrorMatcher::Kind(kind) => error.kind() == kind,
            ErrorMatcher::Any => true,
        }
    }
}

impl From<ErrorKind> for ErrorMatcher {
    fn from(kind: ErrorKind) -> Self {
        ErrorMatcher::Kind(kind)
    }
}

/// The parts of an HTTP request that mappers may look at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProblemRequest {
    pub method: String,
    pub path: String,
}

impl ProblemRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

/// Custom translation. Returning `None` hands the error on to the next matching rule.
pub type ProblemMapper =
    Arc<dyn Fn(&ProblemRequest, &DomainError) -> Option<ProblemDetails> + Send + Sync>;

/// Outcome of resolving an error.
#[derive(Clone, Debug, PartialEq)]
pub enum Resolution {
    /// Respond with this payload.
    Problem(ProblemDetails),
    /// Leave the error alone and let downstream handling deal with it.
    Ignore,
    /// Propagate the original error unchanged.
    Rethrow,
}

// ============================================================================
// Config
// ============================================================================

#[derive(Clone)]
pub struct ProblemDetailsConfig {
    mappers: Vec<(ErrorMatcher, ProblemMapper)>,
    status_codes: Vec<(ErrorMatcher, u16)>,
    ignore: Vec<ErrorMatcher>,
    rethrow: Vec<ErrorMatcher>,
    include_exception_details: bool,
}

impl ProblemDetailsConfig {
    pub fn builder() -> ProblemDetailsConfigBuilder {
        ProblemDetailsConfigBuilder::default()
    }

    pub fn include_exception_details(&self) -> bool {
        self.include_exception_details
    }

    pub fn should_ignore(&self, error: &DomainError) -> bool {
        self.ignore.iter().any(|m| m.matches(error))
    }

    pub fn should_rethrow(&self, error: &DomainError) -> bool {
        self.rethrow.iter().any(|m| m.matches(error))
    }

    /// Status from the first matching status-code rule, or [`FALLBACK_STATUS`].
    pub fn status_code_for(&self, error: &DomainError) -> u16 {
        self.status_codes
            .iter()
            .find(|(matcher, _)| matcher.matches(error))
            .map(|(_, status)| *status)
            .unwrap_or(FALLBACK_STATUS)
    }

    /// Translates `error` raised while serving `request`.
    ///
    /// Ignore rules are checked first, then rethrow rules, then custom mappers in order, then
    /// status-code rules in order. The error itself is never modified.
    pub fn resolve(&self, request: &ProblemRequest, error: &DomainError) -> Resolution {
        if self.should_ignore(error) {
            return Resolution::Ignore;
        }
        if self.should_rethrow(error) {
            return Resolution::Rethrow;
        }

        let mapped = self
            .mappers
            .iter()
            .filter(|(matcher, _)| matcher.matches(error))
            .find_map(|(_, mapper)| mapper(request, error));

        let problem = mapped.unwrap_or_else(|| {
            ProblemDetails::for_status(
                self.status_code_for(error),
                error.message(),
                request.path.as_str(),
            )
        });

        Resolution::Problem(self.decorate(problem, error))
    }

    fn decorate(&self, problem: ProblemDetails, error: &DomainError) -> ProblemDetails {
        if !self.include_exception_details {
            return problem;
        }
        problem.with_exception_details(error.name(), &error.message(), &error.source_chain())
    }
}

impl Default for ProblemDetailsConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for ProblemDetailsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProblemDetailsConfig")
            .field(
                "mappers",
                &self.mappers.iter().map(|(m, _)| m).collect::<Vec<_>>(),
            )
            .field("status_codes", &self.status_codes)
            .field("ignore", &self.ignore)
            .field("rethrow", &self.rethrow)
            .field("include_exception_details", &self.include_exception_details)
            .finish()
    }
}

/// Maps validation failures to a 422 with the per-field `errors` map.
pub fn validation_problem_mapper(
    request: &ProblemRequest,
    error: &DomainError,
) -> Option<ProblemDetails> {
    let validation = error.as_validation()?;
    Some(
        ValidationProblemDetails::new(
            validation.errors().clone(),
            validation.message(),
            request.path.as_str(),
        )
        .into(),
    )
}

// ============================================================================
// Builder
// ============================================================================

/// Collects caller rules. [`ProblemDetailsConfigBuilder::build`] appends the default rules after
/// them.
#[derive(Default)]
pub struct ProblemDetailsConfigBuilder {
    mappers: Vec<(ErrorMatcher, ProblemMapper)>,
    status_codes: Vec<(ErrorMatcher, u16)>,
    ignore: Vec<ErrorMatcher>,
    rethrow: Vec<ErrorMatcher>,
    include_exception_details: Option<bool>,
    environment: Environment,
    skip_defaults: bool,
}

impl ProblemDetailsConfigBuilder {
    pub fn map<F>(mut self, matcher: impl Into<ErrorMatcher>, mapper: F) -> Self
    where
        F: Fn(&ProblemRequest, &DomainError) -> Option<ProblemDetails> + Send + Sync + 'static,
    {
        let mapper: ProblemMapper = Arc::new(mapper);
        self.mappers.push((matcher.into(), mapper));
        self
    }

    pub fn map_to_status_code(mut self, matcher: impl Into<ErrorMatcher>, status: u16) -> Self {
        self.status_codes.push((matcher.into(), status));
        self
    }

    pub fn ignore(mut self, matcher: impl Into<ErrorMatcher>) -> Self {
        self.ignore.push(matcher.into());
        self
    }

    pub fn rethrow(mut self, matcher: impl Into<ErrorMatcher>) -> Self {
        self.rethrow.push(matcher.into());
        self
    }

    /// Overrides the environment-derived default.
    pub fn include_exception_details(mut self, include: bool) -> Self {
        self.include_exception_details = Some(include);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Builds with only the caller's rules. Unmatched errors still resolve to
    /// [`FALLBACK_STATUS`].
    pub fn without_default_mappings(mut self) -> Self {
        self.skip_defaults = true;
        self
    }

    pub fn build(self) -> ProblemDetailsConfig {
        let mut config = ProblemDetailsConfig {
            mappers: self.mappers,
            status_codes: self.status_codes,
            ignore: self.ignore,
            rethrow: self.rethrow,
            include_exception_details: self
                .include_exception_details
                .unwrap_or_else(|| self.environment.includes_exception_details()),
        };

        if !self.skip_defaults {
            let validation: ProblemMapper = Arc::new(validation_problem_mapper);
            config
                .mappers
                .push((ErrorMatcher::Kind(ErrorKind::Validation), validation));
            config.status_codes.extend([
                (ErrorMatcher::Kind(ErrorKind::NotFound), 404),
                (ErrorMatcher::Kind(ErrorKind::ForbiddenAccess), 403),
                (ErrorMatcher::Kind(ErrorKind::InvalidType), 400),
                (ErrorMatcher::Kind(ErrorKind::OutOfRange), 400),
                // Catch-all stays last.
                (ErrorMatcher::Any, FALLBACK_STATUS),
            ]);
        }

        config
    }
}
