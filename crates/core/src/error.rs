//! Domain error hierarchy.
//!
//! Every failure raised by the domain is a [`DomainError`]. The closed [`ErrorKind`] discriminator
//! is what the HTTP boundary matches on when it translates an error into a problem-details
//! response. Domain code never catches these. They travel unchanged to that boundary.

use std::collections::BTreeMap;
use std::fmt;

/// Boxed cause attached to an exception.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Field name → ordered list of messages for that field.
pub type ValidationErrors = BTreeMap<String, Vec<String>>;

/// Closed set of error categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// One or more client-correctable field failures.
    Validation,
    /// A referenced entity or route does not exist.
    NotFound,
    /// The caller is not allowed to perform the operation.
    ForbiddenAccess,
    /// A value had the wrong shape or type (for example a malformed request body).
    InvalidType,
    /// A value was outside the range its type can represent.
    OutOfRange,
    /// Anything else.
    Unclassified,
}

impl ErrorKind {
    /// Every kind, in declaration order.
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::Validation,
        ErrorKind::NotFound,
        ErrorKind::ForbiddenAccess,
        ErrorKind::InvalidType,
        ErrorKind::OutOfRange,
        ErrorKind::Unclassified,
    ];

    /// Discriminator used in logs and serialised exception details.
    pub fn name(self) -> &'static str {
        match self {
            ErrorKind::Validation => "ValidationException",
            ErrorKind::NotFound => "NotFoundException",
            ErrorKind::ForbiddenAccess => "ForbiddenAccessException",
            ErrorKind::InvalidType => "TypeError",
            ErrorKind::OutOfRange => "RangeError",
            ErrorKind::Unclassified => "Error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// ValidationException
// ============================================================================

/// A single field failure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationFailure {
    pub property_name: String,
    pub error_message: String,
}

impl ValidationFailure {
    pub fn new(property_name: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            property_name: property_name.into(),
            error_message: error_message.into(),
        }
    }
}

/// Aggregates one or many field failures.
///
/// All constructors converge on the same representation: a top-level message plus a map of
/// field name to the messages reported for that field.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ValidationException {
    message: String,
    errors: ValidationErrors,
}

impl ValidationException {
    pub const DEFAULT_MESSAGE: &'static str = "One or more validation failures have occurred.";

    /// Key used when the exception is built from a bare message.
    pub const MESSAGE_ONLY_KEY: &'static str = "Validation Exception";

    /// Generic message, no field errors.
    pub fn new() -> Self {
        Self {
            message: Self::DEFAULT_MESSAGE.to_string(),
            errors: ValidationErrors::new(),
        }
    }

    /// Groups failures by property name.
    ///
    /// Messages keep the order in which they were supplied within each property.
    pub fn from_failures(failures: impl IntoIterator<Item = ValidationFailure>) -> Self {
        let mut errors = ValidationErrors::new();
        for failure in failures {
            errors
                .entry(failure.property_name)
                .or_default()
                .push(failure.error_message);
        }

        Self {
            message: Self::DEFAULT_MESSAGE.to_string(),
            errors,
        }
    }

    pub fn from_failure(failure: ValidationFailure) -> Self {
        Self::from_field_and_message(failure.property_name, failure.error_message)
    }

    pub fn from_field_and_message(
        property_name: impl Into<String>,
        error_message: impl Into<String>,
    ) -> Self {
        let error_message = error_message.into();
        let mut errors = ValidationErrors::new();
        errors.insert(property_name.into(), vec![error_message.clone()]);

        Self {
            message: error_message,
            errors,
        }
    }

    /// Uses `message` as the top-level message and files it under
    /// [`ValidationException::MESSAGE_ONLY_KEY`].
    pub fn from_message(message: impl Into<String>) -> Self {
        Self::from_field_and_message(Self::MESSAGE_ONLY_KEY, message)
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    /// Flattens the grouped errors back into individual failures.
    pub fn failures(&self) -> impl Iterator<Item = ValidationFailure> + '_ {
        self.errors.iter().flat_map(|(property, messages)| {
            messages
                .iter()
                .map(move |message| ValidationFailure::new(property.clone(), message.clone()))
        })
    }
}

impl Default for ValidationException {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ValidationFailure> for ValidationException {
    fn from(failure: ValidationFailure) -> Self {
        Self::from_failure(failure)
    }
}

impl From<Vec<ValidationFailure>> for ValidationException {
    fn from(failures: Vec<ValidationFailure>) -> Self {
        Self::from_failures(failures)
    }
}

// ============================================================================
// NotFoundException
// ============================================================================

/// A referenced entity does not exist.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct NotFoundException {
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl NotFoundException {
    pub const DEFAULT_MESSAGE: &'static str = "The requested resource was not found.";

    pub fn new() -> Self {
        Self::with_message(Self::DEFAULT_MESSAGE)
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    /// Message of the form `Entity "Patient" (abc-123) was not found.`
    pub fn for_entity(entity_name: &str, key: impl fmt::Display) -> Self {
        Self::with_message(format!("Entity \"{entity_name}\" ({key}) was not found."))
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for NotFoundException {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ForbiddenAccessException
// ============================================================================

/// The caller may not access the requested resource.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ForbiddenAccessException {
    message: String,
    #[source]
    cause: Option<BoxError>,
}

impl ForbiddenAccessException {
    pub const DEFAULT_MESSAGE: &'static str = "Access to the requested resource is forbidden.";

    pub fn new() -> Self {
        Self::with_message(Self::DEFAULT_MESSAGE)
    }

    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            cause: Some(cause.into()),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl Default for ForbiddenAccessException {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// DomainError
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationException),

    #[error(transparent)]
    NotFound(#[from] NotFoundException),

    #[error(transparent)]
    ForbiddenAccess(#[from] ForbiddenAccessException),

    #[error("{message}")]
    InvalidType { message: String },

    #[error("{message}")]
    OutOfRange { message: String },

    #[error("{message}")]
    Unclassified {
        name: String,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl DomainError {
    pub fn invalid_type(message: impl Into<String>) -> Self {
        DomainError::InvalidType {
            message: message.into(),
        }
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        DomainError::OutOfRange {
            message: message.into(),
        }
    }

    /// An unclassified error named after [`ErrorKind::Unclassified`].
    pub fn unclassified(message: impl Into<String>) -> Self {
        DomainError::Unclassified {
            name: ErrorKind::Unclassified.name().to_string(),
            message: message.into(),
            source: None,
        }
    }

    /// Wraps an arbitrary error, keeping it as the source.
    pub fn from_source(error: impl Into<BoxError>) -> Self {
        let error = error.into();
        DomainError::Unclassified {
            name: ErrorKind::Unclassified.name().to_string(),
            message: error.to_string(),
            source: Some(error),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::NotFound(_) => ErrorKind::NotFound,
            DomainError::ForbiddenAccess(_) => ErrorKind::ForbiddenAccess,
            DomainError::InvalidType { .. } => ErrorKind::InvalidType,
            DomainError::OutOfRange { .. } => ErrorKind::OutOfRange,
            DomainError::Unclassified { .. } => ErrorKind::Unclassified,
        }
    }

    /// Discriminator of this error. Unclassified errors may carry their own name.
    pub fn name(&self) -> &str {
        match self {
            DomainError::Unclassified { name, .. } => name,
            other => other.kind().name(),
        }
    }

    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn as_validation(&self) -> Option<&ValidationException> {
        match self {
            DomainError::Validation(inner) => Some(inner),
            _ => None,
        }
    }

    /// Renders the error followed by each underlying cause, one per line.
    pub fn source_chain(&self) -> String {
        let mut rendered = format!("{}: {}", self.name(), self);
        let mut current = std::error::Error::source(self);
        while let Some(cause) = current {
            rendered.push_str("\n    caused by: ");
            rendered.push_str(&cause.to_string());
            current = cause.source();
        }
        rendered
    }
}

impl From<std::num::TryFromIntError> for DomainError {
    fn from(error: std::num::TryFromIntError) -> Self {
        DomainError::out_of_range(error.to_string())
    }
}

impl From<serde_json::Error> for DomainError {
    fn from(error: serde_json::Error) -> Self {
        DomainError::invalid_type(error.to_string())
    }
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
