//! Guard helpers for calling code.
//!
//! Each guard returns `Err(ValidationException)` built with
//! [`ValidationException::from_message`] when its condition does not hold, so call sites read as
//! a list of preconditions followed by `?`.

use crate::error::ValidationException;

type GuardResult = Result<(), ValidationException>;

/// Fails with `message` unless `condition` is true.
pub fn must(condition: bool, message: &str) -> GuardResult {
    if condition {
        Ok(())
    } else {
        Err(ValidationException::from_message(message))
    }
}

/// Fails with `message` if `condition` is true.
pub fn must_not(condition: bool, message: &str) -> GuardResult {
    must(!condition, message)
}

/// Fails if the value is absent.
pub fn must_not_be_null<T>(value: Option<&T>, message: &str) -> GuardResult {
    must(value.is_some(), message)
}

/// Fails if the value is absent or the empty string.
pub fn must_be_non_empty(value: Option<&str>, message: &str) -> GuardResult {
    must(value.is_some_and(|v| !v.is_empty()), message)
}

/// Fails if the value is absent, empty, or only whitespace.
pub fn must_be_non_blank(value: Option<&str>, message: &str) -> GuardResult {
    must(value.is_some_and(|v| !v.trim().is_empty()), message)
}

/// Fails if the slice has no elements.
pub fn must_not_be_empty_slice<T>(values: &[T], message: &str) -> GuardResult {
    must(!values.is_empty(), message)
}
