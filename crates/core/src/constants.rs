//! Constants used throughout the patients core crate.
//!
//! Field names here are the keys clients see in validation error maps, so they are part of the
//! wire contract.

/// Validation key for failures raised by [`crate::Lifespan`].
pub const LIFESPAN_FIELD: &str = "Lifespan";

/// Validation key for a patient's first name.
pub const FIRST_NAME_FIELD: &str = "FirstName";

/// Validation key for a patient's last name.
pub const LAST_NAME_FIELD: &str = "LastName";

/// Largest accepted known age, in whole years.
pub const MAX_KNOWN_AGE: u32 = 120;

/// Entity name used in not-found messages for patients.
pub const PATIENT_ENTITY_NAME: &str = "Patient";
