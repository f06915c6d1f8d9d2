//! Patient storage.
//!
//! Services depend on the [`PatientRepository`] trait. The in-memory implementation is what the
//! REST server runs against.

pub mod patients;

pub use patients::{InMemoryPatientRepository, PatientRepository};
