//! # Patients Core
//!
//! Core business logic for the patient records service.
//!
//! This crate contains the domain model and pure data operations:
//! - [`Sex`] and [`Lifespan`] value objects
//! - the [`DomainError`] hierarchy the HTTP boundary translates into problem details
//! - the [`Patient`] entity, its repository and [`PatientService`]
//!
//! **No API concerns**: HTTP servers, middleware and DTOs belong in `api-rest` or `api-shared`.

pub mod constants;
pub mod error;
pub mod lifespan;
pub mod patient;
pub mod repositories;
pub mod service;
pub mod sex;
pub mod validation;

pub use error::{
    BoxError, DomainError, DomainResult, ErrorKind, ForbiddenAccessException, NotFoundException,
    ValidationErrors, ValidationException, ValidationFailure,
};
pub use lifespan::{DateOfBirthInput, KnownAgeInput, LifeStage, Lifespan};
pub use patient::{Patient, PatientForCreation, PatientForUpdate, PatientId};
pub use patients_types::NonEmptyText;
pub use repositories::{InMemoryPatientRepository, PatientRepository};
pub use service::PatientService;
pub use sex::Sex;
