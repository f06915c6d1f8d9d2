//! Patient service.
//!
//! Pure patient operations over a [`PatientRepository`]. No HTTP concerns live here; the REST
//! layer translates the returned [`DomainError`]s into responses.

use crate::constants::PATIENT_ENTITY_NAME;
use crate::error::{DomainError, DomainResult, NotFoundException};
use crate::patient::{Patient, PatientForCreation, PatientForUpdate, PatientId};
use crate::repositories::PatientRepository;
use std::sync::Arc;

#[derive(Clone)]
pub struct PatientService {
    repository: Arc<dyn PatientRepository>,
}

impl PatientService {
    /// Creates a new instance of PatientService.
    ///
    /// # Arguments
    ///
    /// * `repository` - Storage shared with any other service instances.
    pub fn new(repository: Arc<dyn PatientRepository>) -> Self {
        Self { repository }
    }

    pub fn list_patients(&self) -> DomainResult<Vec<Patient>> {
        self.repository.list()
    }

    /// Looks up a patient by the raw id taken from a request path.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] if `id` is not a UUID or no patient has it.
    pub fn get_patient(&self, id: &str) -> DomainResult<Patient> {
        let patient_id = parse_id(id)?;
        self.repository
            .get(patient_id)?
            .ok_or_else(|| not_found(id))
    }

    /// Validates and stores a new patient.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Validation`] when the input is invalid.
    pub fn create_patient(&self, input: PatientForCreation) -> DomainResult<Patient> {
        let patient = Patient::create(input)?;
        self.repository.insert(patient.clone())?;
        tracing::info!(patient_id = %patient.id(), "created patient");
        Ok(patient)
    }

    /// Replaces the mutable fields of an existing patient.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::NotFound`] for an unknown id, checked before the input is
    /// validated, and [`DomainError::Validation`] for invalid input.
    pub fn update_patient(&self, id: &str, input: PatientForUpdate) -> DomainResult<Patient> {
        let existing = self.get_patient(id)?;
        let updated = existing.update(input)?;
        if !self.repository.replace(updated.clone())? {
            return Err(not_found(id));
        }
        tracing::info!(patient_id = %updated.id(), "updated patient");
        Ok(updated)
    }

    pub fn delete_patient(&self, id: &str) -> DomainResult<()> {
        let patient_id = parse_id(id)?;
        if !self.repository.delete(patient_id)? {
            return Err(not_found(id));
        }
        tracing::info!(patient_id = %patient_id, "deleted patient");
        Ok(())
    }
}

fn parse_id(id: &str) -> DomainResult<PatientId> {
    id.parse().map_err(|_| not_found(id))
}

fn not_found(id: &str) -> DomainError {
    NotFoundException::for_entity(PATIENT_ENTITY_NAME, id).into()
}
