//! Patient repository trait and in-memory store.

use crate::error::{DomainError, DomainResult};
use crate::patient::{Patient, PatientForCreation, PatientId};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Storage for patients.
///
/// Implementations must be safe to share across request handlers.
pub trait PatientRepository: Send + Sync {
    /// All patients, ordered by last name then first name.
    fn list(&self) -> DomainResult<Vec<Patient>>;

    fn get(&self, id: PatientId) -> DomainResult<Option<Patient>>;

    fn insert(&self, patient: Patient) -> DomainResult<()>;

    /// Replaces an existing patient. Returns `false` when no patient has that id.
    fn replace(&self, patient: Patient) -> DomainResult<bool>;

    /// Returns `false` when no patient has that id.
    fn delete(&self, id: PatientId) -> DomainResult<bool>;
}

#[derive(Debug, Default)]
pub struct InMemoryPatientRepository {
    patients: RwLock<HashMap<PatientId, Patient>>,
}

impl InMemoryPatientRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the two demo patients when the store is empty.
    ///
    /// # Errors
    ///
    /// Returns a [`DomainError`] if the store lock is poisoned or a seed patient fails
    /// validation.
    pub fn seed(&self) -> DomainResult<()> {
        if !self.read()?.is_empty() {
            return Ok(());
        }

        for (first, last, sex) in [("John", "Doe", "Male"), ("Jane", "Smith", "Female")] {
            let patient = Patient::create(PatientForCreation {
                first_name: Some(first.to_string()),
                last_name: Some(last.to_string()),
                sex: Some(sex.to_string()),
                ..Default::default()
            })?;
            self.insert(patient)?;
        }

        tracing::info!("seeded patient store with demo patients");
        Ok(())
    }

    fn read(
        &self,
    ) -> DomainResult<std::sync::RwLockReadGuard<'_, HashMap<PatientId, Patient>>> {
        self.patients.read().map_err(poisoned)
    }

    fn write(
        &self,
    ) -> DomainResult<std::sync::RwLockWriteGuard<'_, HashMap<PatientId, Patient>>> {
        self.patients.write().map_err(poisoned)
    }
}

fn poisoned<T>(_: PoisonError<T>) -> DomainError {
    DomainError::unclassified("patient store lock poisoned")
}

impl PatientRepository for InMemoryPatientRepository {
    fn list(&self) -> DomainResult<Vec<Patient>> {
        let mut patients: Vec<Patient> = self.read()?.values().cloned().collect();
        patients.sort_by(|a, b| {
            a.last_name()
                .cmp(b.last_name())
                .then_with(|| a.first_name().cmp(b.first_name()))
                .then_with(|| a.id().cmp(&b.id()))
        });
        Ok(patients)
    }

    fn get(&self, id: PatientId) -> DomainResult<Option<Patient>> {
        Ok(self.read()?.get(&id).cloned())
    }

    fn insert(&self, patient: Patient) -> DomainResult<()> {
        self.write()?.insert(patient.id(), patient);
        Ok(())
    }

    fn replace(&self, patient: Patient) -> DomainResult<bool> {
        let mut patients = self.write()?;
        match patients.get_mut(&patient.id()) {
            Some(existing) => {
                *existing = patient;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete(&self, id: PatientId) -> DomainResult<bool> {
        Ok(self.write()?.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patient::PatientForUpdate;

    #[test]
    fn seed_is_idempotent_and_sorted() {
        let repo = InMemoryPatientRepository::new();
        repo.seed().expect("seed");
        repo.seed().expect("second seed is a no-op");

        let names: Vec<String> = repo
            .list()
            .expect("list")
            .iter()
            .map(|p| format!("{} {} ({})", p.first_name(), p.last_name(), p.sex()))
            .collect();
        assert_eq!(names, vec!["John Doe (Male)", "Jane Smith (Female)"]);
    }

    #[test]
    fn replace_and_delete_report_missing_ids() {
        let repo = InMemoryPatientRepository::new();
        let patient = Patient::create(PatientForCreation {
            first_name: Some("Ada".into()),
            last_name: Some("Lovelace".into()),
            ..Default::default()
        })
        .expect("valid patient");

        assert!(!repo.replace(patient.clone()).expect("replace"));
        repo.insert(patient.clone()).expect("insert");

        let renamed = patient
            .update(PatientForUpdate {
                first_name: Some("Augusta".into()),
                last_name: Some("Lovelace".into()),
                ..Default::default()
            })
            .expect("valid update");
        assert!(repo.replace(renamed).expect("replace"));
        let stored = repo.get(patient.id()).expect("get").expect("present");
        assert_eq!(stored.first_name(), "Augusta");

        assert!(repo.delete(patient.id()).expect("delete"));
        assert!(!repo.delete(patient.id()).expect("second delete"));
        assert!(repo.get(patient.id()).expect("get").is_none());
    }
}
