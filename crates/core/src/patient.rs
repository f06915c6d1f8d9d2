//! Patient entity.
//!
//! A patient is identified by a [`PatientId`] and carries validated names, a [`Sex`] and a
//! [`Lifespan`]. Patients are immutable: [`Patient::update`] returns a new instance with the
//! same identity.

use crate::constants::{FIRST_NAME_FIELD, LAST_NAME_FIELD, LIFESPAN_FIELD};
use crate::error::{ValidationException, ValidationFailure};
use crate::lifespan::{DateOfBirthInput, KnownAgeInput, Lifespan};
use crate::sex::Sex;
use patients_types::NonEmptyText;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

const FIRST_NAME_REQUIRED: &str = "First name is required.";
const LAST_NAME_REQUIRED: &str = "Last name is required.";

/// Patient identifier (UUID v4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
#[serde(transparent)]
pub struct PatientId(Uuid);

impl PatientId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PatientId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PatientId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

impl fmt::Display for PatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PatientId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Raw input for a new patient. Nothing here has been validated yet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientForCreation {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub sex: Option<String>,
    pub known_age: Option<KnownAgeInput>,
    pub date_of_birth: Option<DateOfBirthInput>,
}

/// Raw input replacing every mutable field of an existing patient.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatientForUpdate {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub sex: Option<String>,
    pub known_age: Option<KnownAgeInput>,
    pub date_of_birth: Option<DateOfBirthInput>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Patient {
    id: PatientId,
    first_name: NonEmptyText,
    last_name: NonEmptyText,
    sex: Sex,
    lifespan: Lifespan,
}

impl Patient {
    /// Validates the input and assigns a fresh id.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationException`] when a name is missing or blank or the lifespan is
    /// invalid. If the lifespan is the only failure its exception is returned as-is. Otherwise
    /// every failure is collected under `FirstName`, `LastName` and `Lifespan`.
    pub fn create(input: PatientForCreation) -> Result<Self, ValidationException> {
        let fields = PatientFields::validate(
            input.first_name.as_deref(),
            input.last_name.as_deref(),
            input.sex.as_deref(),
            input.known_age,
            input.date_of_birth,
        )?;
        Ok(fields.into_patient(PatientId::new()))
    }

    /// Validates the input and returns a replacement with the same id.
    pub fn update(&self, input: PatientForUpdate) -> Result<Self, ValidationException> {
        let fields = PatientFields::validate(
            input.first_name.as_deref(),
            input.last_name.as_deref(),
            input.sex.as_deref(),
            input.known_age,
            input.date_of_birth,
        )?;
        Ok(fields.into_patient(self.id))
    }

    pub fn id(&self) -> PatientId {
        self.id
    }

    pub fn first_name(&self) -> &NonEmptyText {
        &self.first_name
    }

    pub fn last_name(&self) -> &NonEmptyText {
        &self.last_name
    }

    pub fn sex(&self) -> Sex {
        self.sex
    }

    pub fn lifespan(&self) -> &Lifespan {
        &self.lifespan
    }
}

struct PatientFields {
    first_name: NonEmptyText,
    last_name: NonEmptyText,
    sex: Sex,
    lifespan: Lifespan,
}

impl PatientFields {
    fn validate(
        first_name: Option<&str>,
        last_name: Option<&str>,
        sex: Option<&str>,
        known_age: Option<KnownAgeInput>,
        date_of_birth: Option<DateOfBirthInput>,
    ) -> Result<Self, ValidationException> {
        let first_name = NonEmptyText::from_optional(first_name);
        let last_name = NonEmptyText::from_optional(last_name);
        let lifespan = Lifespan::create(known_age, date_of_birth);

        match (first_name, last_name, lifespan) {
            (Ok(first_name), Ok(last_name), Ok(lifespan)) => Ok(Self {
                first_name,
                last_name,
                sex: Sex::parse(sex),
                lifespan,
            }),
            (Ok(_), Ok(_), Err(lifespan_err)) => Err(lifespan_err),
            (first_name, last_name, lifespan) => {
                let mut failures = Vec::new();
                if first_name.is_err() {
                    failures.push(ValidationFailure::new(FIRST_NAME_FIELD, FIRST_NAME_REQUIRED));
                }
                if last_name.is_err() {
                    failures.push(ValidationFailure::new(LAST_NAME_FIELD, LAST_NAME_REQUIRED));
                }
                if let Err(lifespan_err) = lifespan {
                    failures.extend(
                        lifespan_err
                            .failures()
                            .map(|f| ValidationFailure::new(LIFESPAN_FIELD, f.error_message)),
                    );
                }
                Err(ValidationException::from_failures(failures))
            }
        }
    }

    fn into_patient(self, id: PatientId) -> Patient {
        Patient {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            sex: self.sex,
            lifespan: self.lifespan,
        }
    }
}
