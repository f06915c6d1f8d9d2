//! JSON request and response bodies for the patient endpoints.
//!
//! Field names are camelCase on the wire.

use chrono::NaiveDate;
use patients_core::{DateOfBirthInput, KnownAgeInput, Patient, PatientForCreation, PatientForUpdate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientForCreationDto {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    /// Whole years, as a number or numeric string.
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub known_age: Option<KnownAgeInput>,
    /// `YYYY-MM-DD` or an RFC 3339 timestamp.
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub date_of_birth: Option<DateOfBirthInput>,
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientForUpdateDto {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub sex: Option<String>,
    #[serde(default)]
    #[schema(value_type = Option<i64>)]
    pub known_age: Option<KnownAgeInput>,
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub date_of_birth: Option<DateOfBirthInput>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PatientDto {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub sex: String,
    pub age: Option<u32>,
    #[schema(value_type = Option<String>, format = Date)]
    pub date_of_birth: Option<NaiveDate>,
    pub life_stage: String,
    pub phi_friendly_age: String,
}

impl From<PatientForCreationDto> for PatientForCreation {
    fn from(dto: PatientForCreationDto) -> Self {
        Self {
            first_name: dto.first_name,
            last_name: dto.last_name,
            sex: dto.sex,
            known_age: dto.known_age,
            date_of_birth: dto.date_of_birth,
        }
    }
}

impl From<PatientForUpdateDto> for PatientForUpdate {
    fn from(dto: PatientForUpdateDto) -> Self {
        Self {
            first_name: dto.first_name,
            last_name: dto.last_name,
            sex: dto.sex,
            known_age: dto.known_age,
            date_of_birth: dto.date_of_birth,
        }
    }
}

impl From<&Patient> for PatientDto {
    fn from(patient: &Patient) -> Self {
        let lifespan = patient.lifespan();
        Self {
            id: patient.id().to_string(),
            first_name: patient.first_name().to_string(),
            last_name: patient.last_name().to_string(),
            sex: patient.sex().to_string(),
            age: lifespan.age(),
            date_of_birth: lifespan.date_of_birth(),
            life_stage: lifespan.life_stage().to_string(),
            phi_friendly_age: lifespan.phi_friendly_string(),
        }
    }
}
