//! Data access for patients, dentists and appointments.
//!
//! Handlers talk to a [`ClinicStore`]; production uses [`PgClinicStore`],
//! router tests use the in-memory store.

use std::time::Duration;

use async_trait::async_trait;

use crate::models::{
    AppointmentListing, Dentist, NewAppointment, NewDentist, NewPatient, Patient,
};

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgClinicStore;

/// Result of an upsert keyed on `cpf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upserted {
    Created(i32),
    Updated(i32),
}

impl Upserted {
    pub fn id(self) -> i32 {
        match self {
            Upserted::Created(id) | Upserted::Updated(id) => id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("a {entity} with this cpf already exists")]
    Conflict { entity: &'static str },

    #[error("a record with the same unique key already exists")]
    Duplicate,

    #[error("referenced {entity} does not exist")]
    MissingReference { entity: &'static str },

    #[error("{entity} is still referenced by appointments")]
    Referenced { entity: &'static str },

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ClinicStore: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn upsert_patient(&self, patient: &NewPatient) -> Result<Upserted, StoreError>;
    async fn list_patients(&self) -> Result<Vec<Patient>, StoreError>;
    async fn get_patient(&self, id: i32) -> Result<Option<Patient>, StoreError>;
    /// Returns the number of deleted rows (0 or 1).
    async fn delete_patient(&self, id: i32) -> Result<u64, StoreError>;

    async fn upsert_dentist(&self, dentist: &NewDentist) -> Result<Upserted, StoreError>;
    async fn list_dentists(&self) -> Result<Vec<Dentist>, StoreError>;
    async fn get_dentist(&self, id: i32) -> Result<Option<Dentist>, StoreError>;
    async fn delete_dentist(&self, id: i32) -> Result<u64, StoreError>;

    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<i32, StoreError>;
    async fn list_appointments(&self) -> Result<Vec<AppointmentListing>, StoreError>;
    async fn delete_appointment(&self, id: i32) -> Result<u64, StoreError>;
}
