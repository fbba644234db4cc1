use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::error::ApiError;
use crate::store::ClinicStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ClinicStore>,
}

impl AppState {
    pub fn new(store: impl ClinicStore + 'static) -> Self {
        Self {
            store: Arc::new(store),
        }
    }
}

/* -------------------------
   API DTOs
--------------------------*/

/// Body of POST /pacientes. Every field is optional at the serde level so a
/// missing `nome` or `cpf` is reported as a validation error instead of a
/// JSON rejection.
#[derive(Debug, Default, Deserialize)]
pub struct PatientRequest {
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub cpf: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DentistRequest {
    pub nome: Option<String>,
    pub especialidade: Option<String>,
    pub cpf: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppointmentRequest {
    pub id_paciente: Option<i32>,
    pub id_dentista: Option<i32>,
    pub data: Option<String>,
    pub hora: Option<String>,
    pub observacoes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub mensagem: String,
    pub id: i32,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub mensagem: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedIdResponse {
    pub id: i32,
}

/* -------------------------
   Validated input
--------------------------*/

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPatient {
    pub nome: String,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub cpf: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewDentist {
    pub nome: String,
    pub especialidade: Option<String>,
    pub cpf: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAppointment {
    pub id_paciente: i32,
    pub id_dentista: i32,
    pub data: NaiveDate,
    pub hora: NaiveTime,
    pub observacoes: Option<String>,
}

impl PatientRequest {
    pub fn validate(self) -> Result<NewPatient, ApiError> {
        Ok(NewPatient {
            nome: required("nome", self.nome)?,
            telefone: optional(self.telefone),
            email: optional(self.email),
            cpf: required("cpf", self.cpf)?,
        })
    }
}

impl DentistRequest {
    pub fn validate(self) -> Result<NewDentist, ApiError> {
        Ok(NewDentist {
            nome: required("nome", self.nome)?,
            especialidade: optional(self.especialidade),
            cpf: required("cpf", self.cpf)?,
        })
    }
}

impl AppointmentRequest {
    pub fn validate(self) -> Result<NewAppointment, ApiError> {
        let id_paciente = self.id_paciente.ok_or_else(|| missing("id_paciente"))?;
        let id_dentista = self.id_dentista.ok_or_else(|| missing("id_dentista"))?;
        let data = parse_date(&required("data", self.data)?)?;
        let hora = parse_time(&required("hora", self.hora)?)?;

        Ok(NewAppointment {
            id_paciente,
            id_dentista,
            data,
            hora,
            observacoes: optional(self.observacoes),
        })
    }
}

/* -------------------------
   DB Row Models
--------------------------*/

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Patient {
    pub id: i32,
    pub nome: String,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub cpf: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Dentist {
    pub id: i32,
    pub nome: String,
    pub especialidade: Option<String>,
    pub cpf: String,
}

/// An appointment joined with the current names of its patient and dentist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct AppointmentListing {
    pub id: i32,
    pub id_paciente: i32,
    pub paciente: String,
    pub id_dentista: i32,
    pub dentista: String,
    pub data: NaiveDate,
    pub hora: NaiveTime,
    pub observacoes: Option<String>,
}

/* -------------------------
   Helpers
--------------------------*/

fn missing(field: &str) -> ApiError {
    ApiError::BadRequest("VALIDATION_ERROR", format!("{field} is required"))
}

fn required(field: &str, value: Option<String>) -> Result<String, ApiError> {
    match value.as_deref().map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_string()),
        _ => Err(missing(field)),
    }
}

/// Blank strings are stored as NULL.
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn parse_date(raw: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest("VALIDATION_ERROR", "data must be YYYY-MM-DD".into())
    })
}

fn parse_time(raw: &str) -> Result<NaiveTime, ApiError> {
    NaiveTime::parse_from_str(raw, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .map_err(|_| ApiError::BadRequest("VALIDATION_ERROR", "hora must be HH:MM or HH:MM:SS".into()))
}
