use std::sync::Mutex;

use async_trait::async_trait;

use super::{ClinicStore, StoreError, Upserted};
use crate::models::{
    AppointmentListing, Dentist, NewAppointment, NewDentist, NewPatient, Patient,
};

#[derive(Debug, Clone)]
struct AppointmentRow {
    id: i32,
    appointment: NewAppointment,
}

#[derive(Default)]
struct Tables {
    patients: Vec<Patient>,
    dentists: Vec<Dentist>,
    appointments: Vec<AppointmentRow>,
    next_patient: i32,
    next_dentist: i32,
    next_appointment: i32,
}

/// In-process store with the same constraint behavior as the postgres schema
/// (unique cpf, restrict on delete, inner join on listing).
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    down: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every call fails as if the database were unreachable.
    pub fn unavailable() -> Self {
        Self {
            down: true,
            ..Self::default()
        }
    }

    fn with<T>(&self, f: impl FnOnce(&mut Tables) -> Result<T, StoreError>) -> Result<T, StoreError> {
        if self.down {
            return Err(StoreError::Unavailable("connection refused".into()));
        }
        let mut tables = self.tables.lock().unwrap();
        f(&mut tables)
    }
}

fn next(counter: &mut i32) -> i32 {
    *counter += 1;
    *counter
}

#[async_trait]
impl ClinicStore for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.with(|_| Ok(()))
    }

    async fn upsert_patient(&self, patient: &NewPatient) -> Result<Upserted, StoreError> {
        self.with(|t| {
            if let Some(row) = t.patients.iter_mut().find(|p| p.cpf == patient.cpf) {
                row.nome = patient.nome.clone();
                row.telefone = patient.telefone.clone();
                row.email = patient.email.clone();
                return Ok(Upserted::Updated(row.id));
            }
            let id = next(&mut t.next_patient);
            t.patients.push(Patient {
                id,
                nome: patient.nome.clone(),
                telefone: patient.telefone.clone(),
                email: patient.email.clone(),
                cpf: patient.cpf.clone(),
            });
            Ok(Upserted::Created(id))
        })
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, StoreError> {
        self.with(|t| Ok(t.patients.clone()))
    }

    async fn get_patient(&self, id: i32) -> Result<Option<Patient>, StoreError> {
        self.with(|t| Ok(t.patients.iter().find(|p| p.id == id).cloned()))
    }

    async fn delete_patient(&self, id: i32) -> Result<u64, StoreError> {
        self.with(|t| {
            if t.appointments.iter().any(|a| a.appointment.id_paciente == id) {
                return Err(StoreError::Referenced { entity: "paciente" });
            }
            let before = t.patients.len();
            t.patients.retain(|p| p.id != id);
            Ok((before - t.patients.len()) as u64)
        })
    }

    async fn upsert_dentist(&self, dentist: &NewDentist) -> Result<Upserted, StoreError> {
        self.with(|t| {
            if let Some(row) = t.dentists.iter_mut().find(|d| d.cpf == dentist.cpf) {
                row.nome = dentist.nome.clone();
                row.especialidade = dentist.especialidade.clone();
                return Ok(Upserted::Updated(row.id));
            }
            let id = next(&mut t.next_dentist);
            t.dentists.push(Dentist {
                id,
                nome: dentist.nome.clone(),
                especialidade: dentist.especialidade.clone(),
                cpf: dentist.cpf.clone(),
            });
            Ok(Upserted::Created(id))
        })
    }

    async fn list_dentists(&self) -> Result<Vec<Dentist>, StoreError> {
        self.with(|t| Ok(t.dentists.clone()))
    }

    async fn get_dentist(&self, id: i32) -> Result<Option<Dentist>, StoreError> {
        self.with(|t| Ok(t.dentists.iter().find(|d| d.id == id).cloned()))
    }

    async fn delete_dentist(&self, id: i32) -> Result<u64, StoreError> {
        self.with(|t| {
            if t.appointments.iter().any(|a| a.appointment.id_dentista == id) {
                return Err(StoreError::Referenced { entity: "dentista" });
            }
            let before = t.dentists.len();
            t.dentists.retain(|d| d.id != id);
            Ok((before - t.dentists.len()) as u64)
        })
    }

    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<i32, StoreError> {
        self.with(|t| {
            if !t.patients.iter().any(|p| p.id == appointment.id_paciente) {
                return Err(StoreError::MissingReference { entity: "paciente" });
            }
            if !t.dentists.iter().any(|d| d.id == appointment.id_dentista) {
                return Err(StoreError::MissingReference { entity: "dentista" });
            }
            let id = next(&mut t.next_appointment);
            t.appointments.push(AppointmentRow {
                id,
                appointment: appointment.clone(),
            });
            Ok(id)
        })
    }

    async fn list_appointments(&self) -> Result<Vec<AppointmentListing>, StoreError> {
        self.with(|t| {
            let mut rows: Vec<AppointmentListing> = t
                .appointments
                .iter()
                .filter_map(|a| {
                    let patient = t.patients.iter().find(|p| p.id == a.appointment.id_paciente)?;
                    let dentist = t.dentists.iter().find(|d| d.id == a.appointment.id_dentista)?;
                    Some(AppointmentListing {
                        id: a.id,
                        id_paciente: a.appointment.id_paciente,
                        paciente: patient.nome.clone(),
                        id_dentista: a.appointment.id_dentista,
                        dentista: dentist.nome.clone(),
                        data: a.appointment.data,
                        hora: a.appointment.hora,
                        observacoes: a.appointment.observacoes.clone(),
                    })
                })
                .collect();
            rows.sort_by_key(|r| (r.data, r.hora, r.id));
            Ok(rows)
        })
    }

    async fn delete_appointment(&self, id: i32) -> Result<u64, StoreError> {
        self.with(|t| {
            let before = t.appointments.len();
            t.appointments.retain(|a| a.id != id);
            Ok((before - t.appointments.len()) as u64)
        })
    }
}
