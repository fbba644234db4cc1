use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use super::{ClinicStore, StoreError, Upserted};
use crate::models::{
    AppointmentListing, Dentist, NewAppointment, NewDentist, NewPatient, Patient,
};

/// Which statement produced an error; decides how constraint violations are
/// reported.
#[derive(Debug, Clone, Copy)]
enum Op {
    Read,
    Upsert(&'static str),
    Insert,
    Delete(&'static str),
}

#[derive(Clone)]
pub struct PgClinicStore {
    pool: PgPool,
    query_timeout: Duration,
}

impl PgClinicStore {
    pub fn new(pool: PgPool, query_timeout: Duration) -> Self {
        Self {
            pool,
            query_timeout,
        }
    }

    /// Runs one store call under the request timeout. Dropping the future on
    /// expiry hands its connection back to the pool.
    async fn run<T, F>(&self, op: Op, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>> + Send,
    {
        match tokio::time::timeout(self.query_timeout, fut).await {
            Ok(res) => res.map_err(|e| classify(e, op)),
            Err(_) => {
                tracing::warn!(?op, timeout = ?self.query_timeout, "store call timed out");
                Err(StoreError::Timeout(self.query_timeout))
            }
        }
    }
}

/// SQLSTATEs for a server that refuses or drops the session: class 08
/// (connection_exception), too_many_connections, and the shutdown family.
fn is_connectivity_code(code: &str) -> bool {
    code.starts_with("08") || matches!(code, "53300" | "57P01" | "57P02" | "57P03")
}

fn classify(e: sqlx::Error, op: Op) -> StoreError {
    if let sqlx::Error::Database(db) = &e {
        if db.code().is_some_and(|code| is_connectivity_code(&code)) {
            return StoreError::Unavailable(e.to_string());
        }
        if db.is_unique_violation() {
            return match op {
                Op::Upsert(entity) => StoreError::Conflict { entity },
                _ => StoreError::Duplicate,
            };
        }
        if db.is_foreign_key_violation() {
            if let Op::Delete(entity) = op {
                return StoreError::Referenced { entity };
            }
            let entity = match db.constraint() {
                Some(c) if c.contains("id_dentista") => "dentista",
                _ => "paciente",
            };
            return StoreError::MissingReference { entity };
        }
    }

    match e {
        sqlx::Error::PoolTimedOut
        | sqlx::Error::PoolClosed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_)
        | sqlx::Error::WorkerCrashed => StoreError::Unavailable(e.to_string()),
        other => StoreError::Database(other),
    }
}

fn upserted((id, inserted): (i32, bool)) -> Upserted {
    if inserted {
        Upserted::Created(id)
    } else {
        Upserted::Updated(id)
    }
}

#[async_trait]
impl ClinicStore for PgClinicStore {
    async fn ping(&self) -> Result<(), StoreError> {
        self.run(Op::Read, async {
            sqlx::query("SELECT 1").execute(&self.pool).await.map(|_| ())
        })
        .await
    }

    async fn upsert_patient(&self, patient: &NewPatient) -> Result<Upserted, StoreError> {
        // xmax is 0 only for a freshly inserted tuple
        let row: (i32, bool) = self
            .run(
                Op::Upsert("paciente"),
                sqlx::query_as::<_, (i32, bool)>(
                    r#"
                    INSERT INTO pacientes (nome, telefone, email, cpf)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (cpf) DO UPDATE
                    SET nome = EXCLUDED.nome,
                        telefone = EXCLUDED.telefone,
                        email = EXCLUDED.email
                    RETURNING id, (xmax = 0) AS inserted
                    "#,
                )
                .bind(&patient.nome)
                .bind(patient.telefone.as_deref())
                .bind(patient.email.as_deref())
                .bind(&patient.cpf)
                .fetch_one(&self.pool),
            )
            .await?;

        Ok(upserted(row))
    }

    async fn list_patients(&self) -> Result<Vec<Patient>, StoreError> {
        self.run(
            Op::Read,
            sqlx::query_as::<_, Patient>(
                r#"
                SELECT id, nome, telefone, email, cpf
                FROM pacientes
                ORDER BY id
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn get_patient(&self, id: i32) -> Result<Option<Patient>, StoreError> {
        self.run(
            Op::Read,
            sqlx::query_as::<_, Patient>(
                r#"
                SELECT id, nome, telefone, email, cpf
                FROM pacientes
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn delete_patient(&self, id: i32) -> Result<u64, StoreError> {
        let res = self
            .run(
                Op::Delete("paciente"),
                sqlx::query("DELETE FROM pacientes WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;
        Ok(res.rows_affected())
    }

    async fn upsert_dentist(&self, dentist: &NewDentist) -> Result<Upserted, StoreError> {
        let row: (i32, bool) = self
            .run(
                Op::Upsert("dentista"),
                sqlx::query_as::<_, (i32, bool)>(
                    r#"
                    INSERT INTO dentistas (nome, especialidade, cpf)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (cpf) DO UPDATE
                    SET nome = EXCLUDED.nome,
                        especialidade = EXCLUDED.especialidade
                    RETURNING id, (xmax = 0) AS inserted
                    "#,
                )
                .bind(&dentist.nome)
                .bind(dentist.especialidade.as_deref())
                .bind(&dentist.cpf)
                .fetch_one(&self.pool),
            )
            .await?;

        Ok(upserted(row))
    }

    async fn list_dentists(&self) -> Result<Vec<Dentist>, StoreError> {
        self.run(
            Op::Read,
            sqlx::query_as::<_, Dentist>(
                r#"
                SELECT id, nome, especialidade, cpf
                FROM dentistas
                ORDER BY id
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn get_dentist(&self, id: i32) -> Result<Option<Dentist>, StoreError> {
        self.run(
            Op::Read,
            sqlx::query_as::<_, Dentist>(
                r#"
                SELECT id, nome, especialidade, cpf
                FROM dentistas
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await
    }

    async fn delete_dentist(&self, id: i32) -> Result<u64, StoreError> {
        let res = self
            .run(
                Op::Delete("dentista"),
                sqlx::query("DELETE FROM dentistas WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;
        Ok(res.rows_affected())
    }

    async fn create_appointment(&self, appointment: &NewAppointment) -> Result<i32, StoreError> {
        self.run(
            Op::Insert,
            sqlx::query_scalar::<_, i32>(
                r#"
                INSERT INTO consultas (id_paciente, id_dentista, data, hora, observacoes)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id
                "#,
            )
            .bind(appointment.id_paciente)
            .bind(appointment.id_dentista)
            .bind(appointment.data)
            .bind(appointment.hora)
            .bind(appointment.observacoes.as_deref())
            .fetch_one(&self.pool),
        )
        .await
    }

    async fn list_appointments(&self) -> Result<Vec<AppointmentListing>, StoreError> {
        self.run(
            Op::Read,
            sqlx::query_as::<_, AppointmentListing>(
                r#"
                SELECT
                  c.id,
                  c.id_paciente,
                  p.nome AS paciente,
                  c.id_dentista,
                  d.nome AS dentista,
                  c.data,
                  c.hora,
                  c.observacoes
                FROM consultas c
                JOIN pacientes p ON p.id = c.id_paciente
                JOIN dentistas d ON d.id = c.id_dentista
                ORDER BY c.data, c.hora, c.id
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await
    }

    async fn delete_appointment(&self, id: i32) -> Result<u64, StoreError> {
        let res = self
            .run(
                Op::Delete("consulta"),
                sqlx::query("DELETE FROM consultas WHERE id = $1")
                    .bind(id)
                    .execute(&self.pool),
            )
            .await?;
        Ok(res.rows_affected())
    }
}
