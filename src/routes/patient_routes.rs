// src/routes/patient_routes.rs

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::{
    error::ApiError,
    middleware::extractors::{RecordId, ValidJson},
    models::{AppState, MessageResponse, Patient, PatientRequest, SubmitResponse},
    store::Upserted,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pacientes", get(list_patients).post(submit_patient))
        .route("/pacientes/{id}", get(get_patient).delete(delete_patient))
}

/// Creates the patient, or updates name and contact fields of the one that
/// already holds this cpf.
pub async fn submit_patient(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<PatientRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let patient = req.validate()?;

    let outcome = state.store.upsert_patient(&patient).await?;
    let mensagem = match outcome {
        Upserted::Created(id) => {
            tracing::info!(patient_id = id, "patient created");
            "Paciente criado"
        }
        Upserted::Updated(id) => {
            tracing::info!(patient_id = id, "patient updated");
            "Paciente atualizado"
        }
    };

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            mensagem: mensagem.to_string(),
            id: outcome.id(),
        }),
    ))
}

pub async fn list_patients(
    State(state): State<AppState>,
) -> Result<Json<Vec<Patient>>, ApiError> {
    let rows = state.store.list_patients().await?;
    Ok(Json(rows))
}

pub async fn get_patient(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<Patient>, ApiError> {
    let row = state
        .store
        .get_patient(id)
        .await?
        .ok_or_else(|| ApiError::not_found("patient"))?;
    Ok(Json(row))
}

/// Idempotent: an unknown id still reports success.
pub async fn delete_patient(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.store.delete_patient(id).await?;
    tracing::info!(patient_id = id, deleted, "patient delete");

    Ok(Json(MessageResponse {
        mensagem: "Paciente deletado".to_string(),
    }))
}
