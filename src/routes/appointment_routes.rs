// src/routes/appointment_routes.rs

use axum::{
    extract::State,
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};

use crate::{
    error::ApiError,
    middleware::extractors::{RecordId, ValidJson},
    models::{AppState, AppointmentListing, AppointmentRequest, CreatedIdResponse, MessageResponse},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/consultas", get(list_appointments).post(create_appointment))
        .route("/consultas/{id}", delete(delete_appointment))
}

/* ============================================================
   POST /consultas (create)
   ============================================================ */

pub async fn create_appointment(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<AppointmentRequest>,
) -> Result<(StatusCode, Json<CreatedIdResponse>), ApiError> {
    let appointment = req.validate()?;

    let id = state.store.create_appointment(&appointment).await?;
    tracing::info!(
        appointment_id = id,
        patient_id = appointment.id_paciente,
        dentist_id = appointment.id_dentista,
        "appointment created"
    );

    Ok((StatusCode::CREATED, Json(CreatedIdResponse { id })))
}

/* ============================================================
   GET /consultas
   ============================================================ */

/// Appointments whose patient or dentist row is gone are not listed.
pub async fn list_appointments(
    State(state): State<AppState>,
) -> Result<Json<Vec<AppointmentListing>>, ApiError> {
    Ok(Json(state.store.list_appointments().await?))
}

/* ============================================================
   DELETE /consultas/{id}
   ============================================================ */

pub async fn delete_appointment(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.store.delete_appointment(id).await?;
    tracing::info!(appointment_id = id, deleted, "appointment delete");

    Ok(Json(MessageResponse {
        mensagem: "Consulta deletada".to_string(),
    }))
}
