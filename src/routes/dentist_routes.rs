// src/routes/dentist_routes.rs

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};

use crate::{
    error::ApiError,
    middleware::extractors::{RecordId, ValidJson},
    models::{AppState, Dentist, DentistRequest, MessageResponse, SubmitResponse},
    store::Upserted,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/dentistas", get(list_dentists).post(submit_dentist))
        .route("/dentistas/{id}", get(get_dentist).delete(delete_dentist))
}

pub async fn submit_dentist(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<DentistRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    let dentist = req.validate()?;

    let outcome = state.store.upsert_dentist(&dentist).await?;
    let mensagem = match outcome {
        Upserted::Created(_) => "Dentista criado",
        Upserted::Updated(_) => "Dentista atualizado",
    };
    tracing::info!(dentist_id = outcome.id(), mensagem, "dentist saved");

    Ok((
        StatusCode::CREATED,
        Json(SubmitResponse {
            mensagem: mensagem.to_string(),
            id: outcome.id(),
        }),
    ))
}

pub async fn list_dentists(
    State(state): State<AppState>,
) -> Result<Json<Vec<Dentist>>, ApiError> {
    Ok(Json(state.store.list_dentists().await?))
}

pub async fn get_dentist(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<Dentist>, ApiError> {
    state
        .store
        .get_dentist(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("dentist"))
}

pub async fn delete_dentist(
    State(state): State<AppState>,
    RecordId(id): RecordId,
) -> Result<Json<MessageResponse>, ApiError> {
    let deleted = state.store.delete_dentist(id).await?;
    tracing::info!(dentist_id = id, deleted, "dentist delete");

    Ok(Json(MessageResponse {
        mensagem: "Dentista deletado".to_string(),
    }))
}
