//! HTTP handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use clinical_deid_core::DeidentificationResult;
use clinical_deid_ner::ModelStatus;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

const WARMUP_INPUT: &str = "Warmup input";

#[derive(Debug, Deserialize)]
pub struct DeidRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct PingResponse {
    pub message: String,
    pub model: ModelStatus,
}

#[derive(Debug, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub status: ModelStatus,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub model: ModelInfo,
}

/// `POST /deidentify`: redact identifiers from free text.
pub async fn deidentify(
    State(state): State<AppState>,
    payload: Result<Json<DeidRequest>, JsonRejection>,
) -> Result<Json<DeidentificationResult>, ApiError> {
    let Json(request) = payload.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!("deidentify", %request_id);

    async move {
        let text_chars = request.text.chars().count();
        let deidentifier = state.deidentifier.clone();

        // Model inference is CPU-bound
        let current = tracing::Span::current();
        let result = tokio::task::spawn_blocking(move || {
            let _entered = current.enter();
            deidentifier.deidentify(&request.text)
        })
        .await?;

        tracing::info!(
            text_chars,
            redactions = result.entities.len(),
            "De-identification complete"
        );

        Ok::<_, ApiError>(Json(result))
    }
    .instrument(span)
    .await
}

/// `GET /ping`: force the model load so the first real request is fast.
pub async fn ping(State(state): State<AppState>) -> Result<Json<PingResponse>, ApiError> {
    let deidentifier = state.deidentifier.clone();
    tokio::task::spawn_blocking(move || deidentifier.deidentify(WARMUP_INPUT)).await?;

    let model = state.model.status();
    let message = match &model {
        ModelStatus::Ready => "All models warmed up and ready".to_string(),
        _ => "Warmed up without the model; regex detection only".to_string(),
    };

    Ok(Json(PingResponse { message, model }))
}

/// `GET /health`: liveness plus model load state. Never triggers a load.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "clinical-deid",
        model: ModelInfo {
            name: state.model_name.clone(),
            status: state.model.status(),
        },
    })
}
