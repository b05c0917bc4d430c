use crate::infra::{AppState, Pipelines};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use carebridge::error::AppError;
use carebridge::workflows::audit::{AuditRequest, FinalReport};
use carebridge::workflows::chat::{ChatError, ChatReport, ChatResponse};
use carebridge::workflows::comparison::{ComparisonReport, ComparisonRequest};
use carebridge::workflows::prepurchase::{PrePurchaseReport, PrePurchaseRequest};
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Debug, Deserialize)]
pub(crate) struct OpenSessionRequest {
    #[serde(default)]
    pub(crate) report_data: Option<ChatReport>,
}

#[derive(Debug, Serialize)]
pub(crate) struct OpenSessionResponse {
    pub(crate) session_id: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SessionChatRequest {
    pub(crate) session_id: String,
    pub(crate) question: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ReportChatRequest {
    #[serde(default)]
    pub(crate) report_data: Option<ChatReport>,
    pub(crate) question: String,
}

pub(crate) fn router(pipelines: Pipelines) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/audit", post(audit_endpoint))
        .route("/api/v1/prepurchase", post(prepurchase_endpoint))
        .route("/api/v1/compare", post(compare_endpoint))
        .route("/api/v1/chat/sessions", post(open_session_endpoint))
        .route("/api/v1/chat", post(session_chat_endpoint))
        .route("/api/v1/report-chat", post(report_chat_endpoint))
        .layer(Extension(pipelines))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn audit_endpoint(
    Extension(pipelines): Extension<Pipelines>,
    Json(request): Json<AuditRequest>,
) -> Json<FinalReport> {
    Json(pipelines.audit.run(&request).await)
}

pub(crate) async fn prepurchase_endpoint(
    Extension(pipelines): Extension<Pipelines>,
    Json(request): Json<PrePurchaseRequest>,
) -> Json<PrePurchaseReport> {
    Json(pipelines.prepurchase.run(&request.policy_text).await)
}

pub(crate) async fn compare_endpoint(
    Extension(pipelines): Extension<Pipelines>,
    Json(request): Json<ComparisonRequest>,
) -> Json<ComparisonReport> {
    Json(
        pipelines
            .comparison
            .compare(&request.policy_a_text, &request.policy_b_text)
            .await,
    )
}

pub(crate) async fn open_session_endpoint(
    Extension(pipelines): Extension<Pipelines>,
    Json(request): Json<OpenSessionRequest>,
) -> Result<Json<OpenSessionResponse>, AppError> {
    let report = request.report_data.ok_or(ChatError::MissingReport)?;
    let session_id = pipelines.chat.open_session(report);
    Ok(Json(OpenSessionResponse { session_id }))
}

pub(crate) async fn session_chat_endpoint(
    Extension(pipelines): Extension<Pipelines>,
    Json(request): Json<SessionChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = pipelines
        .chat
        .ask_in_session(&request.session_id, &request.question)
        .await?;
    Ok(Json(response))
}

pub(crate) async fn report_chat_endpoint(
    Extension(pipelines): Extension<Pipelines>,
    Json(request): Json<ReportChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let response = pipelines
        .chat
        .ask(request.report_data.as_ref(), &request.question)
        .await?;
    Ok(Json(response))
}
