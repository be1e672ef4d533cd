use axum::{
    extract::{Multipart, Path, State},
    response::Redirect,
    Form,
};
use bytes::Bytes;
use serde::Deserialize;
use tracing::info;

use crate::dashboard::ai_ops::{run_resume_analysis, run_training_suggestion};
use crate::documents::{extract_pdf_text, DocumentError};
use crate::errors::AppError;
use crate::models::consultant::{MeetingId, TrainingStatus};
use crate::routes::{apply, settle};
use crate::state::AppState;

/// Multipart field carrying the uploaded resume.
const RESUME_FIELD: &str = "resume";

#[derive(Deserialize)]
pub struct ResumeTextForm {
    pub resume_text: String,
}

#[derive(Deserialize)]
pub struct NotesForm {
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct TrainingForm {
    pub name: String,
}

#[derive(Deserialize)]
pub struct TrainingStatusForm {
    pub status: String,
}

#[derive(Deserialize)]
pub struct OpportunityForm {
    pub description: String,
}

/// POST /resume/analyze
pub async fn handle_analyze_resume(
    State(state): State<AppState>,
    Form(form): Form<ResumeTextForm>,
) -> Result<Redirect, AppError> {
    let result = analyze(&state, form.resume_text).await;
    settle(&state, result).await
}

/// POST /resume/upload
///
/// Extracts the PDF's text, then runs the same analysis as pasted text.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    let result = upload(&state, multipart).await;
    settle(&state, result).await
}

async fn upload(state: &AppState, mut multipart: Multipart) -> Result<(), AppError> {
    state.dashboard.lock().await.require_consultant()?;
    let bytes = read_resume_field(&mut multipart).await?;
    let text = extract_text(bytes).await?;
    info!("Extracted {} chars from uploaded resume", text.len());
    analyze(state, text).await
}

async fn analyze(state: &AppState, text: String) -> Result<(), AppError> {
    state
        .run_detached(move |dashboard, ai| async move {
            run_resume_analysis(&dashboard, ai.as_ref(), text).await
        })
        .await
}

async fn read_resume_field(multipart: &mut Multipart) -> Result<Bytes, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")))?
    {
        if field.name() == Some(RESUME_FIELD) {
            return field
                .bytes()
                .await
                .map_err(|e| AppError::Validation(format!("Invalid upload: {e}")));
        }
    }
    Err(DocumentError::Empty.into())
}

/// PDF parsing is CPU-bound and may panic on malformed input, so it runs on the
/// blocking pool where a panic surfaces as a `JoinError`.
async fn extract_text(bytes: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| DocumentError::Extraction(format!("parser failed: {e}")))??;
    Ok(text)
}

/// POST /meetings/:id/attend
pub async fn handle_log_attendance(
    State(state): State<AppState>,
    Path(meeting_id): Path<MeetingId>,
    Form(form): Form<NotesForm>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| d.log_attendance(meeting_id, form.notes)).await
}

/// POST /training/suggest
pub async fn handle_suggest_training(
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let result = state
        .run_detached(|dashboard, ai| async move {
            run_training_suggestion(&dashboard, ai.as_ref()).await
        })
        .await;
    settle(&state, result).await
}

/// POST /training/log
pub async fn handle_log_training(
    State(state): State<AppState>,
    Form(form): Form<TrainingForm>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| d.log_training(&form.name)).await
}

/// POST /training/status
pub async fn handle_set_training_status(
    State(state): State<AppState>,
    Form(form): Form<TrainingStatusForm>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| {
        let status = TrainingStatus::parse(&form.status).ok_or_else(|| {
            AppError::Validation(format!("Unknown training status '{}'", form.status))
        })?;
        d.set_training_status(status)
    })
    .await
}

/// POST /opportunities
pub async fn handle_log_opportunity(
    State(state): State<AppState>,
    Form(form): Form<OpportunityForm>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| d.log_opportunity(&form.description)).await
}
