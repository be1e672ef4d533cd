use axum::{
    extract::{Path, State},
    response::Redirect,
    Form,
};
use serde::Deserialize;

use crate::dashboard::actions::ConsultantEdit;
use crate::dashboard::ai_ops::{run_attendance_analysis, run_opportunity_analysis};
use crate::errors::AppError;
use crate::models::consultant::{BenchStatus, ConsultantId, Department};
use crate::routes::consultant::OpportunityForm;
use crate::routes::{apply, settle};
use crate::state::AppState;
use crate::workflow::ConsultantFilter;

/// Filter bar. Blank selects mean "any".
#[derive(Deserialize)]
pub struct FilterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub skill: String,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub status: String,
}

impl FilterForm {
    fn into_filter(self) -> Result<ConsultantFilter, AppError> {
        Ok(ConsultantFilter {
            department: optional(&self.department, parse_department)?,
            status: optional(&self.status, parse_status)?,
            name: self.name.trim().to_string(),
            skill: self.skill.trim().to_string(),
        })
    }
}

#[derive(Deserialize)]
pub struct EditForm {
    pub department: String,
    pub status: String,
    /// Comma separated.
    #[serde(default)]
    pub skills: String,
}

impl EditForm {
    fn into_edit(self) -> Result<ConsultantEdit, AppError> {
        Ok(ConsultantEdit {
            department: parse_department(&self.department)?,
            status: parse_status(&self.status)?,
            skills: self
                .skills
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        })
    }
}

#[derive(Deserialize)]
pub struct DepartmentForm {
    #[serde(default)]
    pub department: String,
}

fn parse_department(s: &str) -> Result<Department, AppError> {
    Department::parse(s).ok_or_else(|| AppError::Validation(format!("Unknown department '{s}'")))
}

fn parse_status(s: &str) -> Result<BenchStatus, AppError> {
    BenchStatus::parse(s).ok_or_else(|| AppError::Validation(format!("Unknown status '{s}'")))
}

fn optional<T>(
    s: &str,
    parse: fn(&str) -> Result<T, AppError>,
) -> Result<Option<T>, AppError> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse(s).map(Some)
    }
}

/// POST /admin/filter
pub async fn handle_set_filter(
    State(state): State<AppState>,
    Form(form): Form<FilterForm>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| d.set_filter(form.into_filter()?)).await
}

/// POST /admin/consultants/:id/edit
pub async fn handle_edit_consultant(
    State(state): State<AppState>,
    Path(id): Path<ConsultantId>,
    Form(form): Form<EditForm>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| d.edit_consultant(id, form.into_edit()?)).await
}

/// POST /admin/consultants/:id/opportunities
pub async fn handle_log_opportunity_for(
    State(state): State<AppState>,
    Path(id): Path<ConsultantId>,
    Form(form): Form<OpportunityForm>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| d.log_opportunity_for(id, &form.description)).await
}

/// POST /admin/consultants/:id/delete
pub async fn handle_delete_consultant(
    State(state): State<AppState>,
    Path(id): Path<ConsultantId>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| d.delete_consultant(id)).await
}

/// POST /admin/consultants/:id/attendance-analysis
pub async fn handle_analyze_attendance(
    State(state): State<AppState>,
    Path(id): Path<ConsultantId>,
) -> Result<Redirect, AppError> {
    let result = state
        .run_detached(move |dashboard, ai| async move {
            run_attendance_analysis(&dashboard, ai.as_ref(), id).await
        })
        .await;
    settle(&state, result).await
}

/// POST /admin/opportunity-analysis
pub async fn handle_analyze_opportunities(
    State(state): State<AppState>,
    Form(form): Form<DepartmentForm>,
) -> Result<Redirect, AppError> {
    let department = match optional(&form.department, parse_department) {
        Ok(department) => department,
        Err(e) => return settle(&state, Err(e)).await,
    };
    let result = state
        .run_detached(move |dashboard, ai| async move {
            run_opportunity_analysis(&dashboard, ai.as_ref(), department).await
        })
        .await;
    settle(&state, result).await
}
