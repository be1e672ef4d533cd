use axum::{
    extract::{Path, State},
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;

use crate::dashboard::Tab;
use crate::errors::AppError;
use crate::routes::apply;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CredentialsForm {
    pub name: String,
    pub password: String,
}

/// GET /
pub async fn handle_index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    let dashboard = state.dashboard.lock().await;
    Ok(Html(state.renderer.render(&dashboard)?))
}

/// POST /login
pub async fn handle_login(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| d.login(&form.name, &form.password)).await
}

/// POST /register
pub async fn handle_register(
    State(state): State<AppState>,
    Form(form): Form<CredentialsForm>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| d.register(&form.name, &form.password)).await
}

/// POST /logout
pub async fn handle_logout(State(state): State<AppState>) -> Result<Redirect, AppError> {
    apply(&state, |d| d.logout()).await
}

/// POST /tabs/:tab
pub async fn handle_select_tab(
    State(state): State<AppState>,
    Path(tab): Path<String>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| {
        let tab = Tab::parse(&tab).ok_or_else(|| AppError::NotFound(format!("Tab '{tab}'")))?;
        d.select_tab(tab)
    })
    .await
}

/// POST /notifications/:id/dismiss
pub async fn handle_dismiss_notification(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Redirect, AppError> {
    apply(&state, |d| {
        d.dismiss_notification(id);
        Ok(())
    })
    .await
}
