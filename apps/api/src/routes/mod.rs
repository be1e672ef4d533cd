//! HTTP surface. Every control on the page posts a form here; each handler runs one
//! dashboard mutation and redirects back to `/` for a fresh render.

pub mod admin;
pub mod consultant;
pub mod health;
pub mod session;

use axum::{
    extract::DefaultBodyLimit,
    response::Redirect,
    routing::{get, post},
    Router,
};
use tracing::error;

use crate::dashboard::Dashboard;
use crate::errors::AppError;
use crate::state::AppState;

/// Upper bound for resume uploads.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/", get(session::handle_index))
        // Session
        .route("/login", post(session::handle_login))
        .route("/register", post(session::handle_register))
        .route("/logout", post(session::handle_logout))
        .route("/tabs/:tab", post(session::handle_select_tab))
        .route(
            "/notifications/:id/dismiss",
            post(session::handle_dismiss_notification),
        )
        // Consultant
        .route("/resume/analyze", post(consultant::handle_analyze_resume))
        .route(
            "/resume/upload",
            post(consultant::handle_upload_resume).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
        )
        .route(
            "/meetings/:id/attend",
            post(consultant::handle_log_attendance),
        )
        .route("/training/suggest", post(consultant::handle_suggest_training))
        .route("/training/log", post(consultant::handle_log_training))
        .route(
            "/training/status",
            post(consultant::handle_set_training_status),
        )
        .route("/opportunities", post(consultant::handle_log_opportunity))
        // Admin
        .route("/admin/filter", post(admin::handle_set_filter))
        .route(
            "/admin/consultants/:id/edit",
            post(admin::handle_edit_consultant),
        )
        .route(
            "/admin/consultants/:id/opportunities",
            post(admin::handle_log_opportunity_for),
        )
        .route(
            "/admin/consultants/:id/attendance-analysis",
            post(admin::handle_analyze_attendance),
        )
        .route(
            "/admin/consultants/:id/delete",
            post(admin::handle_delete_consultant),
        )
        .route(
            "/admin/opportunity-analysis",
            post(admin::handle_analyze_opportunities),
        )
        .with_state(state)
}

/// Runs one synchronous mutation under the dashboard lock and settles its outcome.
pub(crate) async fn apply<T>(
    state: &AppState,
    f: impl FnOnce(&mut Dashboard) -> Result<T, AppError>,
) -> Result<Redirect, AppError> {
    let mut dashboard = state.dashboard.lock().await;
    let result = f(&mut dashboard).map(|_| ());
    report_or_fail(&mut dashboard, result)
}

/// Settles the outcome of an operation that ran without holding the lock.
pub(crate) async fn settle(
    state: &AppState,
    result: Result<(), AppError>,
) -> Result<Redirect, AppError> {
    if result.is_ok() {
        return Ok(Redirect::to("/"));
    }
    let mut dashboard = state.dashboard.lock().await;
    report_or_fail(&mut dashboard, result)
}

/// Recoverable errors become a message on the next render. Storage, render and
/// internal failures propagate as a 5xx.
fn report_or_fail(
    dashboard: &mut Dashboard,
    result: Result<(), AppError>,
) -> Result<Redirect, AppError> {
    match result {
        Ok(()) => Ok(Redirect::to("/")),
        Err(e) if e.is_user_facing() => {
            dashboard.report(&e);
            Ok(Redirect::to("/"))
        }
        Err(e) => {
            error!("Request failed: {e}");
            Err(e)
        }
    }
}
