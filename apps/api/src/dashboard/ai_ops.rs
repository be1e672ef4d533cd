//! AI-backed dashboard operations.
//!
//! Each operation is split in three: `begin_*` validates and registers the loading key
//! under the dashboard lock, the gateway call runs with the lock released, and
//! `finish_*` re-takes the lock, clears the key, and applies the result. A failed call
//! changes nothing except the loading key.
//!
//! Results are addressed to the session that started the call. If that session has
//! ended by the time the call returns, persisted changes still land but nothing is
//! shown, and failures are only logged.

use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::ai::{self, AiGateway};
use crate::dashboard::{Dashboard, NotificationKind, OpportunityAnalysis, PendingOp, Ticket};
use crate::errors::AppError;
use crate::llm_client::LlmError;
use crate::models::consultant::{ConsultantId, Department, ResumeAnalytics, ResumeStatus};
use crate::workflow::merge_skills;

impl Dashboard {
    pub fn begin_resume_analysis(
        &mut self,
        resume_text: &str,
    ) -> Result<(ConsultantId, Ticket), AppError> {
        let id = self.require_consultant()?;
        if resume_text.trim().is_empty() {
            return Err(AppError::Validation("Resume text is empty".to_string()));
        }
        let ticket = self.begin(PendingOp::ResumeAnalysis(id))?;
        Ok((id, ticket))
    }

    /// Applies skills, resume status and the analytics snapshot together.
    /// `resumeUpdated` is set only for an `Updated` verdict and never cleared.
    pub fn finish_resume_analysis(
        &mut self,
        id: ConsultantId,
        ticket: Ticket,
        result: Result<ResumeAnalytics, LlmError>,
    ) -> Result<(), AppError> {
        let current = self.end(ticket);
        let Some(analysis) = outcome(ticket, current, result)? else {
            return Ok(());
        };
        if self.consultant(id).is_none() {
            warn!("Consultant {id} was deleted during resume analysis");
            return Ok(());
        }

        let status = analysis.resume_status;
        let added = self.commit_consultant(id, |c| {
            let added = merge_skills(&mut c.skills, &analysis.extracted_skills);
            c.resume_status = status;
            if status == ResumeStatus::Updated {
                c.workflow.resume_updated = true;
            }
            c.resume_analytics = Some(analysis);
            Ok(added)
        })?;

        info!("Resume analyzed for consultant {id}: {status:?}, {added} new skills");
        if current {
            self.notify(
                NotificationKind::Success,
                format!(
                    "Resume analyzed ({}), {added} new skill(s) added",
                    status.as_str()
                ),
            );
        }
        Ok(())
    }

    pub fn begin_training_suggestion(
        &mut self,
    ) -> Result<(ConsultantId, Ticket, String), AppError> {
        let id = self.require_consultant()?;
        let prompt = self
            .consultant(id)
            .map(ai::training_prompt)
            .ok_or(AppError::SessionLost)?;
        let ticket = self.begin(PendingOp::TrainingSuggestion(id))?;
        Ok((id, ticket, prompt))
    }

    pub fn finish_training_suggestion(
        &mut self,
        id: ConsultantId,
        ticket: Ticket,
        result: Result<String, LlmError>,
    ) -> Result<(), AppError> {
        let current = self.end(ticket);
        if let Some(text) = outcome(ticket, current, result)? {
            if current {
                self.ui.training_suggestions.insert(id, text);
            }
        }
        Ok(())
    }

    pub fn begin_attendance_analysis(
        &mut self,
        id: ConsultantId,
    ) -> Result<(Ticket, String), AppError> {
        self.require_admin()?;
        let prompt = self
            .consultant(id)
            .map(ai::attendance_prompt)
            .ok_or_else(|| AppError::NotFound(format!("Consultant {id} not found")))?;
        let ticket = self.begin(PendingOp::AttendanceAnalysis(id))?;
        Ok((ticket, prompt))
    }

    pub fn finish_attendance_analysis(
        &mut self,
        id: ConsultantId,
        ticket: Ticket,
        result: Result<String, LlmError>,
    ) -> Result<(), AppError> {
        let current = self.end(ticket);
        if let Some(text) = outcome(ticket, current, result)? {
            if current {
                self.ui.attendance_analyses.insert(id, text);
            }
        }
        Ok(())
    }

    pub fn begin_opportunity_analysis(
        &mut self,
        department: Option<Department>,
    ) -> Result<(Ticket, String), AppError> {
        self.require_admin()?;
        let prompt = ai::opportunity_prompt(&self.consultants, department).ok_or_else(|| {
            AppError::Validation(format!(
                "No opportunities logged for {}",
                department.map_or("any department", |d| d.as_str())
            ))
        })?;
        let ticket = self.begin(PendingOp::OpportunityAnalysis)?;
        Ok((ticket, prompt))
    }

    pub fn finish_opportunity_analysis(
        &mut self,
        department: Option<Department>,
        ticket: Ticket,
        result: Result<String, LlmError>,
    ) -> Result<(), AppError> {
        let current = self.end(ticket);
        if let Some(text) = outcome(ticket, current, result)? {
            if current {
                self.ui.opportunity_analysis = Some(OpportunityAnalysis {
                    scope: department,
                    text,
                });
            }
        }
        Ok(())
    }
}

/// Failures are logged; only the session that asked for the call gets the error back.
fn outcome<T>(
    ticket: Ticket,
    current: bool,
    result: Result<T, LlmError>,
) -> Result<Option<T>, AppError> {
    match result {
        Ok(value) => {
            if !current {
                warn!("{} finished after its session ended", ticket.op().label());
            }
            Ok(Some(value))
        }
        Err(e) => {
            error!("{} failed: {e}", ticket.op().label());
            if current {
                Err(AppError::Llm(e))
            } else {
                Ok(None)
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lock-releasing drivers
// ────────────────────────────────────────────────────────────────────────────

pub async fn run_resume_analysis(
    dashboard: &Mutex<Dashboard>,
    gateway: &dyn AiGateway,
    resume_text: String,
) -> Result<(), AppError> {
    let (id, ticket) = dashboard.lock().await.begin_resume_analysis(&resume_text)?;
    let result = ai::analyze_resume(gateway, &resume_text).await;
    dashboard
        .lock()
        .await
        .finish_resume_analysis(id, ticket, result)
}

pub async fn run_training_suggestion(
    dashboard: &Mutex<Dashboard>,
    gateway: &dyn AiGateway,
) -> Result<(), AppError> {
    let (id, ticket, prompt) = dashboard.lock().await.begin_training_suggestion()?;
    let result = gateway.generate_text(&prompt).await;
    dashboard
        .lock()
        .await
        .finish_training_suggestion(id, ticket, result)
}

pub async fn run_attendance_analysis(
    dashboard: &Mutex<Dashboard>,
    gateway: &dyn AiGateway,
    id: ConsultantId,
) -> Result<(), AppError> {
    let (ticket, prompt) = dashboard.lock().await.begin_attendance_analysis(id)?;
    let result = gateway.generate_text(&prompt).await;
    dashboard
        .lock()
        .await
        .finish_attendance_analysis(id, ticket, result)
}

pub async fn run_opportunity_analysis(
    dashboard: &Mutex<Dashboard>,
    gateway: &dyn AiGateway,
    department: Option<Department>,
) -> Result<(), AppError> {
    let (ticket, prompt) = dashboard.lock().await.begin_opportunity_analysis(department)?;
    let result = gateway.generate_text(&prompt).await;
    dashboard
        .lock()
        .await
        .finish_opportunity_analysis(department, ticket, result)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::ai::testing::FakeGateway;
    use crate::dashboard::auth::{ADMIN_NAME, ADMIN_PASSWORD};
    use crate::dashboard::test_support::*;

    fn analysis(status: &str, skills: &[&str]) -> serde_json::Value {
        json!({
            "summary": "Data engineer with banking background",
            "extracted_skills": skills,
            "years_of_experience": 7,
            "project_highlights": ["Risk data mart"],
            "resume_status": status
        })
    }

    #[tokio::test]
    async fn test_updated_resume_sets_flag_and_skills() {
        let (_, mut dashboard, id) = with_consultant("Rae");
        dashboard.consultants[0].skills = vec!["Python".to_string()];
        let dashboard = Mutex::new(dashboard);
        let fake = FakeGateway::new();
        fake.push_structured(Ok(analysis("Updated", &["python", "Spark"])));

        run_resume_analysis(&dashboard, &fake, "resume text".to_string())
            .await
            .unwrap();

        let d = dashboard.lock().await;
        let c = d.consultant(id).unwrap();
        assert_eq!(c.resume_status, ResumeStatus::Updated);
        assert!(c.workflow.resume_updated);
        assert_eq!(c.skills, vec!["Python", "Spark"]);
        assert_eq!(
            c.resume_analytics.as_ref().unwrap().summary,
            "Data engineer with banking background"
        );
        assert!(d.ui().loading.is_empty());
    }

    #[tokio::test]
    async fn test_pending_resume_leaves_flag_alone() {
        let (_, mut dashboard, id) = with_consultant("Rae");
        dashboard.consultants[0].workflow.resume_updated = true;
        let dashboard = Mutex::new(dashboard);
        let fake = FakeGateway::new();
        fake.push_structured(Ok(analysis("Pending", &[])));
        run_resume_analysis(&dashboard, &fake, "old resume".to_string())
            .await
            .unwrap();
        {
            let d = dashboard.lock().await;
            let c = d.consultant(id).unwrap();
            assert_eq!(c.resume_status, ResumeStatus::Pending);
            assert!(c.workflow.resume_updated);
        }

        let (_, fresh, id) = with_consultant("Sol");
        let dashboard = Mutex::new(fresh);
        fake.push_structured(Ok(analysis("Pending", &[])));
        run_resume_analysis(&dashboard, &fake, "old resume".to_string())
            .await
            .unwrap();
        assert!(
            !dashboard
                .lock()
                .await
                .consultant(id)
                .unwrap()
                .workflow
                .resume_updated
        );
    }

    #[tokio::test]
    async fn test_failed_analysis_changes_nothing_but_the_loading_key() {
        let (store, dashboard, _) = with_consultant("Rae");
        let before = dashboard.consultants().to_vec();
        let saved = crate::storage::KvStore::get(
            store.as_ref(),
            crate::repository::CONSULTANTS_KEY,
        )
        .unwrap();
        let dashboard = Mutex::new(dashboard);
        let fake = FakeGateway::new();
        fake.push_structured(Ok(json!({ "summary": "missing the rest" })));

        let err = run_resume_analysis(&dashboard, &fake, "resume".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Llm(LlmError::Schema(_))));

        let d = dashboard.lock().await;
        assert_eq!(d.consultants(), before.as_slice());
        assert!(d.ui().loading.is_empty());
        assert_eq!(
            crate::storage::KvStore::get(store.as_ref(), crate::repository::CONSULTANTS_KEY)
                .unwrap(),
            saved
        );
    }

    #[tokio::test]
    async fn test_empty_resume_text_is_rejected_before_the_call() {
        let (_, dashboard, _) = with_consultant("Rae");
        let dashboard = Mutex::new(dashboard);
        let fake = FakeGateway::new();
        let err = run_resume_analysis(&dashboard, &fake, "  ".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(fake.prompts.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_training_suggestion_is_stored_per_consultant() {
        let (_, dashboard, id) = with_consultant("Rae");
        let dashboard = Mutex::new(dashboard);
        let fake = FakeGateway::new();
        fake.push_text(Ok("1. Databricks Associate".to_string()));
        run_training_suggestion(&dashboard, &fake).await.unwrap();
        let d = dashboard.lock().await;
        assert_eq!(
            d.ui().training_suggestions.get(&id).map(String::as_str),
            Some("1. Databricks Associate")
        );
    }

    #[tokio::test]
    async fn test_attendance_analysis_is_admin_only_and_clears_on_failure() {
        let (_, mut dashboard, id) = with_consultant("Rae");
        assert!(matches!(
            dashboard.begin_attendance_analysis(id),
            Err(AppError::Forbidden)
        ));
        dashboard.logout().unwrap();
        dashboard.login(ADMIN_NAME, ADMIN_PASSWORD).unwrap();
        let dashboard = Mutex::new(dashboard);

        let fake = FakeGateway::new();
        fake.push_text(Err(LlmError::Api {
            status: 500,
            message: "upstream down".to_string(),
        }));
        assert!(run_attendance_analysis(&dashboard, &fake, id).await.is_err());
        assert!(dashboard.lock().await.ui().loading.is_empty());

        fake.push_text(Ok("Engaged, attends regularly".to_string()));
        run_attendance_analysis(&dashboard, &fake, id).await.unwrap();
        assert!(dashboard
            .lock()
            .await
            .ui()
            .attendance_analyses
            .contains_key(&id));
    }

    #[tokio::test]
    async fn test_same_consultant_cannot_be_analyzed_twice_concurrently() {
        let (_, mut dashboard, a) = with_consultant("Rae");
        dashboard.logout().unwrap();
        let b = dashboard.register("Sam", "pw").unwrap();
        dashboard.logout().unwrap();
        dashboard.login(ADMIN_NAME, ADMIN_PASSWORD).unwrap();

        dashboard.begin_attendance_analysis(a).unwrap();
        assert!(matches!(
            dashboard.begin_attendance_analysis(a),
            Err(AppError::InProgress(_))
        ));
        assert!(dashboard.begin_attendance_analysis(b).is_ok());
        assert!(dashboard.ui().is_loading(PendingOp::AttendanceAnalysis(a)));
        assert!(dashboard.ui().is_loading(PendingOp::AttendanceAnalysis(b)));
    }

    #[tokio::test]
    async fn test_opportunity_analysis_requires_data() {
        let (_, mut dashboard, _) = with_consultant("Rae");
        dashboard.log_opportunity("Insurance claims portal").unwrap();
        dashboard.logout().unwrap();
        dashboard.login(ADMIN_NAME, ADMIN_PASSWORD).unwrap();
        assert!(matches!(
            dashboard.begin_opportunity_analysis(Some(Department::Finance)),
            Err(AppError::Validation(_))
        ));

        let dashboard = Mutex::new(dashboard);
        let fake = FakeGateway::new();
        fake.push_text(Ok("Claims work dominates".to_string()));
        run_opportunity_analysis(&dashboard, &fake, None)
            .await
            .unwrap();
        let d = dashboard.lock().await;
        let analysis = d.ui().opportunity_analysis.as_ref().unwrap();
        assert_eq!(analysis.scope, None);
        assert_eq!(analysis.text, "Claims work dominates");
        assert!(fake.prompts.lock().unwrap()[0].contains("Insurance claims portal"));
    }

    #[tokio::test]
    async fn test_relogin_cannot_start_a_second_resume_analysis() {
        let (_, mut dashboard, id) = with_consultant("Rae");
        let (_, ticket) = dashboard.begin_resume_analysis("resume").unwrap();
        dashboard.logout().unwrap();
        dashboard.login("Rae", "pw").unwrap();

        assert!(dashboard.ui().is_loading(PendingOp::ResumeAnalysis(id)));
        assert!(matches!(
            dashboard.begin_resume_analysis("resume"),
            Err(AppError::InProgress(_))
        ));

        let dashboard = Mutex::new(dashboard);
        let fake = FakeGateway::new();
        fake.push_structured(Ok(analysis("Updated", &["Spark"])));
        let result = ai::analyze_resume(&fake, "resume").await;
        dashboard
            .lock()
            .await
            .finish_resume_analysis(id, ticket, result)
            .unwrap();

        let d = dashboard.lock().await;
        assert!(d.ui().loading.is_empty());
        assert_eq!(d.consultant(id).unwrap().skills, vec!["Spark"]);
        assert_eq!(d.ui().notifications.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_suggestion_is_not_reported_to_the_next_user() {
        let (_, mut dashboard, rae) = with_consultant("Rae");
        let (_, ticket, _) = dashboard.begin_training_suggestion().unwrap();
        dashboard.logout().unwrap();
        dashboard.register("Sam", "pw").unwrap();

        dashboard
            .finish_training_suggestion(
                rae,
                ticket,
                Err(LlmError::Api {
                    status: 500,
                    message: "upstream down".to_string(),
                }),
            )
            .unwrap();

        assert!(dashboard.ui().notifications.is_empty());
        assert!(dashboard.ui().loading.is_empty());
        assert!(dashboard.ui().training_suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_late_results_are_not_shown_to_the_next_user() {
        let (_, mut dashboard, rae) = with_consultant("Rae");
        let (_, suggestion, _) = dashboard.begin_training_suggestion().unwrap();
        let (_, resume) = dashboard.begin_resume_analysis("resume").unwrap();
        dashboard.logout().unwrap();
        dashboard.login(ADMIN_NAME, ADMIN_PASSWORD).unwrap();

        dashboard
            .finish_training_suggestion(rae, suggestion, Ok("1. Spark".to_string()))
            .unwrap();
        let fake = FakeGateway::new();
        fake.push_structured(Ok(analysis("Updated", &["Spark"])));
        let result = ai::analyze_resume(&fake, "resume").await;
        dashboard
            .finish_resume_analysis(rae, resume, result)
            .unwrap();

        assert!(dashboard.ui().training_suggestions.is_empty());
        assert!(dashboard.ui().notifications.is_empty());
        assert!(dashboard.ui().loading.is_empty());
        // The analysis is Rae's data and is kept.
        let c = dashboard.consultant(rae).unwrap();
        assert_eq!(c.resume_status, ResumeStatus::Updated);
        assert!(c.workflow.resume_updated);
    }
}
