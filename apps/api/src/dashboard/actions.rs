//! Local (non-AI) mutations for consultants and the administrator.

use chrono::Utc;
use tracing::info;

use crate::dashboard::{Dashboard, NotificationKind, Tab};
use crate::errors::AppError;
use crate::models::consultant::{
    BenchStatus, ConsultantId, Department, MeetingId, TrainingRecord, TrainingStatus,
};
use crate::workflow::{merge_skills, same_name, ConsultantFilter};

/// Admin edit form. Skills replace the current set (deduplicated).
#[derive(Debug, Clone)]
pub struct ConsultantEdit {
    pub department: Department,
    pub status: BenchStatus,
    pub skills: Vec<String>,
}

impl Dashboard {
    pub fn select_tab(&mut self, tab: Tab) -> Result<(), AppError> {
        self.require_consultant()?;
        self.ui.active_tab = tab;
        Ok(())
    }

    /// Marks a meeting attended. Returns false (and changes nothing) when it already was.
    pub fn log_attendance(
        &mut self,
        meeting_id: MeetingId,
        notes: Option<String>,
    ) -> Result<bool, AppError> {
        let id = self.require_consultant()?;
        let (changed, title) = self.commit_consultant(id, |c| {
            let meeting = c
                .meeting_mut(meeting_id)
                .ok_or_else(|| AppError::NotFound(format!("Meeting {meeting_id} not found")))?;
            let changed = meeting.mark_attended(notes);
            let title = meeting.title.clone();
            if changed {
                c.workflow.attendance_reported = true;
            }
            Ok((changed, title))
        })?;

        if changed {
            info!("Consultant {id} attended meeting {meeting_id}");
            self.notify(NotificationKind::Success, format!("Attendance logged for {title}"));
        } else {
            self.notify(
                NotificationKind::Info,
                format!("{title} was already marked as attended"),
            );
        }
        Ok(changed)
    }

    /// Appends a completed training unless one with the same name is already recorded.
    pub fn log_training(&mut self, name: &str) -> Result<(), AppError> {
        let id = self.require_consultant()?;
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation("Training name is required".to_string()));
        }

        self.commit_consultant(id, |c| {
            if c.training_history.iter().any(|t| same_name(&t.name, name)) {
                return Err(AppError::Validation(format!(
                    "'{name}' is already in your training history"
                )));
            }
            c.training_history.push(TrainingRecord {
                name: name.to_string(),
                date: Utc::now().format("%Y-%m-%d").to_string(),
            });
            c.training_status = TrainingStatus::Completed;
            c.workflow.training_completed = true;
            Ok(())
        })?;

        self.notify(NotificationKind::Success, format!("Training '{name}' logged"));
        Ok(())
    }

    pub fn set_training_status(&mut self, status: TrainingStatus) -> Result<(), AppError> {
        let id = self.require_consultant()?;
        self.commit_consultant(id, |c| {
            c.training_status = status;
            if status == TrainingStatus::Completed {
                c.workflow.training_completed = true;
            }
            Ok(())
        })?;
        self.notify(
            NotificationKind::Success,
            format!("Training status set to {}", status.as_str()),
        );
        Ok(())
    }

    pub fn log_opportunity(&mut self, description: &str) -> Result<(), AppError> {
        let id = self.require_consultant()?;
        self.record_opportunity(id, description)
    }

    pub fn log_opportunity_for(
        &mut self,
        id: ConsultantId,
        description: &str,
    ) -> Result<(), AppError> {
        self.require_admin()?;
        self.record_opportunity(id, description)
    }

    fn record_opportunity(&mut self, id: ConsultantId, description: &str) -> Result<(), AppError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(AppError::Validation(
                "Opportunity description is required".to_string(),
            ));
        }
        let name = self.commit_consultant(id, |c| {
            c.opportunities.log(description.to_string());
            c.workflow.opportunities_logged = true;
            Ok(c.name.clone())
        })?;
        self.notify(
            NotificationKind::Success,
            format!("Opportunity logged for {name}"),
        );
        Ok(())
    }

    pub fn set_filter(&mut self, filter: ConsultantFilter) -> Result<(), AppError> {
        self.require_admin()?;
        self.ui.filter = filter;
        Ok(())
    }

    pub fn edit_consultant(&mut self, id: ConsultantId, edit: ConsultantEdit) -> Result<(), AppError> {
        self.require_admin()?;
        let name = self.commit_consultant(id, |c| {
            c.department = edit.department;
            c.status = edit.status;
            let mut skills = Vec::new();
            merge_skills(&mut skills, &edit.skills);
            c.skills = skills;
            Ok(c.name.clone())
        })?;
        info!("Admin updated consultant {id}");
        self.notify(NotificationKind::Success, format!("Saved changes to {name}"));
        Ok(())
    }

    pub fn delete_consultant(&mut self, id: ConsultantId) -> Result<(), AppError> {
        self.require_admin()?;
        let name = self.commit(|list| {
            let index = list
                .iter()
                .position(|c| c.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Consultant {id} not found")))?;
            Ok(list.remove(index).name)
        })?;
        self.ui.training_suggestions.remove(&id);
        self.ui.attendance_analyses.remove(&id);
        info!("Admin deleted consultant {id} ({name})");
        self.notify(NotificationKind::Success, format!("Deleted {name}"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::auth::{ADMIN_NAME, ADMIN_PASSWORD};
    use crate::dashboard::test_support::*;
    use crate::models::consultant::MeetingStatus;

    fn as_admin(dashboard: &mut Dashboard) {
        dashboard.logout().unwrap();
        dashboard.login(ADMIN_NAME, ADMIN_PASSWORD).unwrap();
    }

    #[test]
    fn test_log_attendance_on_meeting_three() {
        let (_, mut dashboard, id) = with_consultant("Ola");
        let before = dashboard.consultant(id).unwrap().meetings.clone();

        assert!(dashboard.log_attendance(3, Some("ok".to_string())).unwrap());

        let c = dashboard.consultant(id).unwrap();
        assert!(c.workflow.attendance_reported);
        for (old, new) in before.iter().zip(&c.meetings) {
            if new.id == 3 {
                assert_eq!(new.status, MeetingStatus::Attended);
                assert_eq!(new.notes.as_deref(), Some("ok"));
            } else {
                assert_eq!(old, new);
            }
        }
    }

    #[test]
    fn test_attendance_cannot_regress_or_be_rewritten() {
        let (_, mut dashboard, id) = with_consultant("Ola");
        dashboard.log_attendance(1, Some("first".to_string())).unwrap();
        assert!(!dashboard.log_attendance(1, Some("again".to_string())).unwrap());
        let m = &dashboard.consultant(id).unwrap().meetings[0];
        assert_eq!(m.status, MeetingStatus::Attended);
        assert_eq!(m.notes.as_deref(), Some("first"));
    }

    #[test]
    fn test_unknown_meeting_is_not_found() {
        let (_, mut dashboard, _) = with_consultant("Ola");
        assert!(matches!(
            dashboard.log_attendance(99, None),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_opportunity_count_matches_descriptions() {
        let (_, mut dashboard, id) = with_consultant("Ola");
        dashboard.log_opportunity("Retail analytics bid").unwrap();
        dashboard.log_opportunity("Claims automation").unwrap();
        assert!(dashboard.log_opportunity("   ").is_err());
        let c = dashboard.consultant(id).unwrap();
        assert_eq!(c.opportunities.count, 2);
        assert_eq!(c.opportunities.descriptions.len(), 2);
        assert!(c.workflow.opportunities_logged);
    }

    #[test]
    fn test_training_dedup_is_case_insensitive() {
        let (_, mut dashboard, id) = with_consultant("Ola");
        dashboard.log_training("AWS Solutions Architect").unwrap();
        assert!(matches!(
            dashboard.log_training("aws solutions architect"),
            Err(AppError::Validation(_))
        ));
        let c = dashboard.consultant(id).unwrap();
        assert_eq!(c.training_history.len(), 1);
        assert_eq!(c.training_history[0].date.len(), 10);
        assert_eq!(c.training_status, TrainingStatus::Completed);
        assert!(c.workflow.training_completed);
    }

    #[test]
    fn test_training_flag_survives_status_change() {
        let (_, mut dashboard, id) = with_consultant("Ola");
        dashboard
            .set_training_status(TrainingStatus::InProgress)
            .unwrap();
        assert!(!dashboard.consultant(id).unwrap().workflow.training_completed);
        dashboard
            .set_training_status(TrainingStatus::Completed)
            .unwrap();
        dashboard
            .set_training_status(TrainingStatus::InProgress)
            .unwrap();
        let c = dashboard.consultant(id).unwrap();
        assert_eq!(c.training_status, TrainingStatus::InProgress);
        assert!(c.workflow.training_completed);
    }

    #[test]
    fn test_select_tab() {
        let (_, mut dashboard, _) = with_consultant("Ola");
        dashboard.select_tab(Tab::Opportunities).unwrap();
        assert_eq!(dashboard.ui().active_tab, Tab::Opportunities);
    }

    #[test]
    fn test_admin_only_actions_reject_consultants() {
        let (_, mut dashboard, id) = with_consultant("Ola");
        assert!(matches!(
            dashboard.delete_consultant(id),
            Err(AppError::Forbidden)
        ));
        assert!(matches!(
            dashboard.set_filter(ConsultantFilter::default()),
            Err(AppError::Forbidden)
        ));
        assert_eq!(dashboard.consultants().len(), 1);
    }

    #[test]
    fn test_admin_edit_and_log_for() {
        let (_, mut dashboard, id) = with_consultant("Ola");
        as_admin(&mut dashboard);
        dashboard
            .edit_consultant(
                id,
                ConsultantEdit {
                    department: Department::Healthcare,
                    status: BenchStatus::InProject,
                    skills: vec!["HL7".to_string(), "hl7".to_string(), "FHIR".to_string()],
                },
            )
            .unwrap();
        dashboard.log_opportunity_for(id, "Hospital EHR rollout").unwrap();

        let c = dashboard.consultant(id).unwrap();
        assert_eq!(c.department, Department::Healthcare);
        assert_eq!(c.status, BenchStatus::InProject);
        assert_eq!(c.skills, vec!["HL7", "FHIR"]);
        assert_eq!(c.opportunities.count, 1);
    }

    #[test]
    fn test_admin_delete() {
        let (store, mut dashboard, id) = with_consultant("Ola");
        as_admin(&mut dashboard);
        dashboard.delete_consultant(id).unwrap();
        assert!(dashboard.consultants().is_empty());
        assert!(matches!(
            dashboard.delete_consultant(id),
            Err(AppError::NotFound(_))
        ));
        let reopened =
            Dashboard::open(crate::repository::ConsultantRepository::new(store)).unwrap();
        assert!(reopened.consultants().is_empty());
    }
}
