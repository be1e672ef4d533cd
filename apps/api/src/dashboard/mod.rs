//! Dashboard: the single owner of the consultant list, the login session and the
//! transient UI state. Every mutation goes through a method here; callers hold the
//! dashboard behind one async mutex so handlers never interleave.

pub mod actions;
pub mod ai_ops;
pub mod auth;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::models::consultant::{Consultant, ConsultantId, Department};
use crate::models::session::SessionIdentity;
use crate::repository::ConsultantRepository;
use crate::storage::StorageError;
use crate::workflow::ConsultantFilter;

/// Consultant dashboard tabs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Resume,
    Attendance,
    Training,
    Opportunities,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Resume, Tab::Attendance, Tab::Training, Tab::Opportunities];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tab::Resume => "resume",
            Tab::Attendance => "attendance",
            Tab::Training => "training",
            Tab::Opportunities => "opportunities",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub id: u64,
    pub kind: NotificationKind,
    pub message: String,
}

/// Identity of an in-flight AI call. At most one call per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PendingOp {
    ResumeAnalysis(ConsultantId),
    TrainingSuggestion(ConsultantId),
    AttendanceAnalysis(ConsultantId),
    OpportunityAnalysis,
}

impl PendingOp {
    pub fn label(&self) -> &'static str {
        match self {
            PendingOp::ResumeAnalysis(_) => "Resume analysis",
            PendingOp::TrainingSuggestion(_) => "Training suggestion",
            PendingOp::AttendanceAnalysis(_) => "Attendance analysis",
            PendingOp::OpportunityAnalysis => "Opportunity analysis",
        }
    }
}

/// A started AI call: its loading key and the session that asked for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    op: PendingOp,
    owner: SessionIdentity,
}

impl Ticket {
    pub fn op(&self) -> PendingOp {
        self.op
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpportunityAnalysis {
    pub scope: Option<Department>,
    pub text: String,
}

/// Most recent notifications kept on screen.
pub const MAX_NOTIFICATIONS: usize = 20;

/// Transient view state. Never persisted. Login and logout reset everything except
/// the loading keys, which belong to calls still in flight.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub active_tab: Tab,
    pub login_error: Option<String>,
    pub notifications: Vec<Notification>,
    pub filter: ConsultantFilter,
    pub loading: HashSet<PendingOp>,
    pub training_suggestions: HashMap<ConsultantId, String>,
    pub attendance_analyses: HashMap<ConsultantId, String>,
    pub opportunity_analysis: Option<OpportunityAnalysis>,
    next_notification_id: u64,
}

impl UiState {
    pub fn is_loading(&self, op: PendingOp) -> bool {
        self.loading.contains(&op)
    }

    fn reset_view(&mut self) {
        *self = UiState {
            loading: std::mem::take(&mut self.loading),
            next_notification_id: self.next_notification_id,
            ..UiState::default()
        };
    }
}

pub struct Dashboard {
    repo: ConsultantRepository,
    consultants: Vec<Consultant>,
    session: Option<SessionIdentity>,
    ui: UiState,
}

impl Dashboard {
    /// Loads consultants and restores the stored session. A session pointing at a
    /// consultant that no longer exists is cleared.
    pub fn open(repo: ConsultantRepository) -> Result<Self, StorageError> {
        let consultants = repo.load()?;
        let mut session = repo.load_session()?;

        if let Some(id) = session.and_then(|s| s.consultant_id()) {
            if !consultants.iter().any(|c| c.id == id) {
                warn!("Stored session refers to unknown consultant {id}, clearing it");
                repo.clear_session()?;
                session = None;
            }
        }

        Ok(Self {
            repo,
            consultants,
            session,
            ui: UiState::default(),
        })
    }

    pub fn consultants(&self) -> &[Consultant] {
        &self.consultants
    }

    pub fn consultant(&self, id: ConsultantId) -> Option<&Consultant> {
        self.consultants.iter().find(|c| c.id == id)
    }

    pub fn session(&self) -> Option<SessionIdentity> {
        self.session
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.ui.next_notification_id += 1;
        self.ui.notifications.push(Notification {
            id: self.ui.next_notification_id,
            kind,
            message: message.into(),
        });
        let overflow = self.ui.notifications.len().saturating_sub(MAX_NOTIFICATIONS);
        self.ui.notifications.drain(..overflow);
    }

    pub fn dismiss_notification(&mut self, id: u64) {
        self.ui.notifications.retain(|n| n.id != id);
    }

    /// Surfaces a recoverable error: inline on the login form when nobody is logged in,
    /// otherwise as a notification.
    pub fn report(&mut self, error: &AppError) {
        if self.session.is_none() {
            self.ui.login_error = Some(error.to_string());
        } else {
            self.notify(NotificationKind::Error, error.to_string());
        }
    }

    /// Applies `f` to a copy of the list, saves the copy, and only then makes it live.
    /// A failed closure or a failed save leaves the dashboard untouched.
    fn commit<T>(
        &mut self,
        f: impl FnOnce(&mut Vec<Consultant>) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        let mut next = self.consultants.clone();
        let out = f(&mut next)?;
        self.repo.save(&next)?;
        self.consultants = next;
        Ok(out)
    }

    fn commit_consultant<T>(
        &mut self,
        id: ConsultantId,
        f: impl FnOnce(&mut Consultant) -> Result<T, AppError>,
    ) -> Result<T, AppError> {
        self.commit(|list| {
            let consultant = list
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| AppError::NotFound(format!("Consultant {id} not found")))?;
            f(consultant)
        })
    }

    fn begin(&mut self, op: PendingOp) -> Result<Ticket, AppError> {
        let owner = self.session.ok_or(AppError::Unauthorized)?;
        if !self.ui.loading.insert(op) {
            return Err(AppError::InProgress(op.label().to_string()));
        }
        Ok(Ticket { op, owner })
    }

    /// Clears the loading key. Returns whether the session that started the call is
    /// still the active one; if not, its results must not reach the current view.
    fn end(&mut self, ticket: Ticket) -> bool {
        self.ui.loading.remove(&ticket.op);
        self.session == Some(ticket.owner)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use super::*;
    use crate::storage::MemoryStore;

    pub fn empty_dashboard() -> (Arc<MemoryStore>, Dashboard) {
        let store = Arc::new(MemoryStore::new());
        let repo = ConsultantRepository::new(store.clone());
        let dashboard = Dashboard::open(repo).unwrap();
        (store, dashboard)
    }

    /// Registers `name` and leaves them logged in.
    pub fn with_consultant(name: &str) -> (Arc<MemoryStore>, Dashboard, ConsultantId) {
        let (store, mut dashboard) = empty_dashboard();
        let id = dashboard.register(name, "pw").unwrap();
        (store, dashboard, id)
    }
}
