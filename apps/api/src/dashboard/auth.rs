use chrono::Utc;
use tracing::{info, warn};

use crate::credentials::{hash_password, verify_password};
use crate::dashboard::Dashboard;
use crate::errors::AppError;
use crate::models::consultant::{Consultant, ConsultantId};
use crate::models::session::SessionIdentity;
use crate::workflow::same_name;

/// The built-in administrator. Not stored in the repository.
pub const ADMIN_NAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

impl Dashboard {
    pub fn login(&mut self, name: &str, password: &str) -> Result<SessionIdentity, AppError> {
        let session = if name.trim() == ADMIN_NAME && password == ADMIN_PASSWORD {
            SessionIdentity::admin()
        } else {
            self.consultants
                .iter()
                .find(|c| same_name(&c.name, name))
                .filter(|c| verify_password(&c.password_hash, password))
                .map(|c| SessionIdentity::Consultant { id: c.id })
                .ok_or(AppError::InvalidCredentials)?
        };

        self.start_session(session)?;
        info!("Logged in: {session:?}");
        Ok(session)
    }

    /// Creates a consultant and logs them in. A failed registration never touches the
    /// repository.
    pub fn register(&mut self, name: &str, password: &str) -> Result<ConsultantId, AppError> {
        let name = name.trim();
        if name.is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "Name and password are required".to_string(),
            ));
        }
        if same_name(name, ADMIN_NAME) {
            return Err(AppError::Validation(format!("'{name}' is a reserved name")));
        }
        if self.consultants.iter().any(|c| same_name(&c.name, name)) {
            return Err(AppError::DuplicateName(name.to_string()));
        }

        let id = self.next_consultant_id();
        let consultant = Consultant::new(id, name.to_string(), hash_password(password));
        self.commit(|list| {
            list.push(consultant);
            Ok(())
        })?;
        info!("Registered consultant {id} ({name})");

        self.start_session(SessionIdentity::Consultant { id })?;
        Ok(id)
    }

    pub fn logout(&mut self) -> Result<(), AppError> {
        self.repo.clear_session()?;
        self.session = None;
        self.ui.reset_view();
        Ok(())
    }

    /// The logged-in consultant's id. A session whose consultant has vanished is ended.
    pub fn require_consultant(&mut self) -> Result<ConsultantId, AppError> {
        match self.session {
            None => Err(AppError::Unauthorized),
            Some(SessionIdentity::Admin { .. }) => Err(AppError::Forbidden),
            Some(SessionIdentity::Consultant { id }) => {
                if self.consultant(id).is_some() {
                    Ok(id)
                } else {
                    warn!("Consultant {id} missing for active session, forcing logout");
                    self.logout()?;
                    Err(AppError::SessionLost)
                }
            }
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        match self.session {
            None => Err(AppError::Unauthorized),
            Some(s) if s.is_admin() => Ok(()),
            Some(_) => Err(AppError::Forbidden),
        }
    }

    fn start_session(&mut self, session: SessionIdentity) -> Result<(), AppError> {
        self.repo.save_session(&session)?;
        self.session = Some(session);
        self.ui.reset_view();
        Ok(())
    }

    /// Creation timestamp in milliseconds, bumped past any id already taken.
    fn next_consultant_id(&self) -> ConsultantId {
        let mut id = Utc::now().timestamp_millis();
        while self.consultants.iter().any(|c| c.id == id) {
            id += 1;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use crate::credentials::verify_password;
    use crate::dashboard::test_support::*;
    use crate::errors::AppError;
    use crate::models::session::SessionIdentity;
    use crate::repository::{CONSULTANTS_KEY, SESSION_KEY};
    use crate::storage::KvStore;

    use super::*;

    #[test]
    fn test_duplicate_registration_is_case_insensitive() {
        let (store, mut dashboard) = empty_dashboard();
        dashboard.register("Alice", "pw1").unwrap();
        dashboard.logout().unwrap();
        let saved = store.get(CONSULTANTS_KEY).unwrap();

        let err = dashboard.register("alice", "pw2").unwrap_err();
        assert!(matches!(err, AppError::DuplicateName(_)));
        assert_eq!(store.get(CONSULTANTS_KEY).unwrap(), saved);

        let list = dashboard.consultants();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Alice");
        assert!(verify_password(&list[0].password_hash, "pw1"));
        assert!(!verify_password(&list[0].password_hash, "pw2"));
        assert!(dashboard.session().is_none());
    }

    #[test]
    fn test_register_logs_in_and_persists_session() {
        let (store, dashboard, id) = with_consultant("Bea");
        assert_eq!(dashboard.session(), Some(SessionIdentity::Consultant { id }));
        let raw = store.get(SESSION_KEY).unwrap().unwrap();
        assert_eq!(
            serde_json::from_str::<serde_json::Value>(&raw).unwrap()["type"],
            "consultant"
        );
    }

    #[test]
    fn test_register_rejects_blank_and_reserved() {
        let (_, mut dashboard) = empty_dashboard();
        assert!(matches!(
            dashboard.register("  ", "pw"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            dashboard.register("Bea", ""),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            dashboard.register("ADMIN", "pw"),
            Err(AppError::Validation(_))
        ));
        assert!(dashboard.consultants().is_empty());
    }

    #[test]
    fn test_login_is_case_insensitive_on_name_only() {
        let (_, mut dashboard, id) = with_consultant("Bea");
        dashboard.logout().unwrap();
        assert_eq!(
            dashboard.login("bEA", "pw").unwrap(),
            SessionIdentity::Consultant { id }
        );
        dashboard.logout().unwrap();
        assert!(matches!(
            dashboard.login("Bea", "PW"),
            Err(AppError::InvalidCredentials)
        ));
        assert!(dashboard.session().is_none());
    }

    #[test]
    fn test_admin_login() {
        let (_, mut dashboard) = empty_dashboard();
        assert!(dashboard.login(ADMIN_NAME, "wrong").is_err());
        let session = dashboard.login(ADMIN_NAME, ADMIN_PASSWORD).unwrap();
        assert!(session.is_admin());
        assert!(dashboard.require_admin().is_ok());
        assert!(matches!(
            dashboard.require_consultant(),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn test_logout_clears_stored_session() {
        let (store, mut dashboard, _) = with_consultant("Bea");
        dashboard.logout().unwrap();
        assert!(dashboard.session().is_none());
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
        assert!(matches!(
            dashboard.require_consultant(),
            Err(AppError::Unauthorized)
        ));
    }

    #[test]
    fn test_missing_record_forces_logout() {
        let (_, mut dashboard, id) = with_consultant("Bea");
        dashboard.consultants.retain(|c| c.id != id);
        assert!(matches!(
            dashboard.require_consultant(),
            Err(AppError::SessionLost)
        ));
        assert!(dashboard.session().is_none());
    }

    #[test]
    fn test_ids_are_unique_even_within_one_millisecond() {
        let (_, mut dashboard) = empty_dashboard();
        let a = dashboard.register("A", "pw").unwrap();
        let b = dashboard.register("B", "pw").unwrap();
        let c = dashboard.register("C", "pw").unwrap();
        assert!(a != b && b != c && a != c);
    }
}
