//! Consultant repository: the typed view over the `consultants` and `session` blobs.

pub mod migration;

use std::sync::Arc;

use serde_json::Value;
use tracing::{info, warn};

use crate::models::consultant::Consultant;
use crate::models::session::SessionIdentity;
use crate::storage::{KvStore, StorageError};

pub const CONSULTANTS_KEY: &str = "consultants";
pub const SESSION_KEY: &str = "session";

#[derive(Clone)]
pub struct ConsultantRepository {
    store: Arc<dyn KvStore>,
}

impl ConsultantRepository {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    /// Reads and migrates the stored list. A missing blob is an empty list; a blob that
    /// cannot be decoded is an error so it is never overwritten by a later save.
    pub fn load(&self) -> Result<Vec<Consultant>, StorageError> {
        let Some(raw) = self.store.get(CONSULTANTS_KEY)? else {
            info!("No stored consultants, starting empty");
            return Ok(Vec::new());
        };

        let corrupt = |message: String| StorageError::Corrupt {
            key: CONSULTANTS_KEY.to_string(),
            message,
        };

        let records: Vec<Value> = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Array(records)) => records,
            Ok(Value::Null) => Vec::new(),
            Ok(other) => return Err(corrupt(format!("expected a list, found {other}"))),
            Err(e) => return Err(corrupt(e.to_string())),
        };

        let consultants = records
            .into_iter()
            .enumerate()
            .map(|(i, record)| {
                serde_json::from_value(migration::migrate_record(record))
                    .map_err(|e| corrupt(format!("record {i}: {e}")))
            })
            .collect::<Result<Vec<Consultant>, _>>()?;

        info!("Loaded {} consultants", consultants.len());
        Ok(consultants)
    }

    /// Writes the whole list in one overwrite.
    pub fn save(&self, consultants: &[Consultant]) -> Result<(), StorageError> {
        let json = serde_json::to_string(consultants)?;
        self.store.set(CONSULTANTS_KEY, &json)
    }

    pub fn load_session(&self) -> Result<Option<SessionIdentity>, StorageError> {
        let Some(raw) = self.store.get(SESSION_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                // An unreadable session only costs a re-login.
                warn!("Discarding unreadable session blob: {e}");
                self.store.remove(SESSION_KEY)?;
                Ok(None)
            }
        }
    }

    pub fn save_session(&self, session: &SessionIdentity) -> Result<(), StorageError> {
        let json = serde_json::to_string(session)?;
        self.store.set(SESSION_KEY, &json)
    }

    pub fn clear_session(&self) -> Result<(), StorageError> {
        self.store.remove(SESSION_KEY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use serde_json::json;

    fn repo_with(raw: Option<&str>) -> (Arc<MemoryStore>, ConsultantRepository) {
        let store = Arc::new(MemoryStore::new());
        if let Some(raw) = raw {
            store.set(CONSULTANTS_KEY, raw).unwrap();
        }
        let repo = ConsultantRepository::new(store.clone());
        (store, repo)
    }

    #[test]
    fn test_missing_blob_loads_empty() {
        let (_, repo) = repo_with(None);
        assert!(repo.load().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_blob_is_an_error() {
        let (_, repo) = repo_with(Some("{not json"));
        assert!(matches!(repo.load(), Err(StorageError::Corrupt { .. })));
    }

    #[test]
    fn test_save_then_load_preserves_order() {
        let (_, repo) = repo_with(None);
        let list = vec![
            Consultant::new(2, "Zed".to_string(), "h".to_string()),
            Consultant::new(1, "Amy".to_string(), "h".to_string()),
        ];
        repo.save(&list).unwrap();
        assert_eq!(repo.load().unwrap(), list);
    }

    #[test]
    fn test_load_migrates_legacy_records() {
        let raw = json!([{
            "id": 9,
            "name": "Old",
            "password": "pw",
            "attendance": {"total": 3, "completed": 1},
            "opportunities": 0
        }])
        .to_string();
        let (_, repo) = repo_with(Some(&raw));
        let list = repo.load().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].meetings.len(), 3);
        assert!(list[0].extra.get("attendance").is_none());
    }

    #[test]
    fn test_session_round_trip_and_clear() {
        let (_, repo) = repo_with(None);
        assert_eq!(repo.load_session().unwrap(), None);
        repo.save_session(&SessionIdentity::Consultant { id: 5 }).unwrap();
        assert_eq!(
            repo.load_session().unwrap(),
            Some(SessionIdentity::Consultant { id: 5 })
        );
        repo.clear_session().unwrap();
        assert_eq!(repo.load_session().unwrap(), None);
    }

    #[test]
    fn test_garbage_session_is_discarded() {
        let (store, repo) = repo_with(None);
        store.set(SESSION_KEY, "\"who?\"").unwrap();
        assert_eq!(repo.load_session().unwrap(), None);
        assert_eq!(store.get(SESSION_KEY).unwrap(), None);
    }
}
