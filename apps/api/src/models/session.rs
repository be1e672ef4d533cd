use serde::{Deserialize, Serialize};

use crate::models::consultant::ConsultantId;

/// Persisted login identity. Serialized as `{"id": 1700000000000, "type": "consultant"}`
/// or `{"id": "admin", "type": "admin"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionIdentity {
    Consultant { id: ConsultantId },
    Admin { id: AdminMarker },
}

impl SessionIdentity {
    pub fn admin() -> Self {
        SessionIdentity::Admin { id: AdminMarker }
    }

    pub fn consultant_id(&self) -> Option<ConsultantId> {
        match self {
            SessionIdentity::Consultant { id } => Some(*id),
            SessionIdentity::Admin { .. } => None,
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, SessionIdentity::Admin { .. })
    }
}

/// The literal `"admin"` id carried by the administrator session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminMarker;

impl Serialize for AdminMarker {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str("admin")
    }
}

impl<'de> Deserialize<'de> for AdminMarker {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s == "admin" {
            Ok(AdminMarker)
        } else {
            Err(serde::de::Error::custom(format!(
                "expected \"admin\", got {s:?}"
            )))
        }
    }
}
