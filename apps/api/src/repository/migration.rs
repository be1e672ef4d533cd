//! Structural upgrades applied to every stored consultant record on load.
//!
//! Works on raw JSON so older shapes can be read before they are typed. Every step is
//! a no-op on an already-upgraded record, and keys this module does not touch are
//! carried through unchanged.

use serde_json::{json, Map, Value};

use crate::credentials::hash_password;
use crate::models::consultant::{default_meetings, weekly_title, DEFAULT_MEETING_COUNT};

pub fn migrate_record(record: Value) -> Value {
    let Value::Object(mut obj) = record else {
        return record;
    };

    normalize_opportunities(&mut obj);

    if !obj.contains_key("trainingHistory") {
        obj.insert("trainingHistory".to_string(), Value::Array(Vec::new()));
    }

    // Legacy attendance is consumed only when it is the source of the meetings.
    if !obj.contains_key("meetings") {
        let legacy_attendance = obj.remove("attendance");
        let meetings = match legacy_attendance.as_ref().and_then(attendance_counts) {
            Some((total, completed)) => meetings_from_attendance(total, completed),
            None => serde_json::to_value(default_meetings()).unwrap_or_default(),
        };
        obj.insert("meetings".to_string(), meetings);
    }

    hash_plaintext_password(&mut obj);

    Value::Object(obj)
}

fn normalize_opportunities(obj: &mut Map<String, Value>) {
    let replacement = match obj.get("opportunities") {
        None | Some(Value::Null) => Some(0),
        Some(Value::Number(n)) => Some(n.as_u64().unwrap_or(0)),
        Some(_) => None,
    };
    if let Some(count) = replacement {
        obj.insert(
            "opportunities".to_string(),
            json!({ "count": count, "descriptions": [] }),
        );
    }
}

fn attendance_counts(attendance: &Value) -> Option<(u32, u32)> {
    let total = attendance.get("total")?.as_u64()?;
    let completed = attendance
        .get("completed")
        .and_then(Value::as_u64)
        .unwrap_or(0);
    let total = u32::try_from(total).unwrap_or(DEFAULT_MEETING_COUNT);
    let completed = u32::try_from(completed).unwrap_or(u32::MAX).min(total);
    Some((total, completed))
}

fn meetings_from_attendance(total: u32, completed: u32) -> Value {
    let meetings: Vec<Value> = (1..=total)
        .map(|week| {
            json!({
                "id": week,
                "title": weekly_title(week),
                "status": if week <= completed { "Attended" } else { "Pending" },
            })
        })
        .collect();
    Value::Array(meetings)
}

fn hash_plaintext_password(obj: &mut Map<String, Value>) {
    if obj.contains_key("passwordHash") {
        return;
    }
    if let Some(Value::String(plain)) = obj.remove("password") {
        obj.insert(
            "passwordHash".to_string(),
            Value::String(hash_password(&plain)),
        );
    }
}
