//! Best-effort audit trail.
//!
//! Entries are written after the audited change has committed. A failed
//! write is logged and otherwise ignored, the change itself stands.

use chrono::Local;
use sea_orm::{ActiveValue::Set, ConnectionTrait, EntityTrait};
use serde_json::{json, Map, Value};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entity::{audit_log, prelude::*, sea_orm_active_enums::AuditAction};

#[derive(Debug, Clone)]
pub struct AuditEntry<'a> {
    pub entity_type: &'a str,
    pub entity_id: String,
    pub action: AuditAction,
    pub changes: Option<Value>,
    pub performed_by: &'a str,
    pub description: Option<String>,
}

pub async fn record<C: ConnectionTrait>(db: &C, entry: AuditEntry<'_>) {
    let model = audit_log::ActiveModel {
        id: Set(Uuid::new_v4()),
        created_at: Set(Local::now().fixed_offset()),
        entity_type: Set(entry.entity_type.to_owned()),
        entity_id: Set(entry.entity_id.clone()),
        action: Set(entry.action),
        changes: Set(entry.changes),
        performed_by: Set(entry.performed_by.to_owned()),
        description: Set(entry.description),
    };

    match AuditLog::insert(model).exec_without_returning(db).await {
        Ok(_) => debug!(entity_type = entry.entity_type, entity_id = %entry.entity_id, action = ?entry.action, "audit entry recorded"),
        Err(err) => warn!(error = %err, entity_type = entry.entity_type, entity_id = %entry.entity_id, "unable to record audit entry"),
    }
}

/// Field level difference of two JSON objects as
/// `{"field": {"old": .., "new": ..}}`. Fields present on one side only show
/// up with `null` on the other.
pub fn diff(old: &Value, new: &Value) -> Map<String, Value> {
    let empty = Map::new();
    let old = old.as_object().unwrap_or(&empty);
    let new = new.as_object().unwrap_or(&empty);

    let mut changes = Map::new();

    for key in old.keys().chain(new.keys()) {
        if changes.contains_key(key) {
            continue;
        }

        let before = old.get(key).unwrap_or(&Value::Null);
        let after = new.get(key).unwrap_or(&Value::Null);

        if before != after {
            changes.insert(key.clone(), json!({ "old": before, "new": after }));
        }
    }

    changes
}
