use crate::domain::model::{Record, TransformFn};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::mpsc;

/// Chains one concurrent stage per transform; each record passes through
/// the stages left to right, order-preserving and 1:1.
pub fn spawn_pipeline(
    rx: mpsc::Receiver<Record>,
    stages: Vec<TransformFn>,
    capacity: usize,
) -> mpsc::Receiver<Record> {
    let mut rx = rx;
    for stage in stages {
        rx = spawn_stage(rx, stage, capacity);
    }
    rx
}

fn spawn_stage(
    mut rx: mpsc::Receiver<Record>,
    stage: TransformFn,
    capacity: usize,
) -> mpsc::Receiver<Record> {
    let (tx, out) = mpsc::channel(capacity);
    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            if tx.send(stage(record)).await.is_err() {
                break;
            }
        }
    });
    out
}

/// Backfills whichever of `created_at`/`updated_at` is empty from the
/// other. A record with both set, or both empty, is unchanged.
pub fn correct_timestamps(mut record: Record) -> Record {
    let created = record
        .get("created_at")
        .and_then(Value::as_str)
        .map(str::to_string);
    let updated = record
        .get("updated_at")
        .and_then(Value::as_str)
        .map(str::to_string);

    match (created.as_deref(), updated.as_deref()) {
        (Some(""), Some(updated)) if !updated.is_empty() => {
            record.insert("created_at", Value::String(updated.to_string()));
        }
        (Some(created), Some("")) if !created.is_empty() => {
            record.insert("updated_at", Value::String(created.to_string()));
        }
        _ => {}
    }
    record
}

/// Drops the named fields from every record.
pub fn remove_fields(fields: Vec<String>) -> TransformFn {
    Box::new(move |mut record| {
        for field in &fields {
            record.remove(field);
        }
        record
    })
}

/// Moves values from old field names to new ones. A mapping whose old and
/// new names coincide leaves the value in place.
pub fn rename_fields(renames: HashMap<String, String>) -> TransformFn {
    Box::new(move |mut record| {
        for (old, new) in &renames {
            if old == new {
                continue;
            }
            if let Some(value) = record.remove(old) {
                record.insert(new.clone(), value);
            }
        }
        record
    })
}
