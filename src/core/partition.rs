use crate::domain::model::{Lane, PartitionFn, Record};
use serde_json::Value;
use tokio::sync::mpsc;

/// Splits one inbound stream into the two lane streams. Relative order is
/// preserved within each lane; no ordering holds between lanes.
pub fn spawn_partition(
    mut rx: mpsc::Receiver<Record>,
    partition: PartitionFn,
    capacity: usize,
) -> (mpsc::Receiver<Record>, mpsc::Receiver<Record>) {
    let (import_tx, import_rx) = mpsc::channel(capacity);
    let (create_tx, create_rx) = mpsc::channel(capacity);

    tokio::spawn(async move {
        while let Some(record) = rx.recv().await {
            let sent = match partition(&record) {
                Lane::Import => import_tx.send(record).await.is_ok(),
                Lane::Create => create_tx.send(record).await.is_ok(),
            };
            if !sent {
                break;
            }
        }
    });

    (import_rx, create_rx)
}

/// Default lane policy: a record carrying a non-empty text marker imports;
/// an absent, empty, or non-text marker means the record is created fresh.
pub fn by_field_presence(field: impl Into<String>) -> PartitionFn {
    let field = field.into();
    Box::new(
        move |record: &Record| match record.get(&field).and_then(Value::as_str) {
            Some(marker) if !marker.is_empty() => Lane::Import,
            _ => Lane::Create,
        },
    )
}
