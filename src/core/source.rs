use crate::core::stats::RunStats;
use crate::domain::model::Record;
use crate::utils::error::Result;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Streams the rows of one extract file as field-named records.
///
/// The header row is read eagerly, so a missing or unreadable header fails
/// the run before any record work starts. The row sequence is lazy, finite
/// and non-restartable.
pub struct RecordSource {
    reader: csv::Reader<File>,
    headers: csv::StringRecord,
}

impl RecordSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path.as_ref())?;
        let headers = reader.headers()?.clone();
        Ok(Self { reader, headers })
    }

    /// Starts the streaming stage. Rows flow into the returned channel in
    /// file order; the handle resolves with `Err` on a mid-stream read
    /// fault, after the channel has been closed so downstream stages drain
    /// what was already emitted.
    pub fn spawn(
        self,
        capacity: usize,
        stats: Arc<RunStats>,
    ) -> (mpsc::Receiver<Record>, JoinHandle<Result<()>>) {
        let (tx, rx) = mpsc::channel(capacity);
        let Self {
            mut reader,
            headers,
        } = self;

        let handle = tokio::task::spawn_blocking(move || {
            for row in reader.records() {
                let row = row?;
                let record = Record::from_row(&headers, &row);
                if tx.blocking_send(record).is_err() {
                    // Downstream went away; nothing left to feed.
                    return Ok(());
                }
                stats.record_extracted();
            }
            Ok(())
        });

        (rx, handle)
    }
}
