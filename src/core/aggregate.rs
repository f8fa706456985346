use crate::core::stats::RunStats;
use crate::domain::model::LoadResult;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Fans in results from both lanes, tallies them, and forwards every
/// result unchanged. The inbound channel closes only once both lane
/// senders are dropped, so the stage never ends while a lane still has
/// work in flight.
pub fn spawn_aggregator(
    mut rx: mpsc::Receiver<LoadResult>,
    out: mpsc::Sender<LoadResult>,
    stats: Arc<RunStats>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(result) = rx.recv().await {
            stats.record_result(result.lane, result.is_success());
            if out.send(result).await.is_err() {
                break;
            }
        }
    })
}
