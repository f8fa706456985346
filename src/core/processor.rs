use crate::core::aggregate::spawn_aggregator;
use crate::core::load::spawn_loader;
use crate::core::partition::spawn_partition;
use crate::core::postprocess::spawn_post_process;
use crate::core::source::RecordSource;
use crate::core::stats::{RunStats, StatsSnapshot};
use crate::core::transform::spawn_pipeline;
use crate::domain::model::Lane;
use crate::domain::ports::{Connections, ProcessDefinition};
use crate::utils::error::{EtlError, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Drives one process definition from extract file to post-processed
/// results.
pub struct Processor {
    definition: Box<dyn ProcessDefinition>,
    conns: Connections,
    channel_capacity: usize,
}

impl Processor {
    pub fn new(
        definition: Box<dyn ProcessDefinition>,
        conns: Connections,
        channel_capacity: usize,
    ) -> Self {
        Self {
            definition,
            conns,
            channel_capacity: channel_capacity.max(1),
        }
    }

    /// Runs the topology to completion: every extracted record reaches one
    /// terminal result and every success is post-processed before this
    /// returns.
    ///
    /// Stages hand records over through bounded channels, so a slow sink
    /// throttles everything upstream of it. A channel closes only when its
    /// producing stage finishes, and stages are joined producer-first, so
    /// no stage's outbound channel closes while inbound work remains.
    pub async fn run(&self) -> Result<StatsSnapshot> {
        let definition = &self.definition;
        let cap = self.channel_capacity;
        let stats = Arc::new(RunStats::new());

        let path = self.conns.extract_path(definition.extract_file_name());
        tracing::info!(file = %path.display(), "starting extract");
        let source = RecordSource::open(&path)?;

        let (rows_rx, source_handle) = source.spawn(cap, stats.clone());
        let pre_rx = spawn_pipeline(rows_rx, definition.pre_transforms(), cap);
        let (import_rx, create_rx) = spawn_partition(pre_rx, definition.partition(), cap);
        let import_rx = spawn_pipeline(import_rx, definition.import_transforms(), cap);
        let create_rx = spawn_pipeline(create_rx, definition.create_transforms(), cap);

        let (results_tx, results_rx) = mpsc::channel(cap);
        let import_handle = spawn_loader(
            import_rx,
            definition.import_loader(&self.conns),
            Lane::Import,
            results_tx.clone(),
        );
        let create_handle = spawn_loader(
            create_rx,
            definition.create_loader(&self.conns),
            Lane::Create,
            results_tx,
        );

        let (post_tx, post_rx) = mpsc::channel(cap);
        let aggregate_handle = spawn_aggregator(results_rx, post_tx, stats.clone());
        let post_handle = spawn_post_process(post_rx, definition.post_process(&self.conns));

        // The loaders own the results sender and the aggregator owns the
        // post-process sender, so each downstream channel closes exactly
        // when its producers are done.
        join_stage(import_handle).await?;
        join_stage(create_handle).await?;
        join_stage(aggregate_handle).await?;
        join_stage(post_handle).await?;

        let stream_outcome = join_stage(source_handle).await?;
        let snapshot = stats.snapshot();
        match stream_outcome {
            Ok(()) => {
                tracing::info!(%snapshot, "run complete");
                Ok(snapshot)
            }
            Err(error) => {
                tracing::error!(%snapshot, %error, "extract stream fault, run aborted after drain");
                Err(error)
            }
        }
    }
}

async fn join_stage<T>(handle: JoinHandle<T>) -> Result<T> {
    handle.await.map_err(|e| EtlError::Worker {
        message: e.to_string(),
    })
}
