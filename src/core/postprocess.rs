use crate::domain::model::LoadResult;
use crate::domain::ports::PostProcess;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Performs the secondary write for every successful result. Failed
/// results are surfaced in the log only, and a secondary-write failure
/// never unwinds the already committed primary load.
pub fn spawn_post_process(
    mut rx: mpsc::Receiver<LoadResult>,
    post: Arc<dyn PostProcess>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(result) = rx.recv().await {
            match &result.outcome {
                Ok(output) => {
                    if let Err(error) = post.apply(&result.input, output).await {
                        tracing::warn!(lane = %result.lane, %error, "post-process write failed");
                    }
                }
                Err(error) => {
                    tracing::warn!(lane = %result.lane, %error, "record failed to load");
                }
            }
        }
    })
}
