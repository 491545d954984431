//
// Import gRPC stubs/definitions.
//
pub use coordinator::coordinator_client::CoordinatorClient;
pub use coordinator::{TaskDescriptor, TaskKind, TaskRequest, TaskResponse, TaskStatusRequest};
pub mod coordinator {
    tonic::include_proto!("coordinator");
}

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tonic::transport::Channel;
use tracing::{info, warn};

use common::Workload;

use crate::{map, reduce};

/// How long to wait before polling again after the coordinator answered
/// "retry" (nothing free right now).
pub const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// The worker control loop. Polls for work until the coordinator says the
/// job is done.
///
/// A failed `RequestTask` is fatal: the coordinator is unreachable and
/// this worker cannot make progress, so the error propagates and the
/// process exits. A failed `TaskStatus` is deliberately not fatal; the
/// unreported task is re-served to someone after the coordinator's
/// timeout.
pub async fn run(
    client: &mut CoordinatorClient<Channel>,
    worker_id: u32,
    workload: Workload,
    dir: &Path,
) -> Result<()> {
    loop {
        let response = client
            .request_task(TaskRequest { worker_id })
            .await
            .context("failed to request a task from the coordinator")?
            .into_inner();

        if response.done {
            break;
        }

        match response.kind() {
            TaskKind::Map => {
                run_batch(&response, workload, dir, map::perform_map).await?;
                report(client, &response, TaskKind::Map).await;
            }
            TaskKind::Reduce => {
                run_batch(&response, workload, dir, reduce::perform_reduce).await?;
                report(client, &response, TaskKind::Reduce).await;
            }
            TaskKind::Unspecified => {}
        }

        if response.retry {
            tokio::time::sleep(RETRY_BACKOFF).await;
        }
    }

    info!("worker {} finished", worker_id);
    Ok(())
}

/// Execute every task in one assignment concurrently and join them all
/// before the caller reports. The current assignment policy sends at most
/// one task, but the wire contract allows a batch.
async fn run_batch<F, Fut>(
    response: &TaskResponse,
    workload: Workload,
    dir: &Path,
    executor: F,
) -> Result<()>
where
    F: Fn(TaskDescriptor, u32, u32, Workload, PathBuf) -> Fut,
    Fut: std::future::Future<Output = Result<()>> + Send + 'static,
{
    let mut batch = JoinSet::new();
    for task in &response.tasks {
        batch.spawn(executor(
            task.clone(),
            response.total_maps,
            response.total_reduces,
            workload,
            dir.to_path_buf(),
        ));
    }
    while let Some(result) = batch.join_next().await {
        result??;
    }
    Ok(())
}

/// Report every task id in the finished batch in one call.
async fn report(
    client: &mut CoordinatorClient<Channel>,
    response: &TaskResponse,
    kind: TaskKind,
) {
    let status = TaskStatusRequest {
        kind: kind as i32,
        worker_id: response.worker_id,
        task_ids: response.tasks.iter().map(|t| t.task_id).collect(),
        done: true,
    };
    if let Err(e) = client.task_status(status).await {
        warn!(
            "status report failed, task will be reassigned after timeout: {}",
            e
        );
    }
}
