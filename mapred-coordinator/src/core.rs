//
// Import gRPC stubs/definitions.
//
pub use coordinator::coordinator_server::{Coordinator, CoordinatorServer};
pub use coordinator::{
    TaskDescriptor, TaskKind, TaskRequest, TaskResponse, TaskStatusRequest, TaskStatusResponse,
};
pub mod coordinator {
    tonic::include_proto!("coordinator");
}

use std::time::Duration;

use tonic::{Request, Response, Status};
use tracing::{debug, info};

use crate::task_set::{Assignment, TaskSet};

/// Where the job currently stands. Never stored: always derived from the
/// two phase-completion flags, so it cannot drift out of sync with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Map tasks outstanding.
    Mapping,

    /// All map tasks done, reduce tasks outstanding.
    Reducing,

    /// Both phases done.
    Finished,
}

/// The leader. Exactly one instance exists per job; it exclusively owns
/// both task sets, and all task mutation goes through their locked
/// operations.
#[derive(Debug)]
pub struct MRCoordinator {
    /// Input files, sorted at construction. Map task ids follow this order.
    inputs: Vec<String>,

    n_reduce: u32,

    /// How long a worker may hold a task before it is put back up for
    /// assignment.
    task_timeout: Duration,

    map_tasks: TaskSet,
    reduce_tasks: TaskSet,
}

impl MRCoordinator {
    /// Set up both task sets eagerly; the reduce set sits idle until the
    /// map phase finishes.
    pub fn new(mut inputs: Vec<String>, n_reduce: u32, task_timeout: Duration) -> Self {
        inputs.sort();
        let map_tasks = TaskSet::for_maps(&inputs);
        let reduce_tasks = TaskSet::for_partitions(n_reduce);
        info!(
            "job initialized with {} map tasks and {} reduce tasks",
            inputs.len(),
            n_reduce
        );
        Self {
            inputs,
            n_reduce,
            task_timeout,
            map_tasks,
            reduce_tasks,
        }
    }

    pub fn total_maps(&self) -> u32 {
        self.inputs.len() as u32
    }

    pub fn total_reduces(&self) -> u32 {
        self.n_reduce
    }

    /// Handles on the task sets, for a serving loop that wants to watch
    /// for completion after the coordinator has been moved into the
    /// server.
    pub fn task_sets(&self) -> (TaskSet, TaskSet) {
        (self.map_tasks.clone(), self.reduce_tasks.clone())
    }

    pub async fn phase(&self) -> JobPhase {
        match (
            self.map_tasks.is_done().await,
            self.reduce_tasks.is_done().await,
        ) {
            (true, true) => JobPhase::Finished,
            (true, false) => JobPhase::Reducing,
            _ => JobPhase::Mapping,
        }
    }

    /// True once both phases are complete. An external driver uses this
    /// to decide when to stop serving requests.
    pub async fn is_finished(&self) -> bool {
        self.phase().await == JobPhase::Finished
    }

    fn reply(
        &self,
        worker_id: u32,
        kind: TaskKind,
        task: Option<Assignment>,
        retry: bool,
        done: bool,
    ) -> TaskResponse {
        // Totals ride along on every reply: a worker needs them to place
        // shards no matter which task it was given.
        TaskResponse {
            kind: kind as i32,
            worker_id,
            total_maps: self.total_maps(),
            total_reduces: self.n_reduce,
            tasks: task
                .into_iter()
                .map(|a| TaskDescriptor {
                    task_id: a.task_id,
                    worker_id: a.worker_id,
                    input_file: a.input_file,
                    reduce_id: a.reduce_id,
                    done: false,
                })
                .collect(),
            retry,
            done,
        }
    }
}

#[tonic::async_trait]
impl Coordinator for MRCoordinator {
    async fn request_task(
        &self,
        request: Request<TaskRequest>,
    ) -> Result<Response<TaskResponse>, Status> {
        let worker_id = request.into_inner().worker_id;

        // Phase order is enforced here: reduce tasks are unreachable
        // until the map set reports itself done.
        let reply = if let Some(task) = self
            .map_tasks
            .assign_next(worker_id, self.task_timeout)
            .await
        {
            self.reply(worker_id, TaskKind::Map, Some(task), false, false)
        } else if !self.map_tasks.is_done().await {
            self.reply(worker_id, TaskKind::Unspecified, None, true, false)
        } else if let Some(task) = self
            .reduce_tasks
            .assign_next(worker_id, self.task_timeout)
            .await
        {
            self.reply(worker_id, TaskKind::Reduce, Some(task), false, false)
        } else if !self.reduce_tasks.is_done().await {
            self.reply(worker_id, TaskKind::Unspecified, None, true, false)
        } else {
            self.reply(worker_id, TaskKind::Unspecified, None, false, true)
        };

        info!(
            "worker {} requested a task: kind={:?} assigned={:?} retry={} done={}",
            worker_id,
            reply.kind(),
            reply.tasks.iter().map(|t| t.task_id).collect::<Vec<_>>(),
            reply.retry,
            reply.done
        );
        Ok(Response::new(reply))
    }

    async fn task_status(
        &self,
        request: Request<TaskStatusRequest>,
    ) -> Result<Response<TaskStatusResponse>, Status> {
        let req = request.into_inner();
        match req.kind() {
            TaskKind::Map => {
                for id in &req.task_ids {
                    self.map_tasks.report_done(*id, req.worker_id).await;
                    debug!("map task {} reported done by worker {}", id, req.worker_id);
                }
            }
            TaskKind::Reduce => {
                for id in &req.task_ids {
                    self.reduce_tasks.report_done(*id, req.worker_id).await;
                    debug!(
                        "reduce task {} reported done by worker {}",
                        id, req.worker_id
                    );
                }
            }
            TaskKind::Unspecified => {
                debug!(
                    "ignoring status report of unspecified kind from worker {}",
                    req.worker_id
                );
            }
        }

        // The only failure mode of this RPC is the transport itself.
        Ok(Response::new(TaskStatusResponse { ack: true }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(10);

    fn coordinator(n_map: usize, n_reduce: u32) -> MRCoordinator {
        let inputs: Vec<String> = (0..n_map).map(|i| format!("in-{}.txt", i)).collect();
        MRCoordinator::new(inputs, n_reduce, TIMEOUT)
    }

    async fn request(c: &MRCoordinator, worker_id: u32) -> TaskResponse {
        c.request_task(Request::new(TaskRequest { worker_id }))
            .await
            .unwrap()
            .into_inner()
    }

    async fn report(c: &MRCoordinator, kind: TaskKind, worker_id: u32, task_ids: Vec<u32>) {
        let resp = c
            .task_status(Request::new(TaskStatusRequest {
                kind: kind as i32,
                worker_id,
                task_ids,
                done: true,
            }))
            .await
            .unwrap()
            .into_inner();
        assert!(resp.ack);
    }

    #[tokio::test]
    async fn responses_always_carry_totals() {
        let c = coordinator(3, 2);
        let resp = request(&c, 1).await;
        assert_eq!(resp.total_maps, 3);
        assert_eq!(resp.total_reduces, 2);
        assert_eq!(resp.worker_id, 1);
    }

    #[tokio::test]
    async fn no_reduce_task_until_map_phase_is_done() {
        let c = coordinator(2, 2);

        // Both map tasks go out, then a third worker must be told to
        // retry rather than being given reduce work.
        assert_eq!(request(&c, 1).await.kind(), TaskKind::Map);
        assert_eq!(request(&c, 2).await.kind(), TaskKind::Map);
        let resp = request(&c, 3).await;
        assert!(resp.retry);
        assert!(resp.tasks.is_empty());

        report(&c, TaskKind::Map, 1, vec![0]).await;
        let resp = request(&c, 3).await;
        assert!(resp.retry);

        report(&c, TaskKind::Map, 2, vec![1]).await;
        let resp = request(&c, 3).await;
        assert_eq!(resp.kind(), TaskKind::Reduce);
        assert_eq!(resp.tasks.len(), 1);
    }

    #[tokio::test]
    async fn done_only_after_both_phases_complete() {
        let c = coordinator(1, 1);
        assert_eq!(c.phase().await, JobPhase::Mapping);

        let resp = request(&c, 1).await;
        assert_eq!(resp.tasks[0].task_id, 0);
        report(&c, TaskKind::Map, 1, vec![0]).await;
        assert_eq!(c.phase().await, JobPhase::Reducing);

        let resp = request(&c, 1).await;
        assert_eq!(resp.kind(), TaskKind::Reduce);
        report(&c, TaskKind::Reduce, 1, vec![0]).await;
        assert_eq!(c.phase().await, JobPhase::Finished);
        assert!(c.is_finished().await);

        let resp = request(&c, 2).await;
        assert!(resp.done);
        assert!(!resp.retry);
        assert!(resp.tasks.is_empty());
    }

    #[tokio::test]
    async fn map_inputs_are_assigned_in_sorted_order() {
        let c = MRCoordinator::new(
            vec!["b.txt".into(), "a.txt".into()],
            1,
            TIMEOUT,
        );
        let resp = request(&c, 1).await;
        assert_eq!(resp.tasks[0].input_file, "a.txt");
    }

    #[tokio::test]
    async fn duplicate_status_report_is_acknowledged() {
        let c = coordinator(1, 1);
        request(&c, 1).await;
        report(&c, TaskKind::Map, 1, vec![0]).await;
        report(&c, TaskKind::Map, 1, vec![0]).await;
        assert_eq!(c.phase().await, JobPhase::Reducing);
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_map_task_is_reoffered_to_another_worker() {
        let c = coordinator(1, 1);
        let resp = request(&c, 1).await;
        assert_eq!(resp.tasks[0].task_id, 0);

        tokio::time::sleep(TIMEOUT + Duration::from_millis(1)).await;

        let resp = request(&c, 2).await;
        assert_eq!(resp.kind(), TaskKind::Map);
        assert_eq!(resp.tasks[0].task_id, 0);
        assert_eq!(resp.tasks[0].worker_id, 2);
    }
}
