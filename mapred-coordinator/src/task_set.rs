//! The per-phase task collection and its assignment state machine.
//!
//! Two independent instances exist per run, one for the map phase and one
//! for the reduce phase. Each is guarded by its own lock, held only for
//! in-memory bookkeeping. Timeout-driven reassignment is a fire-and-forget
//! deferred callback, never a lock-holding sleep.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info};

/// Owner value of a task nobody currently holds. Worker ids come from
/// process ids, which are never zero.
pub const UNASSIGNED: u32 = 0;

/// One unit of work within a phase.
#[derive(Debug)]
struct TaskEntry {
    /// Phase-local id, stable for the lifetime of the phase.
    id: u32,

    /// Worker currently holding the assignment, or [`UNASSIGNED`].
    owner: u32,

    /// Completion is terminal: once set it is never cleared.
    done: bool,

    /// Input file, for a map task.
    input_file: String,

    /// Partition index, for a reduce task.
    reduce_id: u32,
}

/// Snapshot of a task handed to a worker, taken while the lock is held.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub task_id: u32,
    pub worker_id: u32,
    pub input_file: String,
    pub reduce_id: u32,
}

#[derive(Debug)]
struct Inner {
    tasks: Vec<TaskEntry>,

    /// Phase-completion flag. Invariant: true iff every task is done.
    /// Recomputed after every completion report, never reset by hand.
    done: bool,
}

/// All tasks of exactly one phase plus the phase-completion flag.
///
/// Cheap to clone: clones share the same locked state, which is what the
/// timeout callbacks hold on to.
#[derive(Debug, Clone)]
pub struct TaskSet {
    inner: Arc<Mutex<Inner>>,
}

impl TaskSet {
    /// Build the map-phase set, one task per input file in input order.
    /// The caller passes the files already sorted.
    pub fn for_maps(files: &[String]) -> Self {
        let tasks = files
            .iter()
            .enumerate()
            .map(|(id, file)| TaskEntry {
                id: id as u32,
                owner: UNASSIGNED,
                done: false,
                input_file: file.clone(),
                reduce_id: 0,
            })
            .collect();
        Self::from_tasks(tasks)
    }

    /// Build the reduce-phase set, one task per partition index.
    pub fn for_partitions(n_reduce: u32) -> Self {
        let tasks = (0..n_reduce)
            .map(|id| TaskEntry {
                id,
                owner: UNASSIGNED,
                done: false,
                input_file: String::new(),
                reduce_id: id,
            })
            .collect();
        Self::from_tasks(tasks)
    }

    fn from_tasks(tasks: Vec<TaskEntry>) -> Self {
        // An empty phase is complete from the start.
        let done = tasks.iter().all(|t| t.done);
        Self {
            inner: Arc::new(Mutex::new(Inner { tasks, done })),
        }
    }

    /// The phase-completion flag.
    pub async fn is_done(&self) -> bool {
        self.inner.lock().await.done
    }

    /// Id of the first task, in ascending id order, that is neither done
    /// nor held by a worker. Read-only; assignment goes through
    /// [`TaskSet::assign_next`] so scan and claim happen under one lock.
    pub async fn next_assignable(&self) -> Option<u32> {
        let inner = self.inner.lock().await;
        inner
            .tasks
            .iter()
            .find(|t| !t.done && t.owner == UNASSIGNED)
            .map(|t| t.id)
    }

    /// Claim the first assignable task for `worker_id` and schedule the
    /// reassignment timeout. Returns `None` when no task is free, which
    /// covers both "everything assigned" and "phase already done".
    pub async fn assign_next(&self, worker_id: u32, timeout: Duration) -> Option<Assignment> {
        let assignment = {
            let mut inner = self.inner.lock().await;
            let task = inner
                .tasks
                .iter_mut()
                .find(|t| !t.done && t.owner == UNASSIGNED)?;
            task.owner = worker_id;
            Assignment {
                task_id: task.id,
                worker_id,
                input_file: task.input_file.clone(),
                reduce_id: task.reduce_id,
            }
        };

        // Deferred callback per assignment. If the task is still
        // incomplete when it fires, the owner is cleared and the next
        // RequestTask hands the task to someone else. There is no
        // cancellation of in-flight work: execution is at-least-once.
        let set = self.clone();
        let task_id = assignment.task_id;
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            set.release_if_unfinished(task_id).await;
        });

        Some(assignment)
    }

    /// Mark `task_id` done, but only if `worker_id` still owns it. A
    /// straggler whose task was reassigned after a timeout no longer
    /// matches and its report is dropped; a duplicate report from the
    /// rightful owner re-marks an already-done task, which is harmless.
    /// Recomputes the phase flag after every call.
    pub async fn report_done(&self, task_id: u32, worker_id: u32) {
        let mut inner = self.inner.lock().await;
        match inner.tasks.get_mut(task_id as usize) {
            Some(task) if task.owner == worker_id => {
                task.done = true;
            }
            Some(task) => {
                debug!(
                    "dropping completion report for task {} from worker {}, owner is {}",
                    task_id, worker_id, task.owner
                );
            }
            None => {
                debug!("dropping completion report for unknown task {}", task_id);
            }
        }
        inner.done = inner.tasks.iter().all(|t| t.done);
    }

    /// Timeout callback body: put the task back up for assignment unless
    /// it completed while the timer was pending (stale guard).
    async fn release_if_unfinished(&self, task_id: u32) {
        let mut inner = self.inner.lock().await;
        if let Some(task) = inner.tasks.get_mut(task_id as usize) {
            if !task.done && task.owner != UNASSIGNED {
                info!(
                    "task {} timed out on worker {}, releasing for reassignment",
                    task_id, task.owner
                );
                task.owner = UNASSIGNED;
            }
        }
    }
}
