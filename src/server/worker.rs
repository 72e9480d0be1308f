//! Worker contexts that drain the job queue.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tokio::task::{self, JoinSet};

use crate::server::connection::close;
use crate::server::error::Error;
use crate::server::queue::{Job, JobQueue};
use crate::server::router::Router;

/// How the pool runs its workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMode {
    /// One worker polling the queue, sleeping `poll_interval` when it is empty.
    Single { poll_interval: Duration },
    /// `workers` workers blocking on the queue.
    Multi { workers: usize },
}

impl WorkerMode {
    /// Pick the mode for a worker count.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] when `workers` is zero.
    pub fn for_workers(workers: usize, poll_interval: Duration) -> Result<Self, Error> {
        match workers {
            0 => Err(Error::InvalidConfig(
                "at least 1 worker is required to run the server".to_string(),
            )),
            1 => Ok(WorkerMode::Single { poll_interval }),
            n => Ok(WorkerMode::Multi { workers: n }),
        }
    }

    /// Number of worker contexts this mode runs.
    pub fn workers(&self) -> usize {
        match self {
            WorkerMode::Single { .. } => 1,
            WorkerMode::Multi { workers } => *workers,
        }
    }
}

/// A fixed set of workers sharing one router, one state and one queue.
pub struct WorkerPool<S> {
    router: Arc<Router<S>>,
    state: Arc<Mutex<S>>,
    queue: Arc<JobQueue>,
    mode: WorkerMode,
}

impl<S> WorkerPool<S>
where
    S: Send + 'static,
{
    pub fn new(router: Arc<Router<S>>, state: Arc<Mutex<S>>, queue: Arc<JobQueue>, mode: WorkerMode) -> Self {
        Self {
            router,
            state,
            queue,
            mode,
        }
    }

    /// The mode the pool was built with.
    pub fn mode(&self) -> WorkerMode {
        self.mode
    }

    /// Spawn every worker into `tasks`.
    ///
    /// Workers exit once the queue is closed.
    pub fn spawn(&self, tasks: &mut JoinSet<()>) {
        info!("Launching {n} worker(s) in {mode:?} mode", n = self.mode.workers(), mode = self.mode);

        for id in 0..self.mode.workers() {
            let router = Arc::clone(&self.router);
            let state = Arc::clone(&self.state);
            let queue = Arc::clone(&self.queue);

            match self.mode {
                WorkerMode::Single { poll_interval } => {
                    tasks.spawn(Self::run_polling(id, router, state, queue, poll_interval));
                }
                WorkerMode::Multi { .. } => {
                    tasks.spawn(Self::run_blocking(id, router, state, queue));
                }
            }
        }
    }

    /// Single-worker loop: poll, and back off briefly on an empty queue.
    async fn run_polling(id: usize, router: Arc<Router<S>>, state: Arc<Mutex<S>>, queue: Arc<JobQueue>, poll_interval: Duration) {
        debug!("Worker {id} started (polling)");
        while !queue.is_closed() {
            match queue.try_pop().await {
                Some(job) => Self::execute(job, &router, &state).await,
                None => tokio::time::sleep(poll_interval).await,
            }
        }
        debug!("Worker {id} stopped");
    }

    /// Multi-worker loop: wait on the queue until a job arrives or it closes.
    async fn run_blocking(id: usize, router: Arc<Router<S>>, state: Arc<Mutex<S>>, queue: Arc<JobQueue>) {
        debug!("Worker {id} started (blocking)");
        while let Some(job) = queue.pop().await {
            Self::execute(job, &router, &state).await;
        }
        debug!("Worker {id} stopped");
    }

    /// Handle one job: dispatch under the state lock, write the response, close.
    ///
    /// The handler runs on the blocking pool, so a slow handler never stalls
    /// the accept loop or other tasks on the runtime. A handler error or panic
    /// closes the connection without writing anything; the caller keeps
    /// running either way.
    pub async fn execute(job: Job, router: &Arc<Router<S>>, state: &Arc<Mutex<S>>) {
        let Job { id, request, mut connection, peer } = job;
        let peer = peer.map_or_else(|| "unknown peer".to_string(), |addr| addr.to_string());

        let guard = Arc::clone(state).lock_owned().await;
        let router = Arc::clone(router);
        let dispatch = task::spawn_blocking(move || {
            let mut state = guard;
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| router.handle(&request, &mut state)));
            (request, outcome)
        });

        let (request, outcome) = match dispatch.await {
            Ok(done) => done,
            Err(e) => {
                error!("Job {id}: dispatch task failed: {e}; closing connection to {peer}");
                close(connection).await;
                return;
            }
        };

        match outcome {
            Ok(Ok(response)) => {
                match connection.write_all(&response.to_bytes()).await {
                    Ok(()) => debug!(
                        "Job {id}: {method} {path} -> {code} ({peer})",
                        method = request.method,
                        path = request.path,
                        code = response.status.code()
                    ),
                    Err(e) => warn!("Job {id}: failed to send response to {peer}: {e}"),
                }
            }
            Ok(Err(e)) => {
                error!(
                    "Job {id}: handler for {method} {path} failed: {e}; closing connection to {peer}",
                    method = request.method,
                    path = request.path
                );
            }
            Err(payload) => {
                error!(
                    "Job {id}: handler for {method} {path} panicked: {msg}; closing connection to {peer}",
                    method = request.method,
                    path = request.path,
                    msg = panic_message(payload.as_ref())
                );
            }
        }

        close(connection).await;
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "non-string panic payload"
    }
}
