//! FIFO of accepted connections waiting for a worker.

use std::collections::VecDeque;
use std::fmt;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, Notify};

use crate::parser::HttpRequest;
use crate::server::connection::BoxedConnection;

/// One accepted connection paired with the request read from it.
///
/// A job owns its connection; it moves from the accept loop into the queue
/// and from the queue into exactly one worker.
pub struct Job {
    /// Sequence number assigned by the accept loop.
    pub id: u64,
    /// The parsed request.
    pub request: HttpRequest,
    /// The connection the response goes back to.
    pub connection: BoxedConnection,
    /// The peer address, when the transport provides one.
    pub peer: Option<SocketAddr>,
}

impl Job {
    pub fn new(id: u64, request: HttpRequest, connection: BoxedConnection, peer: Option<SocketAddr>) -> Self {
        Self {
            id,
            request,
            connection,
            peer,
        }
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("id", &self.id)
            .field("method", &self.request.method)
            .field("path", &self.request.path)
            .field("peer", &self.peer)
            .finish_non_exhaustive()
    }
}

/// Unbounded FIFO of jobs.
///
/// `push` never fails or waits for capacity. [`JobQueue::pop`] waits on a
/// notification until a job arrives or the queue is closed;
/// [`JobQueue::try_pop`] returns immediately.
pub struct JobQueue {
    jobs: Mutex<VecDeque<Job>>,
    available: Notify,
    closed: AtomicBool,
}

impl JobQueue {
    /// Create an empty, open queue.
    pub fn new() -> Self {
        Self {
            jobs: Mutex::new(VecDeque::new()),
            available: Notify::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Append a job and wake one waiting worker.
    pub async fn push(&self, job: Job) {
        self.jobs.lock().await.push_back(job);
        self.available.notify_one();
    }

    /// Remove the oldest job, waiting for one if the queue is empty.
    ///
    /// Returns `None` once the queue is closed, even if the wait started
    /// before the close.
    pub async fn pop(&self) -> Option<Job> {
        loop {
            // Registered before the check so a push or close in between is not missed.
            let notified = self.available.notified();

            {
                let mut jobs = self.jobs.lock().await;
                if self.closed.load(Ordering::Acquire) {
                    return None;
                }
                if let Some(job) = jobs.pop_front() {
                    return Some(job);
                }
            }

            notified.await;
        }
    }

    /// Remove the oldest job without waiting.
    ///
    /// Returns `None` when the queue is empty or closed.
    pub async fn try_pop(&self) -> Option<Job> {
        let mut jobs = self.jobs.lock().await;
        if self.closed.load(Ordering::Acquire) {
            return None;
        }
        jobs.pop_front()
    }

    /// Close the queue and wake every waiting worker.
    ///
    /// Jobs still queued are drained and handed back so their connections can
    /// be closed.
    pub async fn close(&self) -> Vec<Job> {
        let abandoned = {
            let mut jobs = self.jobs.lock().await;
            self.closed.store(true, Ordering::Release);
            jobs.drain(..).collect()
        };
        self.available.notify_waiters();
        abandoned
    }

    /// Whether [`JobQueue::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Number of queued jobs.
    pub async fn len(&self) -> usize {
        self.jobs.lock().await.len()
    }

    /// Whether no jobs are queued.
    pub async fn is_empty(&self) -> bool {
        self.jobs.lock().await.is_empty()
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}
