//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpSocket};
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tokio::signal;
use log::{info, warn, error};

use crate::parser::{HttpRequest, Method};
use crate::server::config::ServerConfig;
use crate::server::connection::{close, receive_job};
use crate::server::error::Error;
use crate::server::queue::JobQueue;
use crate::server::response::HttpResponse;
use crate::server::router::Router;
use crate::server::shutdown::Shutdown;
use crate::server::worker::{WorkerMode, WorkerPool};

/// A configured, not yet listening HTTP server.
///
/// Collects the configuration, the routes and the initial shared state.
/// [`HttpServer::build`] turns it into a [`BoundServer`].
pub struct HttpServer<S> {
    /// The server configuration.
    pub config: ServerConfig,
    router: Router<S>,
    state: S,
}

impl<S> HttpServer<S>
where
    S: Send + 'static,
{
    /// Create a new HTTP server with the given configuration and initial state.
    pub fn new(config: ServerConfig, state: S) -> Self {
        Self::with_router(config, Router::new(), state)
    }

    /// Create a server around an already populated router.
    pub fn with_router(config: ServerConfig, router: Router<S>, state: S) -> Self {
        Self {
            config,
            router,
            state,
        }
    }

    /// Add a route to the server.
    ///
    /// Registering the same method and path twice keeps the last handler.
    pub fn add_route<F>(&mut self, method: Method, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&HttpRequest, &mut S) -> Result<HttpResponse, Error> + Send + Sync + 'static,
    {
        self.router.add_route(method, path, handler);
        self
    }

    /// The routing table.
    pub fn router(&self) -> &Router<S> {
        &self.router
    }

    /// Display the registered endpoints.
    fn display_server_info(&self) {
        info!("Registered endpoints:");
        for route in self.router.routes() {
            info!("  {route}");
        }
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let addr = self.config.addr;
        let bind_error = move |source: std::io::Error| Error::Bind { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_error)?;

        socket.set_reuseaddr(true).map_err(bind_error)?;
        socket.bind(addr).map_err(bind_error)?;
        let listener = socket.listen(self.config.backlog).map_err(bind_error)?;

        info!(
            "Server listening on http://{addr} (backlog {backlog})",
            addr = listener.local_addr().unwrap_or(addr),
            backlog = self.config.backlog
        );
        Ok(listener)
    }

    /// Bind and listen.
    ///
    /// # Errors
    ///
    /// [`Error::Bind`] if the socket cannot be created, bound or put in
    /// listen mode. The server never reaches [`BoundServer::run`] then.
    pub async fn build(self) -> Result<BoundServer<S>, Error> {
        self.display_server_info();

        let listener = match self.setup_listener().await {
            Ok(listener) => listener,
            Err(e) => {
                error!("{e}");
                return Err(e);
            }
        };

        Ok(BoundServer {
            config: self.config,
            listener,
            router: Arc::new(self.router),
            state: Arc::new(Mutex::new(self.state)),
            shutdown: Shutdown::new(),
        })
    }
}

/// A listening server, ready to [`run`](BoundServer::run).
pub struct BoundServer<S> {
    config: ServerConfig,
    listener: TcpListener,
    router: Arc<Router<S>>,
    state: Arc<Mutex<S>>,
    shutdown: Shutdown,
}

impl<S> BoundServer<S>
where
    S: Send + 'static,
{
    /// The address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, Error> {
        Ok(self.listener.local_addr()?)
    }

    /// The configuration the server was built with.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// A handle that stops [`BoundServer::run`] when triggered.
    pub fn shutdown_handle(&self) -> Shutdown {
        self.shutdown.clone()
    }

    /// A handle to the shared state.
    ///
    /// Locking it contends with handlers, exactly like another handler would.
    pub fn state(&self) -> Arc<Mutex<S>> {
        Arc::clone(&self.state)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown: Shutdown) -> JoinHandle<()> {
        tokio::spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    shutdown.trigger();
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        })
    }

    /// Handle accept errors.
    async fn handle_accept_error(e: std::io::Error) {
        error!("Error accepting connection: {e}");

        // Errors such as EMFILE repeat immediately; wait a bit before retrying
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    /// Accept connections and queue their requests until shutdown.
    async fn accept_loop(&self, queue: &JobQueue) {
        let mut next_id: u64 = 0;

        loop {
            let (socket, peer) = tokio::select! {
                _ = self.shutdown.wait() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        Self::handle_accept_error(e).await;
                        continue;
                    }
                },
            };

            next_id += 1;
            let received = tokio::select! {
                _ = self.shutdown.wait() => break,
                received = receive_job(
                    next_id,
                    socket,
                    Some(peer),
                    self.config.read_buffer_size,
                    self.config.max_request_size,
                ) => received,
            };

            match received {
                Ok(job) => queue.push(job).await,
                Err(Error::ClientDisconnected) => warn!("{peer} disconnected without sending data"),
                Err(e) => warn!("Dropping connection from {peer}: {e}"),
            }
        }

        info!("Shutting down server...");
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(queue: &JobQueue, tasks: &mut JoinSet<()>) {
        let abandoned = queue.close().await;
        if !abandoned.is_empty() {
            warn!("Abandoning {len} queued request(s)", len = abandoned.len());
        }
        for job in abandoned {
            close(job.connection).await;
        }

        info!("Waiting for {len} worker(s) to finish...", len = tasks.len());
        while let Some(res) = tasks.join_next().await {
            if let Err(e) = res {
                error!("Worker failed during shutdown: {e}");
            }
        }

        info!("Server shutdown complete");
    }

    /// Run the accept loop and the worker pool until shutdown is triggered.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidConfig`] when the configuration cannot run, for
    /// example zero workers. Nothing is spawned in that case.
    pub async fn run(self) -> Result<(), Error> {
        self.config.validate()?;
        let mode = WorkerMode::for_workers(self.config.workers, self.config.poll_interval)?;

        let queue = Arc::new(JobQueue::new());
        let mut tasks = JoinSet::new();

        let ctrl_c = self
            .config
            .handle_ctrl_c
            .then(|| Self::setup_ctrl_c_handler(self.shutdown.clone()));

        let pool = WorkerPool::new(Arc::clone(&self.router), Arc::clone(&self.state), Arc::clone(&queue), mode);
        pool.spawn(&mut tasks);

        self.accept_loop(&queue).await;

        Self::perform_shutdown(&queue, &mut tasks).await;

        if let Some(handle) = ctrl_c {
            handle.abort();
        }

        Ok(())
    }
}
