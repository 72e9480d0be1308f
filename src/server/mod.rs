//! HTTP server implementation for microserve.
//!
//! An accept loop reads and parses each connection's request, queues it as a
//! [`Job`], and a pool of workers dispatches jobs through the [`Router`] while
//! holding the shared-state lock.

mod response;
mod config;
mod connection;
mod error;
mod handler;
mod http_server;
mod queue;
mod router;
mod shutdown;
mod worker;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use connection::{BoxedConnection, Connection, read_request, receive_job};
pub use error::Error;
pub use handler::{HandlerFn, RouteKey};
pub use http_server::{BoundServer, HttpServer};
pub use queue::{Job, JobQueue};
pub use router::Router;
pub use shutdown::Shutdown;
pub use worker::{WorkerMode, WorkerPool};
