//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use crate::server::error::Error;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The listen backlog passed to the listening socket.
    pub backlog: u32,
    /// Number of workers; 1 runs a single polling worker, more run blocking workers.
    pub workers: usize,
    /// Size of each read from a connection.
    pub read_buffer_size: usize,
    /// Largest request, in bytes, accepted from a connection.
    pub max_request_size: usize,
    /// How long the single polling worker sleeps when the queue is empty.
    pub poll_interval: Duration,
    /// Trigger shutdown on Ctrl+C.
    pub handle_ctrl_c: bool,
}

impl ServerConfig {
    /// The default configuration listening on `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ..Self::default()
        }
    }

    /// Check the settings that would otherwise fail at runtime.
    pub fn validate(&self) -> Result<(), Error> {
        if self.workers == 0 {
            return Err(Error::InvalidConfig(
                "at least 1 worker is required to run the server".to_string(),
            ));
        }
        if self.read_buffer_size == 0 {
            return Err(Error::InvalidConfig("read_buffer_size must be non-zero".to_string()));
        }
        if self.max_request_size == 0 {
            return Err(Error::InvalidConfig("max_request_size must be non-zero".to_string()));
        }
        Ok(())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, 8080)),
            backlog: 20,
            workers: 1,
            read_buffer_size: 1024,
            max_request_size: 1024 * 1024,
            poll_interval: Duration::from_millis(1),
            handle_ctrl_c: true,
        }
    }
}
