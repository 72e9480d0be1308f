//! HTTP request handlers and route keys.

use std::fmt;

use crate::parser::{HttpRequest, Method};
use crate::server::{HttpResponse, Error};

/// Type alias for a handler function.
///
/// A handler receives the request and exclusive access to the shared state
/// for the duration of the call.
pub type HandlerFn<S> = Box<dyn Fn(&HttpRequest, &mut S) -> Result<HttpResponse, Error> + Send + Sync>;

/// The exact (method, path) pair a handler is registered under.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RouteKey {
    /// The HTTP method to match.
    pub method: Method,
    /// The path to match, byte for byte.
    pub path: String,
}

impl RouteKey {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
        }
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)
    }
}
