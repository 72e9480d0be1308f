//! Static dispatch table from (method, path) to handler.

use std::collections::HashMap;

use log::debug;

use crate::parser::{HttpRequest, Method};
use crate::server::error::Error;
use crate::server::handler::{HandlerFn, RouteKey};
use crate::server::response::HttpResponse;

/// Maps exact (method, path) pairs to handlers.
///
/// Lookup is a plain equality match on the raw request path: no path
/// parameters, no wildcards, no prefix matching and no trailing-slash
/// normalization. A miss yields [`HttpResponse::not_found`].
pub struct Router<S> {
    routes: HashMap<RouteKey, HandlerFn<S>>,
}

impl<S> Router<S> {
    /// Create an empty router.
    pub fn new() -> Self {
        Self {
            routes: HashMap::new(),
        }
    }

    /// Register a handler for `method` and `path`.
    ///
    /// Registering the same pair again replaces the previous handler.
    pub fn add_route<F>(&mut self, method: Method, path: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&HttpRequest, &mut S) -> Result<HttpResponse, Error> + Send + Sync + 'static,
    {
        let key = RouteKey::new(method, path);
        if self.routes.insert(key.clone(), Box::new(handler)).is_some() {
            debug!("Replaced handler for {key}");
        }
        self
    }

    /// Dispatch `request` to its handler, or answer 404 when no route matches.
    ///
    /// The handler's result is returned unmodified. On a miss no handler runs
    /// and `state` is left untouched.
    pub fn handle(&self, request: &HttpRequest, state: &mut S) -> Result<HttpResponse, Error> {
        let key = RouteKey::new(request.method, request.path.as_str());
        match self.routes.get(&key) {
            Some(handler) => handler(request, state),
            None => Ok(HttpResponse::not_found()),
        }
    }

    /// Whether a handler is registered for `method` and `path`.
    pub fn contains(&self, method: Method, path: &str) -> bool {
        self.routes.contains_key(&RouteKey::new(method, path))
    }

    /// The registered route keys, sorted by method then path.
    pub fn routes(&self) -> Vec<&RouteKey> {
        let mut keys: Vec<&RouteKey> = self.routes.keys().collect();
        keys.sort();
        keys
    }

    /// Number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl<S> Default for Router<S> {
    fn default() -> Self {
        Self::new()
    }
}
