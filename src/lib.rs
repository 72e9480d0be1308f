//! A minimal embeddable HTTP server.
//!
//! `microserve` accepts TCP connections, parses HTTP/1.1 requests, dispatches
//! them to handlers registered by exact method and path, and writes the
//! handler's response back before closing the connection. Handlers get
//! exclusive access to one piece of shared application state per call.
//!
//! # Features
//!
//! - Parse HTTP requests from byte slices (GET, POST, PUT, DELETE, OPTIONS, HEAD)
//! - `Content-Length` aware body framing
//! - Exact-match routing with a plain-text 404 fallback
//! - An unbounded job queue feeding a single polling worker or a pool of blocking workers
//! - Handler errors and panics isolated to the connection that caused them
//! - JSON request and response bodies via serde
//!
//! # Examples
//!
//! ## Parsing
//!
//! ```
//! use microserve::{parse_request, Method};
//!
//! let request_bytes = b"POST /increment HTTP/1.1\r\nHost: example.com\r\nContent-Length: 2\r\n\r\nhi!";
//!
//! let request = parse_request(request_bytes).unwrap();
//! assert_eq!(request.method, Method::POST);
//! assert_eq!(request.path, "/increment");
//! assert_eq!(request.body, b"hi");
//! ```
//!
//! ## Error handling
//!
//! ```
//! use microserve::{parse_request, ParserError};
//!
//! let invalid_request = b"PATCH /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! match parse_request(invalid_request) {
//!     Ok(_) => println!("Request parsed successfully"),
//!     Err(ParserError::InvalidMethod(method)) => println!("Invalid method: {}", method),
//!     Err(err) => println!("Other error: {}", err),
//! }
//! ```
//!
//! ## A counter server
//!
//! ```no_run
//! use microserve::{HttpResponse, HttpServer, Method, ServerConfig, StatusCode};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig { workers: 2, ..ServerConfig::with_port(8080) };
//!     let mut server = HttpServer::new(config, 0i64);
//!
//!     server
//!         .add_route(Method::GET, "/counter", |_req, counter: &mut i64| {
//!             HttpResponse::json(StatusCode::Ok, &json!({ "counter": *counter }))
//!         })
//!         .add_route(Method::POST, "/increment", |_req, counter: &mut i64| {
//!             *counter += 1;
//!             HttpResponse::json(StatusCode::Ok, &json!({ "counter": *counter }))
//!         });
//!
//!     server.build().await?.run().await?;
//!     Ok(())
//! }
//! ```
//!
//! See the `demos` directory for a complete server.

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{
    BoundServer, Error as ServerError, HttpResponse, HttpServer, Router, ServerConfig, Shutdown, StatusCode,
};
