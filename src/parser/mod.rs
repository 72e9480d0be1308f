//! HTTP parser module.
//!
//! Turns the raw bytes read from a connection into an [`HttpRequest`].

mod request;
mod method;
mod version;
mod error;
mod head;
mod tests;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;
pub use head::{RequestHead, parse_head};

// Re-export the parse_request function
pub use request::parse_request;

pub(crate) use head::find_head_end;
pub(crate) use request::content_length;
