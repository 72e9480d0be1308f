//! Request-line and header-block parsing.
//!
//! The head parser only locates where the header block ends. Deciding how
//! many of the remaining bytes form the body is left to
//! [`HttpRequest::from_bytes`](crate::parser::HttpRequest::from_bytes).

use std::collections::HashMap;
use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// The parsed head of a request plus the offset at which its body starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHead {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target, verbatim
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers, keyed exactly as received
    pub headers: HashMap<String, String>,
    /// Index of the first body byte in the parsed input
    pub body_offset: usize,
}

/// Locate the blank line closing the header block.
///
/// Returns the length of the head (without the blank line) and the offset of
/// the first body byte. Bare `\n` line endings are accepted as well as `\r\n`.
pub(crate) fn find_head_end(input: &[u8]) -> Option<(usize, usize)> {
    let mut line_start = 0;
    for (i, &byte) in input.iter().enumerate() {
        if byte != b'\n' {
            continue;
        }
        let line = &input[line_start..i];
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        if line.is_empty() && line_start > 0 {
            return Some((line_start, i + 1));
        }
        line_start = i + 1;
    }
    None
}

/// Parse the request line and headers of an HTTP request.
///
/// # Arguments
///
/// * `input` - The raw bytes received from the peer
///
/// # Returns
///
/// The parsed head, or an error if the request line or headers are invalid
/// or the header block is not terminated by a blank line
pub fn parse_head(input: &[u8]) -> Result<RequestHead, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let terminator = find_head_end(input);
    let head_bytes = match terminator {
        Some((head_len, _)) => &input[..head_len],
        None => input,
    };

    let head = std::str::from_utf8(head_bytes)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;

    let mut lines = head.lines();

    let request_line = match lines.next() {
        Some(line) => line,
        None => return Err(Error::EmptyRequest),
    };

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let path = parts[1].to_string();
    if !path.starts_with('/') && path != "*" {
        return Err(Error::InvalidPath);
    }

    let version = HttpVersion::from_str(parts[2])?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::InvalidHeaderFormat);
        }

        // Later duplicates overwrite earlier ones
        headers.insert(name.to_string(), value.trim().to_string());
    }

    let body_offset = match terminator {
        Some((_, body_offset)) => body_offset,
        None => return Err(Error::IncompleteHeaders),
    };

    Ok(RequestHead {
        method,
        path,
        version,
        headers,
        body_offset,
    })
}
