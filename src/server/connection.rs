//! Connection handles and request framing.

use std::net::SocketAddr;

use log::debug;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::parser::{content_length, find_head_end, parse_head, HttpRequest};
use crate::server::error::Error;
use crate::server::queue::Job;
use crate::server::response::{HttpResponse, StatusCode};

/// A bidirectional byte stream to one client.
///
/// Implemented for every `AsyncRead + AsyncWrite` stream, so jobs can carry a
/// `TcpStream` in production and an in-memory stream in tests.
pub trait Connection: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Connection for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// An owned, type-erased connection.
pub type BoxedConnection = Box<dyn Connection>;

/// Read one request's worth of bytes from `reader`.
///
/// Reads in chunks of `chunk_size` until the header block is complete and,
/// when a `Content-Length` is declared, the body has fully arrived; or until
/// the peer closes its write side.
///
/// # Errors
///
/// * [`Error::ClientDisconnected`] if the peer closed before sending anything
/// * [`Error::RequestTooLarge`] if more than `max_size` bytes arrive
/// * [`Error::IoError`] on a failed read
pub async fn read_request<R>(reader: &mut R, chunk_size: usize, max_size: usize) -> Result<Vec<u8>, Error>
where
    R: AsyncRead + Unpin + ?Sized,
{
    let mut buf = Vec::new();
    let mut chunk = vec![0; chunk_size.max(1)];

    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            break;
        }

        buf.extend_from_slice(&chunk[..n]);
        if buf.len() > max_size {
            return Err(Error::RequestTooLarge(max_size));
        }

        if is_complete(&buf) {
            break;
        }
    }

    if buf.is_empty() {
        return Err(Error::ClientDisconnected);
    }

    debug!("Read {len} request bytes", len = buf.len());
    Ok(buf)
}

/// Read and parse a request from a freshly accepted connection.
///
/// On success the connection moves into the returned [`Job`]. On a parse
/// error a `400 Bad Request` is sent on a best-effort basis; on any error the
/// connection is closed before returning.
pub async fn receive_job<C>(
    id: u64,
    mut connection: C,
    peer: Option<SocketAddr>,
    read_buffer_size: usize,
    max_request_size: usize,
) -> Result<Job, Error>
where
    C: Connection + 'static,
{
    let bytes = match read_request(&mut connection, read_buffer_size, max_request_size).await {
        Ok(bytes) => bytes,
        Err(e) => {
            close(connection).await;
            return Err(e);
        }
    };

    match HttpRequest::from_bytes(&bytes) {
        Ok(request) => Ok(Job::new(id, request, Box::new(connection), peer)),
        Err(e) => {
            let response = HttpResponse::text(StatusCode::BadRequest, format!("Error parsing request: {e}"));
            if let Err(write_err) = connection.write_all(&response.to_bytes()).await {
                debug!("Failed to send 400 response: {write_err}");
            }
            close(connection).await;
            Err(Error::ParseError(e))
        }
    }
}

/// Whether `buf` holds a full header block and any declared body.
///
/// A head that fails to parse counts as complete; the parser reports the
/// error once reading stops.
fn is_complete(buf: &[u8]) -> bool {
    if find_head_end(buf).is_none() {
        return false;
    }

    match parse_head(buf) {
        Ok(head) => match content_length(&head.headers) {
            Some(declared) => buf.len() - head.body_offset >= declared,
            None => true,
        },
        Err(_) => true,
    }
}

/// Close a connection, flushing anything still buffered.
///
/// Failures are logged and otherwise ignored; the handle is dropped either way.
pub async fn close<C>(mut connection: C)
where
    C: AsyncWrite + Unpin,
{
    if let Err(e) = connection.shutdown().await {
        debug!("Error closing connection: {e}");
    }
}
