use std::io;

use bytes::BytesMut;
use memchr::memmem;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tracing::{debug, error, info};

use crate::application::ServerData;
use crate::infrastructure::server_impl::parser::parse_headers;
use crate::infrastructure::server_impl::server::{process_server_request, Header};
use crate::AnyResult;

const HEADERS_END: &[u8] = b"\r\n\r\n";

/// How much of a connection is read before the request is parsed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReadPolicy {
    /// A single read of at most `capacity` bytes. Anything beyond it is dropped.
    Fixed { capacity: usize },
    /// Reads up to `chunk` bytes at a time until the headers are complete and the
    /// `Content-Length` body has arrived, the peer stops sending, or `limit` is hit.
    /// A short read while the header terminator is still missing ends the request too,
    /// so input without a blank line is answered instead of waiting on the peer.
    UntilDelimiter { chunk: usize, limit: usize },
}

impl Default for ReadPolicy {
    fn default() -> Self {
        Self::Fixed { capacity: 4096 }
    }
}

/// Total request length once the headers in `buf` are complete, body included.
/// A `Content-Length` too large to add up saturates, leaving `limit` to stop the read.
fn expected_len(buf: &[u8]) -> Option<usize> {
    let end = memmem::find(buf, HEADERS_END)? + HEADERS_END.len();
    let name: &str = Header::CONTENT_LENGTH.into();
    let body_len = parse_headers(&buf[..end])
        .ok()
        .and_then(|headers| headers.get(name).and_then(|len| len.parse::<usize>().ok()))
        .unwrap_or(0);

    Some(end.saturating_add(body_len))
}

pub async fn read_request<R>(reader: &mut R, policy: ReadPolicy) -> io::Result<BytesMut>
where
    R: AsyncRead + Unpin,
{
    match policy {
        ReadPolicy::Fixed { capacity } => {
            let mut buf = BytesMut::zeroed(capacity);
            let n = reader.read(&mut buf).await?;
            buf.truncate(n);
            Ok(buf)
        }
        ReadPolicy::UntilDelimiter { chunk, limit } => {
            let mut buf = BytesMut::with_capacity(chunk.min(limit));
            while buf.len() < limit {
                if expected_len(&buf).is_some_and(|len| buf.len() >= len) {
                    break;
                }

                let wanted = chunk.min(limit - buf.len());
                buf.reserve(wanted);
                let read = (&mut *reader).take(wanted as u64).read_buf(&mut buf).await?;
                if read == 0 {
                    break;
                }
                if read < wanted && memmem::find(&buf, HEADERS_END).is_none() {
                    break;
                }
            }
            Ok(buf)
        }
    }
}

/// Serves exactly one request on `stream`, then shuts down its write half.
pub async fn handle_connection<S>(mut stream: S, server_data: ServerData) -> io::Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let raw = read_request(&mut stream, server_data.read_policy).await?;
    if raw.is_empty() {
        debug!("peer closed before sending a request");
        return Ok(());
    }

    let response = process_server_request(&server_data, &raw);
    let status = response.status_code;
    stream.write_all(&response.into_http()).await?;
    debug!(?status, "response written");

    if let Err(e) = stream.shutdown().await {
        debug!(error = %e, "shutdown after response failed");
    }
    Ok(())
}

/// Accepts connections forever, one task each. Only a failed accept ends the loop.
pub async fn serve(listener: TcpListener, server_data: ServerData) -> AnyResult<()> {
    info!(address = %listener.local_addr()?, "listening");

    loop {
        let (socket, peer) = listener.accept().await?;
        let server_data = server_data.clone();

        tokio::spawn(async move {
            if let Err(e) = handle_connection(socket, server_data).await {
                error!(%peer, error = %e, "connection failed");
            }
        });
    }
}
