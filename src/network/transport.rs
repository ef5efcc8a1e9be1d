//! One-shot TCP delivery of an encoded frame.
//!
//! Every transfer gets its own connection: connect, write the whole
//! buffer, shut down, done. Nothing is pooled or reused, and no response
//! is read back from the server.

use crate::{EqusendError, Result};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

/// Open a fresh connection to `addr`.
///
/// `timeout` bounds the connect; `None` means the call may block
/// indefinitely on an unresponsive peer.
pub async fn connect(addr: &str, timeout: Option<Duration>) -> Result<TcpStream> {
    let stream = with_timeout(addr, timeout, TcpStream::connect(addr)).await?;
    debug!("connected to {}", addr);
    Ok(stream)
}

/// Write the entire frame to `stream` and shut the connection down.
///
/// Takes the stream by value: it is dropped, and the socket closed, on
/// every exit path whether the send succeeded or not. A partial write
/// never surfaces as success, `write_all` either finishes the buffer or
/// fails.
pub async fn send(
    addr: &str,
    mut stream: TcpStream,
    frame: &[u8],
    timeout: Option<Duration>,
) -> Result<()> {
    with_timeout(addr, timeout, async {
        stream.write_all(frame).await?;
        stream.shutdown().await
    })
    .await?;

    debug!("sent {} bytes to {}", frame.len(), addr);
    Ok(())
}

/// Connect, send one frame, close. Convenience composition of [`connect`]
/// and [`send`].
pub async fn send_frame(addr: &str, frame: &[u8], timeout: Option<Duration>) -> Result<()> {
    let stream = connect(addr, timeout).await?;
    send(addr, stream, frame, timeout).await
}

async fn with_timeout<T, F>(addr: &str, timeout: Option<Duration>, fut: F) -> Result<T>
where
    F: std::future::Future<Output = std::io::Result<T>>,
{
    let result = match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or_else(|_| Err(std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out"))),
        None => fut.await,
    };

    result.map_err(|source| EqusendError::Transport {
        addr: addr.to_string(),
        source,
    })
}
