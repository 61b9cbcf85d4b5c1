// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Raw TCP print client (JetDirect, port 9100).
//
// Network-attached label printers accept TSPL on a plain socket: open it,
// write the job, close it.  There is no status channel, so a successful
// return only means the bytes left this host.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::{debug, info};

use shelftag_core::error::{Result, ShelftagError};

/// Timeout for connecting and for each write.
const RAW_TIMEOUT_SECS: u64 = 10;

/// Labels are a few hundred bytes; chunking only matters for logging.
const CHUNK_SIZE: usize = 4096;

/// Send job bytes to a printer via raw TCP.
pub async fn send_raw(host: &str, port: u16, job_bytes: &[u8]) -> Result<()> {
    let addr = format!("{host}:{port}");
    info!(addr = %addr, total = job_bytes.len(), "connecting via raw TCP");

    let timeout = Duration::from_secs(RAW_TIMEOUT_SECS);
    let mut stream = tokio::time::timeout(timeout, TcpStream::connect(&addr))
        .await
        .map_err(|_| {
            ShelftagError::Transport(format!(
                "raw TCP connection to {addr} timed out after {RAW_TIMEOUT_SECS}s"
            ))
        })?
        .map_err(|e| ShelftagError::Transport(format!("raw TCP connect to {addr}: {e}")))?;

    let mut sent = 0usize;
    for chunk in job_bytes.chunks(CHUNK_SIZE) {
        tokio::time::timeout(timeout, stream.write_all(chunk))
            .await
            .map_err(|_| {
                ShelftagError::Transport(format!("raw TCP send to {addr} timed out at byte {sent}"))
            })?
            .map_err(|e| {
                ShelftagError::Transport(format!("raw TCP send failed at byte {sent}: {e}"))
            })?;
        sent += chunk.len();
        debug!(sent, total = job_bytes.len(), "raw TCP progress");
    }

    stream
        .flush()
        .await
        .map_err(|e| ShelftagError::Transport(format!("raw TCP flush: {e}")))?;
    stream
        .shutdown()
        .await
        .map_err(|e| ShelftagError::Transport(format!("raw TCP shutdown: {e}")))?;

    info!(addr = %addr, total = job_bytes.len(), "raw TCP print job sent");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn delivers_all_bytes() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let receiver = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            socket.read_to_end(&mut received).await.unwrap();
            received
        });

        let job = b"SIZE 30 mm,20 mm\r\nCLS\r\nPRINT 1,1\r\n".repeat(500);
        send_raw("127.0.0.1", port, &job).await.unwrap();

        assert_eq!(receiver.await.unwrap(), job);
    }

    #[tokio::test]
    async fn refused_connection_is_transport_error() {
        // Grab a free port, then close it so nothing is listening.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };

        let err = send_raw("127.0.0.1", port, b"CLS\r\n").await.unwrap_err();
        assert!(matches!(err, ShelftagError::Transport(_)));
        assert!(err.to_string().contains("127.0.0.1"));
    }
}
