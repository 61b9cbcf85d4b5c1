// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device-node transport: USB printers exposed by the kernel as a character
// device (`/dev/usb/lp0`) take the job bytes with a plain write.

use std::path::Path;

use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use shelftag_core::error::{Result, ShelftagError};

/// Write job bytes to the device at `path`.
///
/// The node must already exist; a missing path means the printer is
/// unplugged or the path is wrong, and is reported rather than created.
pub async fn send_to_device(path: &Path, job_bytes: &[u8]) -> Result<()> {
    debug!(path = %path.display(), total = job_bytes.len(), "opening printer device");

    let mut device = tokio::fs::OpenOptions::new()
        .append(true)
        .open(path)
        .await
        .map_err(|e| ShelftagError::Transport(format!("open {}: {e}", path.display())))?;

    device
        .write_all(job_bytes)
        .await
        .map_err(|e| ShelftagError::Transport(format!("write {}: {e}", path.display())))?;
    device
        .flush()
        .await
        .map_err(|e| ShelftagError::Transport(format!("flush {}: {e}", path.display())))?;

    info!(path = %path.display(), total = job_bytes.len(), "print job written to device");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn appends_jobs_in_order() {
        let capture = tempfile::NamedTempFile::new().unwrap();

        send_to_device(capture.path(), b"CLS\r\n").await.unwrap();
        send_to_device(capture.path(), b"PRINT 1,1\r\n").await.unwrap();

        let written = std::fs::read(capture.path()).unwrap();
        assert_eq!(written, b"CLS\r\nPRINT 1,1\r\n");
    }

    #[tokio::test]
    async fn missing_device_is_transport_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lp0");

        let err = send_to_device(&path, b"CLS\r\n").await.unwrap_err();
        assert!(matches!(err, ShelftagError::Transport(_)));
        assert!(!path.exists());
    }
}
