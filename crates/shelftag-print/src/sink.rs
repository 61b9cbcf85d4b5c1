// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printer sink: where finished TSPL jobs go.

use std::fmt;
use std::path::PathBuf;

use tracing::{info, instrument, warn};

use shelftag_core::config::{PrinterConfig, TransportConfig};
use shelftag_core::error::Result;

use crate::device::send_to_device;
use crate::job::LabelJob;
use crate::raw_client::send_raw;

/// Destination for raw print jobs.
///
/// Callers that share a sink between tasks must serialize `send` calls;
/// the label server holds it behind an async mutex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrinterSink {
    /// Raw TCP socket (JetDirect).
    RawTcp { host: String, port: u16 },
    /// Character device or capture file.
    Device { path: PathBuf },
}

impl PrinterSink {
    pub fn from_config(printer: &PrinterConfig) -> Self {
        match &printer.transport {
            TransportConfig::Tcp { host, port } => Self::RawTcp {
                host: host.clone(),
                port: *port,
            },
            TransportConfig::Device { path } => Self::Device { path: path.clone() },
        }
    }

    /// Stream one job to the printer.
    #[instrument(skip_all, fields(job_id = %job.id, sink = %self))]
    pub async fn send(&self, job: &LabelJob) -> Result<()> {
        let result = match self {
            Self::RawTcp { host, port } => send_raw(host, *port, job.bytes()).await,
            Self::Device { path } => send_to_device(path, job.bytes()).await,
        };

        match &result {
            Ok(()) => info!(
                label = %job.label,
                bytes = job.len(),
                sha256 = %job.script_sha256,
                "print job delivered"
            ),
            Err(e) => warn!(label = %job.label, error = %e, "print job failed"),
        }
        result
    }
}

impl fmt::Display for PrinterSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RawTcp { host, port } => write!(f, "tcp://{host}:{port}"),
            Self::Device { path } => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shelftag_core::ShelftagConfig;
    use shelftag_tspl::{LabelRequest, render};

    fn job() -> LabelJob {
        let now = NaiveDate::from_ymd_opt(2026, 1, 2)
            .unwrap()
            .and_hms_opt(3, 4, 5)
            .unwrap();
        let request = LabelRequest::new("1-1");
        let rendered = render(&request, &ShelftagConfig::default(), now);
        LabelJob::new(&request, &rendered.script)
    }

    #[test]
    fn sink_from_config() {
        let config = ShelftagConfig::default();
        assert_eq!(
            PrinterSink::from_config(&config.printer),
            PrinterSink::Device {
                path: PathBuf::from("/dev/usb/lp0")
            }
        );

        let config = ShelftagConfig::from_json_str(
            r#"{"printer": {"transport": {"kind": "tcp", "host": "10.0.0.7", "port": 9101}}}"#,
        )
        .unwrap();
        let sink = PrinterSink::from_config(&config.printer);
        assert_eq!(sink.to_string(), "tcp://10.0.0.7:9101");
    }

    #[tokio::test]
    async fn device_sink_writes_job_bytes() {
        let capture = tempfile::NamedTempFile::new().unwrap();
        let sink = PrinterSink::Device {
            path: capture.path().to_path_buf(),
        };
        let job = job();

        sink.send(&job).await.unwrap();

        assert_eq!(std::fs::read(capture.path()).unwrap(), job.bytes());
    }
}
