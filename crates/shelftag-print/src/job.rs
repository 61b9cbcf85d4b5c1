// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// A rendered label on its way to the printer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use shelftag_core::types::JobId;
use shelftag_tspl::{LabelRequest, PrinterScript};

/// One label print job: the job bytes plus what we log about them.
#[derive(Debug, Clone, Serialize)]
pub struct LabelJob {
    pub id: JobId,
    pub label: String,
    /// SHA-256 of the job bytes, lowercase hex.
    pub script_sha256: String,
    #[serde(skip)]
    bytes: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl LabelJob {
    pub fn new(label: &LabelRequest, script: &PrinterScript) -> Self {
        let bytes = script.to_bytes();
        Self {
            id: JobId::new(),
            label: label.as_str().to_owned(),
            script_sha256: hash_bytes(&bytes),
            bytes,
            created_at: Utc::now(),
        }
    }

    /// Raw TSPL bytes to stream to the printer.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Compute the SHA-256 hash of `data` and return it as a lowercase hex string.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use shelftag_core::ShelftagConfig;
    use shelftag_tspl::render;

    /// SHA-256 of the empty byte slice (well-known constant).
    const EMPTY_SHA256: &str =
        "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    fn job_for(label: &str) -> LabelJob {
        let now = NaiveDate::from_ymd_opt(2026, 10, 18)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let request = LabelRequest::new(label);
        let rendered = render(&request, &ShelftagConfig::default(), now);
        LabelJob::new(&request, &rendered.script)
    }

    #[test]
    fn hash_empty_input() {
        assert_eq!(hash_bytes(b""), EMPTY_SHA256);
    }

    #[test]
    fn job_carries_script_bytes_and_digest() {
        let job = job_for("44-10");
        assert!(job.bytes().starts_with(b"SIZE 30 mm,20 mm\r\n"));
        assert!(job.bytes().ends_with(b"PRINT 1,1\r\n"));
        assert_eq!(job.script_sha256, hash_bytes(job.bytes()));
        assert_eq!(job.label, "44-10");
        assert!(!job.is_empty());
    }

    #[test]
    fn same_script_same_digest_different_ids() {
        let a = job_for("6-10");
        let b = job_for("6-10");
        assert_eq!(a.script_sha256, b.script_sha256);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn serialized_job_omits_bytes() {
        let json = serde_json::to_value(job_for("1-1")).unwrap();
        assert!(json.get("bytes").is_none());
        assert_eq!(json["label"], "1-1");
    }
}
