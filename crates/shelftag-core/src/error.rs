// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Shelftag.

use thiserror::Error;

/// Top-level error type for all Shelftag operations.
///
/// Rendering a label never fails, so nothing here originates in the TSPL
/// engine.  These cover the configuration document, the HTTP boundary and
/// the printer transport.
#[derive(Debug, Error)]
pub enum ShelftagError {
    // -- Configuration --
    #[error("configuration error: {0}")]
    Config(String),

    // -- Boundary --
    #[error("bad label format: {0}")]
    InvalidLabel(String),

    #[error("label server error: {0}")]
    Server(String),

    // -- Printer --
    #[error("printer transport failed: {0}")]
    Transport(String),

    // -- Storage / persistence --
    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, ShelftagError>;
