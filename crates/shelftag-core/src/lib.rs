// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Shelftag core types, configuration store and error definitions shared
// across all crates.

pub mod config;
pub mod data_dir;
pub mod error;
pub mod types;

pub use config::ShelftagConfig;
pub use error::ShelftagError;
pub use types::*;
